//! Spotify Web API response types and their conversion into catalog items.

use serde::Deserialize;

use super::trait_def::ProviderUser;
use crate::catalog::{Album, Artist, Track};

#[derive(Debug, Deserialize)]
pub(super) struct SpotifyImage {
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ExternalUrls {
    pub spotify: Option<String>,
}

fn spotify_url(urls: Option<ExternalUrls>) -> Option<String> {
    urls.and_then(|urls| urls.spotify)
}

fn first_image(images: Vec<SpotifyImage>) -> Option<String> {
    images.into_iter().next().map(|image| image.url)
}

/// `release_date` may be `YYYY`, `YYYY-MM` or `YYYY-MM-DD`.
fn release_year(release_date: Option<&str>) -> Option<i32> {
    release_date
        .and_then(|date| date.get(0..4))
        .and_then(|year| year.parse().ok())
}

/// Paged list, entries the provider could not resolve come back as `null`.
#[derive(Debug, Deserialize)]
pub(super) struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<Option<T>>,
}

impl<T> Paging<T> {
    pub fn into_items(self) -> impl Iterator<Item = T> {
        self.items.into_iter().flatten()
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct SpotifyArtist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub external_urls: Option<ExternalUrls>,
}

impl From<SpotifyArtist> for Artist {
    fn from(artist: SpotifyArtist) -> Self {
        Artist {
            id: artist.id,
            name: artist.name,
            url: spotify_url(artist.external_urls),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct SpotifyAlbum {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
    #[serde(default)]
    pub external_urls: Option<ExternalUrls>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub artists: Vec<SpotifyArtist>,
    /// Only present on full album objects.
    #[serde(default)]
    pub tracks: Option<Paging<SpotifyTrack>>,
}

impl From<SpotifyAlbum> for Album {
    fn from(album: SpotifyAlbum) -> Self {
        let mut converted = Album::new(album.id, album.name);
        converted.image = first_image(album.images);
        converted.url = spotify_url(album.external_urls);
        converted.release_year = release_year(album.release_date.as_deref());
        converted.artists = album.artists.into_iter().map(Artist::from).collect();
        if let Some(tracks) = album.tracks {
            let image = converted.image.clone();
            let year = converted.release_year;
            converted.tracks = tracks
                .into_items()
                .map(|track| {
                    let mut track = Track::from(track);
                    track.image = image.clone();
                    track.release_year = year;
                    track
                })
                .collect();
        }
        converted
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct SpotifyTrack {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub album: Option<SpotifyAlbum>,
    #[serde(default)]
    pub artists: Vec<SpotifyArtist>,
    #[serde(default)]
    pub external_urls: Option<ExternalUrls>,
    #[serde(default)]
    pub preview_url: Option<String>,
}

impl From<SpotifyTrack> for Track {
    fn from(track: SpotifyTrack) -> Self {
        let mut converted = Track::new(track.id, track.name);
        converted.url = spotify_url(track.external_urls);
        converted.preview_url = track.preview_url;
        converted.artists = track.artists.into_iter().map(Artist::from).collect();
        match track.album {
            Some(album) => {
                let album = Album::from(album);
                if converted.artists.is_empty() {
                    converted.artists = album.artists.clone();
                }
                converted.with_album(album)
            }
            None => converted,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct SeveralAlbums {
    pub albums: Vec<Option<SpotifyAlbum>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SeveralTracks {
    pub tracks: Vec<Option<SpotifyTrack>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SearchResponse {
    #[serde(default)]
    pub albums: Option<Paging<SpotifyAlbum>>,
    #[serde(default)]
    pub tracks: Option<Paging<SpotifyTrack>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RecommendationsResponse {
    #[serde(default)]
    pub tracks: Vec<SpotifyTrack>,
}

#[derive(Debug, Deserialize)]
pub(super) struct NewReleasesResponse {
    pub albums: Paging<SpotifyAlbum>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SpotifyUser {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
}

impl From<SpotifyUser> for ProviderUser {
    fn from(user: SpotifyUser) -> Self {
        ProviderUser {
            id: user.id,
            display_name: user.display_name,
            image_url: first_image(user.images),
        }
    }
}

/// Pulls a human readable message out of an error body.
///
/// The Web API answers `{"error": {"status": .., "message": ..}}`, the
/// accounts service answers `{"error": "..", "error_description": ".."}`.
pub(crate) fn error_message_from_body(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    if let Some(message) = error.get("message").and_then(|m| m.as_str()) {
        return Some(message.to_string());
    }
    value
        .get("error_description")
        .and_then(|d| d.as_str())
        .or_else(|| error.as_str())
        .map(str::to_string)
}
