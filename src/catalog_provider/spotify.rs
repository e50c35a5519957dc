//! HTTP client for the Spotify Web API.

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::error::CatalogError;
use super::spotify_models::{
    error_message_from_body, NewReleasesResponse, RecommendationsResponse, SearchResponse,
    Paging, SeveralAlbums, SeveralTracks, SpotifyAlbum, SpotifyArtist, SpotifyTrack, SpotifyUser,
};
use super::trait_def::{CatalogProvider, ProviderUser, SearchResults};
use crate::catalog::{Album, Artist, Item, ItemKind, Track};

pub const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";

/// Maps a non-success response to the matching [`CatalogError`].
pub(crate) async fn error_for_response(
    response: reqwest::Response,
) -> Result<reqwest::Response, CatalogError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    match status {
        StatusCode::NOT_FOUND => Err(CatalogError::NotFound),
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            Err(CatalogError::RateLimited { retry_after })
        }
        _ => {
            let body = response.text().await.unwrap_or_default();
            let message = error_message_from_body(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Unexpected status")
                    .to_string()
            });
            Err(CatalogError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }
}

pub struct SpotifyClient {
    client: reqwest::Client,
    base_url: String,
}

impl SpotifyClient {
    pub fn new(base_url: &str, timeout_sec: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(|err| CatalogError::Transport(err.to_string()))?;
        let response = error_for_response(response).await?;

        response
            .json::<T>()
            .await
            .map_err(|err| CatalogError::Decode(err.to_string()))
    }
}

#[async_trait]
impl CatalogProvider for SpotifyClient {
    async fn fetch_one(&self, token: &str, kind: ItemKind, id: &str) -> Result<Item, CatalogError> {
        let path = format!("{}/{}", kind.collection_name(), urlencoding::encode(id));
        let item = match kind {
            ItemKind::Album => {
                let album: SpotifyAlbum = self.get_json(token, &path, &[]).await?;
                Album::from(album).into()
            }
            ItemKind::Track => {
                let track: SpotifyTrack = self.get_json(token, &path, &[]).await?;
                Track::from(track).into()
            }
        };
        Ok(item)
    }

    async fn fetch_many(
        &self,
        token: &str,
        kind: ItemKind,
        ids: &[String],
    ) -> Result<Vec<Item>, CatalogError> {
        let query = [("ids", ids.join(","))];
        let path = kind.collection_name();
        let items = match kind {
            ItemKind::Album => self
                .get_json::<SeveralAlbums>(token, path, &query)
                .await?
                .albums
                .into_iter()
                .flatten()
                .map(|album| Album::from(album).into())
                .collect(),
            ItemKind::Track => self
                .get_json::<SeveralTracks>(token, path, &query)
                .await?
                .tracks
                .into_iter()
                .flatten()
                .map(|track| Track::from(track).into())
                .collect(),
        };
        Ok(items)
    }

    async fn search(
        &self,
        token: &str,
        query: &str,
        limit: usize,
    ) -> Result<SearchResults, CatalogError> {
        let response: SearchResponse = self
            .get_json(
                token,
                "search",
                &[
                    ("q", query.to_string()),
                    ("type", "album,track".to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        Ok(SearchResults {
            albums: response
                .albums
                .map(|page| page.into_items().map(Album::from).collect())
                .unwrap_or_default(),
            tracks: response
                .tracks
                .map(|page| page.into_items().map(Track::from).collect())
                .unwrap_or_default(),
        })
    }

    async fn top_artists(&self, token: &str, limit: usize) -> Result<Vec<Artist>, CatalogError> {
        let page: Paging<SpotifyArtist> = self
            .get_json(token, "me/top/artists", &[("limit", limit.to_string())])
            .await?;
        Ok(page.into_items().map(Artist::from).collect())
    }

    async fn recommendations(
        &self,
        token: &str,
        seed_artist_ids: &[String],
        limit: usize,
    ) -> Result<Vec<Track>, CatalogError> {
        let response: RecommendationsResponse = self
            .get_json(
                token,
                "recommendations",
                &[
                    ("seed_artists", seed_artist_ids.join(",")),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Ok(response.tracks.into_iter().map(Track::from).collect())
    }

    async fn top_tracks(&self, token: &str, limit: usize) -> Result<Vec<Track>, CatalogError> {
        let page: Paging<SpotifyTrack> = self
            .get_json(
                token,
                "me/top/tracks",
                &[
                    ("time_range", "short_term".to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Ok(page.into_items().map(Track::from).collect())
    }

    async fn new_releases(&self, token: &str) -> Result<Vec<Album>, CatalogError> {
        let response: NewReleasesResponse =
            self.get_json(token, "browse/new-releases", &[]).await?;
        Ok(response.albums.into_items().map(Album::from).collect())
    }

    async fn current_user(&self, token: &str) -> Result<ProviderUser, CatalogError> {
        let user: SpotifyUser = self.get_json(token, "me", &[]).await?;
        Ok(user.into())
    }
}
