//! Test data for the in-memory catalog and the fake accounts service

use super::constants::*;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Form, Json, Router};
use chunes_server::catalog::{Album, Artist, Track};
use chunes_server::catalog_provider::{InMemoryCatalogProvider, ProviderUser};
use serde_json::json;
use std::collections::HashMap;

fn artist(id: &str, name: &str) -> Artist {
    Artist {
        id: id.to_string(),
        name: name.to_string(),
        url: Some(format!("https://open.spotify.com/artist/{}", id)),
    }
}

fn album(id: &str, name: &str, year: i32, by: Artist) -> Album {
    let mut album = Album::new(id, name).with_release_year(year);
    album.image = Some(format!("http://img.test/{}.jpg", id));
    album.url = Some(format!("https://open.spotify.com/album/{}", id));
    album.artists = vec![by];
    album
}

fn track(id: &str, name: &str, on: &Album) -> Track {
    let mut track = Track::new(id, name).with_album(on.clone());
    track.artists = on.artists.clone();
    track.url = Some(format!("https://open.spotify.com/track/{}", id));
    track
}

/// Builds the catalog every test server starts with.
///
/// - The Test Band: First Album (1999) with Opening Track and Second Song
/// - Jazz Ensemble: Jazz Collection (2005) with Jazz Piece
/// - Fresh Sounds, only among the new releases
///
/// Top artists are both bands and the recommendations point at tracks of both
/// albums, so recommended albums come out as Jazz Collection then First Album.
pub fn create_test_catalog() -> InMemoryCatalogProvider {
    let provider = InMemoryCatalogProvider::new();

    let band = artist(ARTIST_1_ID, "The Test Band");
    let ensemble = artist(ARTIST_2_ID, "Jazz Ensemble");

    let first_album = album(ALBUM_1_ID, "First Album", 1999, band.clone());
    let jazz_collection = album(ALBUM_2_ID, "Jazz Collection", 2005, ensemble.clone());
    let fresh_sounds = album(ALBUM_3_ID, "Fresh Sounds", 2024, band.clone());

    let opening = track(TRACK_1_ID, "Opening Track", &first_album);
    let second = track(TRACK_2_ID, "Second Song", &first_album);
    let jazz_piece = track(TRACK_3_ID, "Jazz Piece", &jazz_collection);

    provider.add_album(first_album);
    provider.add_album(jazz_collection);
    provider.add_track(opening.clone());
    provider.add_track(second.clone());
    provider.add_track(jazz_piece.clone());

    provider.set_top_artists(vec![band, ensemble]);
    provider.set_recommendations(vec![opening.clone(), jazz_piece.clone(), second.clone()]);
    provider.set_top_tracks(vec![jazz_piece, opening]);
    provider.set_new_releases(vec![fresh_sounds]);

    provider.add_user(
        &access_token_for(TEST_USER_CODE),
        ProviderUser {
            id: TEST_USER_ID.to_string(),
            display_name: Some(TEST_USER_NAME.to_string()),
            image_url: Some(TEST_USER_IMAGE.to_string()),
        },
    );
    provider.add_user(
        &access_token_for(OTHER_USER_CODE),
        ProviderUser {
            id: OTHER_USER_ID.to_string(),
            display_name: None,
            image_url: None,
        },
    );

    provider
}

async fn token_endpoint(
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("Basic "));
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "invalid_client" })),
        )
            .into_response();
    }

    let code = form.get("code").cloned().unwrap_or_default();
    let grant_type = form.get("grant_type").map(String::as_str);
    if code == REJECTED_CODE || grant_type != Some("authorization_code") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid authorization code",
            })),
        )
            .into_response();
    }

    Json(json!({
        "access_token": access_token_for(&code),
        "token_type": "Bearer",
        "expires_in": 3600,
    }))
    .into_response()
}

/// Router standing in for the Spotify accounts service.
///
/// Any code other than [`REJECTED_CODE`] is traded for `access_token_for(code)`.
pub fn fake_accounts_router() -> Router {
    Router::new().route("/api/token", post(token_endpoint))
}
