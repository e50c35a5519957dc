//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all chunes-server endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::{header, RequestBuilder, Response};
use serde_json::{json, Value};
use std::time::Duration;

/// HTTP test client, carries the auth state cookie and the session token
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
    /// Session token sent as a bearer on every API call, once logged in
    pub auth_token: Option<String>,
}

impl TestClient {
    /// Creates a new unauthenticated client
    ///
    /// Use this for testing authentication flows.
    /// For most tests, use `authenticated()` instead.
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            base_url,
            auth_token: None,
        }
    }

    /// Creates a client logged in as the main test user
    pub async fn authenticated(base_url: String) -> Self {
        Self::authenticated_with_code(base_url, TEST_USER_CODE).await
    }

    /// Creates a client logged in through the full authorization flow with `code`
    ///
    /// # Panics
    ///
    /// Panics if authentication fails (indicates test infrastructure problem).
    pub async fn authenticated_with_code(base_url: String, code: &str) -> Self {
        let mut client = Self::new(base_url);

        let response = client.login_flow(code).await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::OK,
            "Login failed for code {}",
            code
        );
        let body: Value = response.json().await.expect("Login response is not JSON");
        let token = body["auth_token"]
            .as_str()
            .expect("Login response carries no auth_token")
            .to_string();
        client.auth_token = Some(token);

        client
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_session(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    // ========================================================================
    // Authentication Endpoints
    // ========================================================================

    /// POST /api/auth/spotify-auth-url
    pub async fn request_auth_url(&self, redirect_uri: &str) -> Response {
        self.client
            .post(self.url("/api/auth/spotify-auth-url"))
            .json(&json!({ "redirectUri": redirect_uri }))
            .send()
            .await
            .expect("Auth URL request failed")
    }

    /// POST /api/auth/login
    pub async fn login(&self, code: &str, state: Option<&str>) -> Response {
        self.client
            .post(self.url("/api/auth/login"))
            .json(&json!({
                "code": code,
                "redirect_uri": TEST_REDIRECT_URI,
                "state": state,
            }))
            .send()
            .await
            .expect("Login request failed")
    }

    /// Requests an authorization URL, then logs in with `code` and the state it carried
    pub async fn login_flow(&self, code: &str) -> Response {
        let response = self.request_auth_url(TEST_REDIRECT_URI).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: Value = response.json().await.expect("Auth URL response is not JSON");
        let auth_url = body["authUrl"].as_str().expect("No authUrl in response");
        let state = state_of(auth_url);

        self.login(code, Some(&state)).await
    }

    // ========================================================================
    // Catalog Endpoints
    // ========================================================================

    /// GET /api/albums/{id}
    pub async fn get_album(&self, id: &str) -> Response {
        self.get(&format!("/api/albums/{}", id)).await
    }

    /// GET /api/tracks/{id}
    pub async fn get_track(&self, id: &str) -> Response {
        self.get(&format!("/api/tracks/{}", id)).await
    }

    /// GET /api/albums/new-releases
    pub async fn get_new_releases(&self) -> Response {
        self.get("/api/albums/new-releases").await
    }

    /// GET /api/albums/recommended
    pub async fn get_recommended_albums(&self) -> Response {
        self.get("/api/albums/recommended").await
    }

    /// GET /api/tracks/top
    pub async fn get_top_tracks(&self) -> Response {
        self.get("/api/tracks/top").await
    }

    /// GET /api/search?query=
    pub async fn search(&self, query: &str) -> Response {
        self.with_session(self.client.get(self.url("/api/search")))
            .query(&[("query", query)])
            .send()
            .await
            .expect("Search request failed")
    }

    // ========================================================================
    // Rating Endpoints
    // ========================================================================

    /// GET /api/ratings
    pub async fn get_latest_ratings(&self) -> Response {
        self.get("/api/ratings").await
    }

    /// GET /api/ratings/me
    pub async fn get_my_rated_items(&self) -> Response {
        self.get("/api/ratings/me").await
    }

    /// POST /api/ratings/{kind}/{id}
    pub async fn rate(&self, kind: &str, id: &str, score: f64, review: Option<&str>) -> Response {
        self.with_session(
            self.client
                .post(self.url(&format!("/api/ratings/{}/{}", kind, id))),
        )
        .json(&json!({ "score": score, "review": review }))
        .send()
        .await
        .expect("Rate request failed")
    }

    /// DELETE /api/ratings/{kind}/{id}
    pub async fn delete_rating(&self, kind: &str, id: &str) -> Response {
        self.with_session(
            self.client
                .delete(self.url(&format!("/api/ratings/{}/{}", kind, id))),
        )
        .send()
        .await
        .expect("Delete rating request failed")
    }

    // ========================================================================
    // Raw access
    // ========================================================================

    /// GET any path with the session, if any
    pub async fn get(&self, path: &str) -> Response {
        self.with_session(self.client.get(self.url(path)))
            .send()
            .await
            .expect("GET request failed")
    }

    /// GET any path with a verbatim Authorization header
    pub async fn get_with_authorization(&self, path: &str, authorization: &str) -> Response {
        self.client
            .get(self.url(path))
            .header(header::AUTHORIZATION, authorization)
            .send()
            .await
            .expect("GET request failed")
    }
}

/// Extracts the `state` query parameter of an authorization URL
fn state_of(auth_url: &str) -> String {
    let url = reqwest::Url::parse(auth_url).expect("Invalid authorization URL");
    url.query_pairs()
        .find(|(key, _)| key == "state")
        .map(|(_, value)| value.into_owned())
        .expect("No state in authorization URL")
}
