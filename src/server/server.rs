use anyhow::Result;
use std::path::Path as FsPath;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{error, info};

use super::session::Session;
use super::{log_requests, state::*, ServerConfig};
use crate::aggregation::{AggregationError, CatalogRatingsService, Envelope};
use crate::auth::{self, AuthError, LoginRequest, SpotifyAuthClient, TokenSigner};
use crate::catalog::{ItemKey, ItemKind};
use crate::rating_store::RatingSubmission;

pub const AUTH_STATE_COOKIE: &str = "spotify_auth_state";

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub version: &'static str,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        match (self.payload, self.error_detail) {
            (Some(payload), _) if self.succeeded => Json(payload).into_response(),
            (_, Some(detail)) => {
                let status =
                    StatusCode::from_u16(detail.status).unwrap_or(StatusCode::BAD_GATEWAY);
                let retry_after = detail
                    .retry_after
                    .as_deref()
                    .and_then(|value| HeaderValue::from_str(value).ok());
                let mut response = (status, Json(detail)).into_response();
                if let Some(retry_after) = retry_after {
                    response.headers_mut().insert(header::RETRY_AFTER, retry_after);
                }
                response
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

/// Logs a failed workflow and wraps the outcome for the client.
fn respond<T: Serialize>(workflow: &str, result: Result<T, AggregationError>) -> Response {
    if let Err(err) = &result {
        error!("{} failed: {}", workflow, err);
    }
    Envelope::from(result).into_response()
}

fn kind_from_segment(segment: &str) -> Result<ItemKind, Response> {
    ItemKind::from_path_segment(segment).ok_or_else(|| StatusCode::NOT_FOUND.into_response())
}

async fn home(State(state): State<ServerState>) -> Json<ServerStats> {
    Json(ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn get_album(
    session: Session,
    State(service): State<GuardedCatalogRatingsService>,
    Path(id): Path<String>,
) -> Response {
    let result = service
        .item_details(&session.user(), ItemKind::Album, &id)
        .await;
    respond("Album details", result)
}

async fn get_track(
    session: Session,
    State(service): State<GuardedCatalogRatingsService>,
    Path(id): Path<String>,
) -> Response {
    let result = service
        .item_details(&session.user(), ItemKind::Track, &id)
        .await;
    respond("Track details", result)
}

async fn get_new_releases(
    session: Session,
    State(service): State<GuardedCatalogRatingsService>,
) -> Response {
    respond("New releases", service.new_releases(&session.user()).await)
}

async fn get_recommended_albums(
    session: Session,
    State(state): State<ServerState>,
) -> Response {
    let result = state.service.recommended_albums(&session.user()).await;
    let succeeded = result.is_ok();
    let mut response = respond("Recommended albums", result);
    if succeeded {
        let cache_control = format!(
            "private, max-age={}",
            state.config.recommended_cache_age_sec
        );
        if let Ok(value) = HeaderValue::from_str(&cache_control) {
            response.headers_mut().insert(header::CACHE_CONTROL, value);
        }
    }
    response
}

async fn get_top_tracks(
    session: Session,
    State(service): State<GuardedCatalogRatingsService>,
) -> Response {
    respond("Top tracks", service.top_tracks(&session.user()).await)
}

async fn get_latest_ratings(
    session: Session,
    State(service): State<GuardedCatalogRatingsService>,
) -> Response {
    respond("Latest ratings", service.latest_ratings(&session.user()).await)
}

async fn get_my_rated_items(
    session: Session,
    State(service): State<GuardedCatalogRatingsService>,
) -> Response {
    respond("My rated items", service.my_rated_items(&session.user()).await)
}

async fn post_rating(
    session: Session,
    State(service): State<GuardedCatalogRatingsService>,
    Path((kind, id)): Path<(String, String)>,
    Json(submission): Json<RatingSubmission>,
) -> Response {
    let kind = match kind_from_segment(&kind) {
        Ok(kind) => kind,
        Err(response) => return response,
    };
    let result = service.rate_item(&session.user(), ItemKey::new(id, kind), &submission);
    respond("Rate item", result)
}

async fn delete_rating(
    session: Session,
    State(service): State<GuardedCatalogRatingsService>,
    Path((kind, id)): Path<(String, String)>,
) -> Response {
    let kind = match kind_from_segment(&kind) {
        Ok(kind) => kind,
        Err(response) => return response,
    };
    match service.delete_rating(&session.user(), &ItemKey::new(id, kind)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => respond::<()>("Delete rating", Err(err)),
    }
}

#[derive(Deserialize, Debug)]
struct SearchParams {
    #[serde(default)]
    query: String,
}

async fn search(
    session: Session,
    State(service): State<GuardedCatalogRatingsService>,
    Query(params): Query<SearchParams>,
) -> Response {
    respond("Search", service.search(&session.user(), &params.query).await)
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct AuthUrlBody {
    redirect_uri: String,
}

async fn post_spotify_auth_url(
    State(auth_client): State<GuardedSpotifyAuthClient>,
    jar: CookieJar,
    Json(body): Json<AuthUrlBody>,
) -> Response {
    match auth_client.login_params(&body.redirect_uri) {
        Ok(params) => {
            let cookie = Cookie::build((AUTH_STATE_COOKIE, params.state))
                .path("/")
                .http_only(true)
                .build();
            (jar.add(cookie), Json(json!({ "authUrl": params.auth_url }))).into_response()
        }
        Err(err) => {
            error!("Could not build the authorization URL: {}", err);
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "invalid redirect uri" })),
            )
                .into_response()
        }
    }
}

async fn post_login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Response {
    let expected_state = jar.get(AUTH_STATE_COOKIE).map(|c| c.value().to_string());
    let jar = jar.remove(Cookie::build(AUTH_STATE_COOKIE).path("/"));

    let result = auth::login(
        &state.auth_client,
        &state.service,
        &state.token_signer,
        &request,
        expected_state.as_deref(),
    )
    .await;

    let response = match result {
        Ok(login) => Json(login).into_response(),
        Err(AuthError::StateMismatch) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "reason": "state mismatch" })),
        )
            .into_response(),
        Err(AuthError::Provider(err)) => respond::<()>("Login", Err(err.into())),
        Err(AuthError::Aggregation(err)) => respond::<()>("Login", Err(err)),
        Err(AuthError::Token(err)) => {
            error!("Could not sign session token: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    };
    (jar, response).into_response()
}

async fn api_not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" }))).into_response()
}

pub fn make_app(
    config: ServerConfig,
    service: CatalogRatingsService,
    token_signer: TokenSigner,
    auth_client: SpotifyAuthClient,
) -> Router {
    let state = ServerState::new(config.clone(), service, token_signer, auth_client);

    let auth_routes: Router<ServerState> = Router::new()
        .route("/spotify-auth-url", post(post_spotify_auth_url))
        .route("/login", post(post_login));

    let albums_routes: Router<ServerState> = Router::new()
        .route("/new-releases", get(get_new_releases))
        .route("/recommended", get(get_recommended_albums))
        .route("/{id}", get(get_album));

    let tracks_routes: Router<ServerState> = Router::new()
        .route("/top", get(get_top_tracks))
        .route("/{id}", get(get_track));

    let ratings_routes: Router<ServerState> = Router::new()
        .route("/", get(get_latest_ratings))
        .route("/me", get(get_my_rated_items))
        .route("/{kind}/{id}", post(post_rating).delete(delete_rating));

    let api_routes: Router<ServerState> = Router::new()
        .nest("/auth", auth_routes)
        .nest("/albums", albums_routes)
        .nest("/tracks", tracks_routes)
        .nest("/ratings", ratings_routes)
        .route("/search", get(search))
        .fallback(api_not_found);

    let home_router: Router<ServerState> = match config.frontend_dir_path {
        Some(frontend_path) => {
            let index = FsPath::new(&frontend_path).join("index.html");
            let static_files_service = ServeDir::new(&frontend_path)
                .append_index_html_on_directories(true)
                .fallback(ServeFile::new(index));
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new().route("/", get(home)),
    };

    home_router
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Could not listen for the shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

pub async fn run_server(
    config: ServerConfig,
    service: CatalogRatingsService,
    token_signer: TokenSigner,
    auth_client: SpotifyAuthClient,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, service, token_signer, auth_client);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
