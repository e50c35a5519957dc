//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own catalog, ratings database
//! and fake Spotify accounts service.

use super::constants::*;
use super::fixtures::{create_test_catalog, fake_accounts_router};
use axum::Router;
use chunes_server::auth::{SpotifyAuthClient, TokenSigner};
use chunes_server::catalog_provider::InMemoryCatalogProvider;
use chunes_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use chunes_server::{CatalogRatingsService, SqliteRatingStore};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Test server instance with isolated catalog and database
///
/// When dropped, the servers shut down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Catalog behind the server, for call assertions and failure injection
    pub catalog: Arc<InMemoryCatalogProvider>,

    /// Rating store for direct database access in tests
    pub rating_store: Arc<SqliteRatingStore>,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _shutdown_txs: Vec<oneshot::Sender<()>>,
}

/// Serves `app` on a random local port until the returned sender fires or drops.
async fn serve_in_background(app: Router) -> (u16, oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let port = listener
        .local_addr()
        .expect("Failed to get local address")
        .port();

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .expect("Server failed");
    });

    (port, shutdown_tx)
}

impl TestServer {
    /// Spawns a new test server on a random port
    ///
    /// This function:
    /// 1. Starts a fake accounts service for the login flow
    /// 2. Fills an in-memory catalog with test data
    /// 3. Creates a ratings database in a temp directory
    /// 4. Spawns the app in a background task and waits for it to be ready
    pub async fn spawn() -> Self {
        let (accounts_port, accounts_shutdown) = serve_in_background(fake_accounts_router()).await;
        let accounts_url = format!("http://127.0.0.1:{}", accounts_port);

        let catalog = Arc::new(create_test_catalog());

        let temp_db_dir = TempDir::new().expect("Failed to create temp dir");
        let rating_store = Arc::new(
            SqliteRatingStore::new(temp_db_dir.path().join("ratings.db"))
                .expect("Failed to open rating store"),
        );

        let service = CatalogRatingsService::new(catalog.clone(), rating_store.clone());
        let auth_client = SpotifyAuthClient::new(
            &accounts_url,
            TEST_CLIENT_ID.to_string(),
            TEST_CLIENT_SECRET.to_string(),
            5,
        )
        .expect("Failed to build accounts client");
        let token_signer = TokenSigner::new(TEST_JWT_SECRET, 3600);

        let config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            port: 0,
            recommended_cache_age_sec: TEST_RECOMMENDED_CACHE_AGE_SEC,
            frontend_dir_path: None,
        };
        let app = make_app(config, service, token_signer, auth_client);
        let (port, app_shutdown) = serve_in_background(app).await;

        let server = Self {
            base_url: format!("http://127.0.0.1:{}", port),
            port,
            catalog,
            rating_store,
            _temp_db_dir: temp_db_dir,
            _shutdown_txs: vec![app_shutdown, accounts_shutdown],
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the home route
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        for tx in self._shutdown_txs.drain(..) {
            let _ = tx.send(());
        }
    }
}
