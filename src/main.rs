use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chunes_server::auth::{SpotifyAuthClient, TokenSigner};
use chunes_server::config::{
    self, DEFAULT_CATALOG_TIMEOUT_SEC, DEFAULT_RECOMMENDED_CACHE_AGE_SEC, DEFAULT_SESSION_TTL_SEC,
};
use chunes_server::{
    run_server, CatalogRatingsService, RequestsLoggingLevel, SpotifyClient, SqliteRatingStore,
};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory holding the ratings database (ratings.db).
    /// Can also be specified in config file.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Spotify application client id.
    #[clap(long, env = "SPOTIFY_CLIENT_ID")]
    pub spotify_client_id: Option<String>,

    /// Spotify application client secret.
    #[clap(long, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    pub spotify_client_secret: Option<String>,

    /// Secret used to sign session tokens. Defaults to the Spotify client secret.
    #[clap(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Base URL of the Spotify Web API.
    #[clap(long)]
    pub spotify_api_url: Option<String>,

    /// Base URL of the Spotify accounts service.
    #[clap(long)]
    pub spotify_accounts_url: Option<String>,

    /// Timeout in seconds for requests to Spotify.
    #[clap(long, default_value_t = DEFAULT_CATALOG_TIMEOUT_SEC)]
    pub catalog_timeout_sec: u64,

    /// Lifetime in seconds of issued session tokens.
    #[clap(long, default_value_t = DEFAULT_SESSION_TTL_SEC)]
    pub session_ttl_sec: u64,

    /// The maximum age in seconds of cached recommendations.
    #[clap(long, default_value_t = DEFAULT_RECOMMENDED_CACHE_AGE_SEC)]
    pub recommended_cache_age_sec: usize,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            db_dir: args.db_dir.clone(),
            port: args.port,
            logging_level: args.logging_level.clone(),
            frontend_dir_path: args.frontend_dir_path.clone(),
            spotify_client_id: args.spotify_client_id.clone(),
            spotify_client_secret: args.spotify_client_secret.clone(),
            jwt_secret: args.jwt_secret.clone(),
            spotify_api_url: args.spotify_api_url.clone(),
            spotify_accounts_url: args.spotify_accounts_url.clone(),
            catalog_timeout_sec: args.catalog_timeout_sec,
            session_ttl_sec: args.session_ttl_sec,
            recommended_cache_age_sec: args.recommended_cache_age_sec,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  db_dir: {:?}", app_config.db_dir);
    info!("  port: {}", app_config.port);
    info!("  spotify api: {}", app_config.spotify.api_url);

    if !app_config.ratings_db_path().exists() {
        info!(
            "Creating new ratings database at {:?}",
            app_config.ratings_db_path()
        );
    }
    let rating_store = Arc::new(SqliteRatingStore::new(app_config.ratings_db_path())?);

    let catalog = Arc::new(
        SpotifyClient::new(&app_config.spotify.api_url, app_config.spotify.timeout_sec)
            .context("Failed to build Spotify client")?,
    );
    let auth_client = SpotifyAuthClient::new(
        &app_config.spotify.accounts_url,
        app_config.spotify.client_id.clone(),
        app_config.spotify.client_secret.clone(),
        app_config.spotify.timeout_sec,
    )
    .context("Failed to build Spotify accounts client")?;
    let token_signer = TokenSigner::new(&app_config.jwt_secret, app_config.session_ttl_sec);

    let service = CatalogRatingsService::new(catalog, rating_store);

    info!("Ready to serve at port {}!", app_config.port);
    run_server(
        app_config.server_config(),
        service,
        token_signer,
        auth_client,
    )
    .await
}
