mod file_config;

pub use file_config::{FileConfig, SpotifyConfig};

use crate::auth::DEFAULT_SPOTIFY_ACCOUNTS_URL;
use crate::catalog_provider::DEFAULT_SPOTIFY_API_URL;
use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

pub const DEFAULT_CATALOG_TIMEOUT_SEC: u64 = 10;
pub const DEFAULT_SESSION_TTL_SEC: u64 = 3600;
pub const DEFAULT_RECOMMENDED_CACHE_AGE_SEC: usize = 60;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
    pub jwt_secret: Option<String>,
    pub spotify_api_url: Option<String>,
    pub spotify_accounts_url: Option<String>,
    pub catalog_timeout_sec: u64,
    pub session_ttl_sec: u64,
    pub recommended_cache_age_sec: usize,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub jwt_secret: String,
    pub session_ttl_sec: u64,
    pub recommended_cache_age_sec: usize,

    pub spotify: SpotifySettings,
}

#[derive(Debug, Clone)]
pub struct SpotifySettings {
    pub client_id: String,
    pub client_secret: String,
    pub api_url: String,
    pub accounts_url: String,
    pub timeout_sec: u64,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let port = file.port.unwrap_or(cli.port);

        let logging_level = match file.logging_level {
            Some(level) => match parse_logging_level(&level) {
                Some(level) => level,
                None => bail!("Unknown logging_level in config file: {}", level),
            },
            None => cli.logging_level.clone(),
        };

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        let spotify_file = file.spotify.unwrap_or_default();
        let client_id = spotify_file
            .client_id
            .or_else(|| cli.spotify_client_id.clone())
            .filter(|id| !id.is_empty());
        let client_secret = spotify_file
            .client_secret
            .or_else(|| cli.spotify_client_secret.clone())
            .filter(|secret| !secret.is_empty());
        let (Some(client_id), Some(client_secret)) = (client_id, client_secret) else {
            bail!("Spotify client id and secret must be specified via --spotify-client-id/--spotify-client-secret or in config file");
        };

        // Sessions are signed with the client secret unless told otherwise.
        let jwt_secret = file
            .jwt_secret
            .or_else(|| cli.jwt_secret.clone())
            .filter(|secret| !secret.is_empty())
            .unwrap_or_else(|| client_secret.clone());

        let spotify = SpotifySettings {
            client_id,
            client_secret,
            api_url: spotify_file
                .api_url
                .or_else(|| cli.spotify_api_url.clone())
                .unwrap_or_else(|| DEFAULT_SPOTIFY_API_URL.to_string()),
            accounts_url: spotify_file
                .accounts_url
                .or_else(|| cli.spotify_accounts_url.clone())
                .unwrap_or_else(|| DEFAULT_SPOTIFY_ACCOUNTS_URL.to_string()),
            timeout_sec: spotify_file.timeout_sec.unwrap_or(cli.catalog_timeout_sec),
        };

        let session_ttl_sec = file.session_ttl_sec.unwrap_or(cli.session_ttl_sec);
        if session_ttl_sec == 0 {
            bail!("session_ttl_sec must be greater than 0");
        }
        let recommended_cache_age_sec = file
            .recommended_cache_age_sec
            .unwrap_or(cli.recommended_cache_age_sec);

        Ok(Self {
            db_dir,
            port,
            logging_level,
            frontend_dir_path,
            jwt_secret,
            session_ttl_sec,
            recommended_cache_age_sec,
            spotify,
        })
    }

    pub fn ratings_db_path(&self) -> PathBuf {
        self.db_dir.join("ratings.db")
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            port: self.port,
            recommended_cache_age_sec: self.recommended_cache_age_sec,
            frontend_dir_path: self.frontend_dir_path.clone(),
        }
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cli_with(db_dir: &TempDir) -> CliConfig {
        CliConfig {
            db_dir: Some(db_dir.path().to_path_buf()),
            port: 3000,
            logging_level: RequestsLoggingLevel::Path,
            spotify_client_id: Some("cli-id".to_string()),
            spotify_client_secret: Some("cli-secret".to_string()),
            catalog_timeout_sec: DEFAULT_CATALOG_TIMEOUT_SEC,
            session_ttl_sec: DEFAULT_SESSION_TTL_SEC,
            recommended_cache_age_sec: DEFAULT_RECOMMENDED_CACHE_AGE_SEC,
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_logging_level() {
        assert!(matches!(
            parse_logging_level("none"),
            Some(RequestsLoggingLevel::None)
        ));
        assert!(matches!(
            parse_logging_level("BODY"),
            Some(RequestsLoggingLevel::Body)
        ));
        assert!(parse_logging_level("invalid").is_none());
    }

    #[test]
    fn test_resolve_cli_only() {
        let temp_dir = TempDir::new().unwrap();
        let cli = cli_with(&temp_dir);

        let config = AppConfig::resolve(&cli, None).unwrap();

        assert_eq!(config.db_dir, temp_dir.path());
        assert_eq!(config.ratings_db_path(), temp_dir.path().join("ratings.db"));
        assert_eq!(config.port, 3000);
        assert_eq!(config.spotify.client_id, "cli-id");
        assert_eq!(config.spotify.api_url, DEFAULT_SPOTIFY_API_URL);
        assert_eq!(config.spotify.accounts_url, DEFAULT_SPOTIFY_ACCOUNTS_URL);
        assert_eq!(config.jwt_secret, "cli-secret");
        assert_eq!(config.session_ttl_sec, 3600);
        assert_eq!(config.server_config().recommended_cache_age_sec, 60);
    }

    #[test]
    fn test_resolve_toml_overrides_cli() {
        let temp_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            db_dir: Some(PathBuf::from("/should/be/overridden")),
            jwt_secret: Some("cli-jwt".to_string()),
            ..cli_with(&temp_dir)
        };
        let file_config = FileConfig {
            db_dir: Some(temp_dir.path().to_string_lossy().to_string()),
            port: Some(4000),
            logging_level: Some("body".to_string()),
            jwt_secret: Some("toml-jwt".to_string()),
            spotify: Some(SpotifyConfig {
                client_id: Some("toml-id".to_string()),
                api_url: Some("http://localhost:9999/v1".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, Some(file_config)).unwrap();

        assert_eq!(config.db_dir, temp_dir.path());
        assert_eq!(config.port, 4000);
        assert_eq!(config.logging_level, RequestsLoggingLevel::Body);
        assert_eq!(config.jwt_secret, "toml-jwt");
        assert_eq!(config.spotify.client_id, "toml-id");
        assert_eq!(config.spotify.client_secret, "cli-secret");
        assert_eq!(config.spotify.api_url, "http://localhost:9999/v1");
    }

    #[test]
    fn test_resolve_requires_existing_db_dir() {
        let temp_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            db_dir: Some(temp_dir.path().join("missing")),
            ..cli_with(&temp_dir)
        };
        let err = AppConfig::resolve(&cli, None).unwrap_err();
        assert!(err.to_string().contains("does not exist"));

        let file_path = temp_dir.path().join("file");
        std::fs::write(&file_path, "x").unwrap();
        let cli = CliConfig {
            db_dir: Some(file_path),
            ..cli_with(&temp_dir)
        };
        let err = AppConfig::resolve(&cli, None).unwrap_err();
        assert!(err.to_string().contains("not a directory"));

        let cli = CliConfig {
            db_dir: None,
            ..cli_with(&temp_dir)
        };
        assert!(AppConfig::resolve(&cli, None).is_err());
    }

    #[test]
    fn test_resolve_requires_spotify_credentials() {
        let temp_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            spotify_client_secret: Some(String::new()),
            ..cli_with(&temp_dir)
        };

        let err = AppConfig::resolve(&cli, None).unwrap_err();

        assert!(err.to_string().contains("client id and secret"));
    }

    #[test]
    fn test_resolve_rejects_unknown_logging_level() {
        let temp_dir = TempDir::new().unwrap();
        let file_config = FileConfig {
            logging_level: Some("verbose".to_string()),
            ..Default::default()
        };

        assert!(AppConfig::resolve(&cli_with(&temp_dir), Some(file_config)).is_err());
    }
}
