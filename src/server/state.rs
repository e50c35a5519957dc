use axum::extract::FromRef;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;
use crate::aggregation::CatalogRatingsService;
use crate::auth::{SpotifyAuthClient, TokenSigner};

pub type GuardedCatalogRatingsService = Arc<CatalogRatingsService>;
pub type GuardedTokenSigner = Arc<TokenSigner>;
pub type GuardedSpotifyAuthClient = Arc<SpotifyAuthClient>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub service: GuardedCatalogRatingsService,
    pub token_signer: GuardedTokenSigner,
    pub auth_client: GuardedSpotifyAuthClient,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        service: CatalogRatingsService,
        token_signer: TokenSigner,
        auth_client: SpotifyAuthClient,
    ) -> Self {
        ServerState {
            config,
            start_time: Instant::now(),
            service: Arc::new(service),
            token_signer: Arc::new(token_signer),
            auth_client: Arc::new(auth_client),
        }
    }
}

impl FromRef<ServerState> for GuardedCatalogRatingsService {
    fn from_ref(input: &ServerState) -> Self {
        input.service.clone()
    }
}

impl FromRef<ServerState> for GuardedTokenSigner {
    fn from_ref(input: &ServerState) -> Self {
        input.token_signer.clone()
    }
}

impl FromRef<ServerState> for GuardedSpotifyAuthClient {
    fn from_ref(input: &ServerState) -> Self {
        input.auth_client.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
