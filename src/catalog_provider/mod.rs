mod error;
mod in_memory;
mod spotify;
mod spotify_models;
mod trait_def;

pub use error::CatalogError;
pub use in_memory::{InMemoryCatalogProvider, ProviderCall};
pub(crate) use spotify::error_for_response;
pub use spotify::{SpotifyClient, DEFAULT_SPOTIFY_API_URL};
pub use trait_def::{CatalogProvider, ProviderUser, SearchResults, MAX_IDS_PER_REQUEST};
