//! Batched item fetching.

use tracing::{debug, warn};

use crate::catalog::{Item, ItemKind};
use crate::catalog_provider::{CatalogError, CatalogProvider, MAX_IDS_PER_REQUEST};

/// Fetches every id of `kind`, at most [`MAX_IDS_PER_REQUEST`] per provider call.
///
/// Chunks are taken from the end of the list, so the output order does not
/// follow `ids`. A chunk the provider reports as not found is skipped, any
/// other failure aborts the whole fetch.
pub async fn fetch_items(
    provider: &dyn CatalogProvider,
    token: &str,
    kind: ItemKind,
    ids: &[String],
) -> Result<Vec<Item>, CatalogError> {
    let mut remaining = ids.to_vec();
    let mut items = Vec::with_capacity(ids.len());

    while !remaining.is_empty() {
        let split_at = remaining.len().saturating_sub(MAX_IDS_PER_REQUEST);
        let mut chunk = remaining.split_off(split_at);
        chunk.reverse();

        let fetched = match chunk.as_slice() {
            [id] => provider.fetch_one(token, kind, id).await.map(|item| vec![item]),
            _ => provider.fetch_many(token, kind, &chunk).await,
        };

        match fetched {
            Ok(fetched) => {
                debug!(
                    "Fetched {} {} items from a chunk of {}",
                    fetched.len(),
                    kind,
                    chunk.len()
                );
                items.extend(fetched);
            }
            Err(CatalogError::NotFound) => {
                warn!("Skipping chunk of {} {} ids, not found", chunk.len(), kind);
            }
            Err(err) => return Err(err),
        }
    }

    Ok(items)
}
