use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::catalog::{ItemKey, Rateable};
use crate::rating_store::{RatingStore, StoreError};

/// Average score of each distinct key, in a single store query.
pub fn fetch_averages(
    store: &dyn RatingStore,
    keys: impl IntoIterator<Item = ItemKey>,
) -> Result<HashMap<ItemKey, f64>, StoreError> {
    let keys: Vec<ItemKey> = keys.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
    if keys.is_empty() {
        return Ok(HashMap::new());
    }
    let averages = store.average_scores(&keys)?;
    debug!("Got averages for {} of {} items", averages.len(), keys.len());
    Ok(averages)
}

/// Sets `averageScore` on every item, 0 for items missing from `averages`.
pub fn apply_averages<T: Rateable>(averages: &HashMap<ItemKey, f64>, items: &mut [T]) {
    for item in items.iter_mut() {
        item.ratings_mut().average_score =
            Some(averages.get(&item.key()).copied().unwrap_or(0.0));
    }
}

pub fn attach_averages<T: Rateable>(
    store: &dyn RatingStore,
    items: &mut [T],
) -> Result<(), StoreError> {
    let averages = fetch_averages(store, items.iter().map(Rateable::key))?;
    apply_averages(&averages, items);
    Ok(())
}
