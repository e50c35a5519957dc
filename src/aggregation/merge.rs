//! Attaching ratings to the items they reference.

use std::collections::HashMap;

use crate::catalog::{ItemKey, Rateable};
use crate::rating_store::Rating;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttachMode {
    /// Push onto the item's rating list, in walk order.
    Append,
    /// Set the item's own rating, a later rating for the same item overwrites it.
    SetSingle,
}

/// Attaches `ratings` to the matching entries of `items` in place.
///
/// Returns the indices of the matched items in the order they were first
/// matched. Ratings referencing an item that is not in `items` are ignored.
/// When `items` holds the same item twice only the first copy is used.
pub fn attach_ratings<T: Rateable>(
    ratings: &[Rating],
    items: &mut [T],
    mode: AttachMode,
) -> Vec<usize> {
    let mut index_by_key: HashMap<ItemKey, usize> = HashMap::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        index_by_key.entry(item.key()).or_insert(index);
    }

    let mut matched = vec![false; items.len()];
    let mut order = Vec::new();
    for rating in ratings {
        let Some(&index) = index_by_key.get(&rating.item_key()) else {
            continue;
        };
        let attached = items[index].ratings_mut();
        match mode {
            AttachMode::Append => attached.push_rating(rating.clone()),
            AttachMode::SetSingle => attached.my_rating = Some(rating.clone()),
        }
        if !matched[index] {
            matched[index] = true;
            order.push(index);
        }
    }
    order
}

/// Attaches `ratings` and keeps only the matched items, ordered by first match.
pub fn merge_ratings<T: Rateable>(ratings: &[Rating], mut items: Vec<T>, mode: AttachMode) -> Vec<T> {
    let order = attach_ratings(ratings, &mut items, mode);
    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|index| slots[index].take())
        .collect()
}
