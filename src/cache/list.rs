//! List splicing used to apply confirmed remote results to the held collections. Every function
//! here is synchronous and leaves element order intact apart from the one change it describes.

use crate::model::{Entity, EntityId};

/// Inserts `item` at the front, making it the most recent entry.
pub(crate) fn prepend<E>(items: &mut Vec<E>, item: E) {
    items.insert(0, item);
}

/// Replaces, in place, every element whose identity is `id`. Returns the number of elements
/// replaced; zero means `item` was dropped.
pub(crate) fn replace<E>(items: &mut [E], id: &EntityId, item: &E) -> usize
where
    E: Entity,
{
    let mut replaced = 0;
    for existing in items.iter_mut().filter(|e| e.id() == id) {
        *existing = item.clone();
        replaced += 1;
    }
    replaced
}

/// Removes every element whose identity is `id`. Returns the number removed.
pub(crate) fn remove<E>(items: &mut Vec<E>, id: &EntityId) -> usize
where
    E: Entity,
{
    let before = items.len();
    items.retain(|e| e.id() != id);
    before - items.len()
}
