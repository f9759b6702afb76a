use crate::types::{Event, UniqueHash};
use std::collections::HashSet;

// Duplicate detection: the first occurrence of a key wins. Events without a
// message id have no key and are always kept.
pub fn is_duplicate(event: &Event, processed_hashes: &mut HashSet<UniqueHash>) -> bool {
    match event.unique_hash() {
        Some(hash) => !processed_hashes.insert(hash),
        None => false,
    }
}

/// Keep the first occurrence of every dedup key, preserving arrival order
pub fn dedup_first<'a, I>(events: I) -> (Vec<&'a Event>, usize)
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut processed_hashes = HashSet::new();
    let mut dropped = 0;
    let kept = events
        .into_iter()
        .filter(|event| {
            let duplicate = is_duplicate(event, &mut processed_hashes);
            dropped += usize::from(duplicate);
            !duplicate
        })
        .collect();
    (kept, dropped)
}
