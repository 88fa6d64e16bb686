use std::collections::BTreeMap;

use super::entry::{key_ids, Entry};

/// Pending edits for one index of a reconciliation run.
///
/// `added` refers to an index of the external sequence, `deleted` to an index
/// of the local state. Both may be present for the same index.
#[derive(Debug, Clone, PartialEq)]
pub struct Delta<V> {
    pub index: usize,
    pub added: Option<Entry<V>>,
    pub deleted: Option<Entry<V>>,
}

/// Presence-diff `external` against `state`.
///
/// Only key membership is compared. A retained key that moved is not reported,
/// so this is not a minimal edit script. Deltas come back in ascending index
/// order.
pub fn compute_deltas<V: Clone>(external: &[Entry<V>], state: &[Entry<V>]) -> Vec<Delta<V>> {
    let state_ids = key_ids(state);
    let external_ids = key_ids(external);

    let mut will: BTreeMap<usize, Delta<V>> = BTreeMap::new();

    for (index, entry) in external.iter().enumerate() {
        if state_ids.contains(&entry.key.id()) {
            continue;
        }
        will.insert(
            index,
            Delta {
                index,
                added: Some(entry.clone()),
                deleted: None,
            },
        );
    }

    for (index, entry) in state.iter().enumerate() {
        if external_ids.contains(&entry.key.id()) {
            continue;
        }
        will.entry(index)
            .or_insert(Delta {
                index,
                added: None,
                deleted: None,
            })
            .deleted = Some(entry.clone());
    }

    will.into_values().collect()
}
