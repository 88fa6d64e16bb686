//! # Keyed Synchronizer
//!
//! Keeps a local, mutable copy of a keyed collection in step with an
//! externally supplied one, while letting the host intercept every insertion
//! and removal.
//!
//! The local state is seeded once. Afterwards it is only ever edited one index
//! at a time, driven by a presence-diff against each new external sequence:
//! keys missing locally are inserted, keys missing externally are removed.
//! Values of keys present on both sides are never touched.
//!
//! ```rust
//! use statecraft::prelude::*;
//!
//! let mut sync = Synchronizer::new(vec![Entry::new("a", 1), Entry::new("b", 2)]);
//! let report = sync.reconcile(&[Entry::new("b", 2), Entry::new("c", 3)], &mut ());
//!
//! assert_eq!(report.inserted, 1);
//! assert_eq!(report.deleted, 1);
//! assert_eq!(sync.values(), vec![2, 3]);
//! ```

mod delta;
mod entry;
mod event;

use std::collections::HashSet;

pub use delta::{compute_deltas, Delta};
pub use entry::{check_unique_keys, Entry, Key, SyncError};
pub use event::{
    DeleteDecision, DeleteEvent, Handlers, InsertDecision, InsertEvent, ReconcileHandler,
};

use crate::utils::CCStr;

/// Outcome of one [Synchronizer::reconcile] run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileReport {
    pub inserted: usize,
    pub deleted: usize,
    pub vetoed: usize,
}
impl ReconcileReport {
    pub fn changed(&self) -> bool {
        self.inserted + self.deleted > 0
    }
}

/// One rendering unit of the synchronized collection.
///
/// `unsync` is true when the key is absent from the latest external sequence,
/// i.e. the local entry is waiting for a removal that was vetoed or not yet
/// confirmed.
#[derive(Debug, Clone, PartialEq)]
pub struct MapItem<V> {
    pub key: Key,
    pub value: V,
    pub unsync: bool,
}

/// Owner of the local keyed state.
#[derive(Debug, Clone, PartialEq)]
pub struct Synchronizer<V> {
    state: Vec<Entry<V>>,
    external_ids: HashSet<CCStr>,
}

impl<V: Clone> Synchronizer<V> {
    pub fn new(initial: Vec<Entry<V>>) -> Self {
        if let Err(e) = check_unique_keys(&initial) {
            log::warn!("synchronizer - initial sequence: {e}");
        }
        let external_ids = entry::key_ids(&initial);
        Self {
            state: initial,
            external_ids,
        }
    }

    pub fn state(&self) -> &[Entry<V>] {
        &self.state
    }

    /// The local values, keys stripped.
    pub fn values(&self) -> Vec<V> {
        self.state.iter().map(|e| e.value.clone()).collect()
    }

    pub fn is_unsync(&self, key: &Key) -> bool {
        !self.external_ids.contains(&key.id())
    }

    /// Rendering units, in local order.
    pub fn items(&self) -> Vec<MapItem<V>> {
        self.items_with(&self.external_ids)
    }

    /// Rendering units flagged against `external` instead of the sequence of
    /// the last run. Hosts rendering before they reconcile use this.
    pub fn items_against(&self, external: &[Entry<V>]) -> Vec<MapItem<V>> {
        self.items_with(&entry::key_ids(external))
    }

    fn items_with(&self, external_ids: &HashSet<CCStr>) -> Vec<MapItem<V>> {
        self.state
            .iter()
            .map(|e| MapItem {
                key: e.key.clone(),
                value: e.value.clone(),
                unsync: !external_ids.contains(&e.key.id()),
            })
            .collect()
    }

    /// Reconcile the local state against a new external sequence.
    ///
    /// For every index, the insertion (if any) is decided before the removal
    /// (if any), each against the state left by the previous edits. Removals
    /// target the current position of the removed entry, so an insertion made
    /// earlier in the same run cannot misdirect them.
    pub fn reconcile<H>(&mut self, external: &[Entry<V>], handler: &mut H) -> ReconcileReport
    where
        H: ReconcileHandler<V> + ?Sized,
    {
        if let Err(e) = check_unique_keys(external) {
            log::warn!("synchronizer - external sequence: {e}");
        }

        let deltas = compute_deltas(external, &self.state);
        self.external_ids = entry::key_ids(external);
        log::debug!("synchronizer - reconcile with {} deltas", deltas.len());

        let mut report = ReconcileReport::default();
        for Delta {
            index,
            added,
            deleted,
        } in deltas
        {
            if let Some(entry) = added {
                self.insert(index, entry, handler, &mut report);
            }
            if let Some(entry) = deleted {
                self.delete(entry, handler, &mut report);
            }
        }

        log::debug!("synchronizer - reconcile done: {report:?}");
        if report.changed() {
            handler.on_sync(&self.values());
        }
        report
    }

    fn insert<H>(
        &mut self,
        index: usize,
        entry: Entry<V>,
        handler: &mut H,
        report: &mut ReconcileReport,
    ) where
        H: ReconcileHandler<V> + ?Sized,
    {
        let at = index.min(self.state.len());
        let mut speculative = self.state.clone();
        speculative.insert(at, entry.clone());

        let decision = handler.on_insert(InsertEvent {
            index,
            entry: entry.clone(),
            speculative,
        });
        match decision {
            InsertDecision::Allow => {
                self.state.insert(at, entry);
                report.inserted += 1;
            }
            InsertDecision::Override { index, entry } => {
                let at = index.min(self.state.len());
                self.state.insert(at, entry);
                report.inserted += 1;
            }
            InsertDecision::Deny => {
                log::debug!("synchronizer - insertion of {} denied", entry.key);
                report.vetoed += 1;
            }
        }
    }

    fn delete<H>(&mut self, entry: Entry<V>, handler: &mut H, report: &mut ReconcileReport)
    where
        H: ReconcileHandler<V> + ?Sized,
    {
        let id = entry.key.id();
        let Some(at) = self.state.iter().position(|e| e.key.id() == id) else {
            log::debug!("synchronizer - {} already removed", entry.key);
            return;
        };
        let mut speculative = self.state.clone();
        speculative.remove(at);

        let decision = handler.on_delete(DeleteEvent {
            index: at,
            entry,
            speculative,
        });
        match decision {
            DeleteDecision::Allow => {
                self.state.remove(at);
                report.deleted += 1;
            }
            DeleteDecision::Override { index } if index < self.state.len() => {
                self.state.remove(index);
                report.deleted += 1;
            }
            DeleteDecision::Override { index } => {
                log::warn!("synchronizer - removal override out of bounds: {index}");
                report.vetoed += 1;
            }
            DeleteDecision::Deny => {
                log::debug!("synchronizer - removal at {at} denied");
                report.vetoed += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(items: &[(&str, u32)]) -> Vec<Entry<u32>> {
        items.iter().map(|(k, v)| Entry::new(*k, *v)).collect()
    }

    fn keys(sync: &Synchronizer<u32>) -> Vec<String> {
        sync.state().iter().map(|e| e.key.to_string()).collect()
    }

    #[test]
    fn delete_then_insert_scenario() {
        let mut sync = Synchronizer::new(seq(&[("a", 1), ("b", 2)]));
        let mut handlers = Handlers::<u32>::default()
            .on_insert(|e| {
                assert_eq!(e.index, 1);
                assert_eq!(e.entry, Entry::new("c", 3));
                assert_eq!(e.speculative, seq(&[("b", 2), ("c", 3)]));
                InsertDecision::Allow
            })
            .on_delete(|e| {
                assert_eq!(e.index, 0);
                assert_eq!(e.entry, Entry::new("a", 1));
                assert_eq!(e.speculative, seq(&[("b", 2)]));
                DeleteDecision::Allow
            });
        let report = sync.reconcile(&seq(&[("b", 2), ("c", 3)]), &mut handlers);

        assert_eq!(
            report,
            ReconcileReport {
                inserted: 1,
                deleted: 1,
                vetoed: 0
            }
        );
        assert_eq!(sync.state(), seq(&[("b", 2), ("c", 3)]).as_slice());
    }

    #[test]
    fn second_run_on_same_sequence_is_a_no_op() {
        let mut sync = Synchronizer::new(seq(&[("a", 1)]));
        let next = seq(&[("x", 9), ("a", 1), ("y", 8)]);
        assert!(sync.reconcile(&next, &mut ()).changed());
        assert_eq!(sync.reconcile(&next, &mut ()), ReconcileReport::default());
    }

    #[test]
    fn same_index_insert_and_delete_converge() {
        let mut sync = Synchronizer::new(seq(&[("a", 1)]));
        let speculated = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut handlers = Handlers::<u32>::default().on_delete({
            let speculated = speculated.clone();
            move |e| {
                // the insertion of the same pass is already visible
                speculated.borrow_mut().push(e.speculative.clone());
                assert_eq!(e.index, 1);
                DeleteDecision::Allow
            }
        });
        sync.reconcile(&seq(&[("c", 3)]), &mut handlers);

        assert_eq!(keys(&sync), vec!["c"]);
        assert_eq!(*speculated.borrow(), vec![seq(&[("c", 3)])]);
    }

    #[test]
    fn denied_insert_is_not_applied() {
        let mut sync = Synchronizer::new(seq(&[("a", 1)]));
        let mut handlers = Handlers::<u32>::default().on_insert(|_| InsertDecision::Deny);
        let report = sync.reconcile(&seq(&[("a", 1), ("b", 2)]), &mut handlers);

        assert_eq!(report.vetoed, 1);
        assert_eq!(keys(&sync), vec!["a"]);
    }

    #[test]
    fn override_insert_applies_handler_choice() {
        let mut sync = Synchronizer::new(seq(&[("a", 1)]));
        let mut handlers = Handlers::<u32>::default().on_insert(|e| InsertDecision::Override {
            index: 0,
            entry: Entry::new(e.entry.key, e.entry.value * 10),
        });
        sync.reconcile(&seq(&[("a", 1), ("b", 2)]), &mut handlers);

        assert_eq!(sync.state(), seq(&[("b", 20), ("a", 1)]).as_slice());
    }

    #[test]
    fn denied_delete_keeps_entry_flagged_unsync() {
        let mut sync = Synchronizer::new(seq(&[("a", 1), ("b", 2)]));
        let mut handlers = Handlers::<u32>::default().on_delete(|_| DeleteDecision::Deny);
        sync.reconcile(&seq(&[("b", 2)]), &mut handlers);

        let items = sync.items();
        assert_eq!(items.len(), 2);
        assert!(items[0].unsync);
        assert_eq!(items[0].key, Key::from("a"));
        assert!(!items[1].unsync);
    }

    #[test]
    fn items_against_flags_keys_missing_from_the_given_sequence() {
        let sync = Synchronizer::new(seq(&[("a", 1), ("b", 2)]));
        let flags: Vec<bool> = sync
            .items_against(&seq(&[("b", 2), ("c", 3)]))
            .iter()
            .map(|item| item.unsync)
            .collect();

        assert_eq!(flags, vec![true, false]);
        assert!(sync.items().iter().all(|item| !item.unsync));
    }

    #[test]
    fn out_of_bounds_delete_override_is_ignored() {
        let mut sync = Synchronizer::new(seq(&[("a", 1)]));
        let mut handlers =
            Handlers::<u32>::default().on_delete(|_| DeleteDecision::Override { index: 5 });
        let report = sync.reconcile(&[], &mut handlers);

        assert_eq!(report.vetoed, 1);
        assert_eq!(keys(&sync), vec!["a"]);
    }

    #[test]
    fn sync_callback_receives_values_only_on_change() {
        let calls = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut handlers = Handlers::<u32>::default().on_sync({
            let calls = calls.clone();
            move |values: &[u32]| calls.borrow_mut().push(values.to_vec())
        });
        let mut sync = Synchronizer::new(seq(&[("a", 1)]));
        sync.reconcile(&seq(&[("a", 1), ("b", 2)]), &mut handlers);
        sync.reconcile(&seq(&[("a", 1), ("b", 2)]), &mut handlers);

        assert_eq!(*calls.borrow(), vec![vec![1, 2]]);
    }

    #[test]
    fn integer_keys_match_their_string_form() {
        let mut sync = Synchronizer::new(vec![Entry::new(1, "one")]);
        let report = sync.reconcile(&[Entry::new("1", "one")], &mut ());
        assert!(!report.changed());
        assert!(!sync.is_unsync(&Key::from("1")));
    }
}
