use super::entry::Entry;

/// An entry of the external sequence is about to be inserted in the local state.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertEvent<V> {
    /// Index in the external sequence, used as the default insertion point
    pub index: usize,
    pub entry: Entry<V>,
    /// What the local state looks like if the insertion is allowed
    pub speculative: Vec<Entry<V>>,
}

/// An entry of the local state is about to be removed.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteEvent<V> {
    /// Current position of the entry in the local state
    pub index: usize,
    pub entry: Entry<V>,
    /// What the local state looks like if the removal is allowed
    pub speculative: Vec<Entry<V>>,
}

/// Verdict of an insert handler.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InsertDecision<V> {
    /// Apply the default insertion
    #[default]
    Allow,
    /// Keep the local state untouched
    Deny,
    /// Insert `entry` at `index` instead of the default
    Override { index: usize, entry: Entry<V> },
}

/// Verdict of a delete handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteDecision {
    /// Apply the default removal
    #[default]
    Allow,
    /// Keep the local state untouched
    Deny,
    /// Remove the entry at `index` instead of the default
    Override { index: usize },
}

/// Observer of a reconciliation run.
///
/// Handlers are notifications with veto power: every method has a default
/// that lets the synchronizer apply its default mutation.
pub trait ReconcileHandler<V> {
    fn on_insert(&mut self, _event: InsertEvent<V>) -> InsertDecision<V> {
        InsertDecision::Allow
    }
    fn on_delete(&mut self, _event: DeleteEvent<V>) -> DeleteDecision {
        DeleteDecision::Allow
    }
    /// Called with the flattened values after a run that changed the state.
    fn on_sync(&mut self, _values: &[V]) {}
}

impl<V> ReconcileHandler<V> for () {}

type InsertFn<V> = Box<dyn FnMut(InsertEvent<V>) -> InsertDecision<V>>;
type DeleteFn<V> = Box<dyn FnMut(DeleteEvent<V>) -> DeleteDecision>;
type SyncFn<V> = Box<dyn FnMut(&[V])>;

/// A [ReconcileHandler] assembled from optional closures.
///
/// ```rust
/// use statecraft::prelude::*;
///
/// let handlers = Handlers::<u32>::default()
///     .on_insert(|event| {
///         if event.entry.value > 10 {
///             InsertDecision::Deny
///         } else {
///             InsertDecision::Allow
///         }
///     });
/// ```
pub struct Handlers<V> {
    insert: Option<InsertFn<V>>,
    delete: Option<DeleteFn<V>>,
    sync: Option<SyncFn<V>>,
}

impl<V> Default for Handlers<V> {
    fn default() -> Self {
        Self {
            insert: None,
            delete: None,
            sync: None,
        }
    }
}

impl<V> Handlers<V> {
    pub fn on_insert(
        mut self,
        f: impl FnMut(InsertEvent<V>) -> InsertDecision<V> + 'static,
    ) -> Self {
        self.insert = Some(Box::new(f));
        self
    }
    pub fn on_delete(mut self, f: impl FnMut(DeleteEvent<V>) -> DeleteDecision + 'static) -> Self {
        self.delete = Some(Box::new(f));
        self
    }
    pub fn on_sync(mut self, f: impl FnMut(&[V]) + 'static) -> Self {
        self.sync = Some(Box::new(f));
        self
    }
}

impl<V> ReconcileHandler<V> for Handlers<V> {
    fn on_insert(&mut self, event: InsertEvent<V>) -> InsertDecision<V> {
        match self.insert.as_mut() {
            Some(f) => f(event),
            None => InsertDecision::Allow,
        }
    }
    fn on_delete(&mut self, event: DeleteEvent<V>) -> DeleteDecision {
        match self.delete.as_mut() {
            Some(f) => f(event),
            None => DeleteDecision::Allow,
        }
    }
    fn on_sync(&mut self, values: &[V]) {
        if let Some(f) = self.sync.as_mut() {
            f(values)
        }
    }
}
