use dioxus::prelude::*;

use crate::synchronizer::{
    DeleteDecision, DeleteEvent, Entry, InsertDecision, InsertEvent, MapItem, ReconcileHandler,
    Synchronizer,
};

/// Host callbacks forwarded to a reconciliation run.
struct CallbackHandlers<V: 'static> {
    on_insert: Option<Callback<InsertEvent<V>, InsertDecision<V>>>,
    on_delete: Option<Callback<DeleteEvent<V>, DeleteDecision>>,
    on_sync: Option<Callback<Vec<V>>>,
}

impl<V: Clone + 'static> ReconcileHandler<V> for CallbackHandlers<V> {
    fn on_insert(&mut self, event: InsertEvent<V>) -> InsertDecision<V> {
        match self.on_insert {
            Some(cb) => cb.call(event),
            None => InsertDecision::Allow,
        }
    }
    fn on_delete(&mut self, event: DeleteEvent<V>) -> DeleteDecision {
        match self.on_delete {
            Some(cb) => cb.call(event),
            None => DeleteDecision::Allow,
        }
    }
    fn on_sync(&mut self, values: &[V]) {
        if let Some(cb) = self.on_sync {
            cb.call(values.to_vec())
        }
    }
}

/// Keep a local copy of `entries` synchronized through a [Synchronizer].
///
/// The local state is seeded from the first value of `entries` and then
/// reconciled every time `entries` changes. `on_sync` receives the seeded
/// values once on mount, then the local values after every run that changed
/// them.
///
/// The returned memo yields the rendering units of the local state. Their
/// `unsync` flag follows `entries` directly, so it is already up to date on
/// the render that precedes the reconciliation.
pub fn use_keyed_sync<V>(
    entries: ReadOnlySignal<Vec<Entry<V>>>,
    on_insert: Option<Callback<InsertEvent<V>, InsertDecision<V>>>,
    on_delete: Option<Callback<DeleteEvent<V>, DeleteDecision>>,
    on_sync: Option<Callback<Vec<V>>>,
) -> Memo<Vec<MapItem<V>>>
where
    V: Clone + PartialEq + 'static,
{
    let mut sync = use_signal(|| Synchronizer::new(entries.peek().clone()));
    let mut mounted = use_hook(|| CopyValue::new(false));

    use_effect(move || {
        let external = entries();
        log::debug!("use_keyed_sync - reconcile {} entries", external.len());
        let mut handlers = CallbackHandlers {
            on_insert,
            on_delete,
            on_sync,
        };
        let report = sync.write().reconcile(&external, &mut handlers);

        let first_run = !*mounted.read();
        mounted.set(true);
        if first_run && !report.changed() {
            handlers.on_sync(&sync.peek().values());
        }
    });

    use_memo(move || sync.read().items_against(&entries.read()))
}
