use crate::prelude::*;

/// Render a keyed collection through a local, synchronized copy.
///
/// `item` is called once per local entry, in local order, and its output is
/// keyed by the entry key. Entries whose key is absent from the latest
/// `entries` are rendered with `unsync: true`, e.g. rows whose removal was
/// denied by `on_delete` and still await confirmation.
#[component]
pub fn KeyedMap<V: Clone + PartialEq + 'static>(
    entries: ReadOnlySignal<Vec<Entry<V>>>,
    on_insert: Option<Callback<InsertEvent<V>, InsertDecision<V>>>,
    on_delete: Option<Callback<DeleteEvent<V>, DeleteDecision>>,
    on_sync: Option<Callback<Vec<V>>>,
    item: Callback<MapItem<V>, Element>,
) -> Element {
    let items = helper_hooks::use_keyed_sync(entries, on_insert, on_delete, on_sync)();

    rsx! {
        {
            items
                .into_iter()
                .map(|map_item| {
                    let key = map_item.key.to_string();
                    rsx! {
                        Fragment { key: "{key}", {item.call(map_item)} }
                    }
                })
        }
    }
}
