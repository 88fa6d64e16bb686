use dioxus::prelude::*;

use std::rc::Rc;

use crate::scheduler::{
    DioxusSpawner, LoadOptions, LoadScheduler, LoadSnapshot, LoadStatus, Produced, Producer,
};

/// Run `producer` as a deferred load of the calling component.
///
/// A load is triggered on mount and every time `deps` changes. The producer
/// passed on the latest render is the one used by subsequent triggers, so it
/// may freely capture render-time values.
///
/// ```rust,no_run
/// use statecraft::prelude::*;
///
/// #[component]
/// fn Greeting(name: String) -> Element {
///     let greeting = helper_hooks::use_loaded_state(
///         name.clone(),
///         move || {
///             let name = name.clone();
///             Produced::future(async move { format!("Hello {name}") })
///         },
///         LoadOptions::default(),
///     );
///     rsx! {
///         if greeting.is_loading() {
///             "Loading..."
///         }
///         if let Some(text) = greeting.value() {
///             p { "{text}" }
///         }
///         button { onclick: move |_| greeting.trigger(), "Reload" }
///     }
/// }
/// ```
pub fn use_loaded_state<T, D, P>(deps: D, producer: P, options: LoadOptions) -> LoadedState<T>
where
    T: Clone + 'static,
    D: Clone + PartialEq + 'static,
    P: Fn() -> Produced<T> + 'static,
{
    let producer: Producer<T> = Rc::new(producer);
    let mut snapshot = use_signal(LoadSnapshot::default);

    let scheduler = use_hook({
        let producer = producer.clone();
        move || {
            log::debug!("use_loaded_state - init");
            let scheduler = LoadScheduler::new(move || producer(), options, DioxusSpawner);
            scheduler.subscribe(move |s| snapshot.set(s.clone()));
            CopyValue::new(scheduler)
        }
    });
    scheduler.read().set_shared_producer(producer);

    use_effect(use_reactive((&deps,), move |(deps,)| {
        log::debug!("use_loaded_state - deps effect");
        scheduler.read().update_deps(deps);
    }));

    LoadedState {
        snapshot,
        scheduler,
    }
}

/// Handle on a deferred load created by [use_loaded_state].
///
/// Reading through this handle subscribes the calling component to the load
/// state, like reading a [Signal] does.
pub struct LoadedState<T: 'static> {
    snapshot: Signal<LoadSnapshot<T>>,
    scheduler: CopyValue<LoadScheduler<T>>,
}
impl<T> PartialEq for LoadedState<T> {
    fn eq(&self, other: &Self) -> bool {
        self.snapshot == other.snapshot && self.scheduler == other.scheduler
    }
}
impl<T: 'static> Clone for LoadedState<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T: 'static> Copy for LoadedState<T> {}

impl<T: Clone + 'static> LoadedState<T> {
    pub fn is_loading(&self) -> bool {
        self.snapshot.read().is_loading
    }

    pub fn value(&self) -> Option<T> {
        self.snapshot.read().value.clone()
    }

    pub fn status(&self) -> LoadStatus {
        self.snapshot.read().status()
    }

    pub fn snapshot(&self) -> LoadSnapshot<T> {
        self.snapshot.read().clone()
    }

    pub fn trigger(&self) {
        self.scheduler.read().trigger();
    }

    pub fn set_value(&self, value: T) {
        self.scheduler.read().set_value(value);
    }

    pub fn clear_value(&self) {
        self.scheduler.read().clear_value();
    }
}

impl<T> From<LoadedState<T>> for ReadOnlySignal<LoadSnapshot<T>> {
    fn from(val: LoadedState<T>) -> Self {
        val.snapshot.into()
    }
}
