use dioxus::prelude::*;

use std::future::Future;

use crate::scheduler::{DioxusSpawner, Transition};

/// Wrap `callback` so that every call runs as low priority work.
///
/// Returns a pending flag, true while any call is still running, and the
/// wrapped callback.
pub fn use_transitioned<A, F>(
    mut callback: impl FnMut(A) -> F + 'static,
) -> (ReadOnlySignal<bool>, Callback<A>)
where
    A: 'static,
    F: Future<Output = ()> + 'static,
{
    let mut pending = use_signal(|| false);

    let transition = use_hook(move || {
        let transition = Transition::new(DioxusSpawner);
        transition.subscribe(move |p| pending.set(p));
        transition
    });

    let start = use_callback(move |args: A| {
        transition.start_async(callback(args));
    });

    (pending.into(), start)
}
