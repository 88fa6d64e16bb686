use futures_util::future::LocalBoxFuture;

/// Runs continuations of asynchronous producers on the host's executor.
///
/// Everything here is single threaded: tasks are `!Send` and expected to run
/// on the thread that owns the scheduler.
pub trait Spawn {
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>);
}

impl<F: Fn(LocalBoxFuture<'static, ()>)> Spawn for F {
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        self(task)
    }
}

/// Spawns on the Dioxus runtime of the current scope.
///
/// Must be used from within a component or one of its tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct DioxusSpawner;
impl Spawn for DioxusSpawner {
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        let _ = dioxus::prelude::spawn(task);
    }
}

/// Spawns on the current tokio [LocalSet](tokio::task::LocalSet).
///
/// Panics when used outside of a `LocalSet` context, like [tokio::task::spawn_local].
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioLocalSpawner;
impl Spawn for TokioLocalSpawner {
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        let _ = tokio::task::spawn_local(task);
    }
}
