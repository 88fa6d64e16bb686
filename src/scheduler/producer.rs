use std::future::Future;
use std::rc::Rc;

use futures_util::future::{FutureExt, LocalBoxFuture};

/// What a producer hands back to the scheduler.
///
/// Producers state explicitly whether their result is already there or will
/// arrive later; the scheduler never inspects the producer itself.
pub enum Produced<T> {
    Sync(T),
    Async(LocalBoxFuture<'static, T>),
}

impl<T> Produced<T> {
    pub fn future<F: Future<Output = T> + 'static>(future: F) -> Self {
        Produced::Async(future.boxed_local())
    }

    pub fn is_async(&self) -> bool {
        matches!(self, Produced::Async(_))
    }
}

impl<T> From<T> for Produced<T> {
    fn from(value: T) -> Self {
        Produced::Sync(value)
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for Produced<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sync(v) => f.debug_tuple("Sync").field(v).finish(),
            Self::Async(_) => f.debug_tuple("Async").finish_non_exhaustive(),
        }
    }
}

/// Shared zero-argument producer
pub type Producer<T> = Rc<dyn Fn() -> Produced<T>>;
