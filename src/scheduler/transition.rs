use std::{cell::RefCell, future::Future, rc::Rc};

use futures_util::future::FutureExt;

use super::spawn::Spawn;

struct TransitionInner {
    pending: usize,
    listeners: Vec<Box<dyn FnMut(bool)>>,
}

/// Low priority work tracker.
///
/// Work started through a transition is counted as pending until it
/// finishes; `is_pending` is true while any such work is running. Listeners are
/// told every time the pending flag flips.
#[derive(Clone)]
pub struct Transition {
    inner: Rc<RefCell<TransitionInner>>,
    spawner: Rc<dyn Spawn>,
}

impl Transition {
    pub fn new(spawner: impl Spawn + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(TransitionInner {
                pending: 0,
                listeners: Vec::new(),
            })),
            spawner: Rc::new(spawner),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.inner.borrow().pending > 0
    }

    pub fn subscribe(&self, listener: impl FnMut(bool) + 'static) {
        self.inner.borrow_mut().listeners.push(Box::new(listener));
    }

    /// Run `work` to completion right away, pending for its duration.
    pub fn start<R>(&self, work: impl FnOnce() -> R) -> R {
        Self::enter(&self.inner);
        let r = work();
        Self::leave(&self.inner);
        r
    }

    /// Spawn `work`, pending until it resolves.
    pub fn start_async<F: Future<Output = ()> + 'static>(&self, work: F) {
        Self::enter(&self.inner);
        let inner = self.inner.clone();
        self.spawner.spawn_local(
            async move {
                work.await;
                Self::leave(&inner);
            }
            .boxed_local(),
        );
    }

    fn enter(inner: &RefCell<TransitionInner>) {
        let flipped = {
            let mut inner = inner.borrow_mut();
            inner.pending += 1;
            inner.pending == 1
        };
        if flipped {
            Self::notify(inner, true);
        }
    }

    fn leave(inner: &RefCell<TransitionInner>) {
        let flipped = {
            let mut inner = inner.borrow_mut();
            inner.pending = inner.pending.saturating_sub(1);
            inner.pending == 0
        };
        if flipped {
            Self::notify(inner, false);
        }
    }

    fn notify(inner: &RefCell<TransitionInner>, pending: bool) {
        let mut listeners = core::mem::take(&mut inner.borrow_mut().listeners);
        for listener in listeners.iter_mut() {
            listener(pending);
        }
        let mut inner = inner.borrow_mut();
        listeners.append(&mut inner.listeners);
        inner.listeners = listeners;
    }
}
