//! # Load Scheduler
//!
//! Wraps a zero-argument producer into a non-blocking loaded state:
//!
//! - `Idle`: nothing loaded yet, nothing loading
//! - `Loading`: a producer invocation is in flight (a previous value may still
//!   be visible, see [LoadOptions::keep_prev_on_load])
//! - `Ready`: a value is present and nothing is loading
//!
//! Triggers arriving while a load is in flight are either let through, dropped,
//! or queued and replayed in FIFO order once the scheduler is idle again,
//! depending on [LoadOptions].
//!
//! ```rust
//! use statecraft::prelude::*;
//!
//! let scheduler =
//!     LoadScheduler::new(|| Produced::Sync(42), LoadOptions::default(), TokioLocalSpawner);
//! assert_eq!(scheduler.status(), LoadStatus::Idle);
//!
//! scheduler.trigger();
//! assert_eq!(scheduler.value(), Some(42));
//! assert_eq!(scheduler.status(), LoadStatus::Ready);
//! ```

mod options;
mod producer;
mod spawn;
mod transition;

use std::{
    any::Any,
    cell::RefCell,
    collections::VecDeque,
    rc::{Rc, Weak},
};

pub use options::LoadOptions;
pub use producer::{Produced, Producer};
pub use spawn::{DioxusSpawner, Spawn, TokioLocalSpawner};
pub use transition::Transition;

/// Coarse state of a scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Ready,
}

/// Point-in-time view of a scheduler, handed to listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadSnapshot<T> {
    pub is_loading: bool,
    pub value: Option<T>,
    /// Number of triggers waiting in the queue
    pub queued: usize,
}

impl<T> Default for LoadSnapshot<T> {
    fn default() -> Self {
        Self {
            is_loading: false,
            value: None,
            queued: 0,
        }
    }
}

impl<T> LoadSnapshot<T> {
    pub fn status(&self) -> LoadStatus {
        match (self.is_loading, &self.value) {
            (true, _) => LoadStatus::Loading,
            (false, Some(_)) => LoadStatus::Ready,
            (false, None) => LoadStatus::Idle,
        }
    }

    /// The value, but only once no load is in flight.
    pub fn settled(&self) -> Option<&T> {
        if self.is_loading {
            None
        } else {
            self.value.as_ref()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TriggerReason {
    Manual,
    DepsChanged,
}

/// A trigger waiting for a free load slot. It carries the producer that was
/// current when the trigger was requested.
struct QueuedLoad<T> {
    producer: Producer<T>,
    reason: TriggerReason,
}

type Listener<T> = Box<dyn FnMut(&LoadSnapshot<T>)>;

struct LoadState<T> {
    options: LoadOptions,
    producer: Producer<T>,
    value: Option<T>,
    in_flight: usize,
    queue: VecDeque<QueuedLoad<T>>,
    deps: Option<Box<dyn Any>>,
    listeners: Vec<Listener<T>>,
    invocations: u64,
    version: u64,
}

impl<T: Clone> LoadState<T> {
    fn snapshot(&self) -> LoadSnapshot<T> {
        LoadSnapshot {
            is_loading: self.in_flight > 0,
            value: self.value.clone(),
            queued: self.queue.len(),
        }
    }
}

struct Shared<T> {
    id: uuid::Uuid,
    transition: Transition,
    state: RefCell<LoadState<T>>,
}

/// Deferred-load state machine around a producer.
///
/// Cloning gives another handle on the same scheduler. Asynchronous
/// continuations only hold a weak handle: once every handle is dropped, results
/// still in flight are discarded.
pub struct LoadScheduler<T> {
    shared: Rc<Shared<T>>,
}

impl<T> Clone for LoadScheduler<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T: Clone + 'static> LoadScheduler<T> {
    pub fn new(
        producer: impl Fn() -> Produced<T> + 'static,
        options: LoadOptions,
        spawner: impl Spawn + 'static,
    ) -> Self {
        let id = uuid::Uuid::new_v4();
        log::debug!("load_scheduler {id} - created with {options:?}");
        Self {
            shared: Rc::new(Shared {
                id,
                transition: Transition::new(spawner),
                state: RefCell::new(LoadState {
                    options,
                    producer: Rc::new(producer),
                    value: None,
                    in_flight: 0,
                    queue: VecDeque::new(),
                    deps: None,
                    listeners: Vec::new(),
                    invocations: 0,
                    version: 0,
                }),
            }),
        }
    }

    pub fn options(&self) -> LoadOptions {
        self.shared.state.borrow().options
    }

    pub fn snapshot(&self) -> LoadSnapshot<T> {
        self.shared.state.borrow().snapshot()
    }

    pub fn status(&self) -> LoadStatus {
        self.snapshot().status()
    }

    pub fn is_loading(&self) -> bool {
        self.shared.state.borrow().in_flight > 0
    }

    pub fn value(&self) -> Option<T> {
        self.shared.state.borrow().value.clone()
    }

    pub fn queue_len(&self) -> usize {
        self.shared.state.borrow().queue.len()
    }

    /// How many times a producer has been invoked so far.
    pub fn invocations(&self) -> u64 {
        self.shared.state.borrow().invocations
    }

    /// The transition tracking asynchronous continuations of this scheduler.
    pub fn transition(&self) -> &Transition {
        &self.shared.transition
    }

    /// Call `listener` with a fresh snapshot after every state change.
    pub fn subscribe(&self, listener: impl FnMut(&LoadSnapshot<T>) + 'static) {
        self.shared
            .state
            .borrow_mut()
            .listeners
            .push(Box::new(listener));
    }

    /// Replace the producer used by subsequent triggers.
    ///
    /// Triggers already queued keep the producer they were requested with.
    pub fn set_producer(&self, producer: impl Fn() -> Produced<T> + 'static) {
        self.set_shared_producer(Rc::new(producer));
    }

    pub fn set_shared_producer(&self, producer: Producer<T>) {
        self.shared.state.borrow_mut().producer = producer;
    }

    /// Request a fresh producer invocation.
    pub fn trigger(&self) {
        self.request(TriggerReason::Manual);
    }

    /// Record the dependencies of the producer and trigger a load when they
    /// differ from the previously recorded ones. The first call always triggers.
    ///
    /// Returns whether a load was requested.
    pub fn update_deps<D: PartialEq + 'static>(&self, deps: D) -> bool {
        let changed = {
            let mut state = self.shared.state.borrow_mut();
            let changed = match state.deps.as_ref().and_then(|d| d.downcast_ref::<D>()) {
                Some(previous) => *previous != deps,
                None => true,
            };
            if changed {
                state.deps = Some(Box::new(deps));
            }
            changed
        };
        if changed {
            self.request(TriggerReason::DepsChanged);
        }
        changed
    }

    /// Assign the value directly, bypassing the producer.
    ///
    /// Neither the loading flag nor the queue are affected, and a load in
    /// flight will still overwrite the value when it completes.
    pub fn set_value(&self, value: T) {
        self.replace_value(Some(value));
    }

    /// Reset the value to nothing, with the same guarantees as [Self::set_value].
    pub fn clear_value(&self) {
        self.replace_value(None);
    }

    fn replace_value(&self, value: Option<T>) {
        {
            let mut state = self.shared.state.borrow_mut();
            state.value = value;
            state.version += 1;
        }
        self.notify();
    }

    fn request(&self, reason: TriggerReason) {
        let producer = self.shared.state.borrow().producer.clone();
        self.run_or_queue(QueuedLoad { producer, reason });
        self.drain();
    }

    fn run_or_queue(&self, load: QueuedLoad<T>) {
        let id = self.shared.id;
        let producer = {
            let mut state = self.shared.state.borrow_mut();
            if state.in_flight > 0 && state.options.prevent_burst_load {
                if state.options.process_queue {
                    log::debug!("load_scheduler {id} - {:?} trigger queued", load.reason);
                    state.queue.push_back(load);
                    state.version += 1;
                    None
                } else {
                    log::debug!("load_scheduler {id} - {:?} trigger suppressed", load.reason);
                    return;
                }
            } else {
                state.in_flight += 1;
                state.invocations += 1;
                if !state.options.keep_prev_on_load {
                    state.value = None;
                }
                state.version += 1;
                log::debug!(
                    "load_scheduler {id} - {:?} load started (in flight: {})",
                    load.reason,
                    state.in_flight
                );
                Some(load.producer)
            }
        };
        self.notify();
        let Some(producer) = producer else {
            return;
        };

        // The continuation joins the transition before the producer call
        // leaves it, so an async load flips the pending flag only once.
        let transition = &self.shared.transition;
        transition.start(|| match producer() {
            Produced::Sync(value) => self.complete(value),
            Produced::Async(future) => {
                let weak: Weak<Shared<T>> = Rc::downgrade(&self.shared);
                transition.start_async(async move {
                    let value = future.await;
                    match weak.upgrade() {
                        Some(shared) => {
                            let scheduler = LoadScheduler { shared };
                            scheduler.complete(value);
                            scheduler.drain();
                        }
                        None => {
                            log::debug!("load_scheduler {id} - dropped, discarding result")
                        }
                    }
                });
            }
        });
    }

    fn complete(&self, value: T) {
        {
            let mut state = self.shared.state.borrow_mut();
            state.value = Some(value);
            state.in_flight = state.in_flight.saturating_sub(1);
            state.version += 1;
            log::debug!(
                "load_scheduler {} - load completed (in flight: {})",
                self.shared.id,
                state.in_flight
            );
        }
        self.notify();
    }

    /// Replay queued triggers for as long as no load is in flight.
    fn drain(&self) {
        loop {
            let next = {
                let mut state = self.shared.state.borrow_mut();
                if state.in_flight == 0 {
                    state.queue.pop_front()
                } else {
                    None
                }
            };
            let Some(load) = next else {
                break;
            };
            log::debug!("load_scheduler {} - replaying queued trigger", self.shared.id);
            self.run_or_queue(load);
        }
    }

    fn notify(&self) {
        loop {
            let (snapshot, version, mut listeners) = {
                let mut state = self.shared.state.borrow_mut();
                let listeners = core::mem::take(&mut state.listeners);
                (state.snapshot(), state.version, listeners)
            };
            for listener in listeners.iter_mut() {
                listener(&snapshot);
            }
            let mut state = self.shared.state.borrow_mut();
            listeners.append(&mut state.listeners);
            state.listeners = listeners;
            // A listener changed the state again, deliver the newer snapshot
            if state.version == version {
                break;
            }
        }
    }
}
