//! State primitives for Dioxus user interfaces.
//!
//! Two independent engines, usable with or without a running Dioxus runtime:
//!
//! - [Synchronizer](synchronizer::Synchronizer): keeps a local keyed collection
//!   in step with an external one, with vetoable insert and delete events.
//! - [LoadScheduler](scheduler::LoadScheduler): deferred loading of a sync or
//!   async producer, with stale-while-loading values, burst suppression and a
//!   FIFO replay queue.
//!
//! The [helper_hooks](prelude::helper_hooks) and the
//! [KeyedMap](components::keyed_map::KeyedMap) component bind them to Dioxus
//! scopes.

pub mod components;
mod helper_hooks;
pub mod scheduler;
pub mod synchronizer;
pub mod utils;

pub mod prelude {
    pub use super::components::keyed_map::KeyedMap;
    pub use super::helper_hooks::prelude::*;
    pub use super::scheduler::{
        DioxusSpawner, LoadOptions, LoadScheduler, LoadSnapshot, LoadStatus, Produced, Spawn,
        TokioLocalSpawner, Transition,
    };
    pub use super::synchronizer::{
        DeleteDecision, DeleteEvent, Entry, Handlers, InsertDecision, InsertEvent, Key, MapItem,
        ReconcileHandler, ReconcileReport, Synchronizer,
    };
    pub use super::utils::{CCStr, LResult};
    pub use dioxus::prelude::*;
}
