use serde::{Deserialize, Serialize};

/// Behavior switches of a [LoadScheduler](super::LoadScheduler).
///
/// Every field defaults to `true`. Missing fields of a deserialized document
/// take their default, so `{}` is a valid configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Keep the previous value visible while a new load runs.
    /// When false the value is cleared as soon as a load starts.
    pub keep_prev_on_load: bool,
    /// Refuse to start a second producer invocation while one is in flight.
    pub prevent_burst_load: bool,
    /// Queue the triggers refused by `prevent_burst_load` instead of dropping them.
    pub process_queue: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            keep_prev_on_load: true,
            prevent_burst_load: true,
            process_queue: true,
        }
    }
}

impl LoadOptions {
    pub fn with_keep_prev_on_load(mut self, keep_prev_on_load: bool) -> Self {
        self.keep_prev_on_load = keep_prev_on_load;
        self
    }
    pub fn with_prevent_burst_load(mut self, prevent_burst_load: bool) -> Self {
        self.prevent_burst_load = prevent_burst_load;
        self
    }
    pub fn with_process_queue(mut self, process_queue: bool) -> Self {
        self.process_queue = process_queue;
        self
    }
}
