mod keyed_sync;
mod loaded_state;
mod transitioned;

pub mod prelude {
    pub use super::loaded_state::LoadedState;
    pub mod helper_hooks {
        pub use super::super::keyed_sync::use_keyed_sync;
        pub use super::super::loaded_state::use_loaded_state;
        pub use super::super::transitioned::use_transitioned;
    }
}
