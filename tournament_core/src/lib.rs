//! Live operations core of a multi-day, multi-court racket-sport
//! tournament: draw plan generation, placement, runtime state, and
//! reschedule.
//!
//! This crate is synchronous-per-operation and transport-agnostic: it
//! consumes [`ports::store::EntityStorePort`] and exposes its operations
//! as plain async methods on [`Core`]. HTTP routing, persistence
//! schemas, authentication and rendering all live outside this crate.

pub mod advancement;
pub mod draft;
pub mod draw_plan;
pub mod errors;
pub mod hashing;
pub mod ids;
pub mod master_sequence;
pub mod model;
pub mod placement;
pub mod ports;
pub mod projection;
pub mod reschedule;
pub mod runtime;
pub mod utils;
pub mod verifier;

pub use errors::{CoreError, CoreResult, Warning};

use ports::store::EntityStorePort;
use std::sync::Arc;

/// The core holds one connection to the entity store and nothing else —
/// no transport, no UI state, no background tasks.
pub struct Core {
    pub store: Arc<dyn EntityStorePort>,
}

impl Core {
    pub fn new(store: Arc<dyn EntityStorePort>) -> Self {
        Core { store }
    }

    pub fn builder() -> CoreBuilder<NoStore> {
        CoreBuilder { state: NoStore }
    }
}

pub struct NoStore;
pub struct WithStore(Arc<dyn EntityStorePort>);

/// Typestate builder so a `Core` can never be constructed without a store.
pub struct CoreBuilder<S> {
    state: S,
}

impl CoreBuilder<NoStore> {
    pub fn store(self, store: Arc<dyn EntityStorePort>) -> CoreBuilder<WithStore> {
        CoreBuilder {
            state: WithStore(store),
        }
    }
}

impl Default for CoreBuilder<NoStore> {
    fn default() -> Self {
        Core::builder()
    }
}

impl CoreBuilder<WithStore> {
    pub fn build(self) -> Core {
        Core { store: self.state.0 }
    }
}
