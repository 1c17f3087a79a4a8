//! Test doubles and fixture builders for exercising the engines end to end.
//!
//! An in-memory store behind `Arc<Mutex<HashMap<_, _>>>` per entity, with
//! `seed_*` helpers for test setup and no behavior beyond plain
//! upsert/list/delete.

pub mod fixtures;
pub mod store;

pub use store::InMemoryEntityStore;

use std::sync::Once;

static TRACING: Once = Once::new();

/// One-time tracing bootstrap for scenario tests. Call at the top of every
/// test that wants `#[instrument]` output under `cargo test -- --nocapture`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tournament_core=debug".to_string());
        let _ = tracing_subscriber::fmt().with_env_filter(env_filter).with_test_writer().try_init();
    });
}
