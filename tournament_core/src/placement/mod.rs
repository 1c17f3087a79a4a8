//! Placement Engine: two interchangeable drivers that turn a
//! match set into MatchAssignment rows under the shared compatibility
//! test and deterministic sort keys.

pub mod batches;
pub mod compat;
pub mod policy_driver;
pub mod sequence_driver;

pub use compat::{is_compatible, match_sort_key, slot_sort_key, PlacementState};
pub use policy_driver::{run_daily_policy, run_full_policy};
pub use sequence_driver::assign_by_sequence;
