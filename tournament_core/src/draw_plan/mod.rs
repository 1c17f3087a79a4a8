//! Draw Plan Engine: compiles a template + seeded team list into
//! the full set of matches for a new ScheduleVersion, with every
//! cross-match dependency wired up front.

pub mod brackets;
pub mod generator;
pub mod rr;
pub mod wf_pairing;
pub mod wf_wiring;

pub use generator::{generate_matches, DrawPlanOutput};
