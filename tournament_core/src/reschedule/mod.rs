//! Reschedule Engine: re-places a subset of matches after a
//! disruption, or rebuilds a set of days from scratch. Placement on a
//! restricted subset, sharing the compatibility primitive with
//! [`crate::placement::compat`].

pub mod apply;
pub mod feasibility;
pub mod preview;
pub mod rebuild;

pub use apply::apply_reschedule;
pub use feasibility::assess_feasibility;
pub use preview::preview_reschedule;
pub use rebuild::rebuild_days;

use crate::model::schedule::{MinuteOfDay, ScheduleSlot};
use chrono::NaiveDate;

/// Which slots on `affected_day` a disruption mode removes.
pub(super) fn is_lost(
    slot: &ScheduleSlot,
    mode: crate::model::enums::RescheduleMode,
    affected_day: NaiveDate,
    unavailable_from: Option<MinuteOfDay>,
    available_from: Option<MinuteOfDay>,
    unavailable_courts: &[u32],
) -> bool {
    use crate::model::enums::RescheduleMode::*;
    if slot.day_date != affected_day {
        return false;
    }
    match mode {
        FullWashout => true,
        PartialDay => {
            let after_start = unavailable_from.map_or(true, |from| slot.start_minute >= from);
            let before_recovery = available_from.map_or(true, |to| slot.start_minute < to);
            after_start && before_recovery
        }
        CourtLoss => unavailable_courts.contains(&slot.court_number),
        Rebuild => true,
    }
}
