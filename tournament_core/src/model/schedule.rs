//! Slot grid, assignments, locks and court annotations. These are
//! plain value types; the entities with real invariants (Tournament, Event,
//! Match) carry their own validation instead.

use crate::ids::{
    AssignmentId, MatchId, MatchLockId, ScheduleVersionId, SlotId, SlotLockId, TournamentId,
};
use crate::model::enums::{AssignedBy, VersionStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleVersion {
    pub id: ScheduleVersionId,
    pub tournament_id: TournamentId,
    pub status: VersionStatus,
    /// "Desk Draft" for the one draft the runtime mutates live; otherwise
    /// an arbitrary operator label or empty.
    pub tag: String,
}

impl ScheduleVersion {
    pub fn is_desk_draft(&self) -> bool {
        self.status == VersionStatus::Draft && self.tag == "Desk Draft"
    }
}

/// Minute-of-day representation avoids pulling in a time-of-day crate for a
/// value that's always within a single tournament day.
pub type MinuteOfDay = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub id: SlotId,
    pub version_id: ScheduleVersionId,
    pub day_date: NaiveDate,
    pub start_minute: MinuteOfDay,
    pub end_minute: MinuteOfDay,
    pub court_number: u32,
    pub block_minutes: u32,
    pub is_active: bool,
}

impl ScheduleSlot {
    pub fn fits(&self, duration_minutes: u32) -> bool {
        self.is_active && self.block_minutes >= duration_minutes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchAssignment {
    pub id: AssignmentId,
    pub version_id: ScheduleVersionId,
    pub match_id: MatchId,
    pub slot_id: SlotId,
    pub assigned_by: AssignedBy,
    pub locked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchLock {
    pub id: MatchLockId,
    pub version_id: ScheduleVersionId,
    pub match_id: MatchId,
    pub slot_id: SlotId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotLockStatus {
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotLock {
    pub id: SlotLockId,
    pub version_id: ScheduleVersionId,
    pub slot_id: SlotId,
    pub status: SlotLockStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourtState {
    pub tournament_id: TournamentId,
    pub court_number: u32,
    pub is_closed: bool,
    pub note: Option<String>,
}
