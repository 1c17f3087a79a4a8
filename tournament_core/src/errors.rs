//! Error and warning taxonomy shared by every operation.
//!
//! `CoreError` aborts the enclosing transaction. `Warning` is returned
//! alongside a successful result; the operation still commits.

use crate::ids::{EventId, MatchId, TeamId};
use crate::ports::store::StoreError;
use crate::utils::validation::{FieldError, ValidationErrors};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, Error)]
pub enum CoreError {
    /// requested entity does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// mutation attempted against a non-draft version
    #[error("version is not a draft: {0}")]
    VersionNotDraft(String),

    /// draw plan generator produced a match_code that already exists in the version
    #[error("duplicate match_code: {0}")]
    DuplicateMatchCode(String),

    /// aggregated field validation failure
    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),

    /// single field validation failure
    #[error("field validation error: {0}")]
    Field(#[from] FieldError),

    /// requested slot is too short, or an add-slot collides with an existing one
    #[error("capacity error: {0}")]
    Capacity(String),

    /// conflicting finalize payload, or target slot already occupied
    #[error("conflict: {0}")]
    Conflict(String),

    /// entity store failure
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// a constraint the core itself is responsible for was violated
    #[error("internal error: {0}")]
    Internal(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, CoreError::Conflict(_))
    }
    pub fn is_version_not_draft(&self) -> bool {
        matches!(self, CoreError::VersionNotDraft(_))
    }
}

/// Non-fatal outcomes surfaced alongside a successful operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Warning {
    /// advancement would overwrite a side already occupied by a different team
    ConflictExistingTeam {
        downstream_match_id: MatchId,
        existing_team_id: TeamId,
        advancing_team_id: TeamId,
    },
    /// downstream match is locked or pre-pinned; advancement skipped it
    SlotLocked { downstream_match_id: MatchId },
    /// winner changed on a match whose downstream match already finished
    DownstreamAlreadyFinal { downstream_match_id: MatchId },
    /// WF round 1 could not avoid pairing two teams sharing an avoid_group
    WfR1AvoidGroupConflict {
        event_id: EventId,
        group: String,
        team_a_id: TeamId,
        team_b_id: TeamId,
    },
    /// WF round 2 wiring block has unavoidable avoid_group overlap
    WfR2AvoidGroupPotentialConflict {
        event_id: EventId,
        block_index: usize,
        r1_match_codes: Vec<String>,
        overlapping_groups: Vec<String>,
    },
    /// score_json had a shape the parser doesn't recognize; standings treat it as no sets played
    ScoreParseFailed { match_id: MatchId },
    /// reschedule could not find any compatible slot for this match
    NoAvailableSlot { match_id: MatchId },
    /// rest or daily-cap conflict surfaced by a read-only check, not a placement failure
    ConflictCheckWarning { match_id: MatchId, detail: String },
}

impl Warning {
    pub fn code(&self) -> &'static str {
        match self {
            Warning::ConflictExistingTeam { .. } => "CONFLICT_EXISTING_TEAM",
            Warning::SlotLocked { .. } => "SLOT_LOCKED",
            Warning::DownstreamAlreadyFinal { .. } => "DOWNSTREAM_ALREADY_FINAL",
            Warning::WfR1AvoidGroupConflict { .. } => "W_WF_R1_AVOID_GROUP_CONFLICT",
            Warning::WfR2AvoidGroupPotentialConflict { .. } => {
                "W_WF_R2_AVOID_GROUP_POTENTIAL_CONFLICT"
            }
            Warning::ScoreParseFailed { .. } => "SCORE_PARSE_FAILED",
            Warning::NoAvailableSlot { .. } => "NO_AVAILABLE_SLOT",
            Warning::ConflictCheckWarning { .. } => "CONFLICT_CHECK_WARNING",
        }
    }
}
