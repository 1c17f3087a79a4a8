//! Wire-facing enumerations shared by every component.

use displaydoc::Display;
use serde::{Deserialize, Serialize};

/// Stage family a match belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum MatchType {
    /// WF
    Wf,
    /// RR
    Rr,
    /// MAIN
    Main,
    /// CONSOLATION
    Consolation,
    /// PLACEMENT
    Placement,
}

/// Per-match runtime lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum RuntimeStatus {
    /// SCHEDULED
    Scheduled,
    /// IN_PROGRESS
    InProgress,
    /// PAUSED
    Paused,
    /// DELAYED
    Delayed,
    /// FINAL
    Final,
    /// CANCELLED
    Cancelled,
}

impl RuntimeStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, RuntimeStatus::Final | RuntimeStatus::Cancelled)
    }
}

/// Who/what produced a MatchAssignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum AssignedBy {
    /// AUTO_ASSIGN_V1
    AutoAssignV1,
    /// ASSIGN_SCOPE_V1
    AssignScopeV1,
    /// ASSIGN_SUBSET_V1
    AssignSubsetV1,
    /// SEQUENCE_V1
    SequenceV1,
    /// REBUILD
    Rebuild,
    /// RESCHEDULE
    Reschedule,
    /// DESK_MOVE
    DeskMove,
    /// DESK_SWAP
    DeskSwap,
}

/// Scoring format, with its standard match duration in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum ScoringFormat {
    /// REGULAR
    Regular,
    /// PRO_SET_8
    ProSet8,
    /// PRO_SET_4
    ProSet4,
}

impl ScoringFormat {
    pub fn duration_minutes(self) -> u32 {
        match self {
            ScoringFormat::Regular => 105,
            ScoringFormat::ProSet8 => 60,
            ScoringFormat::ProSet4 => 35,
        }
    }
}

/// Side of a dependency edge a downstream match draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Role {
    /// WINNER
    Winner,
    /// LOSER
    Loser,
}

/// Reschedule Engine operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum RescheduleMode {
    /// PARTIAL_DAY
    PartialDay,
    /// FULL_WASHOUT
    FullWashout,
    /// COURT_LOSS
    CourtLoss,
    /// REBUILD
    Rebuild,
}

/// Status of a ScheduleVersion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum VersionStatus {
    /// draft
    Draft,
    /// final
    Final,
}

/// Draw plan template families supported by the Draw Plan Engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum TemplateKey {
    /// RR_ONLY
    RrOnly,
    /// WF_TO_POOLS_DYNAMIC
    WfToPoolsDynamic,
    /// WF_TO_POOLS_4
    WfToPools4,
    /// WF_TO_BRACKETS_8
    WfToBrackets8,
}

/// `drop_consolation` mode for REBUILD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Default)]
pub enum DropConsolationMode {
    /// none
    #[default]
    None,
    /// finals
    Finals,
    /// all
    All,
}
