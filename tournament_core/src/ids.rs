//! Stable integer identifiers for every stored entity.
//!
//! IDs are assigned by the entity store on insert (never by the core); a
//! value of 0 means "not yet persisted" and is rejected by any lookup.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub i64);

        impl $name {
            pub fn is_persisted(self) -> bool {
                self.0 != 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(v: i64) -> Self {
                Self(v)
            }
        }
    };
}

typed_id!(TournamentId);
typed_id!(EventId);
typed_id!(TeamId);
typed_id!(ScheduleVersionId);
typed_id!(MatchId);
typed_id!(SlotId);
typed_id!(AssignmentId);
typed_id!(MatchLockId);
typed_id!(SlotLockId);
