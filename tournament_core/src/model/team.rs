//! Team entity.

use crate::ids::{EventId, TeamId};
use crate::utils::normalize::{normalize_label, normalize_optional_label};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    id: TeamId,
    event_id: EventId,
    seed: u32,
    name: String,
    display_name: Option<String>,
    avoid_group: Option<String>,
    wf_group_index: Option<u32>,
    is_defaulted: bool,
}

impl Team {
    pub fn new(id: TeamId, event_id: EventId, seed: u32, name: impl Into<String>) -> Self {
        Team {
            id,
            event_id,
            seed,
            name: normalize_label(&name.into()),
            display_name: None,
            avoid_group: None,
            wf_group_index: None,
            is_defaulted: false,
        }
    }

    pub fn id(&self) -> TeamId {
        self.id
    }
    pub fn event_id(&self) -> EventId {
        self.event_id
    }
    pub fn seed(&self) -> u32 {
        self.seed
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
    pub fn avoid_group(&self) -> Option<&str> {
        self.avoid_group.as_deref()
    }
    pub fn wf_group_index(&self) -> Option<u32> {
        self.wf_group_index
    }
    pub fn is_defaulted(&self) -> bool {
        self.is_defaulted
    }

    pub fn set_display_name(&mut self, name: Option<String>) -> &mut Self {
        self.display_name = normalize_optional_label(name);
        self
    }

    pub fn set_avoid_group(&mut self, group: Option<String>) -> &mut Self {
        self.avoid_group = normalize_optional_label(group);
        self
    }

    pub fn set_wf_group_index(&mut self, index: Option<u32>) -> &mut Self {
        self.wf_group_index = index;
        self
    }

    pub fn mark_defaulted(&mut self) -> &mut Self {
        self.is_defaulted = true;
        self
    }
}
