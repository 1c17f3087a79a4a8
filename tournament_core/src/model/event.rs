//! Event entity and its compiled draw plan.

use crate::ids::{EventId, TournamentId};
use crate::model::enums::TemplateKey;
use crate::utils::normalize::normalize_label;
use crate::utils::validation::{FieldError, ValidationErrors, ValidationResult};
use serde::{Deserialize, Serialize};

/// Minimum number of matches any team in the event is guaranteed to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Guarantee {
    Four,
    Five,
}

impl Guarantee {
    pub fn as_u8(self) -> u8 {
        match self {
            Guarantee::Four => 4,
            Guarantee::Five => 5,
        }
    }
}

/// Per-stage inventory counts, derived by the Draw Plan Engine from a
/// template + team_count + waterfall_rounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryCounts {
    pub wf: u32,
    pub rr: u32,
    pub main: u32,
    pub consolation: u32,
    pub placement: u32,
}

impl InventoryCounts {
    pub fn total(&self) -> u32 {
        self.wf + self.rr + self.main + self.consolation + self.placement
    }
}

/// The compiled draw plan stored on an Event.
/// `inventory` is derived, not an input; the engine recomputes it and the
/// result is part of what `draw_plan_json` hashes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawPlan {
    pub template_key: TemplateKey,
    pub waterfall_rounds: u32,
    pub guarantee: Guarantee,
    pub inventory: InventoryCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    id: EventId,
    tournament_id: TournamentId,
    name: String,
    category: String,
    team_count: u32,
    waterfall_block_minutes: u32,
    standard_block_minutes: u32,
    draw_plan: Option<DrawPlan>,
}

impl Event {
    pub fn new(
        id: EventId,
        tournament_id: TournamentId,
        name: impl Into<String>,
        category: impl Into<String>,
        team_count: u32,
    ) -> Self {
        Event {
            id,
            tournament_id,
            name: normalize_label(&name.into()),
            category: normalize_label(&category.into()),
            team_count,
            waterfall_block_minutes: 20,
            standard_block_minutes: 0,
            draw_plan: None,
        }
    }

    pub fn id(&self) -> EventId {
        self.id
    }
    pub fn tournament_id(&self) -> TournamentId {
        self.tournament_id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn category(&self) -> &str {
        &self.category
    }
    pub fn team_count(&self) -> u32 {
        self.team_count
    }
    pub fn waterfall_block_minutes(&self) -> u32 {
        self.waterfall_block_minutes
    }
    pub fn standard_block_minutes(&self) -> u32 {
        self.standard_block_minutes
    }
    pub fn draw_plan(&self) -> Option<&DrawPlan> {
        self.draw_plan.as_ref()
    }

    pub fn set_durations(&mut self, waterfall_minutes: u32, standard_minutes: u32) -> &mut Self {
        self.waterfall_block_minutes = waterfall_minutes;
        self.standard_block_minutes = standard_minutes;
        self
    }

    pub fn set_draw_plan(&mut self, plan: DrawPlan) -> &mut Self {
        self.draw_plan = Some(plan);
        self
    }

    pub fn validate(&self) -> ValidationResult<()> {
        let mut errors = ValidationErrors::new();
        if self.name.is_empty() {
            errors.push(
                FieldError::builder()
                    .on("name")
                    .required()
                    .done(),
            );
        }
        if self.team_count < 2 {
            errors.push(
                FieldError::builder()
                    .on("team_count")
                    .invalid_format()
                    .message("an event needs at least 2 teams")
                    .done(),
            );
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
