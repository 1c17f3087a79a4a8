//! Match entity — the unit the rest of the system schedules and runs.

use crate::ids::{EventId, MatchId, ScheduleVersionId, TeamId, TournamentId};
use crate::model::enums::{MatchType, Role, RuntimeStatus};
use crate::model::score::ScoreJson;
use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    id: MatchId,
    tournament_id: TournamentId,
    event_id: EventId,
    version_id: ScheduleVersionId,
    match_code: String,
    match_type: MatchType,
    round_index: u32,
    sequence_in_round: u32,
    duration_minutes: u32,

    team_a_id: Option<TeamId>,
    team_b_id: Option<TeamId>,
    placeholder_side_a: Option<String>,
    placeholder_side_b: Option<String>,

    source_match_a_id: Option<MatchId>,
    source_a_role: Option<Role>,
    source_match_b_id: Option<MatchId>,
    source_b_role: Option<Role>,

    runtime_status: RuntimeStatus,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    winner_team_id: Option<TeamId>,
    score_json: Option<ScoreJson>,

    consolation_tier: Option<u8>,
    placement_type: Option<String>,
    preferred_day: Option<Weekday>,
}

impl Match {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: MatchId,
        tournament_id: TournamentId,
        event_id: EventId,
        version_id: ScheduleVersionId,
        match_code: impl Into<String>,
        match_type: MatchType,
        round_index: u32,
        sequence_in_round: u32,
        duration_minutes: u32,
    ) -> Self {
        Match {
            id,
            tournament_id,
            event_id,
            version_id,
            match_code: match_code.into(),
            match_type,
            round_index,
            sequence_in_round,
            duration_minutes,
            team_a_id: None,
            team_b_id: None,
            placeholder_side_a: None,
            placeholder_side_b: None,
            source_match_a_id: None,
            source_a_role: None,
            source_match_b_id: None,
            source_b_role: None,
            runtime_status: RuntimeStatus::Scheduled,
            started_at: None,
            completed_at: None,
            winner_team_id: None,
            score_json: None,
            consolation_tier: None,
            placement_type: None,
            preferred_day: None,
        }
    }

    pub fn id(&self) -> MatchId {
        self.id
    }
    /// Used by the Draw Plan Engine when materializing a batch of matches
    /// whose ids are allocated after all cross-references within the
    /// batch are known, and by entity store implementations assigning an
    /// id on first insert.
    pub fn set_id(&mut self, id: MatchId) -> &mut Self {
        self.id = id;
        self
    }
    pub fn tournament_id(&self) -> TournamentId {
        self.tournament_id
    }
    pub fn event_id(&self) -> EventId {
        self.event_id
    }
    pub fn version_id(&self) -> ScheduleVersionId {
        self.version_id
    }
    pub fn match_code(&self) -> &str {
        &self.match_code
    }
    pub fn match_type(&self) -> MatchType {
        self.match_type
    }
    pub fn round_index(&self) -> u32 {
        self.round_index
    }
    pub fn sequence_in_round(&self) -> u32 {
        self.sequence_in_round
    }
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }
    pub fn team_a_id(&self) -> Option<TeamId> {
        self.team_a_id
    }
    pub fn team_b_id(&self) -> Option<TeamId> {
        self.team_b_id
    }
    pub fn team_ids(&self) -> impl Iterator<Item = TeamId> + '_ {
        self.team_a_id.into_iter().chain(self.team_b_id)
    }
    pub fn placeholder_side_a(&self) -> Option<&str> {
        self.placeholder_side_a.as_deref()
    }
    pub fn placeholder_side_b(&self) -> Option<&str> {
        self.placeholder_side_b.as_deref()
    }
    pub fn source_match_a_id(&self) -> Option<MatchId> {
        self.source_match_a_id
    }
    pub fn source_a_role(&self) -> Option<Role> {
        self.source_a_role
    }
    pub fn source_match_b_id(&self) -> Option<MatchId> {
        self.source_match_b_id
    }
    pub fn source_b_role(&self) -> Option<Role> {
        self.source_b_role
    }
    pub fn runtime_status(&self) -> RuntimeStatus {
        self.runtime_status
    }
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }
    pub fn winner_team_id(&self) -> Option<TeamId> {
        self.winner_team_id
    }
    pub fn score_json(&self) -> Option<&ScoreJson> {
        self.score_json.as_ref()
    }
    pub fn consolation_tier(&self) -> Option<u8> {
        self.consolation_tier
    }
    pub fn placement_type(&self) -> Option<&str> {
        self.placement_type.as_deref()
    }
    pub fn preferred_day(&self) -> Option<Weekday> {
        self.preferred_day
    }

    pub fn set_duration_minutes(&mut self, minutes: u32) -> &mut Self {
        self.duration_minutes = minutes;
        self
    }

    pub fn set_team_a(&mut self, team: Option<TeamId>) -> &mut Self {
        self.team_a_id = team;
        self
    }

    pub fn set_team_b(&mut self, team: Option<TeamId>) -> &mut Self {
        self.team_b_id = team;
        self
    }

    pub fn set_side(&mut self, role: Side, team: Option<TeamId>) -> &mut Self {
        match role {
            Side::A => self.team_a_id = team,
            Side::B => self.team_b_id = team,
        }
        self
    }

    pub fn set_placeholder_side_a(&mut self, p: Option<String>) -> &mut Self {
        self.placeholder_side_a = p;
        self
    }
    pub fn set_placeholder_side_b(&mut self, p: Option<String>) -> &mut Self {
        self.placeholder_side_b = p;
        self
    }

    pub fn wire_source_a(&mut self, source: Option<MatchId>, role: Option<Role>) -> &mut Self {
        self.source_match_a_id = source;
        self.source_a_role = role;
        self
    }

    pub fn wire_source_b(&mut self, source: Option<MatchId>, role: Option<Role>) -> &mut Self {
        self.source_match_b_id = source;
        self.source_b_role = role;
        self
    }

    pub fn wire_source(&mut self, side: Side, source: Option<MatchId>, role: Option<Role>) -> &mut Self {
        match side {
            Side::A => self.wire_source_a(source, role),
            Side::B => self.wire_source_b(source, role),
        }
    }

    pub fn set_consolation_tier(&mut self, tier: Option<u8>) -> &mut Self {
        self.consolation_tier = tier;
        self
    }

    pub fn set_placement_type(&mut self, kind: Option<String>) -> &mut Self {
        self.placement_type = kind;
        self
    }

    pub fn set_preferred_day(&mut self, day: Option<Weekday>) -> &mut Self {
        self.preferred_day = day;
        self
    }

    pub fn set_runtime_status(&mut self, status: RuntimeStatus) -> &mut Self {
        self.runtime_status = status;
        self
    }

    pub fn set_started_at(&mut self, at: Option<DateTime<Utc>>) -> &mut Self {
        self.started_at = at;
        self
    }

    /// Finalize with a winner and score, in one step so `completed_at`,
    /// `runtime_status` and `winner_team_id` never drift apart.
    pub fn finalize(&mut self, winner: TeamId, score: ScoreJson, at: DateTime<Utc>) -> &mut Self {
        self.runtime_status = RuntimeStatus::Final;
        self.winner_team_id = Some(winner);
        self.score_json = Some(score);
        self.completed_at = Some(at);
        self
    }

    pub fn is_assigned_both_sides(&self) -> bool {
        self.team_a_id.is_some() && self.team_b_id.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}
