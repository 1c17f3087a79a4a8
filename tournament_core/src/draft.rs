//! Working Draft Manager: the one mutable "Desk Draft" version per
//! tournament, and live-version resolution for read endpoints.

use crate::errors::{CoreError, CoreResult};
use crate::ids::{ScheduleVersionId, TournamentId};
use crate::model::enums::VersionStatus;
use crate::model::schedule::ScheduleVersion;
use crate::model::{Match, MatchAssignment, MatchLock, ScheduleSlot, SlotLock};
use crate::ports::store::EntityStorePort;
use std::collections::HashMap;
use tracing::{info, instrument};

const DESK_DRAFT_TAG: &str = "Desk Draft";

/// Idempotent: returns the tournament's existing desk draft if one
/// exists, otherwise clones the published version (or, absent a
/// pointer, the most recently created FINAL version) into a brand new
/// draft and repoints the tournament's public pointer at it.
#[instrument(name = "draft.create_desk_draft", skip(store), fields(tournament_id = %tournament_id))]
pub async fn create_desk_draft(
    store: &dyn EntityStorePort,
    tournament_id: TournamentId,
) -> CoreResult<ScheduleVersion> {
    let existing = store.list_versions_of_tournament(tournament_id).await?;
    if let Some(v) = existing.iter().find(|v| v.is_desk_draft()) {
        info!(version_id = %v.id, "desk_draft_already_exists");
        return Ok(v.clone());
    }

    let mut tournament = store
        .get_tournament(tournament_id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("tournament {tournament_id}")))?;

    let source_id = tournament.published_version_id().or_else(|| {
        existing
            .iter()
            .filter(|v| v.status == VersionStatus::Final)
            .max_by_key(|v| v.id.0)
            .map(|v| v.id)
    });

    let draft = ScheduleVersion {
        id: ScheduleVersionId(0),
        tournament_id,
        status: VersionStatus::Draft,
        tag: DESK_DRAFT_TAG.to_string(),
    };
    let new_version = store.save_version(&draft).await?;

    if let Some(source_id) = source_id {
        clone_version_contents(store, tournament_id, source_id, new_version.id).await?;
    }

    tournament.set_published_version_id(Some(new_version.id));
    store.save_tournament(&tournament).await?;

    info!(version_id = %new_version.id, source_id = ?source_id, "desk_draft_created");
    Ok(new_version)
}

/// Clones matches, slots, assignments and locks from `source` into
/// `target`, preserving every cross-reference's referential integrity
/// (source_match links, assignment match/slot links, lock match/slot
/// links) under the newly-assigned ids.
async fn clone_version_contents(
    store: &dyn EntityStorePort,
    tournament_id: TournamentId,
    source: ScheduleVersionId,
    target: ScheduleVersionId,
) -> CoreResult<()> {
    let slots = store.list_slots_of_version(source).await?;
    let slot_drafts: Vec<ScheduleSlot> = slots
        .iter()
        .map(|s| ScheduleSlot { id: crate::ids::SlotId(0), version_id: target, ..*s })
        .collect();
    let saved_slots = store.save_slots(&slot_drafts).await?;
    let slot_id_map: HashMap<_, _> =
        slots.iter().zip(saved_slots.iter()).map(|(old, new)| (old.id, new.id)).collect();

    let match_id_map = clone_matches(store, tournament_id, source, target).await?;

    let assignments = store.list_assignments_of_version(source).await?;
    let assignment_drafts: Vec<MatchAssignment> = assignments
        .iter()
        .filter_map(|a| {
            let match_id = *match_id_map.get(&a.match_id)?;
            let slot_id = *slot_id_map.get(&a.slot_id)?;
            Some(MatchAssignment {
                id: crate::ids::AssignmentId(0),
                version_id: target,
                match_id,
                slot_id,
                assigned_by: a.assigned_by,
                locked: a.locked,
            })
        })
        .collect();
    store.save_assignments(&assignment_drafts).await?;

    let match_locks = store.list_match_locks(source).await?;
    for lock in &match_locks {
        let (Some(&match_id), Some(&slot_id)) =
            (match_id_map.get(&lock.match_id), slot_id_map.get(&lock.slot_id))
        else {
            continue;
        };
        store
            .save_match_lock(&MatchLock {
                id: crate::ids::MatchLockId(0),
                version_id: target,
                match_id,
                slot_id,
            })
            .await?;
    }

    let slot_locks = store.list_slot_locks(source).await?;
    for lock in &slot_locks {
        let Some(&slot_id) = slot_id_map.get(&lock.slot_id) else {
            continue;
        };
        store
            .save_slot_lock(&SlotLock {
                id: crate::ids::SlotLockId(0),
                version_id: target,
                slot_id,
                status: lock.status,
            })
            .await?;
    }

    Ok(())
}

/// Two-pass clone, the same shape as the Draw Plan Engine's materialize
/// step: copy every match without its cross-match wiring first (so ids
/// can be assigned by the store), then rewrite `source_match_x_id` using
/// the old-id → new-id map before a final save.
async fn clone_matches(
    store: &dyn EntityStorePort,
    tournament_id: TournamentId,
    source: ScheduleVersionId,
    target: ScheduleVersionId,
) -> CoreResult<HashMap<crate::ids::MatchId, crate::ids::MatchId>> {
    let matches = store.list_matches_of_version(source).await?;

    let mut bare = Vec::with_capacity(matches.len());
    for m in &matches {
        let mut nm = Match::new(
            crate::ids::MatchId(0),
            tournament_id,
            m.event_id(),
            target,
            m.match_code(),
            m.match_type(),
            m.round_index(),
            m.sequence_in_round(),
            m.duration_minutes(),
        );
        nm.set_team_a(m.team_a_id());
        nm.set_team_b(m.team_b_id());
        nm.set_placeholder_side_a(m.placeholder_side_a().map(str::to_string));
        nm.set_placeholder_side_b(m.placeholder_side_b().map(str::to_string));
        nm.set_consolation_tier(m.consolation_tier());
        nm.set_placement_type(m.placement_type().map(str::to_string));
        nm.set_preferred_day(m.preferred_day());
        nm.set_runtime_status(m.runtime_status());
        nm.set_started_at(m.started_at());
        if let (Some(winner), Some(score), Some(at)) = (m.winner_team_id(), m.score_json(), m.completed_at()) {
            nm.finalize(winner, score.clone(), at);
        }
        bare.push(nm);
    }
    let saved = store.save_matches(&bare).await?;
    let id_map: HashMap<_, _> =
        matches.iter().zip(saved.iter()).map(|(old, new)| (old.id(), new.id())).collect();

    let mut rewired = Vec::with_capacity(saved.len());
    for (old, new) in matches.iter().zip(saved.into_iter()) {
        let mut nm = new;
        let src_a = old.source_match_a_id().and_then(|id| id_map.get(&id).copied());
        let src_b = old.source_match_b_id().and_then(|id| id_map.get(&id).copied());
        nm.wire_source_a(src_a, old.source_a_role());
        nm.wire_source_b(src_b, old.source_b_role());
        rewired.push(nm);
    }
    store.save_matches(&rewired).await?;

    Ok(id_map)
}

/// Live version resolution: explicit version id argument > active
/// desk draft > published pointer > latest FINAL version.
pub async fn resolve_live_version(
    store: &dyn EntityStorePort,
    tournament_id: TournamentId,
    explicit: Option<ScheduleVersionId>,
) -> CoreResult<ScheduleVersion> {
    if let Some(id) = explicit {
        return store
            .get_version(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("version {id}")));
    }

    let versions = store.list_versions_of_tournament(tournament_id).await?;
    if let Some(v) = versions.iter().find(|v| v.is_desk_draft()) {
        return Ok(v.clone());
    }

    let tournament = store
        .get_tournament(tournament_id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("tournament {tournament_id}")))?;
    if let Some(id) = tournament.published_version_id() {
        if let Some(v) = versions.iter().find(|v| v.id == id) {
            return Ok(v.clone());
        }
    }

    versions
        .into_iter()
        .filter(|v| v.status == VersionStatus::Final)
        .max_by_key(|v| v.id.0)
        .ok_or_else(|| CoreError::NotFound(format!("no version for tournament {tournament_id}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desk_draft_tag_matches_is_desk_draft() {
        let v = ScheduleVersion {
            id: ScheduleVersionId(1),
            tournament_id: TournamentId(1),
            status: VersionStatus::Draft,
            tag: DESK_DRAFT_TAG.to_string(),
        };
        assert!(v.is_desk_draft());
    }
}
