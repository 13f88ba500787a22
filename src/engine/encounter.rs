//! Mission attempts: dilemma selection, the resolution loop and scoring.
//!
//! An attempt draws dilemmas from the shared pool against the attacking
//! group's size, then resolves them one per `ADVANCE_DILEMMA`. Between calls
//! the encounter lives in `GameState::dilemma_encounter` and the pending
//! resolution in `GameState::dilemma_result`.

use std::collections::BTreeSet;

use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;

use super::action_log::LogPayload;
use super::dilemma::{self, DilemmaOutcome};
use super::game_state::{
    mission_def, CardInstance, DilemmaInstance, GameState, PersonnelStatus, UniqueId,
};
use super::requirements::first_satisfied;
use super::ActionContext;
use super::turn::{require_phase, TurnPhase};
use crate::error::EngineError;
use crate::library::types::{CardDefId, MissionType};
use crate::library::Library;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct DilemmaEncounter {
    pub mission_index: usize,
    pub group_index: usize,
    /// Accepted dilemmas in presentation order.
    pub selected: Vec<DilemmaInstance>,
    pub cursor: usize,
    pub draw_budget: u32,
    pub cost_budget: u32,
    pub cost_spent: u32,
    /// Definition ids already resolved in this encounter.
    pub faced_ids: BTreeSet<CardDefId>,
}

/// How a finished attempt was scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissionResult {
    pub mission_index: usize,
    pub success: bool,
    pub points: u32,
}

/// Attacking strength left after subtracting dilemmas already overcome here.
pub fn budget(unstopped: usize, overcome_beneath: usize) -> u32 {
    unstopped.saturating_sub(overcome_beneath) as u32
}

fn dilemma_cost(library: &Library, def_id: CardDefId) -> Result<u32, EngineError> {
    library
        .lookup(def_id)?
        .as_dilemma()
        .map(|d| d.cost)
        .ok_or(EngineError::UnknownCardDefinition(def_id))
}

fn applies(library: &Library, def_id: CardDefId, mission_type: MissionType) -> bool {
    library
        .get(def_id)
        .and_then(|c| c.as_dilemma())
        .is_some_and(|d| d.location.applies_to(mission_type))
}

/// Take up to `budget` face-down applicable cards off the pool, top first.
/// The first time a search finds no face-down applicable card, the whole pool
/// is flipped face-down and shuffled; a second miss ends the draw.
fn draw_candidates(
    state: &mut GameState,
    mission_type: MissionType,
    budget: u32,
    ctx: &mut ActionContext<'_>,
) -> Vec<DilemmaInstance> {
    let mut drawn = Vec::new();
    let mut reshuffled = false;
    while (drawn.len() as u32) < budget {
        let next = state
            .dilemma_pool
            .iter()
            .position(|d| !d.faceup && applies(ctx.library, d.def_id, mission_type));
        match next {
            Some(i) => drawn.push(state.dilemma_pool.remove(i)),
            None if reshuffled => break,
            None => {
                for card in state.dilemma_pool.iter_mut() {
                    card.faceup = false;
                }
                ctx.shuffle.shuffle(&mut state.dilemma_pool);
                reshuffled = true;
                tracing::debug!("dilemma pool reshuffled ({} cards)", state.dilemma_pool.len());
                ctx.log.push(LogPayload::PoolReshuffled {
                    pool_size: state.dilemma_pool.len(),
                });
            }
        }
    }
    drawn
}

/// Start `ATTEMPT_MISSION`. Returns the scoring result when no dilemma was
/// accepted and the attempt finished immediately.
pub fn begin_attempt(
    state: &mut GameState,
    mission_index: usize,
    group_index: usize,
    ctx: &mut ActionContext<'_>,
) -> Result<Option<MissionResult>, EngineError> {
    require_phase(state, TurnPhase::ExecuteOrders, "ATTEMPT_MISSION")?;
    if state.dilemma_encounter.is_some() {
        return Err(EngineError::EncounterActive);
    }
    let deployment = state.mission(mission_index)?;
    let group = state.group(mission_index, group_index)?;
    if deployment.mission.completed {
        return Err(EngineError::MissionCompleted(mission_index));
    }
    let def = mission_def(ctx.library, deployment)?;
    let roster = group.roster(ctx.library, ctx.resolver);
    if roster.is_empty() {
        return Err(EngineError::NoActivePersonnel);
    }
    if !def.headquarters
        && !roster
            .iter()
            .any(|m| def.affiliations.contains(&m.stats.affiliation))
    {
        return Err(EngineError::NoMatchingAffiliation);
    }

    let mission_type = def.mission_type;
    let draw_budget = budget(roster.len(), deployment.overcome_count());
    let cost_budget = draw_budget;
    tracing::debug!(
        "attempt on mission {} by group {}: {} unstopped, budget {}",
        mission_index,
        group_index,
        roster.len(),
        draw_budget
    );
    ctx.log.push(LogPayload::MissionAttempted {
        mission_index,
        group_index,
        draw_budget,
        cost_budget,
    });

    // Parked dilemmas come back first and cost nothing.
    let beneath = std::mem::take(&mut state.mission_mut(mission_index)?.dilemmas);
    let (parked, overcome): (Vec<_>, Vec<_>) = beneath.into_iter().partition(|d| !d.overcome);
    state.mission_mut(mission_index)?.dilemmas = overcome;

    let drawn = draw_candidates(state, mission_type, draw_budget, ctx);

    let mut selected = Vec::new();
    let mut returned = Vec::new();
    let mut cost_spent = 0;
    let candidates = parked
        .into_iter()
        .map(|d| (d, true))
        .chain(drawn.into_iter().map(|d| (d, false)));
    for (card, was_parked) in candidates {
        let cost = if was_parked {
            0
        } else {
            dilemma_cost(ctx.library, card.def_id)?
        };
        if cost_spent + cost <= cost_budget {
            cost_spent += cost;
            selected.push(card);
        } else {
            returned.push(card.unique_id);
            state.dilemma_pool.push(DilemmaInstance {
                faceup: true,
                ..card
            });
        }
    }
    ctx.log.push(LogPayload::DilemmasSelected {
        selected: selected.iter().map(|d| d.unique_id).collect(),
        returned_to_pool: returned,
        cost_spent,
    });

    if selected.is_empty() {
        return score_mission(state, mission_index, group_index, ctx).map(Some);
    }

    ctx.shuffle.shuffle(&mut selected);
    state.dilemma_encounter = Some(DilemmaEncounter {
        mission_index,
        group_index,
        selected,
        cursor: 0,
        draw_budget,
        cost_budget,
        cost_spent,
        faced_ids: BTreeSet::new(),
    });
    resolve_current(state, ctx)?;
    Ok(None)
}

/// Evaluate the card under the cursor and store its pending outcome.
fn resolve_current(state: &mut GameState, ctx: &mut ActionContext<'_>) -> Result<(), EngineError> {
    let encounter = state
        .dilemma_encounter
        .as_ref()
        .ok_or(EngineError::NoEncounter)?;
    let card = encounter
        .selected
        .get(encounter.cursor)
        .cloned()
        .ok_or(EngineError::NoEncounter)?;
    let def = ctx.library.lookup(card.def_id)?;
    let rule = &def
        .as_dilemma()
        .ok_or(EngineError::UnknownCardDefinition(card.def_id))?
        .rule;
    let roster = state
        .group(encounter.mission_index, encounter.group_index)?
        .roster(ctx.library, ctx.resolver);
    let outcome = dilemma::evaluate(&card, &def.name, rule, &roster, ctx.shuffle);
    if let Some(encounter) = state.dilemma_encounter.as_mut() {
        encounter.faced_ids.insert(card.def_id);
    }
    ctx.log.push(LogPayload::DilemmaResolved {
        outcome: outcome.clone(),
    });
    state.dilemma_result = Some(outcome);
    Ok(())
}

/// `SELECT_PERSONNEL_FOR_DILEMMA`.
pub fn select_personnel(
    state: &mut GameState,
    personnel_id: UniqueId,
    log: &mut Vec<LogPayload>,
) -> Result<(), EngineError> {
    if state.dilemma_encounter.is_none() {
        return Err(EngineError::NoEncounter);
    }
    let outcome = state
        .dilemma_result
        .as_mut()
        .ok_or(EngineError::SelectionNotRequired)?;
    outcome.select(personnel_id)?;
    log.push(LogPayload::PersonnelSelected {
        dilemma_id: outcome.dilemma_id,
        personnel_id,
    });
    Ok(())
}

fn apply_outcome(
    state: &mut GameState,
    mission_index: usize,
    group_index: usize,
    card: &DilemmaInstance,
    outcome: &DilemmaOutcome,
) -> Result<(), EngineError> {
    let group = state.group_mut(mission_index, group_index)?;
    for id in &outcome.stopped_ids {
        if let Some(person) = group.personnel.iter_mut().find(|p| p.unique_id == *id) {
            person.status = PersonnelStatus::Stopped;
        }
    }
    let mut dead = Vec::new();
    for id in &outcome.killed_ids {
        if let Some(pos) = group.position_of(*id) {
            let person = group.personnel.remove(pos);
            dead.push(CardInstance {
                unique_id: person.unique_id,
                def_id: person.def_id,
            });
        }
    }
    state.discard.extend(dead);

    if outcome.returns_to_pile {
        state.dilemma_pool.push(DilemmaInstance {
            overcome: false,
            faceup: true,
            ..card.clone()
        });
    } else {
        state.mission_mut(mission_index)?.dilemmas.push(DilemmaInstance {
            overcome: outcome.overcome,
            faceup: true,
            ..card.clone()
        });
    }
    Ok(())
}

/// `ADVANCE_DILEMMA`. Returns the scoring result once the attempt is over.
pub fn advance(
    state: &mut GameState,
    ctx: &mut ActionContext<'_>,
) -> Result<Option<MissionResult>, EngineError> {
    let encounter = state
        .dilemma_encounter
        .clone()
        .ok_or(EngineError::NoEncounter)?;
    let outcome = state
        .dilemma_result
        .clone()
        .ok_or(EngineError::NoEncounter)?;
    if outcome.requires_selection {
        return Err(EngineError::SelectionRequired);
    }
    let (mission_index, group_index) = (encounter.mission_index, encounter.group_index);
    let current = encounter
        .selected
        .get(encounter.cursor)
        .cloned()
        .ok_or(EngineError::NoEncounter)?;

    apply_outcome(state, mission_index, group_index, &current, &outcome)?;
    state.dilemma_result = None;

    if state.group(mission_index, group_index)?.unstopped_count() == 0 {
        let rest: Vec<DilemmaInstance> = encounter.selected[encounter.cursor + 1..].to_vec();
        ctx.log.push(LogPayload::EncounterOverrun {
            placed_beneath: rest.iter().map(|d| d.unique_id).collect(),
        });
        tracing::debug!(
            "attacking group overrun, {} dilemmas placed beneath mission {}",
            rest.len(),
            mission_index
        );
        let beneath = &mut state.mission_mut(mission_index)?.dilemmas;
        beneath.extend(rest.into_iter().map(|d| DilemmaInstance {
            overcome: true,
            faceup: true,
            ..d
        }));
        state.dilemma_encounter = None;
        return score_mission(state, mission_index, group_index, ctx).map(Some);
    }

    let mut cursor = encounter.cursor + 1;
    while let Some(next) = encounter.selected.get(cursor) {
        let faced = state
            .dilemma_encounter
            .as_ref()
            .is_some_and(|e| e.faced_ids.contains(&next.def_id));
        if !faced {
            if let Some(e) = state.dilemma_encounter.as_mut() {
                e.cursor = cursor;
            }
            resolve_current(state, ctx)?;
            return Ok(None);
        }
        tracing::debug!("duplicate dilemma {} overcome automatically", next.unique_id);
        ctx.log.push(LogPayload::DilemmaAutoOvercome {
            unique_id: next.unique_id,
            def_id: next.def_id,
        });
        state.mission_mut(mission_index)?.dilemmas.push(DilemmaInstance {
            overcome: true,
            faceup: true,
            ..next.clone()
        });
        cursor += 1;
    }

    state.dilemma_encounter = None;
    score_mission(state, mission_index, group_index, ctx).map(Some)
}

/// Check the group against the mission's requirements and settle the attempt.
pub fn score_mission(
    state: &mut GameState,
    mission_index: usize,
    group_index: usize,
    ctx: &mut ActionContext<'_>,
) -> Result<MissionResult, EngineError> {
    let def = mission_def(ctx.library, state.mission(mission_index)?)?.clone();
    let roster = state
        .group(mission_index, group_index)?
        .roster(ctx.library, ctx.resolver);

    if !roster.is_empty() && first_satisfied(&roster, &def.requirements).is_some() {
        state.mission_mut(mission_index)?.mission.completed = true;
        state.score += def.points;
        match def.mission_type {
            MissionType::Planet => state.completed_planet_missions += 1,
            MissionType::Space => state.completed_space_missions += 1,
        }
        tracing::info!(
            "mission {} completed for {} points (score {})",
            mission_index,
            def.points,
            state.score
        );
        ctx.log.push(LogPayload::MissionScored {
            mission_index,
            points: def.points,
            score: state.score,
        });
        return Ok(MissionResult {
            mission_index,
            success: true,
            points: def.points,
        });
    }

    for person in state.group_mut(mission_index, group_index)?.personnel.iter_mut() {
        person.status = PersonnelStatus::Stopped;
    }
    tracing::info!("mission {} attempt failed", mission_index);
    ctx.log.push(LogPayload::MissionFailed { mission_index });
    Ok(MissionResult {
        mission_index,
        success: false,
        points: 0,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::engine::game_state::tests::{planet_group, sample_state};
    use crate::engine::game_state::Group;
    use crate::engine::modifiers::Unmodified;
    use crate::engine::shuffle::Shuffle;
    use crate::library::registry::{ARCHAEOLOGIST, CAPTAIN, COUNSELOR, SECURITY_CHIEF};
    use crate::library::types::{
        CardDef, CardKind, DilemmaDef, DilemmaLocation, DilemmaRule, Penalty, Requirement, Skill,
    };

    const RUINS: usize = 2;
    const SURVEY: usize = 1;

    /// Register a test dilemma. The default rule is always overcome without effect.
    pub(crate) fn add_dilemma(
        library: &mut Library,
        id: CardDefId,
        cost: u32,
        location: DilemmaLocation,
        rule: Option<DilemmaRule>,
    ) {
        library.add_card(CardDef {
            id,
            name: format!("Test dilemma {}", id),
            kind: CardKind::Dilemma(DilemmaDef {
                cost,
                location,
                rule: rule.unwrap_or(DilemmaRule::UnlessCheck {
                    requirements: vec![Requirement::default()],
                    penalty: Penalty::RandomKill,
                }),
            }),
        });
    }

    pub(crate) fn pool_card(unique_id: UniqueId, def_id: CardDefId) -> DilemmaInstance {
        DilemmaInstance {
            unique_id,
            def_id,
            overcome: false,
            faceup: false,
        }
    }

    fn ready(group: Group, mission: usize) -> GameState {
        let mut state = sample_state();
        state.phase = TurnPhase::ExecuteOrders;
        state.missions[mission].groups[0] = group;
        state
    }

    fn attempt(
        state: &mut GameState,
        library: &Library,
        mission: usize,
        seed: u64,
    ) -> (Result<Option<MissionResult>, EngineError>, Vec<LogPayload>) {
        let mut shuffle = Shuffle::seeded(seed);
        let mut log = Vec::new();
        let mut ctx = ActionContext {
            library,
            resolver: &Unmodified,
            shuffle: &mut shuffle,
            log: &mut log,
        };
        let result = begin_attempt(state, mission, 0, &mut ctx);
        (result, log)
    }

    fn step(
        state: &mut GameState,
        library: &Library,
        seed: u64,
    ) -> (Result<Option<MissionResult>, EngineError>, Vec<LogPayload>) {
        let mut shuffle = Shuffle::seeded(seed);
        let mut log = Vec::new();
        let mut ctx = ActionContext {
            library,
            resolver: &Unmodified,
            shuffle: &mut shuffle,
            log: &mut log,
        };
        let result = advance(state, &mut ctx);
        (result, log)
    }

    fn three_crew() -> Group {
        planet_group(&[(101, CAPTAIN), (102, COUNSELOR), (103, SECURITY_CHIEF)])
    }

    fn five_cheap_dilemmas(library: &mut Library, state: &mut GameState) {
        for i in 0..5u64 {
            add_dilemma(library, 200 + i, 1, DilemmaLocation::Dual, None);
            state.dilemma_pool.push(pool_card(300 + i, 200 + i));
        }
    }

    #[test]
    fn budget_is_unstopped_minus_overcome_beneath() {
        let mut library = Library::with_canonical();
        let mut state = ready(three_crew(), RUINS);
        five_cheap_dilemmas(&mut library, &mut state);

        let (result, _) = attempt(&mut state, &library, RUINS, 1);
        assert_eq!(result, Ok(None));
        let encounter = state.dilemma_encounter.clone().unwrap();
        assert_eq!(encounter.draw_budget, 3);
        assert_eq!(encounter.selected.len(), 3);
        assert!(encounter.cost_spent <= encounter.cost_budget);
        assert_eq!(state.dilemma_pool.len(), 2);

        let mut library = Library::with_canonical();
        let mut state = ready(three_crew(), RUINS);
        five_cheap_dilemmas(&mut library, &mut state);
        state.missions[RUINS].dilemmas.push(DilemmaInstance {
            unique_id: 400,
            def_id: 200,
            overcome: true,
            faceup: true,
        });
        attempt(&mut state, &library, RUINS, 1).0.unwrap();
        let encounter = state.dilemma_encounter.clone().unwrap();
        assert_eq!(encounter.cost_budget, 2);
        assert_eq!(encounter.selected.len(), 2);
    }

    #[test]
    fn overpriced_candidate_returns_face_up() {
        let mut library = Library::with_canonical();
        let mut state = ready(three_crew(), RUINS);
        add_dilemma(&mut library, 200, 4, DilemmaLocation::Dual, None);
        add_dilemma(&mut library, 201, 1, DilemmaLocation::Dual, None);
        state.dilemma_pool = vec![pool_card(300, 200), pool_card(301, 201)];

        let (_, log) = attempt(&mut state, &library, RUINS, 3);
        let encounter = state.dilemma_encounter.clone().unwrap();
        assert_eq!(encounter.selected.len(), 1);
        assert_eq!(encounter.selected[0].unique_id, 301);
        assert_eq!(state.dilemma_pool.len(), 1);
        assert_eq!(state.dilemma_pool[0].unique_id, 300);
        assert!(state.dilemma_pool[0].faceup);
        assert!(log.iter().any(|p| matches!(
            p,
            LogPayload::DilemmasSelected { returned_to_pool, .. } if returned_to_pool == &vec![300]
        )));
    }

    #[test]
    fn exact_budget_card_is_selected_alone() {
        let mut library = Library::with_canonical();
        let mut state = ready(three_crew(), RUINS);
        add_dilemma(&mut library, 200, 3, DilemmaLocation::Dual, None);
        add_dilemma(&mut library, 201, 1, DilemmaLocation::Dual, None);
        state.dilemma_pool = vec![pool_card(300, 200), pool_card(301, 201), pool_card(302, 201)];

        attempt(&mut state, &library, RUINS, 3).0.unwrap();
        let encounter = state.dilemma_encounter.clone().unwrap();
        assert_eq!(encounter.selected.len(), 1);
        assert_eq!(encounter.selected[0].unique_id, 300);
        assert_eq!(encounter.cost_spent, 3);
        assert!(state.dilemma_pool.iter().all(|d| d.faceup));
    }

    #[test]
    fn planet_dilemmas_are_never_drawn_for_space() {
        let mut library = Library::with_canonical();
        let mut state = ready(three_crew(), SURVEY);
        add_dilemma(&mut library, 200, 1, DilemmaLocation::Planet, None);
        add_dilemma(&mut library, 201, 1, DilemmaLocation::Space, None);
        state.dilemma_pool = vec![
            pool_card(300, 200),
            pool_card(301, 200),
            pool_card(302, 201),
            pool_card(303, 200),
        ];
        let (_, log) = attempt(&mut state, &library, SURVEY, 5);
        let encounter = state.dilemma_encounter.clone().unwrap();
        assert_eq!(encounter.selected.len(), 1);
        assert_eq!(encounter.selected[0].def_id, 201);
        let mut left: Vec<_> = state.dilemma_pool.iter().map(|d| d.unique_id).collect();
        left.sort();
        assert_eq!(left, vec![300, 301, 303]);
        assert!(state.dilemma_pool.iter().all(|d| !d.faceup));
        // Only planet cards were left to search, so the pool was reshuffled.
        assert!(log
            .iter()
            .any(|p| matches!(p, LogPayload::PoolReshuffled { pool_size: 3 })));
    }

    #[test]
    fn reshuffles_when_no_face_down_applicable_card_remains() {
        let mut library = Library::with_canonical();
        let mut state = ready(three_crew(), RUINS);
        add_dilemma(&mut library, 200, 1, DilemmaLocation::Dual, None);
        add_dilemma(&mut library, 201, 1, DilemmaLocation::Space, None);
        state.dilemma_pool = vec![
            DilemmaInstance { faceup: true, ..pool_card(300, 200) },
            DilemmaInstance { faceup: true, ..pool_card(301, 200) },
            DilemmaInstance { faceup: true, ..pool_card(302, 201) },
        ];
        let (_, log) = attempt(&mut state, &library, RUINS, 8);
        let reshuffles = log
            .iter()
            .filter(|p| matches!(p, LogPayload::PoolReshuffled { .. }))
            .count();
        assert_eq!(reshuffles, 1);
        assert_eq!(state.dilemma_pool.len(), 1);
        assert!(!state.dilemma_pool[0].faceup);

        let mut state = ready(three_crew(), RUINS);
        state.dilemma_pool = (0..4).map(|i| pool_card(300 + i, 200)).collect();
        let (_, log) = attempt(&mut state, &library, RUINS, 8);
        assert!(!log.iter().any(|p| matches!(p, LogPayload::PoolReshuffled { .. })));
        assert_eq!(state.dilemma_pool.len(), 1);
    }

    #[test]
    fn inapplicable_face_up_cards_are_flipped_by_the_reshuffle() {
        let mut library = Library::with_canonical();
        let mut state = ready(planet_group(&[(101, CAPTAIN)]), RUINS);
        add_dilemma(&mut library, 201, 1, DilemmaLocation::Space, None);
        state.dilemma_pool = vec![DilemmaInstance {
            faceup: true,
            ..pool_card(300, 201)
        }];
        let (result, log) = attempt(&mut state, &library, RUINS, 8);
        assert!(result.is_ok());
        assert!(log
            .iter()
            .any(|p| matches!(p, LogPayload::PoolReshuffled { pool_size: 1 })));
        assert_eq!(state.dilemma_pool.len(), 1);
        assert!(!state.dilemma_pool[0].faceup);
    }

    #[test]
    fn duplicate_copy_is_auto_overcome() {
        let mut library = Library::with_canonical();
        let mut state = ready(three_crew(), RUINS);
        add_dilemma(&mut library, 200, 1, DilemmaLocation::Dual, None);
        state.dilemma_pool = vec![pool_card(300, 200), pool_card(301, 200)];

        attempt(&mut state, &library, RUINS, 2).0.unwrap();
        let (result, log) = step(&mut state, &library, 2);
        let result = result.unwrap().unwrap();
        assert!(!result.success);
        assert!(log
            .iter()
            .any(|p| matches!(p, LogPayload::DilemmaAutoOvercome { def_id: 200, .. })));
        let resolved = log
            .iter()
            .filter(|p| matches!(p, LogPayload::DilemmaResolved { .. }))
            .count();
        assert_eq!(resolved, 0);
        let beneath = &state.missions[RUINS].dilemmas;
        assert_eq!(beneath.len(), 2);
        assert!(beneath.iter().all(|d| d.overcome && d.faceup));
        assert!(state.dilemma_encounter.is_none());
    }

    #[test]
    fn overrun_places_remaining_dilemmas_beneath() {
        let mut library = Library::with_canonical();
        let stop_all = DilemmaRule::ChooseToStop {
            skills: vec![Skill::Medical],
            penalty: Penalty::StopAllReturnToPile,
        };
        add_dilemma(&mut library, 200, 1, DilemmaLocation::Dual, Some(stop_all.clone()));
        add_dilemma(&mut library, 201, 1, DilemmaLocation::Dual, Some(stop_all));
        let mut state = ready(planet_group(&[(101, CAPTAIN), (102, COUNSELOR)]), RUINS);
        state.dilemma_pool = vec![pool_card(300, 200), pool_card(301, 201)];

        attempt(&mut state, &library, RUINS, 4).0.unwrap();
        let first = state.dilemma_result.clone().unwrap();
        assert!(first.returns_to_pile);
        let (result, log) = step(&mut state, &library, 4);
        assert_eq!(result.unwrap().map(|r| r.success), Some(false));
        assert!(log
            .iter()
            .any(|p| matches!(p, LogPayload::EncounterOverrun { .. })));
        assert!(state.dilemma_encounter.is_none());
        assert!(state.dilemma_result.is_none());

        assert_eq!(state.dilemma_pool.len(), 1);
        assert_eq!(state.dilemma_pool[0].unique_id, first.dilemma_id);
        assert!(state.dilemma_pool[0].faceup && !state.dilemma_pool[0].overcome);
        let beneath = &state.missions[RUINS].dilemmas;
        assert_eq!(beneath.len(), 1);
        assert!(beneath[0].overcome && beneath[0].faceup);
        assert!(state.missions[RUINS].groups[0]
            .personnel
            .iter()
            .all(|p| p.status == PersonnelStatus::Stopped));
    }

    #[test]
    fn no_dilemmas_scores_immediately() {
        let library = Library::with_canonical();
        let mut state = ready(
            planet_group(&[
                (101, ARCHAEOLOGIST),
                (102, COUNSELOR),
                (103, CAPTAIN),
                (104, SECURITY_CHIEF),
            ]),
            RUINS,
        );
        let (result, log) = attempt(&mut state, &library, RUINS, 1);
        let result = result.unwrap().unwrap();
        assert!(result.success);
        assert_eq!(result.points, 30);
        assert_eq!(state.score, 30);
        assert_eq!(state.completed_planet_missions, 1);
        assert!(state.missions[RUINS].mission.completed);
        assert!(log.iter().any(|p| matches!(p, LogPayload::MissionScored { .. })));

        let (again, _) = attempt(&mut state, &library, RUINS, 1);
        assert_eq!(again, Err(EngineError::MissionCompleted(RUINS)));
    }

    #[test]
    fn failed_attempt_stops_the_whole_group() {
        let library = Library::with_canonical();
        let mut state = ready(three_crew(), RUINS);
        let result = attempt(&mut state, &library, RUINS, 1).0.unwrap().unwrap();
        assert!(!result.success);
        assert_eq!(state.missions[RUINS].groups[0].unstopped_count(), 0);
        assert!(!state.missions[RUINS].mission.completed);
    }

    #[test]
    fn parked_dilemma_returns_at_zero_cost() {
        let mut library = Library::with_canonical();
        add_dilemma(&mut library, 200, 3, DilemmaLocation::Dual, None);
        let mut state = ready(planet_group(&[(101, CAPTAIN)]), RUINS);
        state.missions[RUINS].dilemmas.push(DilemmaInstance {
            unique_id: 300,
            def_id: 200,
            overcome: false,
            faceup: true,
        });
        attempt(&mut state, &library, RUINS, 1).0.unwrap();
        let encounter = state.dilemma_encounter.clone().unwrap();
        assert_eq!(encounter.selected.len(), 1);
        assert_eq!(encounter.selected[0].unique_id, 300);
        assert_eq!(encounter.cost_spent, 0);
        assert!(state.missions[RUINS].dilemmas.is_empty());
    }

    #[test]
    fn selection_gates_advance() {
        let mut library = Library::with_canonical();
        let rule = DilemmaRule::ChooseToStop {
            skills: vec![Skill::Security],
            penalty: Penalty::RandomKill,
        };
        add_dilemma(&mut library, 200, 1, DilemmaLocation::Dual, Some(rule));
        let mut state = ready(three_crew(), RUINS);
        state.dilemma_pool = vec![pool_card(300, 200)];
        attempt(&mut state, &library, RUINS, 1).0.unwrap();

        assert_eq!(
            step(&mut state, &library, 1).0,
            Err(EngineError::SelectionRequired)
        );
        let mut log = Vec::new();
        assert_eq!(
            select_personnel(&mut state, 102, &mut log),
            Err(EngineError::IneligibleSelection(102))
        );
        select_personnel(&mut state, 103, &mut log).unwrap();
        let result = step(&mut state, &library, 1).0.unwrap().unwrap();
        assert!(!result.success);
        let beneath = &state.missions[RUINS].dilemmas;
        assert_eq!(beneath.len(), 1);
        assert!(beneath[0].overcome);
    }

    #[test]
    fn attempt_requires_matching_affiliation_and_active_crew() {
        use crate::library::registry::BAJORAN_LIAISON;
        let library = Library::with_canonical();
        let mut state = ready(planet_group(&[(101, BAJORAN_LIAISON)]), 3);
        assert_eq!(
            attempt(&mut state, &library, 3, 1).0,
            Err(EngineError::NoMatchingAffiliation)
        );

        let mut state = ready(planet_group(&[]), RUINS);
        assert_eq!(
            attempt(&mut state, &library, RUINS, 1).0,
            Err(EngineError::NoActivePersonnel)
        );

        let mut state = ready(three_crew(), RUINS);
        state.phase = TurnPhase::PlayAndDraw;
        assert!(matches!(
            attempt(&mut state, &library, RUINS, 1).0,
            Err(EngineError::WrongPhase { .. })
        ));
    }

    #[test]
    fn overrun_never_scores_a_mission_without_demands() {
        use crate::library::types::{Affiliation, MissionDef, MissionType, Quadrant};
        let mut library = Library::with_canonical();
        library.add_card(CardDef {
            id: 700,
            name: "Shore Leave".to_string(),
            kind: CardKind::Mission(MissionDef {
                mission_type: MissionType::Planet,
                quadrant: Quadrant::Alpha,
                range: 2,
                points: 40,
                headquarters: false,
                affiliations: vec![Affiliation::Federation],
                requirements: vec![Requirement::default()],
            }),
        });
        let stop_all = DilemmaRule::ChooseToStop {
            skills: vec![Skill::Acquisition],
            penalty: Penalty::StopAllReturnToPile,
        };
        add_dilemma(&mut library, 200, 1, DilemmaLocation::Dual, Some(stop_all));
        let mut state = ready(planet_group(&[(101, CAPTAIN)]), RUINS);
        state.missions[RUINS].mission.def_id = 700;
        state.dilemma_pool = vec![pool_card(300, 200)];

        attempt(&mut state, &library, RUINS, 1).0.unwrap();
        let result = step(&mut state, &library, 1).0.unwrap().unwrap();
        assert!(!result.success);
        assert_eq!(result.points, 0);
        assert_eq!(state.score, 0);
        assert!(!state.missions[RUINS].mission.completed);
    }

    #[test]
    fn killed_personnel_leave_the_group_for_the_discard_pile() {
        use crate::library::types::Attribute;
        let mut library = Library::with_canonical();
        let lethal = DilemmaRule::UnlessCheck {
            requirements: vec![Requirement::default().with_attribute(Attribute::Strength, 1000)],
            penalty: Penalty::RandomKill,
        };
        add_dilemma(&mut library, 200, 1, DilemmaLocation::Dual, Some(lethal));
        add_dilemma(
            &mut library,
            201,
            1,
            DilemmaLocation::Dual,
            Some(DilemmaRule::CrewLimit { keep_count: 1 }),
        );
        let mut state = ready(three_crew(), RUINS);
        state.dilemma_encounter = Some(DilemmaEncounter {
            mission_index: RUINS,
            group_index: 0,
            selected: vec![pool_card(300, 200), pool_card(301, 201)],
            cursor: 0,
            draw_budget: 3,
            cost_budget: 3,
            cost_spent: 2,
            faced_ids: BTreeSet::new(),
        });
        let mut shuffle = Shuffle::seeded(6);
        let mut log = Vec::new();
        let mut ctx = ActionContext {
            library: &library,
            resolver: &Unmodified,
            shuffle: &mut shuffle,
            log: &mut log,
        };
        resolve_current(&mut state, &mut ctx).unwrap();
        let killed = state.dilemma_result.clone().unwrap().killed_ids;
        assert_eq!(killed.len(), 1);
        let victim = killed[0];

        assert_eq!(step(&mut state, &library, 6).0, Ok(None));
        let group = &state.missions[RUINS].groups[0];
        assert_eq!(group.personnel.len(), 2);
        assert!(group.position_of(victim).is_none());
        assert!(state.discard.iter().any(|c| c.unique_id == victim));

        // The next dilemma only sees the two survivors.
        let next = state.dilemma_result.clone().unwrap();
        assert_eq!(next.def_id, 201);
        assert_eq!(next.stopped_ids.len(), 1);
        assert!(!next.stopped_ids.contains(&victim));
    }
}
