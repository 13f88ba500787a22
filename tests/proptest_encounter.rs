// Property-based checks of dilemma selection: budgets, location filtering and
// conservation of pool cards.
use std::collections::BTreeSet;

use away_mission::engine::encounter::{begin_attempt, budget};
use away_mission::engine::game_state::{
    DilemmaInstance, GameState, Group, MissionDeployment, MissionInstance, PersonnelInstance,
    PersonnelStatus,
};
use away_mission::engine::modifiers::Unmodified;
use away_mission::engine::shuffle::Shuffle;
use away_mission::engine::turn::TurnPhase;
use away_mission::engine::{ActionContext, LogPayload};
use away_mission::library::registry::{CAPTAIN, EXCAVATE_RUINS, SURVEY_NEBULA};
use away_mission::library::types::{
    CardDef, CardKind, DilemmaDef, DilemmaLocation, DilemmaRule, MissionType, Penalty, Requirement,
};
use away_mission::library::Library;
use proptest::prelude::*;

const FIRST_DEF: u64 = 500;

fn location(code: u8) -> DilemmaLocation {
    match code % 3 {
        0 => DilemmaLocation::Planet,
        1 => DilemmaLocation::Space,
        _ => DilemmaLocation::Dual,
    }
}

/// One definition per generated pool card, each overcome without effect.
fn library_for(pool: &[(u32, u8, bool)]) -> Library {
    let mut library = Library::with_canonical();
    for (i, (cost, loc, _)) in pool.iter().enumerate() {
        library.add_card(CardDef {
            id: FIRST_DEF + i as u64,
            name: format!("Generated {}", i),
            kind: CardKind::Dilemma(DilemmaDef {
                cost: *cost,
                location: location(*loc),
                rule: DilemmaRule::UnlessCheck {
                    requirements: vec![Requirement::default()],
                    penalty: Penalty::RandomKill,
                },
            }),
        });
    }
    library
}

fn state_for(
    pool: &[(u32, u8, bool)],
    mission_def: u64,
    crew: usize,
    overcome_beneath: usize,
) -> GameState {
    let mut deployment = MissionDeployment::new(MissionInstance {
        unique_id: 1,
        def_id: mission_def,
        completed: false,
    });
    deployment.groups[0] = Group {
        ship: None,
        personnel: (0..crew)
            .map(|i| PersonnelInstance {
                unique_id: 100 + i as u64,
                def_id: CAPTAIN,
                status: PersonnelStatus::Unstopped,
            })
            .collect(),
    };
    deployment.dilemmas = (0..overcome_beneath)
        .map(|i| DilemmaInstance {
            unique_id: 5000 + i as u64,
            def_id: FIRST_DEF,
            overcome: true,
            faceup: true,
        })
        .collect();
    GameState {
        turn: 1,
        phase: TurnPhase::ExecuteOrders,
        missions: vec![deployment],
        dilemma_pool: pool
            .iter()
            .enumerate()
            .map(|(i, (_, _, faceup))| DilemmaInstance {
                unique_id: 1000 + i as u64,
                def_id: FIRST_DEF + i as u64,
                overcome: false,
                faceup: *faceup,
            })
            .collect(),
        next_unique_id: 10_000,
        ..GameState::default()
    }
}

proptest! {
    #[test]
    fn proptest_selection_respects_budget_and_location(
        pool in prop::collection::vec((0u32..5, 0u8..3, any::<bool>()), 0..15),
        crew in 1usize..7,
        overcome_beneath in 0usize..4,
        space in any::<bool>(),
        seed in any::<u64>(),
    ) {
        let (mission_def, mission_type) = if space {
            (SURVEY_NEBULA, MissionType::Space)
        } else {
            (EXCAVATE_RUINS, MissionType::Planet)
        };
        let library = library_for(&pool);
        let mut state = state_for(&pool, mission_def, crew, overcome_beneath);
        let before: BTreeSet<u64> = state.dilemma_pool.iter().map(|d| d.unique_id).collect();

        let mut shuffle = Shuffle::seeded(seed);
        let mut log = Vec::new();
        let mut ctx = ActionContext {
            library: &library,
            resolver: &Unmodified,
            shuffle: &mut shuffle,
            log: &mut log,
        };
        begin_attempt(&mut state, 0, 0, &mut ctx).expect("attempt accepted");

        let expected_budget = budget(crew, overcome_beneath);
        prop_assert_eq!(expected_budget as usize, crew.saturating_sub(overcome_beneath));

        let selected: Vec<DilemmaInstance> = state
            .dilemma_encounter
            .as_ref()
            .map(|e| e.selected.clone())
            .unwrap_or_default();
        if let Some(encounter) = &state.dilemma_encounter {
            prop_assert_eq!(encounter.draw_budget, expected_budget);
            prop_assert_eq!(encounter.cost_budget, expected_budget);
            let total: u32 = selected
                .iter()
                .map(|d| pool[(d.def_id - FIRST_DEF) as usize].0)
                .sum();
            prop_assert_eq!(total, encounter.cost_spent);
            prop_assert!(total <= encounter.cost_budget);
        }
        prop_assert!(selected.len() as u32 <= expected_budget);
        for card in &selected {
            let def = library.get(card.def_id).and_then(|c| c.as_dilemma()).expect("dilemma");
            prop_assert!(def.location.applies_to(mission_type));
        }

        // Every original pool card is in exactly one place.
        let mut seen = BTreeSet::new();
        let pool_ids = state.dilemma_pool.iter().map(|d| d.unique_id);
        let beneath_ids = state.missions[0].dilemmas.iter().map(|d| d.unique_id);
        for id in pool_ids.chain(selected.iter().map(|d| d.unique_id)).chain(beneath_ids) {
            prop_assert!(seen.insert(id), "card {} is in two places", id);
        }
        let original: BTreeSet<u64> = seen.into_iter().filter(|id| *id < 5000).collect();
        prop_assert_eq!(original, before);
    }

    #[test]
    fn proptest_reshuffle_exactly_when_face_down_candidates_run_short(
        pool in prop::collection::vec((1u32..3, 0u8..3, any::<bool>()), 1..12),
        seed in any::<u64>(),
    ) {
        const CREW: usize = 6;
        let library = library_for(&pool);
        let mut state = state_for(&pool, EXCAVATE_RUINS, CREW, 0);
        let face_down_applicable = state.dilemma_pool.iter().filter(|d| {
            !d.faceup
                && library
                    .get(d.def_id)
                    .and_then(|c| c.as_dilemma())
                    .is_some_and(|def| def.location.applies_to(MissionType::Planet))
        }).count();

        let mut shuffle = Shuffle::seeded(seed);
        let mut log = Vec::new();
        let mut ctx = ActionContext {
            library: &library,
            resolver: &Unmodified,
            shuffle: &mut shuffle,
            log: &mut log,
        };
        begin_attempt(&mut state, 0, 0, &mut ctx).expect("attempt accepted");

        let reshuffles = log
            .iter()
            .filter(|p| matches!(p, LogPayload::PoolReshuffled { .. }))
            .count();
        prop_assert!(reshuffles <= 1);
        prop_assert_eq!(reshuffles == 1, face_down_applicable < budget(CREW, 0) as usize);

        if reshuffles == 1 {
            // Only cards skipped for cost come back face up after a reshuffle.
            let returned: BTreeSet<u64> = log
                .iter()
                .find_map(|p| match p {
                    LogPayload::DilemmasSelected { returned_to_pool, .. } => {
                        Some(returned_to_pool.iter().copied().collect())
                    }
                    _ => None,
                })
                .unwrap_or_default();
            for card in state.dilemma_pool.iter().filter(|d| d.faceup) {
                prop_assert!(returned.contains(&card.unique_id));
            }
        }
    }
}
