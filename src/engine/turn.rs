//! Turn phase state machine: PlayAndDraw → ExecuteOrders → DiscardExcess → new turn.

use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;

use super::game_state::{GameState, PersonnelStatus};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::library::Library;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub enum TurnPhase {
    PlayAndDraw,
    ExecuteOrders,
    DiscardExcess,
}

impl TurnPhase {
    pub fn next(&self) -> Self {
        match self {
            TurnPhase::PlayAndDraw => TurnPhase::ExecuteOrders,
            TurnPhase::ExecuteOrders => TurnPhase::DiscardExcess,
            TurnPhase::DiscardExcess => TurnPhase::PlayAndDraw,
        }
    }
}

/// Result of a successful `advance`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseChange {
    pub from: TurnPhase,
    pub to: TurnPhase,
    /// Set when the change started a new turn.
    pub new_turn: Option<u32>,
}

pub fn require_phase(
    state: &GameState,
    expected: TurnPhase,
    action: &'static str,
) -> Result<(), EngineError> {
    if state.phase == expected {
        Ok(())
    } else {
        Err(EngineError::WrongPhase {
            action,
            phase: state.phase,
        })
    }
}

/// Guard for leaving the current phase.
pub fn can_leave(state: &GameState, config: &EngineConfig) -> Result<(), EngineError> {
    match state.phase {
        TurnPhase::PlayAndDraw => {
            if state.counters == 0 || state.deck.is_empty() {
                Ok(())
            } else {
                Err(EngineError::CountersRemaining(state.counters))
            }
        }
        TurnPhase::ExecuteOrders => {
            if state.dilemma_encounter.is_some() {
                Err(EngineError::EncounterActive)
            } else {
                Ok(())
            }
        }
        TurnPhase::DiscardExcess => {
            if state.hand.len() <= config.hand_limit {
                Ok(())
            } else {
                Err(EngineError::HandOverLimit {
                    hand: state.hand.len(),
                    limit: config.hand_limit,
                })
            }
        }
    }
}

pub fn advance(
    state: &mut GameState,
    config: &EngineConfig,
    library: &Library,
) -> Result<PhaseChange, EngineError> {
    can_leave(state, config)?;
    let from = state.phase;
    let to = from.next();
    let new_turn = if from == TurnPhase::DiscardExcess {
        new_turn(state, config, library);
        Some(state.turn)
    } else {
        state.phase = to;
        None
    };
    Ok(PhaseChange { from, to, new_turn })
}

/// Reset per-turn counters, ship range and stopped personnel.
pub fn new_turn(state: &mut GameState, config: &EngineConfig, library: &Library) {
    state.turn += 1;
    state.phase = TurnPhase::PlayAndDraw;
    state.counters = config.counters_per_turn;
    for deployment in &mut state.missions {
        for group in &mut deployment.groups {
            if let Some(ship) = group.ship.as_mut() {
                if let Some(def) = library.get(ship.def_id).and_then(|c| c.as_ship()) {
                    ship.range_remaining = def.range;
                }
            }
            for person in &mut group.personnel {
                person.status = PersonnelStatus::Unstopped;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::game_state::tests::{sample_state, ship_group};
    use crate::engine::game_state::CardInstance;
    use crate::library::registry::USS_HORIZON;

    #[test]
    fn play_and_draw_needs_counters_spent_or_empty_deck() {
        let library = Library::with_canonical();
        let config = EngineConfig::default();
        let mut state = sample_state();
        state.counters = 2;
        state.deck = vec![CardInstance {
            unique_id: 999,
            def_id: 10,
        }];
        assert_eq!(
            advance(&mut state, &config, &library),
            Err(EngineError::CountersRemaining(2))
        );
        state.deck.clear();
        let change = advance(&mut state, &config, &library).unwrap();
        assert_eq!(change.to, TurnPhase::ExecuteOrders);
        assert_eq!(change.new_turn, None);
    }

    #[test]
    fn discard_excess_enforces_hand_limit() {
        let library = Library::with_canonical();
        let config = EngineConfig::default();
        let mut state = sample_state();
        state.phase = TurnPhase::DiscardExcess;
        state.hand = (0..8)
            .map(|i| CardInstance {
                unique_id: 500 + i,
                def_id: 10,
            })
            .collect();
        assert!(matches!(
            advance(&mut state, &config, &library),
            Err(EngineError::HandOverLimit { hand: 8, limit: 7 })
        ));
        state.hand.pop();
        let change = advance(&mut state, &config, &library).unwrap();
        assert_eq!(change.to, TurnPhase::PlayAndDraw);
        assert_eq!(change.new_turn, Some(2));
    }

    #[test]
    fn new_turn_resets_range_counters_and_stops() {
        let library = Library::with_canonical();
        let config = EngineConfig::default();
        let mut state = sample_state();
        let mut group = ship_group(USS_HORIZON, &[(101, 10), (102, 12)]);
        group.ship.as_mut().unwrap().range_remaining = 1;
        group.personnel[0].status = PersonnelStatus::Stopped;
        state.missions[0].groups.push(group);
        state.counters = 0;

        new_turn(&mut state, &config, &library);

        let group = &state.missions[0].groups[1];
        assert_eq!(group.ship.as_ref().unwrap().range_remaining, 8);
        assert!(group
            .personnel
            .iter()
            .all(|p| p.status == PersonnelStatus::Unstopped));
        assert_eq!(state.counters, 7);
        assert_eq!(state.phase, TurnPhase::PlayAndDraw);
    }
}
