//! The game engine: one owner of `GameState`, processing one action at a time.
//!
//! `GameEngine::process` is the only mutating entry point. It runs the action
//! against a working copy of the state and commits the copy, the log entries
//! and the outgoing events only when the action succeeds, so a rejection
//! leaves the game exactly as it was.

pub mod action_log;
pub mod dilemma;
pub mod encounter;
mod endpoints;
pub mod events;
pub mod game_state;
pub mod modifiers;
pub mod movement;
pub mod play;
pub mod requirements;
pub mod shuffle;
pub mod turn;

pub use action_log::{ActionEntry, ActionLog, LogPayload};
pub use endpoints::{
    get_events, get_game_state, okapi_add_operation_for_get_events_,
    okapi_add_operation_for_get_game_state_,
};

use std::sync::Arc;

use crate::action::{ActionRequest, ActionResult, PlayerActions};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::library::types::{CardDef, CardDefId};
use crate::library::{validate_card, Library};
use encounter::MissionResult;
use events::{EventOutbox, GameEvent};
use game_state::{GameOutcome, GameState};
use modifiers::{ModifierResolver, Unmodified};
use shuffle::Shuffle;

/// Engine handle shared with the HTTP layer.
pub type SharedEngine = Arc<rocket::futures::lock::Mutex<GameEngine>>;

/// Collaborators a rule step needs besides the state it mutates.
pub struct ActionContext<'a> {
    pub library: &'a Library,
    pub resolver: &'a dyn ModifierResolver,
    pub shuffle: &'a mut Shuffle,
    pub log: &'a mut Vec<LogPayload>,
}

#[derive(Debug)]
pub struct GameEngine {
    state: GameState,
    library: Library,
    log: ActionLog,
    shuffle: Shuffle,
    resolver: Box<dyn ModifierResolver>,
    config: EngineConfig,
    events: EventOutbox,
}

impl GameEngine {
    /// Engine over the canonical card set.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_library(config, Library::with_canonical())
    }

    pub fn with_library(config: EngineConfig, library: Library) -> Self {
        let mut engine = GameEngine {
            state: GameState::default(),
            library,
            log: ActionLog::new(),
            shuffle: Shuffle::from_config(config.shuffle),
            resolver: Box::new(Unmodified),
            config,
            events: EventOutbox::default(),
        };
        engine.sync();
        engine
    }

    pub fn with_resolver(mut self, resolver: Box<dyn ModifierResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn shared(self) -> SharedEngine {
        Arc::new(rocket::futures::lock::Mutex::new(self))
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn snapshot(&self) -> GameState {
        self.state.clone()
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn log(&self) -> &ActionLog {
        &self.log
    }

    pub fn events(&self) -> &EventOutbox {
        &self.events
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Publish a full `STATE_SYNC`.
    pub fn sync(&mut self) -> u64 {
        self.events.push(GameEvent::StateSync {
            state: Box::new(self.state.clone()),
        })
    }

    /// Replace the randomness source.
    pub fn configure_shuffle(&mut self, shuffle: Shuffle) {
        tracing::info!("shuffle source set to {}", shuffle.source());
        self.shuffle = shuffle;
    }

    /// Switch to a seeded shuffle and record the seed for replay.
    pub fn set_seed(&mut self, seed: u64) -> ActionEntry {
        self.configure_shuffle(Shuffle::seeded(seed));
        self.log.append(LogPayload::SeedSet { seed }, None)
    }

    /// Add a card definition after checking that its rules can resolve.
    pub fn register_card(&mut self, card: CardDef) -> Result<CardDefId, EngineError> {
        validate_card(&card).map_err(EngineError::InvalidDefinition)?;
        Ok(self.library.add_card(card))
    }

    /// Run one action. On success the state, log and outbox are updated and
    /// the new log entries are returned; on failure nothing but the
    /// `ACTION_REJECTED` event changes, and the shuffle is rewound to where it
    /// stood before the action.
    pub fn process(&mut self, request: ActionRequest) -> Result<Vec<ActionEntry>, EngineError> {
        let ActionRequest {
            correlation_id,
            action,
        } = request;
        let name = action.name();
        let mut working = self.state.clone();
        let checkpoint = self.shuffle.clone();
        let mut payloads = Vec::new();

        match self.dispatch(&mut working, action, &mut payloads) {
            Ok(()) => {
                self.state = working;
                let entries = self.log.append_all(payloads, correlation_id.as_deref());
                tracing::debug!("{} accepted, {} log entries", name, entries.len());
                self.events.push(GameEvent::StateUpdate {
                    correlation_id,
                    state: Box::new(self.state.clone()),
                    entries: entries.clone(),
                });
                if let Some(outcome) = entries.iter().find_map(|e| match e.payload {
                    LogPayload::GameOver { victory, score } => Some(GameOutcome { victory, score }),
                    _ => None,
                }) {
                    self.events.push(GameEvent::GameOver {
                        victory: outcome.victory,
                        score: outcome.score,
                    });
                }
                Ok(entries)
            }
            Err(e) => {
                self.shuffle = checkpoint;
                tracing::warn!("{} rejected: {}", name, e);
                self.events.push(GameEvent::ActionRejected {
                    correlation_id,
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// `process`, folded into the protocol reply.
    pub fn apply(&mut self, request: ActionRequest) -> ActionResult {
        match self.process(request) {
            Ok(new_entries) => ActionResult::accepted(self.snapshot(), new_entries),
            Err(e) => ActionResult::rejected(&e),
        }
    }

    fn dispatch(
        &mut self,
        state: &mut GameState,
        action: PlayerActions,
        payloads: &mut Vec<LogPayload>,
    ) -> Result<(), EngineError> {
        let mut ctx = ActionContext {
            library: &self.library,
            resolver: self.resolver.as_ref(),
            shuffle: &mut self.shuffle,
            log: payloads,
        };

        if let PlayerActions::SetupGame { deck } = &action {
            return play::setup_game(state, deck, &self.config, &mut ctx);
        }
        if !state.is_set_up() {
            return Err(EngineError::GameNotStarted);
        }
        if state.game_over.is_some() {
            return Err(EngineError::GameOver);
        }
        if state.dilemma_encounter.is_some() && !action.continues_encounter() {
            return Err(EngineError::EncounterActive);
        }

        let scored = match action {
            PlayerActions::SetupGame { .. } => None,
            PlayerActions::Draw { count } => {
                play::draw(state, count, ctx.log)?;
                None
            }
            PlayerActions::Deploy {
                card_id,
                mission_index,
            } => {
                play::deploy(state, card_id, mission_index, &mut ctx)?;
                None
            }
            PlayerActions::NextPhase => {
                next_phase(state, &self.config, &mut ctx)?;
                None
            }
            PlayerActions::MoveShip {
                source,
                group_index,
                destination,
            } => {
                play::move_ship(state, source, group_index, destination, &mut ctx)?;
                None
            }
            PlayerActions::BeamToShip {
                mission_index,
                personnel_id,
                group_index,
            } => {
                play::beam_to_ship(state, mission_index, personnel_id, group_index, ctx.log)?;
                None
            }
            PlayerActions::BeamToPlanet {
                mission_index,
                group_index,
                personnel_id,
            } => {
                play::beam_to_planet(state, mission_index, group_index, personnel_id, &mut ctx)?;
                None
            }
            PlayerActions::AttemptMission {
                mission_index,
                group_index,
            } => encounter::begin_attempt(state, mission_index, group_index, &mut ctx)?,
            PlayerActions::SelectPersonnelForDilemma { personnel_id } => {
                encounter::select_personnel(state, personnel_id, ctx.log)?;
                None
            }
            PlayerActions::AdvanceDilemma => encounter::advance(state, &mut ctx)?,
            PlayerActions::DiscardCard { card_id } => {
                play::discard(state, card_id, ctx.log)?;
                None
            }
        };

        if let Some(result) = scored {
            check_victory(state, &self.config, result, ctx.log);
        }
        Ok(())
    }
}

/// `NEXT_PHASE`, including defeat when a turn ends with an empty deck.
fn next_phase(
    state: &mut GameState,
    config: &EngineConfig,
    ctx: &mut ActionContext<'_>,
) -> Result<(), EngineError> {
    let change = turn::advance(state, config, ctx.library)?;
    tracing::info!("phase {:?} -> {:?}", change.from, change.to);
    ctx.log.push(LogPayload::PhaseAdvanced {
        from: change.from,
        to: change.to,
    });
    if let Some(turn) = change.new_turn {
        ctx.log.push(LogPayload::NewTurn { turn });
        if state.deck.is_empty() {
            end_game(state, false, ctx.log);
        }
    }
    Ok(())
}

fn check_victory(
    state: &mut GameState,
    config: &EngineConfig,
    result: MissionResult,
    log: &mut Vec<LogPayload>,
) {
    if result.success
        && state.score >= config.winning_score
        && state.completed_planet_missions > 0
        && state.completed_space_missions > 0
    {
        end_game(state, true, log);
    }
}

fn end_game(state: &mut GameState, victory: bool, log: &mut Vec<LogPayload>) {
    tracing::info!("game over: victory={} score={}", victory, state.score);
    state.game_over = Some(GameOutcome {
        victory,
        score: state.score,
    });
    log.push(LogPayload::GameOver {
        victory,
        score: state.score,
    });
}
