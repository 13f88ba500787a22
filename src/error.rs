use thiserror::Error;

use crate::engine::game_state::UniqueId;
use crate::engine::turn::TurnPhase;
use crate::library::types::{Affiliation, CardDefId};

/// Every reason the engine can reject an action. A rejection never mutates state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("no game has been set up")]
    GameNotStarted,
    #[error("a game is already in progress")]
    GameInProgress,
    #[error("the game is over")]
    GameOver,
    #[error("invalid setup: {0}")]
    InvalidSetup(String),
    #[error("card definition rejected: {0}")]
    InvalidDefinition(String),

    #[error("{action} is not legal during {phase:?}")]
    WrongPhase {
        action: &'static str,
        phase: TurnPhase,
    },
    #[error("the counters for this turn are not exhausted ({0} left)")]
    CountersRemaining(u32),
    #[error("hand holds {hand} cards, the limit is {limit}")]
    HandOverLimit { hand: usize, limit: usize },
    #[error("not enough counters: need {needed}, have {available}")]
    InsufficientCounters { needed: u32, available: u32 },

    #[error("draw count must be at least 1")]
    InvalidDrawCount,
    #[error("draw deck holds {available} cards, cannot draw {requested}")]
    DeckTooSmall { requested: u32, available: usize },

    #[error("unknown card definition {0}")]
    UnknownCardDefinition(CardDefId),
    #[error("card {0} is not in hand")]
    CardNotInHand(UniqueId),
    #[error("mission {0} does not exist")]
    UnknownMission(usize),
    #[error("group {group} does not exist at mission {mission}")]
    UnknownGroup { mission: usize, group: usize },
    #[error("personnel {0} is not in that group")]
    UnknownPersonnel(UniqueId),

    #[error("{0} cards cannot be deployed")]
    NotDeployable(&'static str),
    #[error("mission {mission} does not accept {affiliation:?} cards")]
    AffiliationMismatch {
        mission: usize,
        affiliation: Affiliation,
    },

    #[error("group {0} is not a ship group")]
    NotAShipGroup(usize),
    #[error("ship is not staffed: {0}")]
    NotStaffed(String),
    #[error("not enough range: need {needed}, have {remaining}")]
    InsufficientRange { needed: u32, remaining: u32 },
    #[error("source and destination are the same mission")]
    SameMission,
    #[error("personnel {0} is stopped")]
    PersonnelStopped(UniqueId),
    #[error("mission {0} has no planet surface")]
    NoPlanetSurface(usize),

    #[error("mission {0} is already completed")]
    MissionCompleted(usize),
    #[error("the attacking group has no unstopped personnel")]
    NoActivePersonnel,
    #[error("no unstopped personnel shares an affiliation with the mission")]
    NoMatchingAffiliation,
    #[error("a dilemma encounter is in progress")]
    EncounterActive,
    #[error("no dilemma encounter is in progress")]
    NoEncounter,
    #[error("the pending dilemma needs a personnel selection first")]
    SelectionRequired,
    #[error("the pending dilemma does not take a selection")]
    SelectionNotRequired,
    #[error("personnel {0} is not a legal choice for this dilemma")]
    IneligibleSelection(UniqueId),
}

impl EngineError {
    /// Errors naming something that does not exist (HTTP 404 rather than 400).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::UnknownCardDefinition(_)
                | EngineError::CardNotInHand(_)
                | EngineError::UnknownMission(_)
                | EngineError::UnknownGroup { .. }
                | EngineError::UnknownPersonnel(_)
        )
    }
}
