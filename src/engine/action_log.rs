//! Append-only record of everything that happened to the game.
//!
//! Entries are domain data, not diagnostics: they carry typed payloads and
//! are exposed read-only through `GET /actions/log`.

use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;

use super::dilemma::DilemmaOutcome;
use super::game_state::UniqueId;
use super::turn::TurnPhase;
use crate::library::types::CardDefId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", tag = "type")]
pub enum LogPayload {
    GameSetUp {
        missions: Vec<CardDefId>,
        pool_size: usize,
        deck_size: usize,
        hand: Vec<UniqueId>,
    },
    CardsDrawn {
        unique_ids: Vec<UniqueId>,
        counters_left: u32,
    },
    CardDeployed {
        unique_id: UniqueId,
        def_id: CardDefId,
        mission_index: usize,
        group_index: Option<usize>,
        cost: u32,
    },
    PhaseAdvanced {
        from: TurnPhase,
        to: TurnPhase,
    },
    NewTurn {
        turn: u32,
    },
    ShipMoved {
        source: usize,
        group_index: usize,
        destination: usize,
        new_group_index: usize,
        cost: u32,
    },
    Beamed {
        mission_index: usize,
        personnel_id: UniqueId,
        from_group: usize,
        to_group: usize,
    },
    MissionAttempted {
        mission_index: usize,
        group_index: usize,
        draw_budget: u32,
        cost_budget: u32,
    },
    PoolReshuffled {
        pool_size: usize,
    },
    DilemmasSelected {
        selected: Vec<UniqueId>,
        returned_to_pool: Vec<UniqueId>,
        cost_spent: u32,
    },
    DilemmaResolved {
        outcome: DilemmaOutcome,
    },
    PersonnelSelected {
        dilemma_id: UniqueId,
        personnel_id: UniqueId,
    },
    DilemmaAutoOvercome {
        unique_id: UniqueId,
        def_id: CardDefId,
    },
    EncounterOverrun {
        placed_beneath: Vec<UniqueId>,
    },
    MissionScored {
        mission_index: usize,
        points: u32,
        score: u32,
    },
    MissionFailed {
        mission_index: usize,
    },
    CardDiscarded {
        unique_id: UniqueId,
        def_id: CardDefId,
    },
    SeedSet {
        seed: u64,
    },
    GameOver {
        victory: bool,
        score: u32,
    },
}

impl LogPayload {
    /// The name stored in `ActionEntry::action_type`, used for filtering.
    pub fn action_type(&self) -> &'static str {
        match self {
            LogPayload::GameSetUp { .. } => "GameSetUp",
            LogPayload::CardsDrawn { .. } => "CardsDrawn",
            LogPayload::CardDeployed { .. } => "CardDeployed",
            LogPayload::PhaseAdvanced { .. } => "PhaseAdvanced",
            LogPayload::NewTurn { .. } => "NewTurn",
            LogPayload::ShipMoved { .. } => "ShipMoved",
            LogPayload::Beamed { .. } => "Beamed",
            LogPayload::MissionAttempted { .. } => "MissionAttempted",
            LogPayload::PoolReshuffled { .. } => "PoolReshuffled",
            LogPayload::DilemmasSelected { .. } => "DilemmasSelected",
            LogPayload::DilemmaResolved { .. } => "DilemmaResolved",
            LogPayload::PersonnelSelected { .. } => "PersonnelSelected",
            LogPayload::DilemmaAutoOvercome { .. } => "DilemmaAutoOvercome",
            LogPayload::EncounterOverrun { .. } => "EncounterOverrun",
            LogPayload::MissionScored { .. } => "MissionScored",
            LogPayload::MissionFailed { .. } => "MissionFailed",
            LogPayload::CardDiscarded { .. } => "CardDiscarded",
            LogPayload::SeedSet { .. } => "SeedSet",
            LogPayload::GameOver { .. } => "GameOver",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct ActionEntry {
    pub seq: u64,
    pub action_type: String,
    pub payload: LogPayload,
    /// Milliseconds since the Unix epoch.
    pub timestamp: String,
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ActionLog {
    entries: Vec<ActionEntry>,
    seq: u64,
}

impl ActionLog {
    pub fn new() -> Self {
        ActionLog::default()
    }

    /// Append an entry with the next sequence number.
    pub fn append(&mut self, payload: LogPayload, request_id: Option<String>) -> ActionEntry {
        self.seq += 1;
        let timestamp = match std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH) {
            Ok(dur) => format!("{}", dur.as_millis()),
            Err(_) => "0".to_string(),
        };
        let entry = ActionEntry {
            seq: self.seq,
            action_type: payload.action_type().to_string(),
            payload,
            timestamp,
            request_id,
        };
        self.entries.push(entry.clone());
        entry
    }

    /// Append a batch produced by one action; all share the correlation id.
    pub fn append_all(
        &mut self,
        payloads: Vec<LogPayload>,
        request_id: Option<&str>,
    ) -> Vec<ActionEntry> {
        payloads
            .into_iter()
            .map(|p| self.append(p, request_id.map(str::to_string)))
            .collect()
    }

    pub fn entries(&self) -> &[ActionEntry] {
        &self.entries
    }

    pub fn last_seq(&self) -> u64 {
        self.seq
    }
}
