//! Engine-to-client notifications, kept in a sequenced outbox that clients
//! poll through `GET /events?from_seq`.
//!
//! Only the most recent `EVENT_RETENTION` events are kept. A client that falls
//! further behind resynchronises from `GET /game/state`.

use std::collections::VecDeque;

use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;

use super::action_log::ActionEntry;
use super::game_state::GameState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameEvent {
    StateSync {
        state: Box<GameState>,
    },
    StateUpdate {
        correlation_id: Option<String>,
        state: Box<GameState>,
        entries: Vec<ActionEntry>,
    },
    ActionRejected {
        correlation_id: Option<String>,
        reason: String,
    },
    GameOver {
        victory: bool,
        score: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct SequencedEvent {
    pub seq: u64,
    pub event: GameEvent,
}

/// Events kept in the outbox; older ones are dropped as new ones arrive.
pub const EVENT_RETENTION: usize = 256;

#[derive(Debug, Clone)]
pub struct EventOutbox {
    events: VecDeque<SequencedEvent>,
    seq: u64,
    retention: usize,
}

impl Default for EventOutbox {
    fn default() -> Self {
        EventOutbox::with_retention(EVENT_RETENTION)
    }
}

impl EventOutbox {
    pub fn with_retention(retention: usize) -> Self {
        EventOutbox {
            events: VecDeque::new(),
            seq: 0,
            retention: retention.max(1),
        }
    }

    pub fn push(&mut self, event: GameEvent) -> u64 {
        self.seq += 1;
        self.events.push_back(SequencedEvent {
            seq: self.seq,
            event,
        });
        while self.events.len() > self.retention {
            self.events.pop_front();
        }
        self.seq
    }

    /// Lowest sequence number still held, if any.
    pub fn first_seq(&self) -> Option<u64> {
        self.events.front().map(|e| e.seq)
    }

    /// Events with `seq >= from_seq`, oldest first.
    pub fn since(&self, from_seq: u64) -> Vec<SequencedEvent> {
        self.events
            .iter()
            .filter(|e| e.seq >= from_seq)
            .cloned()
            .collect()
    }

    pub fn last_seq(&self) -> u64 {
        self.seq
    }
}
