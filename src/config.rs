//! Rule constants and the randomness source, overridable from the environment.

use std::str::FromStr;

use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;

/// Which generator backs the engine's shuffle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub enum ShuffleConfig {
    /// OS-seeded cryptographically strong generator.
    Secure,
    /// Reproducible generator for replays and tests.
    Seeded(u64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct EngineConfig {
    pub counters_per_turn: u32,
    pub hand_limit: usize,
    pub starting_hand: usize,
    pub mission_count: usize,
    pub winning_score: u32,
    pub shuffle: ShuffleConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            counters_per_turn: 7,
            hand_limit: 7,
            starting_hand: 7,
            mission_count: 5,
            winning_score: 100,
            shuffle: ShuffleConfig::Secure,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `AWAY_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = EngineConfig::default();
        let shuffle = match parse_var::<u64, _>(&lookup, "AWAY_SEED") {
            Some(seed) => ShuffleConfig::Seeded(seed),
            None => defaults.shuffle,
        };
        EngineConfig {
            counters_per_turn: parse_var(&lookup, "AWAY_COUNTERS_PER_TURN")
                .unwrap_or(defaults.counters_per_turn),
            hand_limit: parse_var(&lookup, "AWAY_HAND_LIMIT").unwrap_or(defaults.hand_limit),
            starting_hand: parse_var(&lookup, "AWAY_STARTING_HAND")
                .unwrap_or(defaults.starting_hand),
            mission_count: defaults.mission_count,
            winning_score: parse_var(&lookup, "AWAY_WINNING_SCORE")
                .unwrap_or(defaults.winning_score),
            shuffle,
        }
    }

    /// A seeded configuration, otherwise default.
    pub fn seeded(seed: u64) -> Self {
        EngineConfig {
            shuffle: ShuffleConfig::Seeded(seed),
            ..EngineConfig::default()
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("ignoring {}={:?}: not a valid value", key, raw);
            None
        }
    }
}
