//! Lookup seam for passive abilities and cost modifiers.
//!
//! The core never computes stat or cost adjustments itself. It asks a
//! `ModifierResolver` and treats the answer as already-applied input.

use std::fmt::Debug;

use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;

use crate::library::types::{
    Affiliation, CardDef, CardDefId, CardKind, Icon, MissionDef, PersonnelDef, Skill,
};

/// Effective stats of one personnel, after modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct PersonnelStats {
    pub affiliation: Affiliation,
    pub skills: Vec<Skill>,
    pub integrity: u32,
    pub cunning: u32,
    pub strength: u32,
    pub icons: Vec<Icon>,
}

impl From<&PersonnelDef> for PersonnelStats {
    fn from(def: &PersonnelDef) -> Self {
        PersonnelStats {
            affiliation: def.affiliation,
            skills: def.skills.clone(),
            integrity: def.integrity,
            cunning: def.cunning,
            strength: def.strength,
            icons: def.icons.clone(),
        }
    }
}

pub trait ModifierResolver: Debug + Send + Sync {
    /// Stats of `def` given the definition ids of the cards present with it.
    fn personnel_stats(&self, def: &PersonnelDef, present: &[CardDefId]) -> PersonnelStats;

    /// Counters needed to deploy `card` at `destination`.
    fn deploy_cost(&self, card: &CardDef, destination: &MissionDef) -> u32;
}

/// Printed values, no adjustments.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unmodified;

impl ModifierResolver for Unmodified {
    fn personnel_stats(&self, def: &PersonnelDef, _present: &[CardDefId]) -> PersonnelStats {
        PersonnelStats::from(def)
    }

    fn deploy_cost(&self, card: &CardDef, _destination: &MissionDef) -> u32 {
        printed_cost(&card.kind).unwrap_or(0)
    }
}

/// The cost printed on a card, if it has one.
pub fn printed_cost(kind: &CardKind) -> Option<u32> {
    match kind {
        CardKind::Personnel(p) => Some(p.cost),
        CardKind::Ship(s) => Some(s.cost),
        CardKind::Dilemma(d) => Some(d.cost),
        CardKind::Interrupt(p) | CardKind::Event(p) => Some(p.cost),
        CardKind::Mission(_) => None,
    }
}
