//! Skill and attribute checks shared by mission scoring and dilemmas.
//!
//! Pure functions over a roster snapshot. A requirement expression is a list
//! of alternative sets; the first set that passes wins.

use std::collections::HashMap;

use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;

use super::game_state::UniqueId;
use super::modifiers::PersonnelStats;
use crate::library::types::{Attribute, Requirement, Skill};

/// One active personnel as seen by rule evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct RosterMember {
    pub unique_id: UniqueId,
    pub stats: PersonnelStats,
}

impl RosterMember {
    pub fn has_skill(&self, skill: Skill) -> bool {
        self.stats.skills.contains(&skill)
    }

    pub fn has_any_skill(&self, skills: &[Skill]) -> bool {
        skills.iter().any(|s| self.has_skill(*s))
    }
}

/// Skills and attributes of a roster summed into one pool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillPool {
    pub skills: HashMap<Skill, u32>,
    pub integrity: u32,
    pub cunning: u32,
    pub strength: u32,
}

impl SkillPool {
    pub fn of(roster: &[RosterMember]) -> Self {
        let mut pool = SkillPool::default();
        for member in roster {
            for skill in &member.stats.skills {
                *pool.skills.entry(*skill).or_insert(0) += 1;
            }
            pool.integrity += member.stats.integrity;
            pool.cunning += member.stats.cunning;
            pool.strength += member.stats.strength;
        }
        pool
    }

    pub fn attribute(&self, attribute: Attribute) -> u32 {
        match attribute {
            Attribute::Strength => self.strength,
            Attribute::Integrity => self.integrity,
            Attribute::Cunning => self.cunning,
        }
    }

    /// Each listed skill occurrence consumes one from the pool; thresholds are strict.
    pub fn meets(&self, requirement: &Requirement) -> bool {
        let mut remaining = self.skills.clone();
        for skill in &requirement.skills {
            match remaining.get_mut(skill) {
                Some(count) if *count > 0 => *count -= 1,
                _ => return false,
            }
        }
        requirement
            .attributes
            .iter()
            .all(|t| self.attribute(t.attribute) > t.threshold)
    }
}

pub fn satisfies(roster: &[RosterMember], requirement: &Requirement) -> bool {
    SkillPool::of(roster).meets(requirement)
}

/// Index of the first requirement set the roster meets, in declaration order.
pub fn first_satisfied(roster: &[RosterMember], requirements: &[Requirement]) -> Option<usize> {
    let pool = SkillPool::of(roster);
    requirements.iter().position(|r| pool.meets(r))
}

pub fn any_satisfied(roster: &[RosterMember], requirements: &[Requirement]) -> bool {
    first_satisfied(roster, requirements).is_some()
}
