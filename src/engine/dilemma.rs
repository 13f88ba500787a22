//! Resolution of a single dilemma against the attacking roster.
//!
//! Evaluation never mutates game state. It only decides who is stopped or
//! killed and where the card goes; the encounter applies the outcome later.
//! All random picks come from the injected `Shuffle`.

use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;

use super::game_state::{DilemmaInstance, UniqueId};
use super::requirements::{any_satisfied, RosterMember};
use super::shuffle::Shuffle;
use crate::error::EngineError;
use crate::library::types::{CardDefId, DilemmaRule, Penalty, Requirement, Skill, TargetEffect};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct DilemmaOutcome {
    pub dilemma_id: UniqueId,
    pub def_id: CardDefId,
    pub overcome: bool,
    pub stopped_ids: Vec<UniqueId>,
    pub killed_ids: Vec<UniqueId>,
    pub requires_selection: bool,
    pub selectable_personnel_ids: Vec<UniqueId>,
    pub returns_to_pile: bool,
    pub message: String,
}

impl DilemmaOutcome {
    fn new(dilemma: &DilemmaInstance) -> Self {
        DilemmaOutcome {
            dilemma_id: dilemma.unique_id,
            def_id: dilemma.def_id,
            overcome: true,
            stopped_ids: Vec::new(),
            killed_ids: Vec::new(),
            requires_selection: false,
            selectable_personnel_ids: Vec::new(),
            returns_to_pile: false,
            message: String::new(),
        }
    }

    fn with_message(mut self, message: String) -> Self {
        self.message = message;
        self
    }

    /// Record the attacker's choice for a pending selection.
    pub fn select(&mut self, personnel_id: UniqueId) -> Result<(), EngineError> {
        if !self.requires_selection {
            return Err(EngineError::SelectionNotRequired);
        }
        if !self.selectable_personnel_ids.contains(&personnel_id) {
            return Err(EngineError::IneligibleSelection(personnel_id));
        }
        self.requires_selection = false;
        self.selectable_personnel_ids.clear();
        self.stopped_ids = vec![personnel_id];
        self.overcome = true;
        self.message = format!("Personnel {} is stopped", personnel_id);
        Ok(())
    }
}

fn ids(roster: &[RosterMember]) -> Vec<UniqueId> {
    roster.iter().map(|m| m.unique_id).collect()
}

/// Resolve `dilemma` (named `name`, governed by `rule`) against `roster`.
pub fn evaluate(
    dilemma: &DilemmaInstance,
    name: &str,
    rule: &DilemmaRule,
    roster: &[RosterMember],
    shuffle: &mut Shuffle,
) -> DilemmaOutcome {
    let outcome = DilemmaOutcome::new(dilemma);
    let outcome = match rule {
        DilemmaRule::ChooseToStop { skills, penalty } => {
            choose_to_stop(outcome, name, skills, penalty, roster, shuffle)
        }
        DilemmaRule::UnlessCheck {
            requirements,
            penalty,
        } => unless_check(outcome, name, requirements, penalty, roster, shuffle),
        DilemmaRule::RandomThenCheck {
            requirements,
            effect,
        } => random_then_check(outcome, name, requirements, *effect, roster, shuffle),
        DilemmaRule::CrewLimit { keep_count } => {
            crew_limit(outcome, name, *keep_count, roster, shuffle)
        }
        DilemmaRule::PinnedDown => pinned_down(outcome, name, roster, shuffle),
    };
    tracing::debug!(
        "dilemma {} ({}) resolved: overcome={} stopped={:?} killed={:?} selection={}",
        dilemma.unique_id,
        name,
        outcome.overcome,
        outcome.stopped_ids,
        outcome.killed_ids,
        outcome.requires_selection
    );
    outcome
}

fn choose_to_stop(
    mut outcome: DilemmaOutcome,
    name: &str,
    skills: &[Skill],
    penalty: &Penalty,
    roster: &[RosterMember],
    shuffle: &mut Shuffle,
) -> DilemmaOutcome {
    let eligible: Vec<UniqueId> = roster
        .iter()
        .filter(|m| m.has_any_skill(skills))
        .map(|m| m.unique_id)
        .collect();
    if eligible.is_empty() {
        return apply_penalty(outcome, name, penalty, roster, shuffle);
    }
    outcome.overcome = false;
    outcome.requires_selection = true;
    outcome.selectable_personnel_ids = eligible;
    outcome.with_message(format!(
        "{}: choose a personnel with {:?} to be stopped",
        name, skills
    ))
}

fn unless_check(
    outcome: DilemmaOutcome,
    name: &str,
    requirements: &[Requirement],
    penalty: &Penalty,
    roster: &[RosterMember],
    shuffle: &mut Shuffle,
) -> DilemmaOutcome {
    if any_satisfied(roster, requirements) {
        return outcome.with_message(format!("{}: requirements met, no effect", name));
    }
    apply_penalty(outcome, name, penalty, roster, shuffle)
}

fn random_then_check(
    mut outcome: DilemmaOutcome,
    name: &str,
    requirements: &[Requirement],
    effect: TargetEffect,
    roster: &[RosterMember],
    shuffle: &mut Shuffle,
) -> DilemmaOutcome {
    // The target is fixed before the check so the draw does not depend on it.
    let target = shuffle.choose(&ids(roster));
    if any_satisfied(roster, requirements) {
        return outcome.with_message(format!("{}: requirements met, no effect", name));
    }
    let Some(target) = target else {
        return outcome.with_message(format!("{}: nobody to target", name));
    };
    match effect {
        TargetEffect::Stop => {
            outcome.stopped_ids.push(target);
            outcome.with_message(format!("{}: personnel {} is stopped", name, target))
        }
        TargetEffect::Kill => {
            outcome.killed_ids.push(target);
            outcome.with_message(format!("{}: personnel {} is killed", name, target))
        }
    }
}

fn crew_limit(
    mut outcome: DilemmaOutcome,
    name: &str,
    keep_count: usize,
    roster: &[RosterMember],
    shuffle: &mut Shuffle,
) -> DilemmaOutcome {
    outcome.overcome = false;
    if roster.len() <= keep_count {
        return outcome.with_message(format!("{}: crew within limit of {}", name, keep_count));
    }
    let excess = roster.len() - keep_count;
    outcome.stopped_ids = shuffle.choose_many(&ids(roster), excess);
    outcome.with_message(format!(
        "{}: {} personnel stopped to keep {}",
        name, excess, keep_count
    ))
}

fn pinned_down(
    mut outcome: DilemmaOutcome,
    name: &str,
    roster: &[RosterMember],
    shuffle: &mut Shuffle,
) -> DilemmaOutcome {
    let mut remaining = ids(roster);
    // One stop always; a second at nine or more remaining, a third at ten or more.
    for min_remaining in [0usize, 9, 10] {
        if remaining.is_empty() || remaining.len() < min_remaining {
            break;
        }
        if let Some(i) = shuffle.choose_index(remaining.len()) {
            outcome.stopped_ids.push(remaining.remove(i));
        }
    }
    let count = outcome.stopped_ids.len();
    outcome.with_message(format!("{}: {} personnel stopped", name, count))
}

fn apply_penalty(
    mut outcome: DilemmaOutcome,
    name: &str,
    penalty: &Penalty,
    roster: &[RosterMember],
    shuffle: &mut Shuffle,
) -> DilemmaOutcome {
    match penalty {
        Penalty::RandomKill => match shuffle.choose(&ids(roster)) {
            Some(victim) => {
                outcome.killed_ids.push(victim);
                outcome.with_message(format!("{}: personnel {} is killed", name, victim))
            }
            None => outcome.with_message(format!("{}: nobody to kill", name)),
        },
        Penalty::RandomKillWithSkill { skill } => {
            let holders: Vec<UniqueId> = roster
                .iter()
                .filter(|m| m.has_skill(*skill))
                .map(|m| m.unique_id)
                .collect();
            match shuffle.choose(&holders) {
                Some(victim) => {
                    outcome.killed_ids.push(victim);
                    outcome.with_message(format!(
                        "{}: personnel {} with {:?} is killed",
                        name, victim, skill
                    ))
                }
                None => outcome.with_message(format!("{}: nobody has {:?}", name, skill)),
            }
        }
        Penalty::StopAllReturnToPile => {
            outcome.stopped_ids = ids(roster);
            outcome.overcome = false;
            outcome.returns_to_pile = true;
            outcome.with_message(format!(
                "{}: all personnel stopped, dilemma returns to the pool",
                name
            ))
        }
    }
}
