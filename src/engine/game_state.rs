//! The single aggregate owned by the engine, and the in-play instance types.
//!
//! Definitional data (name, stats, rules) stays in the Library; instances only
//! carry their `def_id` and the mutable per-instance fields.

use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;

use super::dilemma::DilemmaOutcome;
use super::encounter::DilemmaEncounter;
use super::modifiers::ModifierResolver;
use super::requirements::RosterMember;
use super::turn::TurnPhase;
use crate::error::EngineError;
use crate::library::types::{CardDefId, MissionDef};
use crate::library::Library;

/// Per-instance id, stable for the instance's lifetime and never shared.
pub type UniqueId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub enum PersonnelStatus {
    Unstopped,
    Stopped,
}

/// A card in hand, deck or discard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct CardInstance {
    pub unique_id: UniqueId,
    pub def_id: CardDefId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct PersonnelInstance {
    pub unique_id: UniqueId,
    pub def_id: CardDefId,
    pub status: PersonnelStatus,
}

impl PersonnelInstance {
    pub fn is_unstopped(&self) -> bool {
        self.status == PersonnelStatus::Unstopped
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct ShipInstance {
    pub unique_id: UniqueId,
    pub def_id: CardDefId,
    pub range_remaining: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct DilemmaInstance {
    pub unique_id: UniqueId,
    pub def_id: CardDefId,
    pub overcome: bool,
    pub faceup: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct MissionInstance {
    pub unique_id: UniqueId,
    pub def_id: CardDefId,
    pub completed: bool,
}

/// Cards co-located at one mission. Group 0 is planetside and has no ship;
/// every other group is bound to exactly one ship.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct Group {
    pub ship: Option<ShipInstance>,
    pub personnel: Vec<PersonnelInstance>,
}

impl Group {
    pub fn planetside() -> Self {
        Group::default()
    }

    pub fn aboard(ship: ShipInstance) -> Self {
        Group {
            ship: Some(ship),
            personnel: Vec::new(),
        }
    }

    pub fn unstopped(&self) -> impl Iterator<Item = &PersonnelInstance> {
        self.personnel.iter().filter(|p| p.is_unstopped())
    }

    pub fn unstopped_count(&self) -> usize {
        self.unstopped().count()
    }

    pub fn position_of(&self, unique_id: UniqueId) -> Option<usize> {
        self.personnel.iter().position(|p| p.unique_id == unique_id)
    }

    /// Definition ids of every card in the group, ship first.
    pub fn present_def_ids(&self) -> Vec<CardDefId> {
        self.ship
            .iter()
            .map(|s| s.def_id)
            .chain(self.personnel.iter().map(|p| p.def_id))
            .collect()
    }

    /// Effective stats of the unstopped personnel, for rule evaluation.
    pub fn roster(&self, library: &Library, resolver: &dyn ModifierResolver) -> Vec<RosterMember> {
        let present = self.present_def_ids();
        self.unstopped()
            .filter_map(|p| {
                let def = library.get(p.def_id)?.as_personnel()?;
                Some(RosterMember {
                    unique_id: p.unique_id,
                    stats: resolver.personnel_stats(def, &present),
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct MissionDeployment {
    pub mission: MissionInstance,
    pub groups: Vec<Group>,
    /// Dilemmas placed beneath the mission, overcome or parked for re-encounter.
    pub dilemmas: Vec<DilemmaInstance>,
}

impl MissionDeployment {
    pub fn new(mission: MissionInstance) -> Self {
        MissionDeployment {
            mission,
            groups: vec![Group::planetside()],
            dilemmas: Vec::new(),
        }
    }

    pub fn overcome_count(&self) -> usize {
        self.dilemmas.iter().filter(|d| d.overcome).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct GameOutcome {
    pub victory: bool,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct GameState {
    /// 0 until the game has been set up.
    pub turn: u32,
    pub phase: TurnPhase,
    pub counters: u32,
    pub missions: Vec<MissionDeployment>,
    pub dilemma_pool: Vec<DilemmaInstance>,
    pub hand: Vec<CardInstance>,
    pub deck: Vec<CardInstance>,
    pub discard: Vec<CardInstance>,
    pub score: u32,
    pub completed_planet_missions: u32,
    pub completed_space_missions: u32,
    pub dilemma_encounter: Option<DilemmaEncounter>,
    pub dilemma_result: Option<DilemmaOutcome>,
    pub game_over: Option<GameOutcome>,
    pub next_unique_id: UniqueId,
}

impl Default for GameState {
    fn default() -> Self {
        GameState {
            turn: 0,
            phase: TurnPhase::PlayAndDraw,
            counters: 0,
            missions: Vec::new(),
            dilemma_pool: Vec::new(),
            hand: Vec::new(),
            deck: Vec::new(),
            discard: Vec::new(),
            score: 0,
            completed_planet_missions: 0,
            completed_space_missions: 0,
            dilemma_encounter: None,
            dilemma_result: None,
            game_over: None,
            next_unique_id: 1,
        }
    }
}

impl GameState {
    pub fn is_set_up(&self) -> bool {
        self.turn > 0
    }

    pub fn mint_id(&mut self) -> UniqueId {
        let id = self.next_unique_id;
        self.next_unique_id += 1;
        id
    }

    pub fn headquarters_index(&self, library: &Library) -> Option<usize> {
        self.missions.iter().position(|m| {
            library
                .get(m.mission.def_id)
                .and_then(|c| c.as_mission())
                .is_some_and(|def| def.headquarters)
        })
    }

    pub fn mission(&self, index: usize) -> Result<&MissionDeployment, EngineError> {
        self.missions
            .get(index)
            .ok_or(EngineError::UnknownMission(index))
    }

    pub fn mission_mut(&mut self, index: usize) -> Result<&mut MissionDeployment, EngineError> {
        self.missions
            .get_mut(index)
            .ok_or(EngineError::UnknownMission(index))
    }

    pub fn group(&self, mission: usize, group: usize) -> Result<&Group, EngineError> {
        self.mission(mission)?
            .groups
            .get(group)
            .ok_or(EngineError::UnknownGroup { mission, group })
    }

    pub fn group_mut(&mut self, mission: usize, group: usize) -> Result<&mut Group, EngineError> {
        self.mission_mut(mission)?
            .groups
            .get_mut(group)
            .ok_or(EngineError::UnknownGroup { mission, group })
    }

    pub fn hand_position(&self, unique_id: UniqueId) -> Result<usize, EngineError> {
        self.hand
            .iter()
            .position(|c| c.unique_id == unique_id)
            .ok_or(EngineError::CardNotInHand(unique_id))
    }
}

/// Definition of the mission at a deployment slot.
pub fn mission_def<'a>(
    library: &'a Library,
    deployment: &MissionDeployment,
) -> Result<&'a MissionDef, EngineError> {
    let card = library.lookup(deployment.mission.def_id)?;
    card.as_mission()
        .ok_or(EngineError::UnknownCardDefinition(card.id))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::library::registry::{
        CHART_ANOMALY, EXCAVATE_RUINS, NEGOTIATE_TREATY, STARFLEET_HEADQUARTERS, SURVEY_NEBULA,
    };

    /// Turn 1, PlayAndDraw, the five canonical missions with empty planetside groups.
    pub(crate) fn sample_state() -> GameState {
        let mut state = GameState {
            turn: 1,
            counters: 7,
            next_unique_id: 1000,
            ..GameState::default()
        };
        for (i, def_id) in [
            STARFLEET_HEADQUARTERS,
            SURVEY_NEBULA,
            EXCAVATE_RUINS,
            NEGOTIATE_TREATY,
            CHART_ANOMALY,
        ]
        .into_iter()
        .enumerate()
        {
            state.missions.push(MissionDeployment::new(MissionInstance {
                unique_id: 1 + i as UniqueId,
                def_id,
                completed: false,
            }));
        }
        state
    }

    pub(crate) fn personnel(unique_id: UniqueId, def_id: CardDefId) -> PersonnelInstance {
        PersonnelInstance {
            unique_id,
            def_id,
            status: PersonnelStatus::Unstopped,
        }
    }

    /// A planetside group holding `(unique_id, def_id)` personnel.
    pub(crate) fn planet_group(members: &[(UniqueId, CardDefId)]) -> Group {
        Group {
            ship: None,
            personnel: members.iter().map(|(u, d)| personnel(*u, *d)).collect(),
        }
    }

    /// A ship group (ship unique id 900) holding `(unique_id, def_id)` personnel.
    pub(crate) fn ship_group(ship_def: CardDefId, members: &[(UniqueId, CardDefId)]) -> Group {
        Group {
            ship: Some(ShipInstance {
                unique_id: 900,
                def_id: ship_def,
                range_remaining: 8,
            }),
            personnel: members.iter().map(|(u, d)| personnel(*u, *d)).collect(),
        }
    }

    #[test]
    fn headquarters_is_found() {
        let library = Library::with_canonical();
        assert_eq!(sample_state().headquarters_index(&library), Some(0));
    }

    #[test]
    fn missing_group_is_reported() {
        let state = sample_state();
        assert!(state.group(0, 0).is_ok());
        assert_eq!(
            state.group(0, 3),
            Err(EngineError::UnknownGroup {
                mission: 0,
                group: 3
            })
        );
        assert_eq!(state.group(9, 0), Err(EngineError::UnknownMission(9)));
    }

    #[test]
    fn roster_skips_stopped_personnel() {
        let library = Library::with_canonical();
        let mut group = planet_group(&[(1, 10), (2, 12)]);
        group.personnel[0].status = PersonnelStatus::Stopped;
        let roster = group.roster(&library, &super::super::modifiers::Unmodified);
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].unique_id, 2);
    }
}
