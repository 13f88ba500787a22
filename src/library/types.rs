use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;

/// Definitional card id. Every physical copy of the same named card shares it.
pub type CardDefId = u64;

/// Skills printed on personnel and demanded by missions and dilemmas.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(crate = "rocket::serde")]
pub enum Skill {
    Acquisition,
    Anthropology,
    Archaeology,
    Astrometrics,
    Biology,
    Diplomacy,
    Engineering,
    Exobiology,
    Geology,
    Honor,
    Intelligence,
    Law,
    Leadership,
    Medical,
    Navigation,
    Officer,
    Physics,
    Programming,
    Science,
    Security,
    Telepathy,
    Transporters,
    Treachery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub enum Attribute {
    Strength,
    Integrity,
    Cunning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub enum Affiliation {
    Bajoran,
    Borg,
    Cardassian,
    Dominion,
    Federation,
    Ferengi,
    Klingon,
    NonAligned,
    Romulan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub enum Quadrant {
    Alpha,
    Beta,
    Gamma,
    Delta,
}

/// Staffing icons. Command may stand in for Staff, never the other way round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub enum Icon {
    Staff,
    Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub enum MissionType {
    Planet,
    Space,
}

/// Where a dilemma may be faced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub enum DilemmaLocation {
    Planet,
    Space,
    Dual,
}

impl DilemmaLocation {
    pub fn applies_to(&self, mission_type: MissionType) -> bool {
        match self {
            DilemmaLocation::Dual => true,
            DilemmaLocation::Planet => mission_type == MissionType::Planet,
            DilemmaLocation::Space => mission_type == MissionType::Space,
        }
    }
}

/// An attribute total the roster must strictly exceed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct AttributeThreshold {
    pub attribute: Attribute,
    pub threshold: u32,
}

/// One requirement set: a multiset of skills plus optional attribute thresholds.
/// A requirement expression is a list of these, satisfied if any one passes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct Requirement {
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub attributes: Vec<AttributeThreshold>,
}

impl Requirement {
    pub fn skills(skills: &[Skill]) -> Self {
        Requirement {
            skills: skills.to_vec(),
            attributes: Vec::new(),
        }
    }

    /// Demands nothing, so any roster (even an empty one) would meet it.
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty() && self.attributes.is_empty()
    }

    pub fn with_attribute(mut self, attribute: Attribute, threshold: u32) -> Self {
        self.attributes.push(AttributeThreshold {
            attribute,
            threshold,
        });
        self
    }
}

/// Penalty applied when a dilemma's condition is not met.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", tag = "penalty")]
pub enum Penalty {
    /// A uniformly random unstopped personnel is killed.
    RandomKill,
    /// A random unstopped personnel holding `skill` is killed; no effect if none holds it.
    RandomKillWithSkill { skill: Skill },
    /// Every unstopped personnel is stopped and the dilemma returns to the pool face up.
    StopAllReturnToPile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub enum TargetEffect {
    Stop,
    Kill,
}

/// Closed set of dilemma behaviors. Each variant has exactly one evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", tag = "rule")]
pub enum DilemmaRule {
    /// The attacker stops one personnel holding any listed skill.
    ChooseToStop { skills: Vec<Skill>, penalty: Penalty },
    /// Overcome if any requirement set passes, otherwise apply the penalty.
    UnlessCheck {
        requirements: Vec<Requirement>,
        penalty: Penalty,
    },
    /// A random target is picked first; it suffers `effect` if the requirements fail.
    RandomThenCheck {
        requirements: Vec<Requirement>,
        effect: TargetEffect,
    },
    /// Randomly stop personnel down to `keep_count`; stays beneath the mission unresolved.
    CrewLimit { keep_count: usize },
    /// Graduated random stops depending on how many personnel remain.
    PinnedDown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct MissionDef {
    pub mission_type: MissionType,
    pub quadrant: Quadrant,
    pub range: u32,
    pub points: u32,
    #[serde(default)]
    pub headquarters: bool,
    #[serde(default)]
    pub affiliations: Vec<Affiliation>,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct PersonnelDef {
    pub affiliation: Affiliation,
    pub cost: u32,
    #[serde(default)]
    pub skills: Vec<Skill>,
    pub integrity: u32,
    pub cunning: u32,
    pub strength: u32,
    #[serde(default)]
    pub icons: Vec<Icon>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct ShipDef {
    pub affiliation: Affiliation,
    pub cost: u32,
    pub range: u32,
    pub weapons: u32,
    pub shields: u32,
    #[serde(default)]
    pub staffing: Vec<Icon>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct DilemmaDef {
    pub cost: u32,
    pub location: DilemmaLocation,
    pub rule: DilemmaRule,
}

/// Interrupts and events. Their game text is resolved outside the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct PlayableDef {
    pub cost: u32,
    #[serde(default)]
    pub text: String,
}

/// The kind of card and its type-specific payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", tag = "card_kind")]
pub enum CardKind {
    Mission(MissionDef),
    Personnel(PersonnelDef),
    Ship(ShipDef),
    Dilemma(DilemmaDef),
    Interrupt(PlayableDef),
    Event(PlayableDef),
}

impl CardKind {
    pub fn name(&self) -> &'static str {
        match self {
            CardKind::Mission(_) => "Mission",
            CardKind::Personnel(_) => "Personnel",
            CardKind::Ship(_) => "Ship",
            CardKind::Dilemma(_) => "Dilemma",
            CardKind::Interrupt(_) => "Interrupt",
            CardKind::Event(_) => "Event",
        }
    }
}

/// Immutable card definition as stored in the card database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct CardDef {
    pub id: CardDefId,
    pub name: String,
    pub kind: CardKind,
}

impl CardDef {
    pub fn as_mission(&self) -> Option<&MissionDef> {
        match &self.kind {
            CardKind::Mission(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_personnel(&self) -> Option<&PersonnelDef> {
        match &self.kind {
            CardKind::Personnel(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_ship(&self) -> Option<&ShipDef> {
        match &self.kind {
            CardKind::Ship(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_dilemma(&self) -> Option<&DilemmaDef> {
        match &self.kind {
            CardKind::Dilemma(d) => Some(d),
            _ => None,
        }
    }
}
