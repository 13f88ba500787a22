use super::types::{
    Affiliation, Attribute, CardDef, CardDefId, CardKind, DilemmaDef, DilemmaLocation,
    DilemmaRule, Icon, MissionDef, MissionType, Penalty, PersonnelDef, PlayableDef, Quadrant,
    Requirement, ShipDef, Skill, TargetEffect,
};
use super::Library;

// Mission ids
pub const STARFLEET_HEADQUARTERS: CardDefId = 1;
pub const SURVEY_NEBULA: CardDefId = 2;
pub const EXCAVATE_RUINS: CardDefId = 3;
pub const NEGOTIATE_TREATY: CardDefId = 4;
pub const CHART_ANOMALY: CardDefId = 5;

// Personnel ids
pub const CAPTAIN: CardDefId = 10;
pub const FIRST_OFFICER: CardDefId = 11;
pub const SCIENCE_OFFICER: CardDefId = 12;
pub const CHIEF_ENGINEER: CardDefId = 13;
pub const SHIP_DOCTOR: CardDefId = 14;
pub const SECURITY_CHIEF: CardDefId = 15;
pub const COUNSELOR: CardDefId = 16;
pub const ARCHAEOLOGIST: CardDefId = 17;
pub const ENSIGN_PILOT: CardDefId = 18;
pub const BAJORAN_LIAISON: CardDefId = 19;

// Ship ids
pub const USS_HORIZON: CardDefId = 20;
pub const SCOUT_RUNABOUT: CardDefId = 21;

// Dilemma ids
pub const LIMITED_WELCOME: CardDefId = 30;
pub const PINNED_DOWN: CardDefId = 31;
pub const SECURITY_SWEEP: CardDefId = 32;
pub const QUARANTINE_PROTOCOL: CardDefId = 33;
pub const ION_STORM: CardDefId = 34;
pub const HOSTILE_BOARDING: CardDefId = 35;
pub const PLAGUE_VECTOR: CardDefId = 36;
pub const SABOTAGE: CardDefId = 37;
pub const SNIPER: CardDefId = 38;
pub const CREW_ROTATION: CardDefId = 39;

// Interrupts and events
pub const RED_ALERT: CardDefId = 50;
pub const EMERGENCY_TRANSPORT: CardDefId = 51;

fn mission(id: CardDefId, name: &str, def: MissionDef) -> CardDef {
    CardDef {
        id,
        name: name.to_string(),
        kind: CardKind::Mission(def),
    }
}

#[allow(clippy::too_many_arguments)]
fn personnel(
    id: CardDefId,
    name: &str,
    affiliation: Affiliation,
    cost: u32,
    skills: &[Skill],
    (integrity, cunning, strength): (u32, u32, u32),
    icons: &[Icon],
) -> CardDef {
    CardDef {
        id,
        name: name.to_string(),
        kind: CardKind::Personnel(PersonnelDef {
            affiliation,
            cost,
            skills: skills.to_vec(),
            integrity,
            cunning,
            strength,
            icons: icons.to_vec(),
        }),
    }
}

fn dilemma(
    id: CardDefId,
    name: &str,
    cost: u32,
    location: DilemmaLocation,
    rule: DilemmaRule,
) -> CardDef {
    CardDef {
        id,
        name: name.to_string(),
        kind: CardKind::Dilemma(DilemmaDef {
            cost,
            location,
            rule,
        }),
    }
}

impl Library {
    /// The canonical card set shipped with the server.
    pub fn with_canonical() -> Self {
        use Skill::*;

        let mut lib = Library::new();

        // ---- Missions ----
        lib.add_card(mission(
            STARFLEET_HEADQUARTERS,
            "Starfleet Headquarters",
            MissionDef {
                mission_type: MissionType::Planet,
                quadrant: Quadrant::Alpha,
                range: 2,
                points: 0,
                headquarters: true,
                affiliations: vec![Affiliation::Federation],
                requirements: vec![],
            },
        ));
        lib.add_card(mission(
            SURVEY_NEBULA,
            "Survey Nebula",
            MissionDef {
                mission_type: MissionType::Space,
                quadrant: Quadrant::Alpha,
                range: 2,
                points: 35,
                headquarters: false,
                affiliations: vec![Affiliation::Federation, Affiliation::Bajoran],
                requirements: vec![
                    Requirement::skills(&[Astrometrics, Navigation])
                        .with_attribute(Attribute::Cunning, 32),
                    Requirement::skills(&[Physics, Physics, Science]),
                ],
            },
        ));
        lib.add_card(mission(
            EXCAVATE_RUINS,
            "Excavate Ruins",
            MissionDef {
                mission_type: MissionType::Planet,
                quadrant: Quadrant::Alpha,
                range: 3,
                points: 30,
                headquarters: false,
                affiliations: vec![Affiliation::Federation, Affiliation::Bajoran],
                requirements: vec![Requirement::skills(&[Archaeology, Anthropology, Geology])
                    .with_attribute(Attribute::Integrity, 28)],
            },
        ));
        lib.add_card(mission(
            NEGOTIATE_TREATY,
            "Negotiate Treaty",
            MissionDef {
                mission_type: MissionType::Planet,
                quadrant: Quadrant::Gamma,
                range: 2,
                points: 40,
                headquarters: false,
                affiliations: vec![Affiliation::Federation],
                requirements: vec![Requirement::skills(&[Diplomacy, Diplomacy, Leadership])
                    .with_attribute(Attribute::Integrity, 30)],
            },
        ));
        lib.add_card(mission(
            CHART_ANOMALY,
            "Chart Anomaly",
            MissionDef {
                mission_type: MissionType::Space,
                quadrant: Quadrant::Gamma,
                range: 3,
                points: 35,
                headquarters: false,
                affiliations: vec![Affiliation::Federation, Affiliation::Bajoran],
                requirements: vec![Requirement::skills(&[Astrometrics, Physics, Programming])
                    .with_attribute(Attribute::Cunning, 30)],
            },
        ));

        // ---- Personnel ----
        let fed = Affiliation::Federation;
        lib.add_card(personnel(
            CAPTAIN,
            "Captain",
            fed,
            3,
            &[Leadership, Diplomacy, Officer, Honor],
            (8, 7, 6),
            &[Icon::Command],
        ));
        lib.add_card(personnel(
            FIRST_OFFICER,
            "First Officer",
            fed,
            3,
            &[Leadership, Officer, Security, Navigation],
            (7, 6, 7),
            &[Icon::Command],
        ));
        lib.add_card(personnel(
            SCIENCE_OFFICER,
            "Science Officer",
            fed,
            2,
            &[Science, Physics, Astrometrics, Programming],
            (6, 8, 4),
            &[Icon::Staff],
        ));
        lib.add_card(personnel(
            CHIEF_ENGINEER,
            "Chief Engineer",
            fed,
            2,
            &[Engineering, Physics, Programming, Transporters],
            (6, 7, 5),
            &[Icon::Staff],
        ));
        lib.add_card(personnel(
            SHIP_DOCTOR,
            "Ship's Doctor",
            fed,
            2,
            &[Medical, Biology, Exobiology],
            (7, 6, 3),
            &[Icon::Staff],
        ));
        lib.add_card(personnel(
            SECURITY_CHIEF,
            "Security Chief",
            fed,
            2,
            &[Security, Honor, Leadership],
            (7, 5, 8),
            &[Icon::Staff],
        ));
        lib.add_card(personnel(
            COUNSELOR,
            "Counselor",
            fed,
            2,
            &[Anthropology, Diplomacy, Telepathy],
            (8, 6, 3),
            &[],
        ));
        lib.add_card(personnel(
            ARCHAEOLOGIST,
            "Archaeologist",
            fed,
            1,
            &[Archaeology, Geology, Anthropology],
            (6, 7, 3),
            &[],
        ));
        lib.add_card(personnel(
            ENSIGN_PILOT,
            "Ensign Pilot",
            fed,
            1,
            &[Navigation, Astrometrics],
            (5, 5, 4),
            &[Icon::Staff],
        ));
        lib.add_card(personnel(
            BAJORAN_LIAISON,
            "Bajoran Liaison",
            Affiliation::Bajoran,
            2,
            &[Diplomacy, Intelligence, Honor],
            (6, 6, 5),
            &[Icon::Staff],
        ));

        // ---- Ships ----
        lib.add_card(CardDef {
            id: USS_HORIZON,
            name: "U.S.S. Horizon".to_string(),
            kind: CardKind::Ship(ShipDef {
                affiliation: fed,
                cost: 4,
                range: 8,
                weapons: 7,
                shields: 7,
                staffing: vec![Icon::Command, Icon::Staff, Icon::Staff],
            }),
        });
        lib.add_card(CardDef {
            id: SCOUT_RUNABOUT,
            name: "Scout Runabout".to_string(),
            kind: CardKind::Ship(ShipDef {
                affiliation: fed,
                cost: 2,
                range: 6,
                weapons: 3,
                shields: 4,
                staffing: vec![Icon::Staff],
            }),
        });

        // ---- Dilemmas ----
        lib.add_card(dilemma(
            LIMITED_WELCOME,
            "Limited Welcome",
            1,
            DilemmaLocation::Planet,
            DilemmaRule::CrewLimit { keep_count: 9 },
        ));
        lib.add_card(dilemma(
            PINNED_DOWN,
            "Pinned Down",
            2,
            DilemmaLocation::Planet,
            DilemmaRule::PinnedDown,
        ));
        lib.add_card(dilemma(
            SECURITY_SWEEP,
            "Security Sweep",
            1,
            DilemmaLocation::Dual,
            DilemmaRule::ChooseToStop {
                skills: vec![Security, Leadership],
                penalty: Penalty::RandomKill,
            },
        ));
        lib.add_card(dilemma(
            QUARANTINE_PROTOCOL,
            "Quarantine Protocol",
            2,
            DilemmaLocation::Dual,
            DilemmaRule::ChooseToStop {
                skills: vec![Medical, Biology],
                penalty: Penalty::StopAllReturnToPile,
            },
        ));
        lib.add_card(dilemma(
            ION_STORM,
            "Ion Storm",
            2,
            DilemmaLocation::Space,
            DilemmaRule::UnlessCheck {
                requirements: vec![
                    Requirement::skills(&[Navigation, Astrometrics]),
                    Requirement::default().with_attribute(Attribute::Cunning, 30),
                ],
                penalty: Penalty::StopAllReturnToPile,
            },
        ));
        lib.add_card(dilemma(
            HOSTILE_BOARDING,
            "Hostile Boarding",
            3,
            DilemmaLocation::Space,
            DilemmaRule::UnlessCheck {
                requirements: vec![
                    Requirement::skills(&[Security, Security]),
                    Requirement::default().with_attribute(Attribute::Strength, 35),
                ],
                penalty: Penalty::RandomKill,
            },
        ));
        lib.add_card(dilemma(
            PLAGUE_VECTOR,
            "Plague Vector",
            2,
            DilemmaLocation::Planet,
            DilemmaRule::UnlessCheck {
                requirements: vec![Requirement::skills(&[Medical, Exobiology])],
                penalty: Penalty::RandomKillWithSkill { skill: Biology },
            },
        ));
        lib.add_card(dilemma(
            SABOTAGE,
            "Sabotage",
            2,
            DilemmaLocation::Dual,
            DilemmaRule::RandomThenCheck {
                requirements: vec![Requirement::skills(&[Engineering, Programming])],
                effect: TargetEffect::Stop,
            },
        ));
        lib.add_card(dilemma(
            SNIPER,
            "Sniper",
            3,
            DilemmaLocation::Planet,
            DilemmaRule::RandomThenCheck {
                requirements: vec![
                    Requirement::skills(&[Security]).with_attribute(Attribute::Strength, 30)
                ],
                effect: TargetEffect::Kill,
            },
        ));
        lib.add_card(dilemma(
            CREW_ROTATION,
            "Crew Rotation",
            1,
            DilemmaLocation::Space,
            DilemmaRule::CrewLimit { keep_count: 5 },
        ));

        // ---- Interrupts and events ----
        lib.add_card(CardDef {
            id: RED_ALERT,
            name: "Red Alert".to_string(),
            kind: CardKind::Event(PlayableDef {
                cost: 2,
                text: "Your ships are on alert.".to_string(),
            }),
        });
        lib.add_card(CardDef {
            id: EMERGENCY_TRANSPORT,
            name: "Emergency Transport".to_string(),
            kind: CardKind::Interrupt(PlayableDef {
                cost: 0,
                text: "Beam a personnel to safety.".to_string(),
            }),
        });

        lib
    }
}

/// A legal starting deck list built from the canonical card set.
pub fn starter_deck() -> Vec<CardDefId> {
    let mut deck = vec![
        STARFLEET_HEADQUARTERS,
        SURVEY_NEBULA,
        EXCAVATE_RUINS,
        NEGOTIATE_TREATY,
        CHART_ANOMALY,
    ];
    for id in [
        LIMITED_WELCOME,
        PINNED_DOWN,
        SECURITY_SWEEP,
        QUARANTINE_PROTOCOL,
        ION_STORM,
        HOSTILE_BOARDING,
        PLAGUE_VECTOR,
        SABOTAGE,
        SNIPER,
        CREW_ROTATION,
    ] {
        deck.push(id);
        deck.push(id);
    }
    for id in [
        CAPTAIN,
        FIRST_OFFICER,
        SCIENCE_OFFICER,
        CHIEF_ENGINEER,
        SHIP_DOCTOR,
        SECURITY_CHIEF,
        COUNSELOR,
        ARCHAEOLOGIST,
        ENSIGN_PILOT,
        BAJORAN_LIAISON,
    ] {
        deck.extend([id, id, id]);
    }
    deck.extend([USS_HORIZON, USS_HORIZON, SCOUT_RUNABOUT, SCOUT_RUNABOUT]);
    deck.extend([RED_ALERT, RED_ALERT, EMERGENCY_TRANSPORT]);
    deck
}
