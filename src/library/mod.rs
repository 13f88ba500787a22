//! Static card-definition database.
//!
//! The Library is the immutable lookup every in-play instance is resolved
//! against: name, stats, skills, costs and dilemma rules all live here. Game
//! state only ever stores definition ids.

mod endpoints;
pub mod registry;
pub mod types;

pub use endpoints::{
    add_test_library_card, list_library_cards, okapi_add_operation_for_add_test_library_card_,
    okapi_add_operation_for_list_library_cards_,
};

use std::collections::BTreeMap;

use crate::error::EngineError;
use types::{CardDef, CardDefId, CardKind, DilemmaRule};

#[derive(Debug, Clone, Default)]
pub struct Library {
    pub cards: BTreeMap<CardDefId, CardDef>,
}

impl Library {
    pub fn new() -> Self {
        Library {
            cards: BTreeMap::new(),
        }
    }

    /// Add or replace a definition. Returns the id it was stored under.
    pub fn add_card(&mut self, card: CardDef) -> CardDefId {
        let id = card.id;
        self.cards.insert(id, card);
        id
    }

    pub fn get(&self, id: CardDefId) -> Option<&CardDef> {
        self.cards.get(&id)
    }

    /// Like `get`, but an unknown id is an engine rejection.
    pub fn lookup(&self, id: CardDefId) -> Result<&CardDef, EngineError> {
        self.get(id).ok_or(EngineError::UnknownCardDefinition(id))
    }

    /// All definitions matching a predicate on CardKind, in id order.
    pub fn cards_matching<F>(&self, predicate: F) -> Vec<&CardDef>
    where
        F: Fn(&CardKind) -> bool,
    {
        self.cards
            .values()
            .filter(|c| predicate(&c.kind))
            .collect()
    }

    /// Reject definitions whose rules could never resolve.
    pub fn validate_definitions(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        for card in self.cards.values() {
            if let Err(e) = validate_card(card) {
                errors.push(e);
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

pub fn validate_card(card: &CardDef) -> Result<(), String> {
    match &card.kind {
        CardKind::Dilemma(d) => match &d.rule {
            DilemmaRule::ChooseToStop { skills, .. } if skills.is_empty() => Err(format!(
                "Dilemma {} ({}) lists no skills to stop",
                card.id, card.name
            )),
            DilemmaRule::UnlessCheck { requirements, .. }
            | DilemmaRule::RandomThenCheck { requirements, .. }
                if requirements.is_empty() =>
            {
                Err(format!(
                    "Dilemma {} ({}) has no requirement sets",
                    card.id, card.name
                ))
            }
            _ => Ok(()),
        },
        CardKind::Mission(m) if m.headquarters && m.points > 0 => Err(format!(
            "Headquarters {} ({}) cannot award points",
            card.id, card.name
        )),
        CardKind::Mission(m)
            if !m.headquarters
                && (m.requirements.is_empty() || m.requirements.iter().any(|r| r.is_empty())) =>
        {
            Err(format!(
                "Mission {} ({}) needs non-empty requirement sets",
                card.id, card.name
            ))
        }
        _ => Ok(()),
    }
}
