use rocket::response::status::{BadRequest, Created};
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

use super::types::CardDef;
use crate::engine::SharedEngine;
use crate::status_messages::{new_status, Status};

/// Card definitions from the card database.
/// Optionally filter by ?kind= (Mission, Personnel, Ship, Dilemma, Interrupt, Event).
#[openapi]
#[get("/library/cards?<kind>")]
pub async fn list_library_cards(
    kind: Option<String>,
    engine: &State<SharedEngine>,
) -> Json<Vec<CardDef>> {
    let engine = engine.lock().await;
    let cards: Vec<CardDef> = engine
        .library()
        .cards_matching(|k| match kind.as_deref() {
            Some(name) => k.name() == name,
            None => true,
        })
        .into_iter()
        .cloned()
        .collect();
    Json(cards)
}

/// Test endpoint: register a card definition in the card database.
#[openapi]
#[post("/tests/library/cards", format = "json", data = "<card>")]
pub async fn add_test_library_card(
    card: Json<CardDef>,
    engine: &State<SharedEngine>,
) -> Result<Created<String>, BadRequest<Json<Status>>> {
    let mut engine = engine.lock().await;
    match engine.register_card(card.0) {
        Ok(id) => Ok(Created::new(format!("/library/cards/{}", id))),
        Err(e) => Err(BadRequest(new_status(e))),
    }
}
