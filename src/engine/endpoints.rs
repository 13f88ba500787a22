use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

use super::events::SequencedEvent;
use super::game_state::GameState;
use super::SharedEngine;

/// Full snapshot of the current game.
#[openapi]
#[get("/game/state")]
pub async fn get_game_state(engine: &State<SharedEngine>) -> Json<GameState> {
    Json(engine.lock().await.snapshot())
}

/// Events from the outbox with `seq >= from_seq` (everything retained by
/// default). The outbox keeps only the latest `EVENT_RETENTION` events, so
/// a gap between `from_seq` and the first returned `seq` means the client
/// must reload `GET /game/state`.
#[openapi]
#[get("/events?<from_seq>")]
pub async fn get_events(
    from_seq: Option<u64>,
    engine: &State<SharedEngine>,
) -> Json<Vec<SequencedEvent>> {
    Json(engine.lock().await.events().since(from_seq.unwrap_or(0)))
}
