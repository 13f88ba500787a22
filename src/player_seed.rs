use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::State;
use rocket_okapi::{openapi, JsonSchema};

use crate::engine::{ActionEntry, SharedEngine};

#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct SeedRequest {
    pub seed: u64,
}

/// Replace the engine's shuffle with a seeded one; the seed is recorded in
/// the action log so a game can be replayed.
#[openapi]
#[post("/player/seed", format = "json", data = "<seed_req>")]
pub async fn set_seed(
    seed_req: Json<SeedRequest>,
    engine: &State<SharedEngine>,
) -> Json<ActionEntry> {
    let mut engine = engine.lock().await;
    Json(engine.set_seed(seed_req.seed))
}
