//! # Away Mission
//!
//! A single-player rules engine for a mission-and-dilemma card game, served
//! over HTTP.
//!
//! ## Overview
//!
//! Players set up five missions, deploy personnel and ships, move between
//! missions and attempt them. Each attempt draws dilemmas from a shared pool
//! that must be resolved before the mission's requirements are checked.
//!
//! ## Architecture
//!
//! The API is built using the Rocket web framework with OpenAPI documentation
//! support. One `GameEngine` owns the game state and is shared between
//! requests behind an `Arc<Mutex<T>>`; every request handler is a thin wrapper
//! around `GameEngine::process`.

// Rocket makes this a bit tricky to support
#![allow(clippy::module_name_repetitions)]
#[macro_use]
extern crate rocket;

use rocket_okapi::openapi_get_routes;
use rocket_okapi::swagger_ui::{make_swagger_ui, SwaggerUIConfig};
use tracing_subscriber::EnvFilter;

pub mod action;
pub mod actions_log;
pub mod config;
pub mod engine;
pub mod error;
pub mod library;
pub mod player_seed;
pub mod status_messages;

pub use crate::action::{ActionRequest, ActionResult, PlayerActions};
pub use crate::config::EngineConfig;
pub use crate::engine::{GameEngine, SharedEngine};
pub use crate::error::EngineError;

/// Initializes and configures the Rocket web server with all routes and OpenAPI documentation.
/// The engine configuration is read from the environment.
///
/// # Example
///
/// ```no_run
/// use away_mission::rocket_initialize;
///
/// #[rocket::main]
/// async fn main() {
///     let _ = rocket_initialize().launch().await;
/// }
/// ```
pub fn rocket_initialize() -> rocket::Rocket<rocket::Build> {
    rocket_with_engine(GameEngine::new(EngineConfig::from_env()))
}

/// Same as `rocket_initialize`, serving a prepared engine.
pub fn rocket_with_engine(engine: GameEngine) -> rocket::Rocket<rocket::Build> {
    use crate::action::okapi_add_operation_for_play_;
    use crate::action::play;
    use crate::actions_log::list_actions_log;
    use crate::actions_log::okapi_add_operation_for_list_actions_log_;
    use crate::engine::{
        get_events, get_game_state, okapi_add_operation_for_get_events_,
        okapi_add_operation_for_get_game_state_,
    };
    use crate::library::{
        add_test_library_card, list_library_cards, okapi_add_operation_for_add_test_library_card_,
        okapi_add_operation_for_list_library_cards_,
    };
    use crate::player_seed::okapi_add_operation_for_set_seed_;
    use crate::player_seed::set_seed;

    // A subscriber may already be installed by the host or an earlier client.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("away_mission=info")),
        )
        .try_init();

    tracing::info!(
        "starting engine with {} card definitions, shuffle {:?}",
        engine.library().cards.len(),
        engine.config().shuffle
    );

    rocket::build()
        .mount(
            "/",
            openapi_get_routes![
                play,
                get_game_state,
                get_events,
                list_actions_log,
                list_library_cards,
                add_test_library_card,
                set_seed
            ],
        )
        .mount("/swagger", make_swagger_ui(&get_docs()))
        .manage(engine.shared())
}

fn get_docs() -> SwaggerUIConfig {
    SwaggerUIConfig {
        url: "/openapi.json".to_string(),
        ..Default::default()
    }
}
