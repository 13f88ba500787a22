use either::{Either, Left, Right};
use rocket::response::status::{BadRequest, NotFound};
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::State;
use rocket_okapi::{openapi, JsonSchema};

use crate::engine::game_state::{GameState, UniqueId};
use crate::engine::{ActionEntry, SharedEngine};
use crate::error::EngineError;
use crate::library::types::CardDefId;
use crate::status_messages::{new_status, Status};

/// Player actions
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize, JsonSchema, Hash)]
#[serde(
    crate = "rocket::serde",
    tag = "action_type",
    rename_all = "SCREAMING_SNAKE_CASE"
)]
pub enum PlayerActions {
    /// Partition a deck list into missions, dilemma pool and draw deck.
    SetupGame {
        deck: Vec<CardDefId>,
    },
    Draw {
        count: u32,
    },
    /// Deploy from hand; without a mission index the card goes to headquarters.
    Deploy {
        card_id: UniqueId,
        mission_index: Option<usize>,
    },
    NextPhase,
    MoveShip {
        source: usize,
        group_index: usize,
        destination: usize,
    },
    BeamToShip {
        mission_index: usize,
        personnel_id: UniqueId,
        group_index: usize,
    },
    BeamToPlanet {
        mission_index: usize,
        group_index: usize,
        personnel_id: UniqueId,
    },
    AttemptMission {
        mission_index: usize,
        group_index: usize,
    },
    SelectPersonnelForDilemma {
        personnel_id: UniqueId,
    },
    AdvanceDilemma,
    DiscardCard {
        card_id: UniqueId,
    },
}

impl PlayerActions {
    /// Protocol name of the action, as used in rejection messages.
    pub fn name(&self) -> &'static str {
        match self {
            PlayerActions::SetupGame { .. } => "SETUP_GAME",
            PlayerActions::Draw { .. } => "DRAW",
            PlayerActions::Deploy { .. } => "DEPLOY",
            PlayerActions::NextPhase => "NEXT_PHASE",
            PlayerActions::MoveShip { .. } => "MOVE_SHIP",
            PlayerActions::BeamToShip { .. } => "BEAM_TO_SHIP",
            PlayerActions::BeamToPlanet { .. } => "BEAM_TO_PLANET",
            PlayerActions::AttemptMission { .. } => "ATTEMPT_MISSION",
            PlayerActions::SelectPersonnelForDilemma { .. } => "SELECT_PERSONNEL_FOR_DILEMMA",
            PlayerActions::AdvanceDilemma => "ADVANCE_DILEMMA",
            PlayerActions::DiscardCard { .. } => "DISCARD_CARD",
        }
    }

    /// Actions that drive an open dilemma encounter.
    pub fn continues_encounter(&self) -> bool {
        matches!(
            self,
            PlayerActions::SelectPersonnelForDilemma { .. } | PlayerActions::AdvanceDilemma
        )
    }
}

/// One submitted action and the caller's correlation id.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct ActionRequest {
    #[serde(default)]
    pub correlation_id: Option<String>,
    pub action: PlayerActions,
}

impl ActionRequest {
    pub fn new(action: PlayerActions) -> Self {
        ActionRequest {
            correlation_id: None,
            action,
        }
    }

    pub fn correlated(correlation_id: impl Into<String>, action: PlayerActions) -> Self {
        ActionRequest {
            correlation_id: Some(correlation_id.into()),
            action,
        }
    }
}

/// Protocol-level reply to an action.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct ActionResult {
    pub success: bool,
    pub reason: Option<String>,
    pub state: Option<GameState>,
    pub new_entries: Vec<ActionEntry>,
}

impl ActionResult {
    pub fn accepted(state: GameState, new_entries: Vec<ActionEntry>) -> Self {
        ActionResult {
            success: true,
            reason: None,
            state: Some(state),
            new_entries,
        }
    }

    pub fn rejected(error: &EngineError) -> Self {
        ActionResult {
            success: false,
            reason: Some(error.to_string()),
            state: None,
            new_entries: Vec::new(),
        }
    }
}

/// Submit one action. Unknown cards, missions, groups or personnel are 404,
/// every other rejection is 400.
#[openapi]
#[post("/action", format = "json", data = "<request>")]
pub async fn play(
    engine: &State<SharedEngine>,
    request: Json<ActionRequest>,
) -> Result<
    (rocket::http::Status, Json<ActionResult>),
    Either<NotFound<Json<Status>>, BadRequest<Json<Status>>>,
> {
    let mut engine = engine.lock().await;
    match engine.process(request.0) {
        Ok(new_entries) => Ok((
            rocket::http::Status::Created,
            Json(ActionResult::accepted(engine.snapshot(), new_entries)),
        )),
        Err(e) if e.is_not_found() => Err(Left(NotFound(new_status(e)))),
        Err(e) => Err(Right(BadRequest(new_status(e)))),
    }
}
