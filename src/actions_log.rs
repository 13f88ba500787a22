use rocket::serde::json::Json;
use rocket_okapi::openapi;

use crate::engine::{ActionEntry, SharedEngine};

#[derive(rocket::serde::Serialize, rocket::serde::Deserialize, rocket_okapi::JsonSchema, Debug)]
#[serde(crate = "rocket::serde")]
pub struct ActionLogResponse {
    pub entries: Vec<ActionEntry>,
    pub next_seq: Option<u64>,
    pub limit: usize,
}

/// Page through the action log, optionally from a sequence number and for one action type.
#[openapi]
#[get("/actions/log?<from_seq>&<limit>&<action_type>")]
pub async fn list_actions_log(
    from_seq: Option<u64>,
    limit: Option<usize>,
    action_type: Option<String>,
    engine: &rocket::State<SharedEngine>,
) -> Json<ActionLogResponse> {
    let engine = engine.lock().await;
    Json(page(
        engine.log().entries(),
        from_seq,
        limit,
        action_type.as_deref(),
    ))
}

fn page(
    entries: &[ActionEntry],
    from_seq: Option<u64>,
    limit: Option<usize>,
    action_type: Option<&str>,
) -> ActionLogResponse {
    let mut filtered: Vec<ActionEntry> = entries
        .iter()
        .filter(|e| {
            if let Some(f) = from_seq {
                if e.seq < f {
                    return false;
                }
            }
            if let Some(at) = action_type {
                if e.action_type != at {
                    return false;
                }
            }
            true
        })
        .cloned()
        .collect();
    let max = limit.unwrap_or(1000);
    let has_more = filtered.len() > max;
    filtered.truncate(max);
    let next_seq = if has_more {
        filtered.last().map(|e| e.seq + 1)
    } else {
        None
    };
    ActionLogResponse {
        entries: filtered,
        next_seq,
        limit: max,
    }
}
