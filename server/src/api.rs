//! Action-dispatch HTTP API
//!
//! A single endpoint keyed by an `action` field: GET actions read query
//! parameters, POST actions read a JSON body. Responses are JSON with the
//! wire field names the browser client expects.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use powerclash_engine::{
    Arena, AttackOutcome, BattleId, Catalog, EngineError, EpochMs, PlayerDelta, PlayerId,
    PlayerStore, PowerId, PowerOutcome, PowerType, SEARCH_REFUND_MONEY,
};
use serde_json::{json, Value};
use tiny_http::{Header, Method, Request, Response};

use crate::store::MemoryStore;

pub struct Api {
    arena: Arc<Arena>,
    store: Arc<MemoryStore>,
    catalog: Arc<Catalog>,
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> EpochMs {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

impl Api {
    pub fn new(arena: Arc<Arena>, store: Arc<MemoryStore>, catalog: Arc<Catalog>) -> Self {
        Self {
            arena,
            store,
            catalog,
        }
    }

    pub fn handle(&self, mut request: Request) {
        let method = request.method().clone();
        let url = request.url().to_string();
        let query = parse_query(&url);

        let (status, body) = match method {
            Method::Options => (200, Value::Null),
            Method::Get => self.dispatch_get(&query),
            Method::Post => {
                let mut raw = String::new();
                if request.as_reader().read_to_string(&mut raw).is_err() {
                    respond(request, 400, json!({"error": "unreadable body"}));
                    return;
                }
                match serde_json::from_str::<Value>(if raw.is_empty() { "{}" } else { &raw }) {
                    Ok(body) => self.dispatch_post(&body),
                    Err(_) => (400, json!({"error": "invalid JSON body"})),
                }
            }
            _ => (405, json!({"error": "method not allowed"})),
        };

        log::debug!("{method} {url} -> {status}");
        respond(request, status, body);
    }

    fn dispatch_get(&self, query: &HashMap<String, String>) -> (u32, Value) {
        let action = query.get("action").map(String::as_str).unwrap_or("");
        match action {
            "check_match" => {
                let Some(user_id) = param_u32(query, "user_id") else {
                    return missing("user_id");
                };
                (200, json!(self.arena.check_match(user_id)))
            }
            "battle_state" => {
                let Some(battle_id) = param_u64(query, "battle_id") else {
                    return missing("battle_id");
                };
                match self.arena.battle_state(battle_id) {
                    Ok(view) => (200, json!(view)),
                    Err(err) => error_response(&err),
                }
            }
            "get_user_powers" => {
                let Some(user_id) = param_u32(query, "user_id") else {
                    return missing("user_id");
                };
                let powers = self.store.equipped_powers(user_id);
                (200, json!({"success": true, "powers": powers}))
            }
            "catalog" => (200, json!({"powers": self.catalog.powers()})),
            _ => (400, json!({"error": "invalid action"})),
        }
    }

    fn dispatch_post(&self, body: &Value) -> (u32, Value) {
        let action = body.get("action").and_then(Value::as_str).unwrap_or("");
        let user_id = body.get("user_id").and_then(Value::as_u64).map(|v| v as PlayerId);

        match action {
            "find_match" => {
                let Some(user_id) = user_id else {
                    return missing("user_id");
                };
                self.find_match(user_id)
            }
            "cancel_search" => {
                let Some(user_id) = user_id else {
                    return missing("user_id");
                };
                self.cancel_search(user_id)
            }
            "attack" => {
                let (Some(user_id), Some(battle_id)) = (user_id, body_u64(body, "battle_id"))
                else {
                    return missing("user_id/battle_id");
                };
                match self.arena.attack(battle_id, user_id, now_ms()) {
                    Ok(outcome) => (200, attack_response(&outcome)),
                    Err(err) => error_response(&err),
                }
            }
            "use_power" => {
                let (Some(user_id), Some(battle_id), Some(power_id)) = (
                    user_id,
                    body_u64(body, "battle_id"),
                    body_u64(body, "power_id").map(|v| v as PowerId),
                ) else {
                    return missing("user_id/battle_id/power_id");
                };
                self.use_power(battle_id, user_id, power_id)
            }
            "spin" => {
                let Some(user_id) = user_id else {
                    return missing("user_id");
                };
                self.spin(user_id)
            }
            _ => (400, json!({"error": "invalid action"})),
        }
    }

    fn find_match(&self, user_id: PlayerId) -> (u32, Value) {
        match self.arena.find_match(user_id, now_ms()) {
            Ok(view) => {
                let mut value = json!(view);
                if !view.matched {
                    value["searching"] = json!(true);
                }
                (200, value)
            }
            Err(err) => error_response(&err),
        }
    }

    fn cancel_search(&self, user_id: PlayerId) -> (u32, Value) {
        // The refund belongs to the API layer, never the queue, and only a
        // removed entry earns it.
        let removed = self.arena.cancel_search(user_id);
        let reward = if removed {
            if let Err(err) = self.store.apply(user_id, PlayerDelta::search_refund()) {
                return error_response(&err);
            }
            SEARCH_REFUND_MONEY
        } else {
            0
        };
        let money = self.store.record(user_id).money;
        (
            200,
            json!({"success": true, "reward": reward, "money": money}),
        )
    }

    fn use_power(&self, battle_id: BattleId, user_id: PlayerId, power_id: PowerId) -> (u32, Value) {
        match self.arena.use_power(battle_id, user_id, power_id, now_ms()) {
            Ok(PowerOutcome::Struck(outcome)) => (200, attack_response(&outcome)),
            Ok(PowerOutcome::Shielded { duration_secs, .. }) => (
                200,
                json!({
                    "success": true,
                    "message": format!("Shield active for {duration_secs}s"),
                }),
            ),
            Ok(PowerOutcome::CounterArmed { .. }) => (
                200,
                json!({"success": true, "message": "Counter active for 3s"}),
            ),
            Err(err) => error_response(&err),
        }
    }

    fn spin(&self, user_id: PlayerId) -> (u32, Value) {
        match self.arena.spin(user_id) {
            Ok(power) => (
                200,
                json!({
                    "success": true,
                    "power": {
                        "id": power.id,
                        "name": power.name,
                        "rarity": power.rarity,
                        "effect": effect_text(&power),
                    },
                }),
            ),
            Err(err) => error_response(&err),
        }
    }
}

fn attack_response(outcome: &AttackOutcome) -> Value {
    let mut value = json!(outcome);
    value["success"] = json!(true);
    if outcome.blocked {
        value["message"] = json!("Attack blocked by shield!");
    } else if outcome.countered {
        value["message"] = json!(format!(
            "Countered! You took {} damage",
            outcome.damage_taken
        ));
    }
    value
}

fn effect_text(power: &powerclash_engine::Power) -> String {
    match power.power_type {
        PowerType::Attack => format!("Deals {} damage", power.damage),
        PowerType::Defense => format!("Blocks attacks for {}s", power.shield_duration_secs),
        PowerType::Counter => format!("Reflects {} damage", power.damage),
    }
}

fn error_response(err: &EngineError) -> (u32, Value) {
    let status = match err {
        EngineError::BattleNotFound { .. } | EngineError::UnknownPlayer { .. } => 404,
        EngineError::NotAParticipant { .. } => 403,
        _ => 400,
    };
    (status, json!({"error": err.to_string()}))
}

fn missing(field: &str) -> (u32, Value) {
    (400, json!({"error": format!("missing {field}")}))
}

fn param_u32(query: &HashMap<String, String>, key: &str) -> Option<u32> {
    query.get(key)?.parse().ok()
}

fn param_u64(query: &HashMap<String, String>, key: &str) -> Option<u64> {
    query.get(key)?.parse().ok()
}

fn body_u64(body: &Value, key: &str) -> Option<u64> {
    body.get(key)?.as_u64()
}

fn parse_query(url: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    if let Some((_, raw)) = url.split_once('?') {
        for pair in raw.split('&') {
            if let Some((key, value)) = pair.split_once('=') {
                params.insert(key.to_string(), value.to_string());
            }
        }
    }
    params
}

fn respond(request: Request, status: u32, body: Value) {
    let payload = if body.is_null() {
        String::new()
    } else {
        body.to_string()
    };
    let response = Response::from_string(payload)
        .with_status_code(status as u16)
        .with_header(header("Content-Type", "application/json"))
        .with_header(header("Access-Control-Allow-Origin", "*"))
        .with_header(header(
            "Access-Control-Allow-Headers",
            "Content-Type, X-User-Id",
        ))
        .with_header(header(
            "Access-Control-Allow-Methods",
            "GET, POST, OPTIONS",
        ));
    if let Err(err) = request.respond(response) {
        log::warn!("failed to send response: {err}");
    }
}

fn header(name: &str, value: &str) -> Header {
    Header::from_bytes(name.as_bytes(), value.as_bytes()).expect("static header is valid")
}
