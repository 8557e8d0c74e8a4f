//! Pixel Pets in-browser WASM engine.
//!
//! The Telegram mini-app loads this module in a Web Worker. The worker calls
//! `handle_request(method, path, query, body)` for every HTMX request and
//! `navigate(path)` whenever the page is opened on a deep link. Uses
//! `matchit` for URL routing, the same router engine that powers Axum.
//!
//! Game state (pet slots, training sessions, the active tab) is owned by one
//! `game::state::Engine` per worker. Admin economy settings go through
//! `admin::config_client` and never touch the engine.

use wasm_bindgen::prelude::*;

pub mod admin;
pub mod config;
pub mod error;
pub mod game;
pub mod host;
pub mod routes;

use crate::config::EngineConfig;
use crate::game::countdown::CountdownView;
use crate::game::slots::SlotId;
use crate::game::state::{Engine, replace_engine, with_engine, with_engine_mut};
use crate::game::ticker::TickSubscription;
use crate::host::HostEnvironment;

/// Process an HTTP-like request and return an HTML (or JSON) fragment.
///
/// # Arguments
/// * `method` — HTTP method ("GET" or "POST")
/// * `path`   — URL path (e.g., "/api/slots")
/// * `query`  — Query string (e.g., "?slot=1")
/// * `body`   — URL-encoded form body; empty for GET requests.
#[wasm_bindgen]
pub fn handle_request(method: &str, path: &str, query: &str, body: &str) -> String {
    let mut router = matchit::Router::new();

    router.insert("/api/slots", "slots").ok();
    router.insert("/api/training", "training").ok();
    router.insert("/api/training/countdown", "training_countdown").ok();
    router.insert("/api/tick", "tick").ok();
    router.insert("/api/screen", "screen").ok();
    router.insert("/api/state", "state").ok();
    router.insert("/api/state/persist", "state_persist").ok();
    router.insert("/api/state/restore", "state_restore").ok();
    router.insert("/api/state/import", "state_import").ok();

    match router.at(path) {
        Ok(matched) => match (*matched.value, method) {
            ("slots", "GET") => routes::slots::handle_slots_get(query),
            ("slots", "POST") => routes::slots::handle_slots_post(body),
            ("training", "POST") => routes::training::handle_training_post(body),
            ("training_countdown", "GET") => routes::training::handle_countdown_get(query),
            ("tick", "POST") => routes::training::handle_tick_post(body),
            ("screen", "GET") => routes::screen::handle_screen_get(query),
            ("screen", "POST") => routes::screen::handle_screen_post(body),
            ("state", "GET") => routes::state::handle_state_get(query),
            ("state_persist", "GET") => routes::state::handle_persist_get(query),
            ("state_restore", "POST") => routes::state::handle_restore_post(body),
            ("state_import", "POST") => routes::state::handle_import_post(body),
            _ => method_not_allowed(),
        },
        Err(_) => not_found(),
    }
}

/// Resolve a deep link. Sets the active tab first, then returns
/// `{"screen":..,"canonicalPath":"/","redirected":..}` so the shell can
/// `history.replaceState` before painting. Unknown paths return
/// `{"error":..}` and leave the active tab alone.
#[wasm_bindgen]
pub fn navigate(path: &str) -> String {
    match with_engine_mut(|e| e.navigate(path)) {
        Ok(nav) => serde_json::to_string(&nav).unwrap_or_else(|_| "{}".to_string()),
        Err(err) => serde_json::json!({ "error": err.to_string() }).to_string(),
    }
}

/// Replace the worker's engine with one built from a JSON config. Called
/// once at startup, before restoring persisted state. Returns "ok" or an
/// error message; on error the running engine is kept.
#[wasm_bindgen]
pub fn configure(config_json: &str) -> String {
    let built = EngineConfig::from_json(config_json)
        .and_then(|cfg| Engine::new(cfg, Box::new(game::clock::SystemClock)));
    match built {
        Ok(engine) => {
            replace_engine(engine);
            "ok".to_string()
        }
        Err(err) => {
            log::warn!("kept previous engine config: {}", err);
            format!("error: {}", err)
        }
    }
}

/// Whether the page is running inside the Telegram client.
#[wasm_bindgen]
pub fn is_telegram_host(init_data: &str, platform: &str) -> bool {
    HostEnvironment::detect(init_data, platform).is_telegram()
}

/// Interval the shell should use for `POST /api/tick`.
#[wasm_bindgen]
pub fn tick_interval_ms() -> u32 {
    with_engine(|e| e.config().tick_interval_ms.min(u32::MAX as u64) as u32)
}

/// Start watching a slot's countdown. The view keeps the handle while it is
/// mounted and calls `free()` when it unmounts, which stops the refresh.
/// Returns `undefined` for unknown slots.
#[wasm_bindgen]
pub fn watch_slot(slot: u32) -> Option<CountdownWatch> {
    with_engine_mut(|e| e.watch(SlotId(slot)))
        .ok()
        .map(|sub| CountdownWatch { sub })
}

#[wasm_bindgen]
pub struct CountdownWatch {
    sub: TickSubscription,
}

#[wasm_bindgen]
impl CountdownWatch {
    pub fn slot(&self) -> u32 {
        self.sub.slot().0
    }

    /// False once the slot went idle or was removed.
    pub fn is_active(&self) -> bool {
        self.sub.is_active()
    }

    /// Last refreshed `HH:MM:SS`, if a tick has run.
    pub fn formatted(&self) -> Option<String> {
        self.last().map(|v| v.formatted)
    }

    pub fn progress(&self) -> f64 {
        self.last().map(|v| v.progress).unwrap_or(0.0)
    }

    pub fn is_complete(&self) -> bool {
        self.last().is_some_and(|v| v.is_complete)
    }
}

impl CountdownWatch {
    fn last(&self) -> Option<CountdownView> {
        self.sub.last()
    }
}

fn not_found() -> String {
    r#"<span class="text-pp-red">404 — route not found</span>"#.to_string()
}

fn method_not_allowed() -> String {
    r#"<span class="text-pp-red">405 — method not allowed</span>"#.to_string()
}
