//! Engine state container.
//!
//! [`Engine`] owns everything the progression engine mutates: the slot
//! registry, the screen selector and the tick scheduler, plus the clock and
//! config they run against. Native code and tests create and pass engines
//! explicitly. The WASM boundary keeps one in a `thread_local!` +
//! `RefCell`, which is safe in the single-threaded worker and keeps state
//! alive across `handle_request` calls for the whole session.

use std::cell::RefCell;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::game::clock::{Clock, SystemClock, Timestamp};
use crate::game::countdown::CountdownView;
use crate::game::screen::{Navigation, Screen, ScreenSelector};
use crate::game::slots::{SlotId, SlotRegistry};
use crate::game::ticker::{SlotCountdown, TickScheduler, TickSubscription};
use crate::game::training::{CompletedTraining, TrainingState};

/// Persisted form of the engine: what localStorage and the backend sync see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSnapshot {
    pub saved_at: Timestamp,
    pub registry: SlotRegistry,
    #[serde(default)]
    pub screen: ScreenSelector,
}

pub struct Engine {
    config: EngineConfig,
    registry: SlotRegistry,
    screen: ScreenSelector,
    scheduler: TickScheduler,
    clock: Box<dyn Clock>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::with_parts(EngineConfig::default(), Box::new(SystemClock))
    }
}

impl Engine {
    /// Build an engine from a validated config and a clock.
    pub fn new(config: EngineConfig, clock: Box<dyn Clock>) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_parts(config, clock))
    }

    fn with_parts(config: EngineConfig, clock: Box<dyn Clock>) -> Self {
        Self {
            config,
            registry: SlotRegistry::with_capacity(config.max_pet_slots),
            screen: ScreenSelector::default(),
            scheduler: TickScheduler::new(),
            clock,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now_ms()
    }

    pub fn registry(&self) -> &SlotRegistry {
        &self.registry
    }

    pub fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }

    // ── Slots ──────────────────────────────────────────────────────

    pub fn create_slot(&mut self) -> Result<SlotId> {
        self.registry.create_slot()
    }

    pub fn remove_slot(&mut self, id: SlotId) -> Result<()> {
        self.registry.remove_slot(id).map(|_| ())
    }

    pub fn assign_pet(&mut self, id: SlotId, name: &str) -> Result<()> {
        self.registry.assign_pet(id, name)
    }

    // ── Training ───────────────────────────────────────────────────

    pub fn start_training(&mut self, id: SlotId) -> Result<Timestamp> {
        let now = self.now();
        self.registry
            .start_training(id, now, self.config.training_duration_ms)
    }

    pub fn collect(&mut self, id: SlotId) -> Result<CompletedTraining> {
        let now = self.now();
        self.registry.collect(id, now)
    }

    pub fn training_state(&self, id: SlotId) -> Result<TrainingState> {
        self.registry.training_state(id, self.now())
    }

    pub fn countdown(&self, id: SlotId) -> Result<Option<CountdownView>> {
        Ok(self.registry.get_slot(id)?.countdown(self.now()))
    }

    // ── Countdown refresh ──────────────────────────────────────────

    /// Subscribe a mounted view to `id`'s countdown.
    pub fn watch(&mut self, id: SlotId) -> Result<TickSubscription> {
        self.registry.get_slot(id)?;
        Ok(self.scheduler.subscribe(id))
    }

    /// One refresh: a single clock read shared by every live countdown.
    pub fn tick(&self) -> Vec<SlotCountdown> {
        let now = self.now();
        self.scheduler.tick(&self.registry, now)
    }

    // ── Screens ────────────────────────────────────────────────────

    pub fn active_tab(&self) -> Screen {
        self.screen.active_tab()
    }

    pub fn set_active_tab(&mut self, tag: &str) -> Result<Screen> {
        self.screen.set_active_tab(tag)
    }

    pub fn navigate(&mut self, path: &str) -> Result<Navigation> {
        self.screen.navigate(path)
    }

    // ── Persistence ────────────────────────────────────────────────

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            saved_at: self.now(),
            registry: self.registry.clone(),
            screen: self.screen,
        }
    }

    /// Replace registry and screen with a snapshot. The snapshot is checked
    /// against this engine's capacity first; on error nothing changes.
    ///
    /// Sessions recorded with only a target get a start one configured
    /// training duration earlier. Live tick subscriptions are released, since
    /// their slot ids referred to the registry being replaced.
    pub fn restore(&mut self, snapshot: EngineSnapshot) -> Result<()> {
        let mut registry = snapshot.registry;
        registry.rebase_capacity(self.config.max_pet_slots);
        if let Err(e) = registry.validate() {
            warn!("rejected engine snapshot: {}", e);
            return Err(e);
        }
        registry.backfill_session_starts(self.config.training_duration_ms);
        info!("restored {} pet slot(s) from snapshot", registry.len());
        self.registry = registry;
        self.screen = snapshot.screen;
        self.scheduler.clear();
        Ok(())
    }

    pub fn export_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn import_json(&mut self, json: &str) -> Result<()> {
        let snapshot: EngineSnapshot = serde_json::from_str(json)
            .map_err(|e| EngineError::Snapshot(format!("invalid JSON: {}", e)))?;
        self.restore(snapshot)
    }

    /// URL-safe base64 of the JSON snapshot, for localStorage.
    pub fn encode_snapshot(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.export_json())
    }

    pub fn restore_encoded(&mut self, state_b64: &str) -> Result<()> {
        if state_b64.is_empty() {
            return Ok(());
        }
        let bytes = URL_SAFE_NO_PAD
            .decode(state_b64)
            .map_err(|e| EngineError::Snapshot(format!("base64 decode error: {}", e)))?;
        let json = String::from_utf8(bytes)
            .map_err(|e| EngineError::Snapshot(format!("not UTF-8: {}", e)))?;
        self.import_json(&json)
    }
}

thread_local! {
    static ENGINE: RefCell<Engine> = RefCell::new(Engine::default());
}

/// Execute a closure with read access to the worker's engine.
pub fn with_engine<F, R>(f: F) -> R
where
    F: FnOnce(&Engine) -> R,
{
    ENGINE.with(|e| f(&e.borrow()))
}

/// Execute a closure with mutable access to the worker's engine.
pub fn with_engine_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut Engine) -> R,
{
    ENGINE.with(|e| f(&mut e.borrow_mut()))
}

/// Swap in a new engine (startup config, tests).
pub fn replace_engine(engine: Engine) {
    ENGINE.with(|e| {
        *e.borrow_mut() = engine;
    });
}
