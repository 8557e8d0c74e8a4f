//! Training session state machine.
//!
//! ```text
//!   Idle ──start_training──▶ Training ──(now >= target)──▶ ReadyToCollect
//!    ▲                                                          │
//!    └────────────────────────── collect ───────────────────────┘
//! ```
//!
//! The `Training → ReadyToCollect` edge is observed, not fired: the state is
//! always computed from the stored target and the caller's `now`. Nothing
//! runs in the background to flip it.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::game::clock::Timestamp;
use crate::game::countdown::{self, CountdownView};
use crate::game::slots::{PetSlot, SlotId, SlotRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingState {
    Idle,
    Training,
    ReadyToCollect,
}

/// A running session attached to a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredSession")]
pub struct TrainingSession {
    #[serde(rename = "trainingStartedAt")]
    pub started_at_ms: Timestamp,
    #[serde(rename = "trainingTarget")]
    pub target_ms: Timestamp,
    /// Loaded from a record that only carried `trainingTarget`.
    #[serde(skip)]
    start_missing: bool,
}

/// Wire form. Backend records may omit the start time.
#[derive(Deserialize)]
struct StoredSession {
    #[serde(rename = "trainingStartedAt", default)]
    started_at_ms: Option<Timestamp>,
    #[serde(rename = "trainingTarget")]
    target_ms: Timestamp,
}

impl From<StoredSession> for TrainingSession {
    fn from(stored: StoredSession) -> Self {
        Self {
            started_at_ms: stored.started_at_ms.unwrap_or(stored.target_ms),
            target_ms: stored.target_ms,
            start_missing: stored.started_at_ms.is_none(),
        }
    }
}

impl TrainingSession {
    pub fn new(started_at_ms: Timestamp, target_ms: Timestamp) -> Self {
        Self {
            started_at_ms,
            target_ms,
            start_missing: false,
        }
    }

    pub fn duration_ms(&self) -> u64 {
        self.target_ms.saturating_sub(self.started_at_ms)
    }

    /// Place a start time that was missing on load `duration_ms` before the
    /// target.
    fn backfill_start(&mut self, duration_ms: u64) -> bool {
        if !self.start_missing {
            return false;
        }
        self.started_at_ms = self.target_ms.saturating_sub(duration_ms);
        self.start_missing = false;
        true
    }
}

/// Handed back by [`SlotRegistry::collect`] so the reward layer can credit
/// the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedTraining {
    pub slot: SlotId,
    pub started_at_ms: Timestamp,
    pub finished_at_ms: Timestamp,
    pub collected_at_ms: Timestamp,
}

impl PetSlot {
    pub fn training_state(&self, now: Timestamp) -> TrainingState {
        match self.training {
            None => TrainingState::Idle,
            Some(t) if now >= t.target_ms => TrainingState::ReadyToCollect,
            Some(_) => TrainingState::Training,
        }
    }

    /// Countdown for this slot's session, using the session's own length as
    /// the progress denominator. `None` while idle.
    pub fn countdown(&self, now: Timestamp) -> Option<CountdownView> {
        let t = self.training?;
        countdown::derive_with_duration(Some(t.target_ms), now, t.duration_ms())
    }
}

impl SlotRegistry {
    pub fn training_state(&self, id: SlotId, now: Timestamp) -> Result<TrainingState> {
        Ok(self.get_slot(id)?.training_state(now))
    }

    /// Start a session of `duration_ms` on an idle slot. Returns the target.
    pub fn start_training(
        &mut self,
        id: SlotId,
        now: Timestamp,
        duration_ms: u64,
    ) -> Result<Timestamp> {
        let slot = self.get_slot_mut(id)?;
        if slot.training.is_some() {
            warn!("slot {} asked to train while {:?}", id, slot.training_state(now));
            return Err(EngineError::AlreadyTraining(id));
        }
        let target_ms = now.saturating_add(duration_ms);
        slot.training = Some(TrainingSession::new(now, target_ms));
        debug!("slot {} training until {}", id, target_ms);
        Ok(target_ms)
    }

    /// Give sessions loaded without a start time one `duration_ms` before
    /// their target, so progress has a denominator.
    pub(crate) fn backfill_session_starts(&mut self, duration_ms: u64) {
        for slot in self.slots_mut() {
            if let Some(session) = slot.training.as_mut() {
                if session.backfill_start(duration_ms) {
                    debug!(
                        "slot {} session start backfilled to {}",
                        slot.id, session.started_at_ms
                    );
                }
            }
        }
    }

    /// Take the finished session off a slot, returning it to idle.
    pub fn collect(&mut self, id: SlotId, now: Timestamp) -> Result<CompletedTraining> {
        let slot = self.get_slot_mut(id)?;
        let session = match slot.training {
            Some(t) if now >= t.target_ms => t,
            _ => {
                warn!("slot {} collected while {:?}", id, slot.training_state(now));
                return Err(EngineError::NotReady(id));
            }
        };
        slot.training = None;
        debug!("slot {} collected, back to idle", id);
        Ok(CompletedTraining {
            slot: id,
            started_at_ms: session.started_at_ms,
            finished_at_ms: session.target_ms,
            collected_at_ms: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MAX_PET_SLOTS, TRAINING_DURATION_MS};

    fn registry_with(n: usize) -> (SlotRegistry, Vec<SlotId>) {
        let mut reg = SlotRegistry::default();
        let ids = (0..n).map(|_| reg.create_slot().unwrap()).collect();
        (reg, ids)
    }

    #[test]
    fn full_cycle_scenario() {
        let (mut reg, ids) = registry_with(MAX_PET_SLOTS);
        let slot1 = ids[0];

        let target = reg.start_training(slot1, 0, TRAINING_DURATION_MS).unwrap();
        assert_eq!(target, 86_400_000);
        assert_eq!(reg.get_slot(slot1).unwrap().training_target(), Some(86_400_000));
        assert_eq!(reg.training_state(slot1, 0).unwrap(), TrainingState::Training);

        let now = 86_400_000;
        let view = countdown::derive(reg.get_slot(slot1).unwrap().training_target(), now).unwrap();
        assert_eq!(view.time_left_ms, 0);
        assert_eq!(view.formatted, "00:00:00");
        assert_eq!(view.progress, 1.0);
        assert!(view.is_complete);
        assert_eq!(reg.training_state(slot1, now).unwrap(), TrainingState::ReadyToCollect);

        let done = reg.collect(slot1, now).unwrap();
        assert_eq!(done.slot, slot1);
        assert_eq!(done.finished_at_ms, 86_400_000);
        assert_eq!(reg.training_state(slot1, now).unwrap(), TrainingState::Idle);
        assert_eq!(reg.get_slot(slot1).unwrap().training_target(), None);
    }

    #[test]
    fn double_start_is_rejected() {
        let (mut reg, ids) = registry_with(1);
        reg.start_training(ids[0], 0, TRAINING_DURATION_MS).unwrap();
        assert_eq!(
            reg.start_training(ids[0], 10, TRAINING_DURATION_MS),
            Err(EngineError::AlreadyTraining(ids[0]))
        );
        // Still rejected once the session is ready but uncollected.
        assert_eq!(
            reg.start_training(ids[0], TRAINING_DURATION_MS, TRAINING_DURATION_MS),
            Err(EngineError::AlreadyTraining(ids[0]))
        );
        assert_eq!(reg.get_slot(ids[0]).unwrap().training_target(), Some(TRAINING_DURATION_MS));
    }

    #[test]
    fn collect_before_target_is_not_ready() {
        let (mut reg, ids) = registry_with(1);
        reg.start_training(ids[0], 0, TRAINING_DURATION_MS).unwrap();
        assert_eq!(
            reg.collect(ids[0], TRAINING_DURATION_MS - 1),
            Err(EngineError::NotReady(ids[0]))
        );
        assert_eq!(reg.training_state(ids[0], 5).unwrap(), TrainingState::Training);
    }

    #[test]
    fn collect_on_idle_is_not_ready() {
        let (mut reg, ids) = registry_with(1);
        assert_eq!(reg.collect(ids[0], 0), Err(EngineError::NotReady(ids[0])));
    }

    #[test]
    fn cycle_repeats() {
        let (mut reg, ids) = registry_with(1);
        let mut now = 0;
        for _ in 0..3 {
            reg.start_training(ids[0], now, 1_000).unwrap();
            now += 1_000;
            reg.collect(ids[0], now).unwrap();
        }
        assert_eq!(reg.training_state(ids[0], now).unwrap(), TrainingState::Idle);
    }

    #[test]
    fn removing_a_training_slot_discards_the_session() {
        let (mut reg, ids) = registry_with(2);
        reg.start_training(ids[0], 0, TRAINING_DURATION_MS).unwrap();
        let removed = reg.remove_slot(ids[0]).unwrap();
        assert!(removed.training().is_some());
        assert_eq!(reg.collect(ids[0], TRAINING_DURATION_MS), Err(EngineError::NotFound(ids[0])));
    }

    #[test]
    fn target_only_record_gets_backfilled_start() {
        let json = r#"{"slots":[{"id":1,"trainingTarget":50000},{"id":2,"trainingStartedAt":0,"trainingTarget":50000}],"capacity":3,"nextId":3}"#;
        let mut reg: SlotRegistry = serde_json::from_str(json).unwrap();
        assert_eq!(reg.get_slot(SlotId(1)).unwrap().training_target(), Some(50_000));

        reg.backfill_session_starts(10_000);
        let backfilled = reg.get_slot(SlotId(1)).unwrap().training().copied().unwrap();
        assert_eq!(backfilled, TrainingSession::new(40_000, 50_000));
        // A recorded start of 0 is kept as is.
        let recorded = reg.get_slot(SlotId(2)).unwrap().training().copied().unwrap();
        assert_eq!(recorded, TrainingSession::new(0, 50_000));

        let view = reg.get_slot(SlotId(1)).unwrap().countdown(45_000).unwrap();
        assert!((view.progress - 0.5).abs() < 1e-9);

        let out = serde_json::to_string(&reg).unwrap();
        assert!(out.contains(r#"{"id":1,"trainingStartedAt":40000,"trainingTarget":50000}"#));
    }

    #[test]
    fn slot_countdown_uses_session_length() {
        let (mut reg, ids) = registry_with(1);
        reg.start_training(ids[0], 1_000, 4_000).unwrap();
        let slot = reg.get_slot(ids[0]).unwrap();
        let view = slot.countdown(3_000).unwrap();
        assert_eq!(view.time_left_ms, 2_000);
        assert!((view.progress - 0.5).abs() < 1e-9);

        reg.collect(ids[0], 5_000).unwrap();
        assert_eq!(reg.get_slot(ids[0]).unwrap().countdown(5_000), None);
    }
}
