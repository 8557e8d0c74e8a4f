//! Pet slot registry.
//!
//! Holds at most `capacity` slots in insertion order. Each slot owns an
//! optional training session; the session lifecycle itself lives in
//! `game::training`. Every mutating method validates first and commits last,
//! so a rejected call leaves the registry untouched.

use std::fmt;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::MAX_PET_SLOTS;
use crate::error::{EngineError, Result};
use crate::game::clock::Timestamp;
use crate::game::training::TrainingSession;

/// Longest pet name kept after trimming.
const PET_NAME_MAX: usize = 24;

/// Stable slot identifier. Never reused within one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(pub u32);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetSlot {
    pub id: SlotId,
    /// Display name of the pet assigned to this slot, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pet: Option<String>,
    #[serde(flatten)]
    pub(crate) training: Option<TrainingSession>,
}

impl PetSlot {
    fn new(id: SlotId) -> Self {
        Self {
            id,
            pet: None,
            training: None,
        }
    }

    /// When the current training session completes. `None` while idle.
    pub fn training_target(&self) -> Option<Timestamp> {
        self.training.map(|t| t.target_ms)
    }

    pub fn training(&self) -> Option<&TrainingSession> {
        self.training.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRegistry {
    slots: Vec<PetSlot>,
    capacity: usize,
    next_id: u32,
}

impl Default for SlotRegistry {
    fn default() -> Self {
        Self::with_capacity(MAX_PET_SLOTS)
    }
}

impl SlotRegistry {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            next_id: 1,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.capacity
    }

    /// Open a new, idle slot.
    pub fn create_slot(&mut self) -> Result<SlotId> {
        if self.is_full() {
            return Err(EngineError::CapacityExceeded { max: self.capacity });
        }
        let id = SlotId(self.next_id);
        self.next_id = self.next_id.checked_add(1).ok_or(EngineError::IdsExhausted)?;
        self.slots.push(PetSlot::new(id));
        info!("created pet slot {} ({}/{})", id, self.slots.len(), self.capacity);
        Ok(id)
    }

    /// Free a slot. Any running training session is discarded without reward.
    pub fn remove_slot(&mut self, id: SlotId) -> Result<PetSlot> {
        let idx = self.index_of(id)?;
        let removed = self.slots.remove(idx);
        if removed.training.is_some() {
            info!("removed pet slot {} and discarded its training session", id);
        } else {
            info!("removed pet slot {}", id);
        }
        Ok(removed)
    }

    pub fn get_slot(&self, id: SlotId) -> Result<&PetSlot> {
        self.slots
            .iter()
            .find(|s| s.id == id)
            .ok_or(EngineError::NotFound(id))
    }

    pub(crate) fn get_slot_mut(&mut self, id: SlotId) -> Result<&mut PetSlot> {
        self.slots
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(EngineError::NotFound(id))
    }

    /// All slots, oldest first.
    pub fn list_slots(&self) -> &[PetSlot] {
        &self.slots
    }

    pub(crate) fn slots_mut(&mut self) -> impl Iterator<Item = &mut PetSlot> {
        self.slots.iter_mut()
    }

    /// Attach (or rename) the pet living in a slot. Blank names clear it.
    pub fn assign_pet(&mut self, id: SlotId, name: &str) -> Result<()> {
        let slot = self.get_slot_mut(id)?;
        let trimmed: String = name.trim().chars().take(PET_NAME_MAX).collect();
        slot.pet = if trimmed.is_empty() { None } else { Some(trimmed) };
        debug!("slot {} pet is now {:?}", id, slot.pet);
        Ok(())
    }

    /// Adopt the running config's capacity for an imported registry.
    pub(crate) fn rebase_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
    }

    /// Check the invariants of a registry that came from outside (an imported
    /// snapshot), since deserialization alone can't enforce them.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.next_id == 0 || self.next_id == u32::MAX {
            return Err(EngineError::Snapshot(format!("next id {} out of range", self.next_id)));
        }
        if self.slots.len() > self.capacity {
            return Err(EngineError::Snapshot(format!(
                "{} slots exceed capacity {}",
                self.slots.len(),
                self.capacity
            )));
        }
        let mut seen: Vec<SlotId> = Vec::with_capacity(self.slots.len());
        for slot in &self.slots {
            if seen.contains(&slot.id) {
                return Err(EngineError::Snapshot(format!("duplicate slot id {}", slot.id)));
            }
            if slot.id.0 >= self.next_id {
                return Err(EngineError::Snapshot(format!(
                    "slot id {} not below next id {}",
                    slot.id, self.next_id
                )));
            }
            seen.push(slot.id);
        }
        Ok(())
    }

    fn index_of(&self, id: SlotId) -> Result<usize> {
        self.slots
            .iter()
            .position(|s| s.id == id)
            .ok_or(EngineError::NotFound(id))
    }
}
