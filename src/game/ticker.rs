//! Countdown refresh scheduling.
//!
//! The shell runs a one-second interval while anything is subscribed and
//! calls [`TickScheduler::tick`] on each firing. Views subscribe to a slot
//! when they mount and hold the returned [`TickSubscription`]; dropping it
//! (unmount, an early `?` return, a panic unwinding) releases the entry, so
//! no countdown outlives the view that asked for it.
//!
//! Each tick derives every view from a single `now`. Entries whose session
//! has completed keep their last view and are not recomputed until the slot
//! starts a new session; entries whose slot went idle or disappeared are
//! released.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use log::debug;
use serde::Serialize;

use crate::game::clock::Timestamp;
use crate::game::countdown::CountdownView;
use crate::game::slots::{SlotId, SlotRegistry};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotCountdown {
    pub slot: SlotId,
    #[serde(flatten)]
    pub view: CountdownView,
}

#[derive(Debug)]
struct Entry {
    slot: SlotId,
    /// Target the cached view was derived for.
    target: Option<Timestamp>,
    last: Option<CountdownView>,
}

type Entries = Rc<RefCell<BTreeMap<u64, Entry>>>;

#[derive(Debug, Default)]
pub struct TickScheduler {
    entries: Entries,
    next_key: u64,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start refreshing `slot`'s countdown until the subscription is dropped.
    pub fn subscribe(&mut self, slot: SlotId) -> TickSubscription {
        let key = self.next_key;
        self.next_key += 1;
        self.entries.borrow_mut().insert(
            key,
            Entry {
                slot,
                target: None,
                last: None,
            },
        );
        debug!("tick subscription {} for slot {}", key, slot);
        TickSubscription {
            key,
            slot,
            entries: Rc::downgrade(&self.entries),
        }
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Release every subscription. Outstanding handles report inactive and
    /// their drop becomes a no-op.
    pub fn clear(&self) {
        let released = {
            let mut entries = self.entries.borrow_mut();
            let n = entries.len();
            entries.clear();
            n
        };
        if released > 0 {
            debug!("released {} tick subscription(s)", released);
        }
    }

    /// Nothing to refresh. The shell can clear its interval.
    pub fn is_idle(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Refresh every live subscription against one `now` snapshot.
    pub fn tick(&self, registry: &SlotRegistry, now: Timestamp) -> Vec<SlotCountdown> {
        let mut entries = self.entries.borrow_mut();
        let mut out = Vec::with_capacity(entries.len());

        entries.retain(|key, entry| {
            let Ok(slot) = registry.get_slot(entry.slot) else {
                debug!("releasing tick {}: slot {} is gone", key, entry.slot);
                return false;
            };
            let target = slot.training_target();
            if target.is_none() {
                debug!("releasing tick {}: slot {} is idle", key, entry.slot);
                return false;
            }

            let cached_complete = entry.target == target
                && entry.last.as_ref().is_some_and(|v| v.is_complete);
            if !cached_complete {
                entry.last = slot.countdown(now);
                entry.target = target;
            }
            if let Some(view) = &entry.last {
                out.push(SlotCountdown {
                    slot: entry.slot,
                    view: view.clone(),
                });
            }
            true
        });

        out
    }
}

/// Keeps a countdown refreshing. Dropping it cancels the refresh.
#[derive(Debug)]
pub struct TickSubscription {
    key: u64,
    slot: SlotId,
    entries: Weak<RefCell<BTreeMap<u64, Entry>>>,
}

impl TickSubscription {
    pub fn slot(&self) -> SlotId {
        self.slot
    }

    /// Whether the scheduler is still refreshing this subscription.
    pub fn is_active(&self) -> bool {
        let Some(entries) = self.entries.upgrade() else {
            return false;
        };
        let active = entries.borrow().contains_key(&self.key);
        active
    }

    /// Last view computed for this subscription, if any.
    pub fn last(&self) -> Option<CountdownView> {
        let entries = self.entries.upgrade()?;
        let last = entries.borrow().get(&self.key).and_then(|e| e.last.clone());
        last
    }
}

impl Drop for TickSubscription {
    fn drop(&mut self) {
        if let Some(entries) = self.entries.upgrade() {
            // try_borrow_mut: a drop during `tick` must not panic.
            if let Ok(mut entries) = entries.try_borrow_mut() {
                entries.remove(&self.key);
            }
        }
    }
}
