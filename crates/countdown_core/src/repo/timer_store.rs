//! Ordered in-memory timer collection mirrored to an optional slot.
//!
//! # Responsibility
//! - Own every `Timer` instance exclusively.
//! - Assign ids on create; delete and replace by id.
//! - Mirror each mutation to the injected persistence collaborator.
//!
//! # Invariants
//! - Insertion order is the only order; nothing is ever sorted.
//! - Ids are unique within the store.
//! - Persistence is best-effort: load/save failures are logged and swallowed,
//!   and a failed load yields an empty store.

use crate::model::timer::{Timer, TimerDraft, TimerId};
use crate::repo::slot_persistence::{NullPersistence, TimerPersistence};
use log::{debug, info, warn};
use uuid::Uuid;

/// Ordered timer collection.
pub struct TimerStore<P: TimerPersistence = NullPersistence> {
    timers: Vec<Timer>,
    persistence: P,
}

impl TimerStore<NullPersistence> {
    /// Creates an empty store without persistence.
    pub fn new() -> Self {
        Self {
            timers: Vec::new(),
            persistence: NullPersistence,
        }
    }
}

impl Default for TimerStore<NullPersistence> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: TimerPersistence> TimerStore<P> {
    /// Creates a store seeded from `persistence`.
    ///
    /// # Side effects
    /// - Reads the slot once. Malformed or unreadable data is logged and
    ///   replaced by an empty list; the slot itself is left untouched until
    ///   the next mutation.
    pub fn load(persistence: P) -> Self {
        let timers = match persistence.load() {
            Ok(timers) => {
                info!(
                    "event=store_load module=repo status=ok count={}",
                    timers.len()
                );
                timers
            }
            Err(err) => {
                warn!("event=store_load module=repo status=error fallback=empty error={err}");
                Vec::new()
            }
        };

        Self {
            timers,
            persistence,
        }
    }

    /// Appends a new timer with a freshly assigned id and returns it.
    pub fn create(&mut self, draft: TimerDraft) -> Timer {
        let id = self.fresh_id();
        let timer = draft.into_timer(id);
        self.timers.push(timer.clone());
        debug!(
            "event=timer_create module=repo status=ok timer_id={} kind={}",
            id,
            timer.kind.label()
        );
        self.persist();
        timer
    }

    /// Removes the timer with `id`. Absent ids are a no-op.
    ///
    /// Returns whether a record was removed.
    pub fn delete(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.id != id);
        let removed = self.timers.len() != before;
        if removed {
            debug!("event=timer_delete module=repo status=ok timer_id={id}");
            self.persist();
        }
        removed
    }

    /// Overwrites the record sharing `timer.id`, keeping its position.
    ///
    /// Absent ids are a no-op. Returns whether a record was replaced.
    pub fn replace(&mut self, timer: Timer) -> bool {
        let Some(slot) = self.timers.iter_mut().find(|current| current.id == timer.id) else {
            return false;
        };
        debug!(
            "event=timer_replace module=repo status=ok timer_id={}",
            timer.id
        );
        *slot = timer;
        self.persist();
        true
    }

    pub fn get(&self, id: TimerId) -> Option<&Timer> {
        self.timers.iter().find(|timer| timer.id == id)
    }

    /// Timers in insertion order.
    pub fn timers(&self) -> &[Timer] {
        &self.timers
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    fn fresh_id(&self) -> TimerId {
        loop {
            let candidate = Uuid::new_v4();
            if self.get(candidate).is_none() {
                return candidate;
            }
        }
    }

    fn persist(&self) {
        if let Err(err) = self.persistence.save(&self.timers) {
            warn!(
                "event=store_save module=repo status=error count={} error={err}",
                self.timers.len()
            );
        }
    }
}
