//! Card-level tick scheduling with per-card cancellation.
//!
//! # Responsibility
//! - Track which timers currently have a mounted card.
//! - Drive each mounted card on its own fixed interval.
//! - Cancel a card's ticking when it is unmounted or its timer is deleted.
//!
//! # Invariants
//! - Only mounted cards are evaluated; a deleted timer is never ticked again.
//! - A due card is evaluated once per `pump`, even after a long stall.
//! - All mutations run on the caller's thread; nothing here blocks.

use crate::clock::Clock;
use crate::model::timer::{Timer, TimerId};
use crate::repo::slot_persistence::TimerPersistence;
use crate::service::timer_service::{CreateTimerError, TimerInput, TimerService, TimerView};
use chrono::{Duration, NaiveDateTime};
use log::debug;
use std::collections::HashMap;

/// Mounted-card registry on top of a [`TimerService`].
pub struct TickSession<P: TimerPersistence, C: Clock> {
    service: TimerService<P, C>,
    next_due: HashMap<TimerId, NaiveDateTime>,
}

impl<P: TimerPersistence, C: Clock> TickSession<P, C> {
    pub fn new(service: TimerService<P, C>) -> Self {
        Self {
            service,
            next_due: HashMap::new(),
        }
    }

    /// Mounts a card for `id` and renders it immediately.
    ///
    /// Re-mounting an already mounted card restarts its interval. Returns
    /// `None` (and mounts nothing) when the timer does not exist.
    pub fn mount(&mut self, id: TimerId) -> Option<TimerView> {
        let view = self.service.tick(id)?;
        let first_due = self.after_interval(self.service.now());
        self.next_due.insert(id, first_due);
        debug!("event=card_mount module=session status=ok timer_id={id}");
        Some(view)
    }

    /// Mounts a card for every stored timer, in store order.
    pub fn mount_all(&mut self) -> Vec<TimerView> {
        let ids = self.timer_ids();
        ids.into_iter().filter_map(|id| self.mount(id)).collect()
    }

    /// Cancels the card's interval. Returns whether it was mounted.
    pub fn unmount(&mut self, id: TimerId) -> bool {
        let removed = self.next_due.remove(&id).is_some();
        if removed {
            debug!("event=card_unmount module=session status=ok timer_id={id}");
        }
        removed
    }

    pub fn is_mounted(&self, id: TimerId) -> bool {
        self.next_due.contains_key(&id)
    }

    pub fn mounted_count(&self) -> usize {
        self.next_due.len()
    }

    /// Creates a timer and mounts its card, like a list appending a card.
    pub fn create(&mut self, input: &TimerInput) -> Result<Timer, CreateTimerError> {
        let timer = self.service.create(input)?;
        self.mount(timer.id);
        Ok(timer)
    }

    /// Unmounts the card, then deletes the timer. Absent ids are a no-op.
    pub fn delete(&mut self, id: TimerId) -> bool {
        self.unmount(id);
        self.service.delete(id)
    }

    /// Evaluates every mounted card whose interval elapsed, in store order.
    ///
    /// A card that fell several intervals behind ticks once and is
    /// rescheduled one interval after "now".
    pub fn pump(&mut self) -> Vec<TimerView> {
        let now = self.service.now();
        let due: Vec<(TimerId, NaiveDateTime)> = self
            .timer_ids()
            .into_iter()
            .filter_map(|id| self.next_due.get(&id).map(|due_at| (id, *due_at)))
            .filter(|(_, due_at)| *due_at <= now)
            .collect();

        let mut views = Vec::with_capacity(due.len());
        for (id, due_at) in due {
            let Some(view) = self.service.tick(id) else {
                self.next_due.remove(&id);
                continue;
            };
            let mut next = self.after_interval(due_at);
            if next <= now {
                next = self.after_interval(now);
            }
            self.next_due.insert(id, next);
            views.push(view);
        }
        views
    }

    pub fn timers(&self) -> &[Timer] {
        self.service.timers()
    }

    pub fn service(&self) -> &TimerService<P, C> {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut TimerService<P, C> {
        &mut self.service
    }

    fn timer_ids(&self) -> Vec<TimerId> {
        self.service.timers().iter().map(|timer| timer.id).collect()
    }

    fn after_interval(&self, from: NaiveDateTime) -> NaiveDateTime {
        let millis = i64::try_from(self.service.config().tick_interval_ms).unwrap_or(i64::MAX);
        from.checked_add_signed(Duration::milliseconds(millis))
            .unwrap_or(NaiveDateTime::MAX)
    }
}
