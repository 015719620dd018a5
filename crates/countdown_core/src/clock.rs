//! Wall-clock sources for tick evaluation.
//!
//! # Invariants
//! - Instants are host-local wall-clock date-times; no timezone math happens
//!   beyond what the host clock reports.

use chrono::{Duration, Local, NaiveDateTime};
use std::cell::Cell;
use std::rc::Rc;

/// Source of "now" for the engine and the creation boundary.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Host local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Manually driven clock for tests and simulations.
///
/// Clones share the same instant, so a caller can keep one handle and
/// advance time under a session that owns another.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Rc<Cell<NaiveDateTime>>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Rc::new(Cell::new(now)),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.now.get()
    }
}
