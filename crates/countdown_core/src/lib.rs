//! Core domain logic for countdown timers.
//! This crate is the single source of truth for timer lifecycle invariants.

pub mod clock;
pub mod config;
pub mod date_math;
pub mod db;
pub mod engine;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, CoreConfig};
pub use date_math::{days_in_month, decompose, next_occurrence, RemainingTime};
pub use engine::{classify, evaluate, roll_forward, Evaluation, TimerState};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::timer::{
    parse_timer_id, Timer, TimerDraft, TimerId, TimerKind, TimerValidationError,
};
pub use repo::slot_persistence::{
    MemorySlot, NullPersistence, PersistError, PersistResult, SqliteSlotPersistence,
    TimerPersistence,
};
pub use repo::timer_store::TimerStore;
pub use service::tick_session::TickSession;
pub use service::timer_service::{
    validate_input, CreateTimerError, TimerInput, TimerService, TimerView,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
