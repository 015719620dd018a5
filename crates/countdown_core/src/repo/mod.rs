//! Timer collection ownership and persistence collaborators.
//!
//! # Responsibility
//! - Keep the ordered timer list and its create/delete/replace operations.
//! - Isolate slot storage behind the `TimerPersistence` contract.
//!
//! # Invariants
//! - Only the store mutates timers; callers receive clones.
//! - Persistence errors never escape the store.

pub mod slot_persistence;
pub mod timer_store;
