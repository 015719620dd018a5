//! Countdown domain model.
//!
//! # Responsibility
//! - Define the canonical timer record used by engine, store and boundary.
//! - Collapse event and birthday shapes into one tagged variant.
//!
//! # Invariants
//! - Every timer is identified by a stable `TimerId`.
//! - Birthday-only data lives inside the `Birthday` variant, never beside it.

pub mod timer;
