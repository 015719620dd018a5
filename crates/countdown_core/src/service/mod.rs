//! Countdown use-case services.
//!
//! # Responsibility
//! - Guard the creation boundary and orchestrate store + engine per tick.
//! - Schedule mounted cards and cancel them on unmount/delete.
//!
//! # See also
//! - `engine` for the lifecycle rules applied on each tick.

pub mod tick_session;
pub mod timer_service;
