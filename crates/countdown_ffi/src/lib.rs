//! UI-facing bindings for the countdown core.
//!
//! `api` holds the exported use-case calls; `labels` holds locale-specific
//! rendering helpers that stay outside the engine contract.

pub mod api;
pub mod labels;
