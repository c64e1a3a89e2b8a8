//! Common types and utilities for the live scoring backend
//!
//! This crate provides the shared identifiers used across the
//! scoring crates.
//!
//! # Modules
//!
//! - [`types`] - Shared domain identifiers (MatchId, PlayerId, TeamSide, etc.)

pub mod types;

pub use types::*;
