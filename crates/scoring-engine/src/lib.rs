//! Cricket live-scoring engine for LiveScore
//!
//! Turns ball-by-ball events into a consistent [`MatchState`]: team totals,
//! per-player figures, the over in progress, and a bounded undo history.
//!
//! # Layers
//!
//! - [`engine::ScoringEngine`] - pure state machine, one command at a time
//! - [`store::MatchStore`] - where authoritative match states live
//! - [`broadcast::Broadcaster`] - fan-out of every committed state
//! - [`service::ScoringService`] - single writer per match tying the above together
//! - `api` (feature `api`) - axum routes and the live WebSocket feed

pub mod broadcast;
pub mod command;
pub mod crease;
pub mod engine;
pub mod error;
pub mod history;
pub mod metrics;
pub mod over;
pub mod player;
pub mod score;
pub mod service;
pub mod state;
pub mod store;

#[cfg(feature = "api")]
pub mod api;

pub use broadcast::{Broadcaster, ChannelBroadcaster};
pub use command::{BallEvent, Command, ScoreRequest, SquadMember};
pub use crease::CreaseSlot;
pub use engine::ScoringEngine;
pub use error::ScoringError;
pub use player::{DismissalKind, PlayerRef};
pub use score::{ExtraKind, Overs, Score};
pub use service::{ScoringService, Subscription};
pub use state::{MatchOutcome, MatchState, MatchStatus, MatchSummary, TossDecision};
pub use store::{InMemoryMatchStore, MatchStore, StoreError};

/// Result type for scoring operations
pub type Result<T> = std::result::Result<T, ScoringError>;
