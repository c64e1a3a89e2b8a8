//! Store trait for match states

use async_trait::async_trait;
use common::MatchId;

use crate::error::ScoringError;
use crate::state::{MatchState, MatchSummary};

/// Errors that can occur in the store
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Match not found: {0}")]
    MatchNotFound(MatchId),

    #[error("Match already exists: {0}")]
    AlreadyExists(MatchId),

    /// A write did not follow the stored version
    #[error("Version conflict for match {id}: stored {stored}, attempted {attempted}")]
    VersionConflict {
        id: MatchId,
        stored: u64,
        attempted: u64,
    },

    #[error("Store error: {0}")]
    Other(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for ScoringError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MatchNotFound(id) => ScoringError::not_found(format!("match {}", id)),
            other => ScoringError::Persistence(other.to_string()),
        }
    }
}

/// Storage for match states
///
/// Implementations can be in-memory or backed by a database; the scoring
/// service only relies on the operations below.
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Store a newly scheduled match
    async fn insert(&self, state: MatchState) -> StoreResult<()>;

    /// Fetch the current state of a match
    async fn get(&self, id: MatchId) -> StoreResult<Option<MatchState>>;

    /// Replace the state of an existing match
    ///
    /// The new state's version must be exactly one past the stored one.
    async fn persist(&self, state: &MatchState) -> StoreResult<()>;

    /// Summaries of all matches, oldest first
    async fn list(&self) -> StoreResult<Vec<MatchSummary>>;

    /// Matches not yet completed
    async fn active_count(&self) -> StoreResult<usize>;
}
