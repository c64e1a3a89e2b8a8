//! In-memory match store

use async_trait::async_trait;
use common::MatchId;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::state::{MatchState, MatchSummary};
use crate::store::traits::{MatchStore, StoreError, StoreResult};

/// In-memory store for match states
///
/// Fast but non-persistent; data is lost on restart.
pub struct InMemoryMatchStore {
    matches: RwLock<HashMap<MatchId, MatchState>>,
}

impl InMemoryMatchStore {
    pub fn new() -> Self {
        Self {
            matches: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryMatchStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MatchStore for InMemoryMatchStore {
    async fn insert(&self, state: MatchState) -> StoreResult<()> {
        let mut matches = self.matches.write().await;
        if matches.contains_key(&state.id) {
            return Err(StoreError::AlreadyExists(state.id));
        }
        debug!(match_id = %state.id, "Match stored");
        matches.insert(state.id, state);
        Ok(())
    }

    async fn get(&self, id: MatchId) -> StoreResult<Option<MatchState>> {
        let matches = self.matches.read().await;
        Ok(matches.get(&id).cloned())
    }

    async fn persist(&self, state: &MatchState) -> StoreResult<()> {
        let mut matches = self.matches.write().await;
        let stored = matches
            .get_mut(&state.id)
            .ok_or(StoreError::MatchNotFound(state.id))?;

        if state.version != stored.version + 1 {
            return Err(StoreError::VersionConflict {
                id: state.id,
                stored: stored.version,
                attempted: state.version,
            });
        }
        *stored = state.clone();
        debug!(match_id = %state.id, version = state.version, "Match persisted");
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<MatchSummary>> {
        let matches = self.matches.read().await;
        let mut states: Vec<&MatchState> = matches.values().collect();
        states.sort_by_key(|s| s.created_at);
        Ok(states.into_iter().map(MatchState::summary).collect())
    }

    async fn active_count(&self) -> StoreResult<usize> {
        let matches = self.matches.read().await;
        Ok(matches.values().filter(|s| !s.is_completed()).count())
    }
}
