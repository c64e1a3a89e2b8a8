//! Scoring service
//!
//! The single writer per match. Each command takes the match's lock and
//! runs load -> apply -> persist -> broadcast while holding it, so commands
//! for one match are serialized and observers never see a state that was
//! not stored. Different matches do not contend.
//!
//! Locks exist only for stored matches that are still open; completing a
//! match releases its lock.

use common::MatchId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::broadcast::{Broadcaster, ChannelBroadcaster};
use crate::command::Command;
use crate::engine::ScoringEngine;
use crate::error::ScoringError;
use crate::metrics::{ScoringMetrics, OUTCOME_OK};
use crate::state::{MatchState, MatchSummary, SPORT_CRICKET};
use crate::store::{InMemoryMatchStore, MatchStore};
use crate::Result;

/// Starting point for a new observer
#[derive(Debug)]
pub struct Subscription {
    /// Latest committed state
    pub current: MatchState,
    /// Later commits; `None` when the match is already completed
    pub updates: Option<broadcast::Receiver<Arc<MatchState>>>,
}

pub struct ScoringService {
    engine: ScoringEngine,
    store: Arc<dyn MatchStore>,
    broadcaster: Arc<dyn Broadcaster>,
    /// Per-match write locks
    locks: Mutex<HashMap<MatchId, Arc<tokio::sync::Mutex<()>>>>,
    metrics: ScoringMetrics,
}

impl ScoringService {
    pub fn new(
        engine: ScoringEngine,
        store: Arc<dyn MatchStore>,
        broadcaster: Arc<dyn Broadcaster>,
    ) -> Self {
        Self {
            engine,
            store,
            broadcaster,
            locks: Mutex::new(HashMap::new()),
            metrics: ScoringMetrics::new(),
        }
    }

    /// Service over an in-memory store and channel broadcaster
    pub fn in_memory(engine: ScoringEngine, broadcast_capacity: usize) -> Self {
        Self::new(
            engine,
            Arc::new(InMemoryMatchStore::new()),
            Arc::new(ChannelBroadcaster::with_capacity(broadcast_capacity)),
        )
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Schedule a new match
    pub async fn create_match(
        &self,
        sport: &str,
        team_a: impl Into<String>,
        team_b: impl Into<String>,
    ) -> Result<MatchState> {
        if !sport.eq_ignore_ascii_case(SPORT_CRICKET) {
            return Err(ScoringError::validation(format!(
                "unsupported sport: {}",
                sport
            )));
        }
        let (team_a, team_b) = (team_a.into(), team_b.into());
        if team_a.trim().is_empty() || team_b.trim().is_empty() {
            return Err(ScoringError::validation("team names must not be empty"));
        }

        let state = self.engine.schedule(team_a, team_b);
        self.store.insert(state.clone()).await?;
        self.refresh_active_matches().await;
        Ok(state)
    }

    pub async fn get_match(&self, id: MatchId) -> Result<MatchState> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| ScoringError::not_found(format!("match {}", id)))
    }

    pub async fn list_matches(&self) -> Result<Vec<MatchSummary>> {
        Ok(self.store.list().await?)
    }

    /// Observe committed states of a match
    ///
    /// Unknown matches are NotFound. A completed match yields its final
    /// state and no update channel.
    pub async fn subscribe(&self, id: MatchId) -> Result<Subscription> {
        let current = self.get_match(id).await?;
        if current.is_completed() {
            return Ok(Subscription {
                current,
                updates: None,
            });
        }

        let lock = self.lock_for(id);
        let _guard = lock.lock().await;
        // Read again under the lock so no commit falls between read and subscribe
        let current = self.get_match(id).await?;
        if current.is_completed() {
            self.release_lock(id);
            return Ok(Subscription {
                current,
                updates: None,
            });
        }
        let updates = Some(self.broadcaster.subscribe(id));
        Ok(Subscription { current, updates })
    }

    /// Apply a command to a match and return the committed state
    pub async fn submit(&self, id: MatchId, command: Command) -> Result<MatchState> {
        let kind = command.kind();
        let started = Instant::now();

        let result = self.submit_locked(id, command).await;
        match &result {
            Ok(state) => {
                self.metrics.record_command(kind, OUTCOME_OK, started.elapsed());
                info!(match_id = %id, kind, version = state.version, "Command applied");
            }
            Err(err) => {
                self.metrics.record_command(kind, err.kind(), started.elapsed());
                warn!(match_id = %id, kind, error = %err, "Command rejected");
            }
        }
        result
    }

    async fn submit_locked(&self, id: MatchId, command: Command) -> Result<MatchState> {
        if self.get_match(id).await?.is_completed() {
            return Err(completed(id));
        }

        let lock = self.lock_for(id);
        let _guard = lock.lock().await;

        let current = self.get_match(id).await?;
        if current.is_completed() {
            self.release_lock(id);
            return Err(completed(id));
        }
        let next = self.engine.apply(&current, command)?;
        self.store.persist(&next).await?;
        self.broadcaster.publish(&next);

        if next.is_completed() {
            self.release_lock(id);
            self.refresh_active_matches().await;
        }
        Ok(next)
    }

    /// Callers must have seen the match in the store
    fn lock_for(&self, id: MatchId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock();
        Arc::clone(locks.entry(id).or_default())
    }

    fn release_lock(&self, id: MatchId) {
        self.locks.lock().remove(&id);
    }

    /// Matches currently holding a write lock entry
    pub fn lock_count(&self) -> usize {
        self.locks.lock().len()
    }

    async fn refresh_active_matches(&self) {
        match self.store.active_count().await {
            Ok(count) => self.metrics.set_active_matches(count),
            Err(err) => warn!(error = %err, "Failed to count active matches"),
        }
    }
}

fn completed(id: MatchId) -> ScoringError {
    ScoringError::invalid_state(format!("match {} is completed", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crease::CreaseSlot;
    use crate::player::PlayerRef;
    use crate::state::TossDecision;
    use crate::store::{StoreError, StoreResult};
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use common::{PlayerId, TeamSide};

    async fn ready_match(service: &ScoringService) -> MatchId {
        let id = service
            .create_match("cricket", "Lions", "Tigers")
            .await
            .unwrap()
            .id;
        let setup = [
            Command::Toss {
                winner: TeamSide::A,
                decision: TossDecision::Bat,
            },
            Command::SelectBatsman {
                player: PlayerRef::named(PlayerId::new(), "Opener One"),
                slot: CreaseSlot::Striker,
            },
            Command::SelectBatsman {
                player: PlayerRef::named(PlayerId::new(), "Opener Two"),
                slot: CreaseSlot::NonStriker,
            },
            Command::SelectBowler {
                player: PlayerRef::named(PlayerId::new(), "Quick"),
            },
        ];
        for cmd in setup {
            service.submit(id, cmd).await.unwrap();
        }
        id
    }

    #[tokio::test]
    async fn test_submit_persists_and_broadcasts() {
        let service = ScoringService::in_memory(ScoringEngine::new(), 16);
        let id = ready_match(&service).await;
        let mut rx = service.subscribe(id).await.unwrap().updates.unwrap();

        let state = service.submit(id, Command::runs(TeamSide::A, 4)).await.unwrap();
        assert_eq!(state.score(TeamSide::A).runs, 4);

        let stored = service.get_match(id).await.unwrap();
        assert_eq!(stored, state);

        let published = rx.recv().await.unwrap();
        assert_eq!(published.version, state.version);
        assert_eq!(published.score(TeamSide::A).runs, 4);
    }

    #[tokio::test]
    async fn test_rejected_command_leaves_store_untouched() {
        let service = ScoringService::in_memory(ScoringEngine::new(), 16);
        let id = ready_match(&service).await;
        let before = service.get_match(id).await.unwrap();
        let mut rx = service.subscribe(id).await.unwrap().updates.unwrap();

        assert_matches!(
            service.submit(id, Command::runs(TeamSide::A, 9)).await,
            Err(ScoringError::Validation(_))
        );
        assert_matches!(
            service.submit(id, Command::Undo).await,
            Err(ScoringError::NoHistory)
        );
        assert_eq!(service.get_match(id).await.unwrap(), before);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unknown_match() {
        let service = ScoringService::in_memory(ScoringEngine::new(), 16);
        assert_matches!(
            service.submit(MatchId::new(), Command::Undo).await,
            Err(ScoringError::NotFound(_))
        );
        assert_matches!(
            service.get_match(MatchId::new()).await,
            Err(ScoringError::NotFound(_))
        );
    }

    #[tokio::test]
    async fn test_unknown_match_takes_no_lock() {
        let broadcaster = Arc::new(ChannelBroadcaster::new());
        let service = ScoringService::new(
            ScoringEngine::new(),
            Arc::new(InMemoryMatchStore::new()),
            broadcaster.clone(),
        );
        for _ in 0..1000 {
            assert_matches!(
                service.submit(MatchId::new(), Command::Undo).await,
                Err(ScoringError::NotFound(_))
            );
        }
        for _ in 0..100 {
            assert_matches!(
                service.subscribe(MatchId::new()).await,
                Err(ScoringError::NotFound(_))
            );
        }
        assert_eq!(service.lock_count(), 0);
        assert_eq!(broadcaster.channel_count(), 0);
    }

    #[tokio::test]
    async fn test_completion_releases_match() {
        let broadcaster = Arc::new(ChannelBroadcaster::new());
        let service = ScoringService::new(
            ScoringEngine::new(),
            Arc::new(InMemoryMatchStore::new()),
            broadcaster.clone(),
        );
        let id = ready_match(&service).await;
        assert_eq!(service.lock_count(), 1);

        let mut rx = service.subscribe(id).await.unwrap().updates.unwrap();
        service.submit(id, Command::runs(TeamSide::A, 1)).await.unwrap();
        service.submit(id, Command::CompleteMatch).await.unwrap();
        assert_eq!(service.lock_count(), 0);
        assert_eq!(broadcaster.channel_count(), 0);

        assert_eq!(rx.recv().await.unwrap().version, 5);
        assert!(rx.recv().await.unwrap().is_completed());
        assert_eq!(
            rx.recv().await.unwrap_err(),
            broadcast::error::RecvError::Closed
        );

        // Frozen matches are rejected without taking a lock
        assert_matches!(
            service.submit(id, Command::SwitchStrike).await,
            Err(ScoringError::InvalidState(_))
        );
        assert_eq!(service.lock_count(), 0);
    }

    #[tokio::test]
    async fn test_subscribe_to_completed_match() {
        let broadcaster = Arc::new(ChannelBroadcaster::new());
        let service = ScoringService::new(
            ScoringEngine::new(),
            Arc::new(InMemoryMatchStore::new()),
            broadcaster.clone(),
        );
        let id = ready_match(&service).await;
        service.submit(id, Command::CompleteMatch).await.unwrap();

        let subscription = service.subscribe(id).await.unwrap();
        assert!(subscription.current.is_completed());
        assert!(subscription.updates.is_none());
        assert_eq!(broadcaster.channel_count(), 0);
        assert_eq!(service.lock_count(), 0);
    }

    #[tokio::test]
    async fn test_create_match_validation() {
        let service = ScoringService::in_memory(ScoringEngine::new(), 16);
        assert_matches!(
            service.create_match("football", "A", "B").await,
            Err(ScoringError::Validation(_))
        );
        assert_matches!(
            service.create_match("cricket", " ", "B").await,
            Err(ScoringError::Validation(_))
        );

        service.create_match("Cricket", "Lions", "Tigers").await.unwrap();
        assert_eq!(service.list_matches().await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_commands_are_serialized() {
        let service = Arc::new(ScoringService::in_memory(ScoringEngine::new(), 64));
        let id = ready_match(&service).await;
        let start_version = service.get_match(id).await.unwrap().version;

        let mut handles = Vec::new();
        for _ in 0..20 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                service.submit(id, Command::runs(TeamSide::A, 2)).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let state = service.get_match(id).await.unwrap();
        assert_eq!(state.score(TeamSide::A).runs, 40);
        assert_eq!(state.score(TeamSide::A).legal_balls(), 20);
        assert_eq!(state.version, start_version + 20);
        assert_eq!(state.history.len(), 20);
        assert!(state.over_reconciles());
    }

    /// Store that accepts inserts but fails every write afterwards
    struct ReadOnlyStore {
        inner: InMemoryMatchStore,
    }

    #[async_trait]
    impl MatchStore for ReadOnlyStore {
        async fn insert(&self, state: MatchState) -> StoreResult<()> {
            self.inner.insert(state).await
        }

        async fn get(&self, id: MatchId) -> StoreResult<Option<MatchState>> {
            self.inner.get(id).await
        }

        async fn persist(&self, _state: &MatchState) -> StoreResult<()> {
            Err(StoreError::Other("disk full".to_string()))
        }

        async fn list(&self) -> StoreResult<Vec<MatchSummary>> {
            self.inner.list().await
        }

        async fn active_count(&self) -> StoreResult<usize> {
            self.inner.active_count().await
        }
    }

    #[tokio::test]
    async fn test_persistence_failure_is_not_broadcast() {
        let broadcaster = Arc::new(ChannelBroadcaster::new());
        let service = ScoringService::new(
            ScoringEngine::new(),
            Arc::new(ReadOnlyStore {
                inner: InMemoryMatchStore::new(),
            }),
            broadcaster.clone(),
        );
        let id = service
            .create_match("cricket", "Lions", "Tigers")
            .await
            .unwrap()
            .id;
        let mut rx = service.subscribe(id).await.unwrap().updates.unwrap();

        let result = service
            .submit(
                id,
                Command::Toss {
                    winner: TeamSide::B,
                    decision: TossDecision::Bowl,
                },
            )
            .await;
        assert_matches!(result, Err(ScoringError::Persistence(msg)) if msg.contains("disk full"));
        assert!(rx.try_recv().is_err());
        assert_eq!(service.get_match(id).await.unwrap().toss, None);
    }
}
