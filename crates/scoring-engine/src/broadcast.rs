//! Live state fan-out
//!
//! Every committed [`MatchState`] is published to the match's channel.
//! Slow receivers lose the oldest snapshots rather than holding up the
//! writer; each snapshot is complete, so skipping some is harmless.

use common::MatchId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

use crate::state::MatchState;

/// Default snapshots buffered per match channel
pub const DEFAULT_BROADCAST_CAPACITY: usize = 64;

/// Publishes committed match states to observers
pub trait Broadcaster: Send + Sync {
    /// Publish a committed state, returning how many observers received it
    fn publish(&self, state: &MatchState) -> usize;

    /// Observe a match
    fn subscribe(&self, id: MatchId) -> broadcast::Receiver<Arc<MatchState>>;
}

/// One tokio broadcast channel per match
pub struct ChannelBroadcaster {
    channels: RwLock<HashMap<MatchId, broadcast::Sender<Arc<MatchState>>>>,
    capacity: usize,
}

impl ChannelBroadcaster {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BROADCAST_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Matches with an open channel
    pub fn channel_count(&self) -> usize {
        self.channels.read().len()
    }
}

impl Default for ChannelBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl Broadcaster for ChannelBroadcaster {
    fn publish(&self, state: &MatchState) -> usize {
        let snapshot = Arc::new(state.clone());
        let mut channels = self.channels.write();

        // No channel means nobody ever subscribed
        let delivered = channels
            .get(&state.id)
            .and_then(|tx| tx.send(snapshot).ok())
            .unwrap_or(0);

        // Completed matches never change again; dropping the sender closes receivers
        if state.is_completed() {
            channels.remove(&state.id);
        }
        debug!(match_id = %state.id, version = state.version, delivered, "State published");
        delivered
    }

    fn subscribe(&self, id: MatchId) -> broadcast::Receiver<Arc<MatchState>> {
        let mut channels = self.channels.write();
        channels
            .entry(id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MatchStatus;
    use tokio::sync::broadcast::error::RecvError;

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let broadcaster = ChannelBroadcaster::new();
        let state = MatchState::schedule("Lions", "Tigers");

        let mut rx1 = broadcaster.subscribe(state.id);
        let mut rx2 = broadcaster.subscribe(state.id);
        assert_eq!(broadcaster.publish(&state), 2);

        assert_eq!(rx1.recv().await.unwrap().id, state.id);
        assert_eq!(rx2.recv().await.unwrap().version, state.version);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let broadcaster = ChannelBroadcaster::new();
        let state = MatchState::schedule("Lions", "Tigers");
        assert_eq!(broadcaster.publish(&state), 0);
        assert_eq!(broadcaster.channel_count(), 0);
    }

    #[tokio::test]
    async fn test_matches_are_isolated() {
        let broadcaster = ChannelBroadcaster::new();
        let one = MatchState::schedule("Lions", "Tigers");
        let two = MatchState::schedule("Eagles", "Hawks");

        let mut rx = broadcaster.subscribe(one.id);
        broadcaster.publish(&two);
        broadcaster.publish(&one);

        assert_eq!(rx.recv().await.unwrap().id, one.id);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_completed_match_closes_channel() {
        let broadcaster = ChannelBroadcaster::new();
        let mut state = MatchState::schedule("Lions", "Tigers");
        let mut rx = broadcaster.subscribe(state.id);

        state.status = MatchStatus::Completed;
        assert_eq!(broadcaster.publish(&state), 1);
        assert_eq!(broadcaster.channel_count(), 0);

        assert!(rx.recv().await.unwrap().is_completed());
        assert_eq!(rx.recv().await.unwrap_err(), RecvError::Closed);
    }

    #[tokio::test]
    async fn test_slow_receiver_lags() {
        let broadcaster = ChannelBroadcaster::with_capacity(2);
        let mut state = MatchState::schedule("Lions", "Tigers");
        let mut rx = broadcaster.subscribe(state.id);

        for version in 1..=4 {
            state.version = version;
            broadcaster.publish(&state);
        }
        assert_eq!(rx.recv().await.unwrap_err(), RecvError::Lagged(2));
        assert_eq!(rx.recv().await.unwrap().version, 3);
    }
}
