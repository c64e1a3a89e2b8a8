//! Action history
//!
//! Bounded log of applied deliveries. Appends at the tail, evicts from the
//! head past capacity, and undo always pops the tail.

use chrono::{DateTime, Utc};
use common::TeamSide;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::crease::Crease;
use crate::over::OverTracker;
use crate::player::SquadEntry;
use crate::score::Score;
use crate::state::MatchStatus;

/// Default number of entries kept
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Everything a delivery can touch besides the score
///
/// Restoring this frame together with the `before` score puts the match
/// back exactly where it was before the delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollbackFrame {
    pub innings: u8,
    pub status: MatchStatus,
    pub batting: Option<TeamSide>,
    pub crease: Crease,
    pub over: OverTracker,
    /// Striker's entry as it was (batting side)
    pub striker: SquadEntry,
    /// Bowler's entry as it was (fielding side)
    pub bowler: SquadEntry,
    /// Fall-of-wicket records before the delivery
    pub fall_of_wickets: usize,
}

/// One applied delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub team: TeamSide,
    /// Short label ("runs:4", "wicket:caught", "extra:WIDE")
    pub action: String,
    pub before: Score,
    pub after: Score,
    pub rollback: RollbackFrame,
}

/// Bounded LIFO of applied deliveries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl ActionHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
            capacity: capacity.max(1),
        }
    }

    /// Append at the tail, evicting the oldest entry when full
    pub fn push(&mut self, entry: HistoryEntry) {
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Remove and return the most recent entry
    pub fn pop(&mut self) -> Option<HistoryEntry> {
        self.entries.pop_back()
    }

    /// Most recent entry
    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries oldest first
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }
}

impl Default for ActionHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::PlayerId;

    fn entry(action: &str, runs_after: u32) -> HistoryEntry {
        let before = Score::new();
        let mut after = Score::new();
        after.runs = runs_after;
        HistoryEntry {
            timestamp: Utc::now(),
            team: TeamSide::A,
            action: action.to_string(),
            before,
            after,
            rollback: RollbackFrame {
                innings: 1,
                status: MatchStatus::Live,
                batting: Some(TeamSide::A),
                crease: Crease::new(),
                over: OverTracker::new(),
                striker: SquadEntry::new(PlayerId::new(), "bat"),
                bowler: SquadEntry::new(PlayerId::new(), "bowl"),
                fall_of_wickets: 0,
            },
        }
    }

    #[test]
    fn test_lifo_order() {
        let mut history = ActionHistory::new();
        history.push(entry("runs:1", 1));
        history.push(entry("runs:2", 3));

        assert_eq!(history.pop().unwrap().action, "runs:2");
        assert_eq!(history.pop().unwrap().action, "runs:1");
        assert!(history.pop().is_none());
    }

    #[test]
    fn test_evicts_oldest_past_capacity() {
        let mut history = ActionHistory::with_capacity(3);
        for i in 0..5 {
            history.push(entry(&format!("runs:{}", i), i));
        }

        assert_eq!(history.len(), 3);
        let actions: Vec<_> = history.iter().map(|e| e.action.as_str()).collect();
        assert_eq!(actions, vec!["runs:2", "runs:3", "runs:4"]);
        assert_eq!(history.last().unwrap().action, "runs:4");
    }

    #[test]
    fn test_default_capacity_is_fifty() {
        let mut history = ActionHistory::default();
        for i in 0..60 {
            history.push(entry("runs:0", i));
        }
        assert_eq!(history.len(), DEFAULT_HISTORY_CAPACITY);
        assert_eq!(history.iter().next().unwrap().after.runs, 10);
    }
}
