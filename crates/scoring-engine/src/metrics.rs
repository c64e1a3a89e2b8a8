//! Scoring metrics
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! binary installs a recorder (see `observability::init_metrics`).
//!
//! # Metrics
//!
//! * `scoring_commands_total{kind,outcome}` - commands handled
//! * `scoring_command_duration_seconds{kind}` - time from lock to broadcast
//! * `scoring_undo_total` - deliveries undone
//! * `scoring_active_matches` - matches not yet completed

use metrics::{counter, gauge, histogram, Counter, Gauge};
use std::time::Duration;

/// Outcome label for a successful command
pub const OUTCOME_OK: &str = "ok";

#[derive(Clone)]
pub struct ScoringMetrics {
    undo_total: Counter,
    active_matches: Gauge,
}

impl ScoringMetrics {
    pub fn new() -> Self {
        Self {
            undo_total: counter!("scoring_undo_total"),
            active_matches: gauge!("scoring_active_matches"),
        }
    }

    /// Record a handled command
    ///
    /// `outcome` is [`OUTCOME_OK`] or the error's kind label.
    pub fn record_command(&self, kind: &'static str, outcome: &'static str, elapsed: Duration) {
        counter!("scoring_commands_total", "kind" => kind, "outcome" => outcome).increment(1);
        histogram!("scoring_command_duration_seconds", "kind" => kind)
            .record(elapsed.as_secs_f64());
        if kind == "undo" && outcome == OUTCOME_OK {
            self.undo_total.increment(1);
        }
    }

    pub fn set_active_matches(&self, count: usize) {
        self.active_matches.set(count as f64);
    }
}

impl Default for ScoringMetrics {
    fn default() -> Self {
        Self::new()
    }
}
