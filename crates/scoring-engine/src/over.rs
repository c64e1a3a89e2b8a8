//! Over tracker
//!
//! Keeps the outcome sequence of the over in progress and decides, per
//! delivery, whether strike rotates and whether the over is complete.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::score::{ExtraKind, BALLS_PER_OVER};

/// Default bound on the display buffer
pub const DEFAULT_OVER_BUFFER_CAPACITY: usize = 60;

/// What happened on a single delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BallOutcome {
    /// Runs off the bat
    Runs { runs: u32 },
    /// Batter dismissed
    Wicket,
    /// One-run extra
    Extra { extra: ExtraKind },
}

impl BallOutcome {
    /// Whether the delivery counts toward the over
    pub fn is_legal(&self) -> bool {
        match self {
            BallOutcome::Runs { .. } | BallOutcome::Wicket => true,
            BallOutcome::Extra { extra } => extra.is_legal(),
        }
    }

    /// Runs the batters physically ran or hit (drives odd-run rotation)
    pub fn runs_between_wickets(&self) -> u32 {
        match self {
            BallOutcome::Runs { runs } => *runs,
            BallOutcome::Wicket => 0,
            BallOutcome::Extra { extra } if extra.is_legal() => 1,
            BallOutcome::Extra { .. } => 0,
        }
    }

    /// Runs charged to the bowler
    pub fn runs_conceded(&self) -> u32 {
        match self {
            BallOutcome::Runs { runs } => *runs,
            BallOutcome::Wicket => 0,
            BallOutcome::Extra { extra } if extra.charged_to_bowler() => 1,
            BallOutcome::Extra { .. } => 0,
        }
    }

    /// Scorecard label ("0", "4", "W", "Wd", "Nb", "B", "Lb")
    pub fn label(&self) -> String {
        match self {
            BallOutcome::Runs { runs } => runs.to_string(),
            BallOutcome::Wicket => "W".to_string(),
            BallOutcome::Extra { extra } => match extra {
                ExtraKind::Wide => "Wd".to_string(),
                ExtraKind::NoBall => "Nb".to_string(),
                ExtraKind::Bye => "B".to_string(),
                ExtraKind::LegBye => "Lb".to_string(),
            },
        }
    }
}

/// Effect of one delivery on strike and over state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeliveryEffect {
    /// Striker and non-striker change ends
    pub rotate_strike: bool,
    /// Set when this delivery was the over's sixth legal ball
    pub over_completed: Option<CompletedOver>,
}

/// Summary of an over that just finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedOver {
    /// No runs chargeable to the bowler
    pub maiden: bool,
    /// Runs charged to the bowler during the over
    pub runs_conceded: u32,
}

/// Outcome sequence of the over in progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverTracker {
    /// Labels of the deliveries in this over, oldest first
    balls: VecDeque<String>,
    /// Legal deliveries so far in this over (0..=5)
    legal_balls: u8,
    /// Runs charged to the bowler so far in this over
    runs_conceded: u32,
    capacity: usize,
}

impl OverTracker {
    /// Create a tracker with the default buffer bound
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_OVER_BUFFER_CAPACITY)
    }

    /// Create a tracker with a custom buffer bound
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            balls: VecDeque::new(),
            legal_balls: 0,
            runs_conceded: 0,
            capacity: capacity.max(1),
        }
    }

    /// Record a delivery and report strike/over effects
    ///
    /// On the sixth legal ball the over-completion rotation replaces the
    /// delivery's own odd-run rotation, and the buffer is cleared.
    pub fn record(&mut self, outcome: &BallOutcome) -> DeliveryEffect {
        if self.balls.len() >= self.capacity {
            self.balls.pop_front();
        }
        self.balls.push_back(outcome.label());
        self.runs_conceded += outcome.runs_conceded();

        if !outcome.is_legal() {
            return DeliveryEffect::default();
        }

        self.legal_balls += 1;
        if self.legal_balls as u32 >= BALLS_PER_OVER {
            let completed = CompletedOver {
                maiden: self.runs_conceded == 0,
                runs_conceded: self.runs_conceded,
            };
            self.reset();
            return DeliveryEffect {
                rotate_strike: true,
                over_completed: Some(completed),
            };
        }

        DeliveryEffect {
            rotate_strike: outcome.runs_between_wickets() % 2 == 1,
            over_completed: None,
        }
    }

    /// Clear the over in progress
    pub fn reset(&mut self) {
        self.balls.clear();
        self.legal_balls = 0;
        self.runs_conceded = 0;
    }

    /// Labels of the deliveries in this over
    pub fn balls(&self) -> impl Iterator<Item = &str> {
        self.balls.iter().map(String::as_str)
    }

    /// Legal deliveries so far in this over
    pub fn legal_balls(&self) -> u8 {
        self.legal_balls
    }

    /// Runs charged to the bowler so far in this over
    pub fn runs_conceded(&self) -> u32 {
        self.runs_conceded
    }

    pub fn is_empty(&self) -> bool {
        self.balls.is_empty()
    }
}

impl Default for OverTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runs(n: u32) -> BallOutcome {
        BallOutcome::Runs { runs: n }
    }

    #[test]
    fn test_odd_runs_rotate_strike() {
        let mut over = OverTracker::new();
        for n in [1, 3, 5, 7] {
            assert!(over.record(&runs(n)).rotate_strike, "{} should rotate", n);
            over.reset();
        }
        for n in [0, 2, 4, 6] {
            assert!(!over.record(&runs(n)).rotate_strike, "{} should not rotate", n);
            over.reset();
        }
    }

    #[test]
    fn test_wides_and_no_balls_do_not_count_toward_over() {
        let mut over = OverTracker::new();
        for _ in 0..5 {
            over.record(&runs(0));
        }
        let effect = over.record(&BallOutcome::Extra { extra: ExtraKind::Wide });
        assert_eq!(effect, DeliveryEffect::default());
        let effect = over.record(&BallOutcome::Extra { extra: ExtraKind::NoBall });
        assert_eq!(effect.over_completed, None);
        assert_eq!(over.legal_balls(), 5);
        assert_eq!(over.balls().collect::<Vec<_>>(), vec!["0", "0", "0", "0", "0", "Wd", "Nb"]);

        let effect = over.record(&runs(2));
        assert!(effect.rotate_strike);
        assert!(effect.over_completed.is_some());
        assert!(over.is_empty());
        assert_eq!(over.legal_balls(), 0);
    }

    #[test]
    fn test_six_singles_rotate_six_times() {
        let mut over = OverTracker::new();
        let rotations = (0..6).filter(|_| over.record(&runs(1)).rotate_strike).count();
        assert_eq!(rotations, 6);
    }

    #[test]
    fn test_maiden_detection() {
        let mut over = OverTracker::new();
        for _ in 0..5 {
            over.record(&runs(0));
        }
        // A leg-bye is not charged to the bowler
        let effect = over.record(&BallOutcome::Extra { extra: ExtraKind::LegBye });
        assert_eq!(
            effect.over_completed,
            Some(CompletedOver { maiden: true, runs_conceded: 0 })
        );

        over.record(&BallOutcome::Extra { extra: ExtraKind::Wide });
        for _ in 0..5 {
            over.record(&runs(0));
        }
        let effect = over.record(&BallOutcome::Wicket);
        assert_eq!(
            effect.over_completed,
            Some(CompletedOver { maiden: false, runs_conceded: 1 })
        );
    }

    #[test]
    fn test_buffer_is_bounded() {
        let mut over = OverTracker::with_capacity(3);
        for _ in 0..5 {
            over.record(&BallOutcome::Extra { extra: ExtraKind::Wide });
        }
        assert_eq!(over.balls().count(), 3);
        assert_eq!(over.runs_conceded(), 5);
    }

    #[test]
    fn test_labels() {
        assert_eq!(runs(4).label(), "4");
        assert_eq!(BallOutcome::Wicket.label(), "W");
        assert_eq!(BallOutcome::Extra { extra: ExtraKind::Bye }.label(), "B");
        assert_eq!(BallOutcome::Extra { extra: ExtraKind::LegBye }.label(), "Lb");
    }
}
