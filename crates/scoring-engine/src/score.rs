//! Score ledger
//!
//! Running team totals for the two innings of a match. Every mutation is
//! keyed by [`TeamSide`] and counts legal deliveries as a single integer,
//! which is expanded to the `overs.balls` display form on demand so that
//! advancing and rewinding a ball are exact inverses.

use common::TeamSide;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ScoringError;
use crate::Result;

/// Legal deliveries in one over
pub const BALLS_PER_OVER: u32 = 6;

/// Dismissals that end an innings
pub const MAX_WICKETS: u8 = 10;

/// Highest run value a single delivery can carry (boundary plus overthrows)
pub const MAX_RUNS_PER_BALL: u32 = 7;

// ============================================================================
// Overs
// ============================================================================

/// Completed overs plus legal balls of the over in progress
///
/// Serialized in the conventional `overs.balls` decimal form, so
/// 4 overs and 3 balls is `4.3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Overs {
    /// Whole overs bowled
    pub completed: u32,
    /// Legal balls in the current over (0..=5)
    pub balls: u8,
}

impl Overs {
    /// Create an overs value; `balls` past an over rolls into `completed`
    pub fn new(completed: u32, balls: u8) -> Self {
        Self::from_legal_balls(completed * BALLS_PER_OVER + balls as u32)
    }

    /// Expand a total legal-ball count
    pub fn from_legal_balls(total: u32) -> Self {
        Self {
            completed: total / BALLS_PER_OVER,
            balls: (total % BALLS_PER_OVER) as u8,
        }
    }

    /// Total legal balls represented
    pub fn legal_balls(&self) -> u32 {
        self.completed * BALLS_PER_OVER + self.balls as u32
    }

    /// Display form (`4.3`)
    pub fn as_decimal(&self) -> f64 {
        self.completed as f64 + self.balls as f64 / 10.0
    }

    /// Parse the display form; `None` when the ball part is not 0..=5
    pub fn from_decimal(value: f64) -> Option<Self> {
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        let completed = value.trunc();
        let balls = ((value - completed) * 10.0).round();
        if balls >= BALLS_PER_OVER as f64 {
            return None;
        }
        Some(Self {
            completed: completed as u32,
            balls: balls as u8,
        })
    }

    /// Over boundary reached (balls part is zero and at least one over bowled)
    pub fn at_over_boundary(&self) -> bool {
        self.balls == 0 && self.completed > 0
    }
}

impl std::fmt::Display for Overs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.completed, self.balls)
    }
}

impl Serialize for Overs {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_decimal())
    }
}

impl<'de> Deserialize<'de> for Overs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Overs::from_decimal(value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid overs value: {}", value)))
    }
}

// ============================================================================
// Extras
// ============================================================================

/// Kind of extra delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExtraKind {
    /// Wide - not a legal ball
    #[serde(alias = "wide")]
    Wide,
    /// No-ball - not a legal ball
    #[serde(rename = "NOBALL", alias = "noball", alias = "no_ball")]
    NoBall,
    /// Bye - legal ball, not charged to the bowler
    #[serde(alias = "bye")]
    Bye,
    /// Leg-bye - legal ball, not charged to the bowler
    #[serde(rename = "LEGBYE", alias = "legbye", alias = "leg_bye")]
    LegBye,
}

impl ExtraKind {
    /// Whether the delivery counts toward the over
    pub fn is_legal(&self) -> bool {
        matches!(self, ExtraKind::Bye | ExtraKind::LegBye)
    }

    /// Whether the run is charged to the bowler's figures
    pub fn charged_to_bowler(&self) -> bool {
        !self.is_legal()
    }

    /// Parse a request label (case-insensitive, `_`/`-` ignored)
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
            .collect::<String>()
            .to_uppercase();
        match normalized.as_str() {
            "WIDE" | "WD" => Some(ExtraKind::Wide),
            "NOBALL" | "NB" => Some(ExtraKind::NoBall),
            "BYE" | "B" => Some(ExtraKind::Bye),
            "LEGBYE" | "LB" => Some(ExtraKind::LegBye),
            _ => None,
        }
    }
}

impl std::fmt::Display for ExtraKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtraKind::Wide => write!(f, "WIDE"),
            ExtraKind::NoBall => write!(f, "NOBALL"),
            ExtraKind::Bye => write!(f, "BYE"),
            ExtraKind::LegBye => write!(f, "LEGBYE"),
        }
    }
}

/// Extras conceded by the fielding side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extras {
    pub wides: u32,
    pub no_balls: u32,
    pub byes: u32,
    pub leg_byes: u32,
}

impl Extras {
    /// Sum of all extras
    pub fn total(&self) -> u32 {
        self.wides + self.no_balls + self.byes + self.leg_byes
    }

    fn counter_mut(&mut self, kind: ExtraKind) -> &mut u32 {
        match kind {
            ExtraKind::Wide => &mut self.wides,
            ExtraKind::NoBall => &mut self.no_balls,
            ExtraKind::Bye => &mut self.byes,
            ExtraKind::LegBye => &mut self.leg_byes,
        }
    }
}

// ============================================================================
// Score
// ============================================================================

/// One team's innings total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    /// Total runs, extras included
    pub runs: u32,
    /// Wickets fallen (0..=10)
    pub wickets: u8,
    /// Overs bowled
    pub overs: Overs,
    /// Extras breakdown (already summed into `runs`)
    pub extras: Extras,
}

impl Score {
    /// Create a score at 0/0 (0.0 ov)
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs off a legal delivery; consumes one ball
    pub fn add_runs(&mut self, runs: u32) -> Result<()> {
        if runs > MAX_RUNS_PER_BALL {
            return Err(ScoringError::validation(format!(
                "run value {} outside [0, {}]",
                runs, MAX_RUNS_PER_BALL
            )));
        }
        self.runs += runs;
        self.advance_ball();
        Ok(())
    }

    /// Dismissal; consumes one ball
    pub fn record_wicket(&mut self) -> Result<()> {
        if self.is_all_out() {
            return Err(ScoringError::invalid_state(format!(
                "already {} wickets down",
                MAX_WICKETS
            )));
        }
        self.wickets += 1;
        self.advance_ball();
        Ok(())
    }

    /// One-run extra; byes and leg-byes consume a ball, wides and no-balls do not
    pub fn record_extra(&mut self, kind: ExtraKind) {
        self.runs += 1;
        *self.extras.counter_mut(kind) += 1;
        if kind.is_legal() {
            self.advance_ball();
        }
    }

    /// Total legal balls bowled
    pub fn legal_balls(&self) -> u32 {
        self.overs.legal_balls()
    }

    /// Whether the innings is closed by dismissals
    pub fn is_all_out(&self) -> bool {
        self.wickets >= MAX_WICKETS
    }

    /// Runs per over, `None` before the first legal ball
    pub fn run_rate(&self) -> Option<f64> {
        let balls = self.legal_balls();
        if balls == 0 {
            return None;
        }
        Some(self.runs as f64 * BALLS_PER_OVER as f64 / balls as f64)
    }

    fn advance_ball(&mut self) {
        self.overs = Overs::from_legal_balls(self.legal_balls() + 1);
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} ({} ov)", self.runs, self.wickets, self.overs)
    }
}

/// Both teams' scores, addressed by side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TeamScores {
    #[serde(rename = "A")]
    pub a: Score,
    #[serde(rename = "B")]
    pub b: Score,
}

impl TeamScores {
    /// Score for one side
    pub fn get(&self, side: TeamSide) -> &Score {
        match side {
            TeamSide::A => &self.a,
            TeamSide::B => &self.b,
        }
    }

    /// Mutable score for one side
    pub fn get_mut(&mut self, side: TeamSide) -> &mut Score {
        match side {
            TeamSide::A => &mut self.a,
            TeamSide::B => &mut self.b,
        }
    }

    /// Overwrite one side's score (undo)
    pub fn restore(&mut self, side: TeamSide, score: Score) {
        *self.get_mut(side) = score;
    }

    pub fn add_runs(&mut self, side: TeamSide, runs: u32) -> Result<()> {
        self.get_mut(side).add_runs(runs)
    }

    pub fn record_wicket(&mut self, side: TeamSide) -> Result<()> {
        self.get_mut(side).record_wicket()
    }

    pub fn record_extra(&mut self, side: TeamSide, kind: ExtraKind) {
        self.get_mut(side).record_extra(kind)
    }
}

// ============================================================================
// Tests
// ============================================================================
