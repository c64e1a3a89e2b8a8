//! Match aggregate
//!
//! [`MatchState`] is the single root that the engine reads and writes.
//! It is created when a match is scheduled and mutated only through
//! [`ScoringEngine`](crate::engine::ScoringEngine).

use chrono::{DateTime, Utc};
use common::{MatchId, PlayerId, TeamId, TeamSide};
use serde::{Deserialize, Serialize};

use crate::crease::Crease;
use crate::history::ActionHistory;
use crate::over::OverTracker;
use crate::player::{DismissalKind, Squad};
use crate::score::{Overs, Score, TeamScores, MAX_WICKETS};

/// Sport identifier handled by this engine
pub const SPORT_CRICKET: &str = "cricket";

// ============================================================================
// Status / Toss
// ============================================================================

/// Match lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Created, no ball bowled
    #[default]
    Scheduled,
    /// In progress
    Live,
    /// Terminal; the state is frozen
    Completed,
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchStatus::Scheduled => write!(f, "scheduled"),
            MatchStatus::Live => write!(f, "live"),
            MatchStatus::Completed => write!(f, "completed"),
        }
    }
}

/// What the toss winner chose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TossDecision {
    #[serde(alias = "bat")]
    Bat,
    #[serde(alias = "bowl")]
    Bowl,
}

/// Toss outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toss {
    pub winner: TeamSide,
    pub decision: TossDecision,
}

impl Toss {
    /// Side that bats first
    pub fn batting_first(&self) -> TeamSide {
        match self.decision {
            TossDecision::Bat => self.winner,
            TossDecision::Bowl => self.winner.opponent(),
        }
    }
}

// ============================================================================
// Teams / Records
// ============================================================================

/// A team taking part in the match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRef {
    pub id: TeamId,
    pub name: String,
}

impl TeamRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TeamId::new(),
            name: name.into(),
        }
    }
}

/// State at the moment a batter was dismissed; never modified once written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallOfWicket {
    pub team: TeamSide,
    pub wicket_number: u8,
    pub player: PlayerId,
    pub player_runs: u32,
    pub player_balls: u32,
    pub team_runs: u32,
    pub team_overs: Overs,
    pub dismissal: DismissalKind,
    pub timestamp: DateTime<Utc>,
}

/// Winning margin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum WinMargin {
    /// Side batting first defended its total
    Runs(u32),
    /// Chasing side reached the target with wickets in hand
    Wickets(u8),
}

/// Result of a completed match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum MatchOutcome {
    Won {
        winner: TeamSide,
        margin: Option<WinMargin>,
    },
    Tie,
}

/// Both squads, addressed by side
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Squads {
    #[serde(rename = "A")]
    pub a: Squad,
    #[serde(rename = "B")]
    pub b: Squad,
}

impl Squads {
    pub fn get(&self, side: TeamSide) -> &Squad {
        match side {
            TeamSide::A => &self.a,
            TeamSide::B => &self.b,
        }
    }

    pub fn get_mut(&mut self, side: TeamSide) -> &mut Squad {
        match side {
            TeamSide::A => &mut self.a,
            TeamSide::B => &mut self.b,
        }
    }

    /// Batting squad and fielding squad, mutably
    pub fn split_mut(&mut self, batting: TeamSide) -> (&mut Squad, &mut Squad) {
        match batting {
            TeamSide::A => (&mut self.a, &mut self.b),
            TeamSide::B => (&mut self.b, &mut self.a),
        }
    }
}

// ============================================================================
// Match State
// ============================================================================

/// The match aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchState {
    pub id: MatchId,
    pub sport: String,
    pub team_a: TeamRef,
    pub team_b: TeamRef,
    pub status: MatchStatus,
    pub scores: TeamScores,
    /// 1 or 2
    pub innings: u8,
    /// Side currently batting, once known
    pub batting: Option<TeamSide>,
    /// Runs the chasing side needs (first-innings total + 1)
    pub target: Option<u32>,
    pub toss: Option<Toss>,
    pub fall_of_wickets: Vec<FallOfWicket>,
    pub history: ActionHistory,
    pub current_over: OverTracker,
    pub crease: Crease,
    pub squads: Squads,
    /// Unset on a tie
    pub winner: Option<TeamSide>,
    pub outcome: Option<MatchOutcome>,
    /// Incremented on every successful mutation
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MatchState {
    /// Schedule a new match with empty innings
    pub fn schedule(team_a: impl Into<String>, team_b: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: MatchId::new(),
            sport: SPORT_CRICKET.to_string(),
            team_a: TeamRef::new(team_a),
            team_b: TeamRef::new(team_b),
            status: MatchStatus::Scheduled,
            scores: TeamScores::default(),
            innings: 1,
            batting: None,
            target: None,
            toss: None,
            fall_of_wickets: Vec::new(),
            history: ActionHistory::new(),
            current_over: OverTracker::new(),
            crease: Crease::new(),
            squads: Squads::default(),
            winner: None,
            outcome: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Override history and over-buffer bounds
    pub fn with_limits(mut self, history_capacity: usize, over_buffer_capacity: usize) -> Self {
        self.history = ActionHistory::with_capacity(history_capacity);
        self.current_over = OverTracker::with_capacity(over_buffer_capacity);
        self
    }

    pub fn team(&self, side: TeamSide) -> &TeamRef {
        match side {
            TeamSide::A => &self.team_a,
            TeamSide::B => &self.team_b,
        }
    }

    pub fn score(&self, side: TeamSide) -> &Score {
        self.scores.get(side)
    }

    pub fn squad(&self, side: TeamSide) -> &Squad {
        self.squads.get(side)
    }

    /// Side fielding, once the batting side is known
    pub fn bowling(&self) -> Option<TeamSide> {
        self.batting.map(|side| side.opponent())
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    /// Runs still needed by the chasing side
    pub fn runs_required(&self) -> Option<u32> {
        let target = self.target?;
        let batting = self.batting?;
        Some(target.saturating_sub(self.score(batting).runs))
    }

    /// Whether the Over Tracker agrees with the ledger's ball count
    pub fn over_reconciles(&self) -> bool {
        match self.batting {
            Some(side) => self.current_over.legal_balls() == self.score(side).overs.balls,
            None => self.current_over.legal_balls() == 0,
        }
    }

    /// Wickets in hand for a side
    pub fn wickets_in_hand(&self, side: TeamSide) -> u8 {
        MAX_WICKETS - self.score(side).wickets.min(MAX_WICKETS)
    }

    /// Compact listing view
    pub fn summary(&self) -> MatchSummary {
        MatchSummary {
            id: self.id,
            team_a: self.team_a.name.clone(),
            team_b: self.team_b.name.clone(),
            status: self.status,
            innings: self.innings,
            batting: self.batting,
            score_a: self.scores.a.to_string(),
            score_b: self.scores.b.to_string(),
            run_rate: self.batting.and_then(|side| self.score(side).run_rate()),
            runs_required: self.runs_required(),
            winner: self.winner,
            version: self.version,
        }
    }
}

/// Listing view of a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    pub id: MatchId,
    pub team_a: String,
    pub team_b: String,
    pub status: MatchStatus,
    pub innings: u8,
    pub batting: Option<TeamSide>,
    pub score_a: String,
    pub score_b: String,
    /// Current run rate of the side at the crease
    pub run_rate: Option<f64>,
    pub runs_required: Option<u32>,
    pub winner: Option<TeamSide>,
    pub version: u64,
}
