//! Player stat tracker
//!
//! Per-player batting and bowling figures, updated from the same
//! [`BallOutcome`] that drives the ledger so the two never drift apart.

use common::PlayerId;
use serde::{Deserialize, Serialize};

use crate::error::ScoringError;
use crate::over::BallOutcome;
use crate::score::{ExtraKind, Overs, BALLS_PER_OVER};
use crate::Result;

// ============================================================================
// Dismissal
// ============================================================================

/// How a batter was dismissed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DismissalKind {
    #[default]
    Bowled,
    Caught,
    Lbw,
    Stumped,
    RunOut,
    HitWicket,
    Other,
}

impl DismissalKind {
    /// Whether the bowler's wicket column is credited
    pub fn credited_to_bowler(&self) -> bool {
        !matches!(self, DismissalKind::RunOut | DismissalKind::Other)
    }
}

impl std::fmt::Display for DismissalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DismissalKind::Bowled => "bowled",
            DismissalKind::Caught => "caught",
            DismissalKind::Lbw => "lbw",
            DismissalKind::Stumped => "stumped",
            DismissalKind::RunOut => "run out",
            DismissalKind::HitWicket => "hit wicket",
            DismissalKind::Other => "other",
        };
        write!(f, "{}", label)
    }
}

// ============================================================================
// Figures
// ============================================================================

/// Batting figures for one innings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattingFigures {
    pub runs: u32,
    pub balls_faced: u32,
    pub fours: u32,
    pub sixes: u32,
    pub is_out: bool,
    pub out_type: Option<DismissalKind>,
    /// Bowler, or fielder for run-outs
    pub out_by: Option<PlayerId>,
    pub current_batsman: bool,
    pub on_strike: bool,
}

impl BattingFigures {
    /// Credit a delivery faced by this batter
    pub fn face(&mut self, outcome: &BallOutcome) {
        if let BallOutcome::Runs { runs } = outcome {
            self.runs += runs;
            match runs {
                4 => self.fours += 1,
                6 => self.sixes += 1,
                _ => {}
            }
        }
        if outcome.is_legal() {
            self.balls_faced += 1;
        }
    }

    /// Mark the batter out
    pub fn dismiss(&mut self, kind: DismissalKind, by: Option<PlayerId>) {
        self.is_out = true;
        self.out_type = Some(kind);
        self.out_by = by;
        self.current_batsman = false;
        self.on_strike = false;
    }

    /// Runs per hundred balls
    pub fn strike_rate(&self) -> Option<f64> {
        if self.balls_faced == 0 {
            return None;
        }
        Some(self.runs as f64 * 100.0 / self.balls_faced as f64)
    }
}

/// Bowling figures for one innings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BowlingFigures {
    pub balls_bowled: u32,
    /// Derived from `balls_bowled`
    pub overs: Overs,
    pub runs_conceded: u32,
    pub wickets: u32,
    pub maidens: u32,
    pub wides: u32,
    pub no_balls: u32,
    pub current_bowler: bool,
}

impl BowlingFigures {
    /// Charge a delivery to this bowler
    pub fn bowl(&mut self, outcome: &BallOutcome, wicket_credited: bool) {
        self.runs_conceded += outcome.runs_conceded();
        match outcome {
            BallOutcome::Extra { extra: ExtraKind::Wide } => self.wides += 1,
            BallOutcome::Extra { extra: ExtraKind::NoBall } => self.no_balls += 1,
            _ => {}
        }
        if wicket_credited {
            self.wickets += 1;
        }
        if outcome.is_legal() {
            self.balls_bowled += 1;
            self.overs = Overs::from_legal_balls(self.balls_bowled);
        }
    }

    /// Runs conceded per over
    pub fn economy(&self) -> Option<f64> {
        if self.balls_bowled == 0 {
            return None;
        }
        Some(self.runs_conceded as f64 * BALLS_PER_OVER as f64 / self.balls_bowled as f64)
    }
}

// ============================================================================
// Squad
// ============================================================================

/// Reference to a player in a command
///
/// The id is authoritative. The name is only needed the first time a
/// player appears, so an unseen player can be added to the squad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRef {
    pub id: PlayerId,
    #[serde(default)]
    pub name: Option<String>,
}

impl PlayerRef {
    /// Reference an existing player by id
    pub fn id(id: PlayerId) -> Self {
        Self { id, name: None }
    }

    /// Reference a player that may not be in the squad yet
    pub fn named(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
        }
    }
}

/// One player's identity and figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SquadEntry {
    pub id: PlayerId,
    pub name: String,
    pub batting: BattingFigures,
    pub bowling: BowlingFigures,
}

impl SquadEntry {
    /// New player with zero-valued figures
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            batting: BattingFigures::default(),
            bowling: BowlingFigures::default(),
        }
    }
}

/// A team's players, in the order they were added
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Squad {
    players: Vec<SquadEntry>,
}

impl Squad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: PlayerId) -> Option<&SquadEntry> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut SquadEntry> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.get(id).is_some()
    }

    /// Check that a reference can be resolved without mutating the squad
    pub fn can_resolve(&self, player: &PlayerRef) -> Result<()> {
        if self.contains(player.id) || player.name.is_some() {
            Ok(())
        } else {
            Err(ScoringError::not_found(format!("player {}", player.id)))
        }
    }

    /// Resolve a reference, adding an unseen named player with zero figures
    pub fn resolve(&mut self, player: &PlayerRef) -> Result<&mut SquadEntry> {
        self.can_resolve(player)?;
        let index = match self.players.iter().position(|p| p.id == player.id) {
            Some(index) => index,
            None => {
                let name = player.name.clone().unwrap_or_default();
                self.players.push(SquadEntry::new(player.id, name));
                self.players.len() - 1
            }
        };
        Ok(&mut self.players[index])
    }

    /// Insert or rename; existing figures are kept
    pub fn upsert(&mut self, id: PlayerId, name: impl Into<String>) {
        let name = name.into();
        match self.get_mut(id) {
            Some(entry) => entry.name = name,
            None => self.players.push(SquadEntry::new(id, name)),
        }
    }

    /// Put a saved entry's figures back in place (undo)
    ///
    /// The current name is kept, so a rename after the saved delivery
    /// survives.
    pub fn restore_figures(&mut self, entry: SquadEntry) {
        match self.get_mut(entry.id) {
            Some(existing) => {
                existing.batting = entry.batting;
                existing.bowling = entry.bowling;
            }
            None => self.players.push(entry),
        }
    }

    /// Display name for presentation
    pub fn name_of(&self, id: PlayerId) -> Option<&str> {
        self.get(id).map(|p| p.name.as_str())
    }

    /// Drop all crease / bowling-end flags (innings change)
    pub fn clear_flags(&mut self) {
        for player in &mut self.players {
            player.batting.current_batsman = false;
            player.batting.on_strike = false;
            player.bowling.current_bowler = false;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SquadEntry> {
        self.players.iter()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
