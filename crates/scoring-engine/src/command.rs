//! Scoring commands
//!
//! [`Command`] is the one input type of the engine. The flat request shape
//! used by older scoring clients ([`ScoreRequest`]) is decoded into it with
//! `TryFrom`.

use common::{MatchId, PlayerId, TeamSide};
use serde::{Deserialize, Serialize};

use crate::crease::CreaseSlot;
use crate::error::ScoringError;
use crate::over::BallOutcome;
use crate::player::{DismissalKind, PlayerRef};
use crate::score::ExtraKind;
use crate::state::TossDecision;
use crate::Result;

// ============================================================================
// Command
// ============================================================================

/// A single delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BallEvent {
    /// Runs off the bat (0..=7)
    Runs { runs: u32 },
    /// Striker dismissed
    Wicket {
        #[serde(default)]
        dismissal: DismissalKind,
        /// Fielder credited on a run-out
        #[serde(default)]
        fielder: Option<PlayerId>,
    },
    /// One-run extra
    Extra { extra: ExtraKind },
}

impl BallEvent {
    /// Outcome as seen by the over tracker and figures
    pub fn outcome(&self) -> BallOutcome {
        match *self {
            BallEvent::Runs { runs } => BallOutcome::Runs { runs },
            BallEvent::Wicket { .. } => BallOutcome::Wicket,
            BallEvent::Extra { extra } => BallOutcome::Extra { extra },
        }
    }

    /// History label
    pub fn label(&self) -> String {
        match self {
            BallEvent::Runs { runs } => format!("runs:{}", runs),
            BallEvent::Wicket { dismissal, .. } => format!("wicket:{}", dismissal),
            BallEvent::Extra { extra } => format!("extra:{}", extra),
        }
    }
}

/// Squad override entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquadMember {
    pub id: PlayerId,
    pub name: String,
}

/// Everything the engine can be asked to do
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    Toss {
        winner: TeamSide,
        decision: TossDecision,
    },
    Ball {
        team: TeamSide,
        event: BallEvent,
    },
    Undo,
    SelectBatsman {
        player: PlayerRef,
        slot: CreaseSlot,
    },
    SelectBowler {
        player: PlayerRef,
    },
    SwitchStrike,
    EndOver,
    SwapInnings,
    CompleteMatch,
    UpdateSquad {
        team: TeamSide,
        players: Vec<SquadMember>,
    },
}

impl Command {
    /// Metric / log label
    pub fn kind(&self) -> &'static str {
        match self {
            Command::Toss { .. } => "toss",
            Command::Ball { event, .. } => match event {
                BallEvent::Runs { .. } => "runs",
                BallEvent::Wicket { .. } => "wicket",
                BallEvent::Extra { .. } => "extra",
            },
            Command::Undo => "undo",
            Command::SelectBatsman { .. } => "select_batsman",
            Command::SelectBowler { .. } => "select_bowler",
            Command::SwitchStrike => "switch_strike",
            Command::EndOver => "end_over",
            Command::SwapInnings => "swap_innings",
            Command::CompleteMatch => "complete_match",
            Command::UpdateSquad { .. } => "update_squad",
        }
    }

    pub fn runs(team: TeamSide, runs: u32) -> Self {
        Command::Ball {
            team,
            event: BallEvent::Runs { runs },
        }
    }

    pub fn wicket(team: TeamSide, dismissal: DismissalKind) -> Self {
        Command::Ball {
            team,
            event: BallEvent::Wicket {
                dismissal,
                fielder: None,
            },
        }
    }

    pub fn extra(team: TeamSide, extra: ExtraKind) -> Self {
        Command::Ball {
            team,
            event: BallEvent::Extra { extra },
        }
    }
}

// ============================================================================
// Flat request
// ============================================================================

/// Toss part of a flat request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TossRequest {
    pub winner: String,
    pub decision: TossDecision,
}

/// Batsman selection part of a flat request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectBatsmanRequest {
    pub player: PlayerRef,
    pub slot: String,
}

/// Flat score request
///
/// Exactly one operation field may be set; boolean flags count as set
/// only when `true`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    #[serde(default)]
    pub match_id: Option<MatchId>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub runs: Option<i64>,
    #[serde(default)]
    pub is_wicket: Option<bool>,
    #[serde(default)]
    pub wicket_type: Option<DismissalKind>,
    #[serde(default)]
    pub fielder: Option<PlayerId>,
    #[serde(default)]
    pub extra_type: Option<String>,
    #[serde(default)]
    pub is_undo: Option<bool>,
    #[serde(default)]
    pub toss: Option<TossRequest>,
    #[serde(default)]
    pub select_batsman: Option<SelectBatsmanRequest>,
    #[serde(default)]
    pub select_bowler: Option<PlayerRef>,
    #[serde(default)]
    pub switch_strike: Option<bool>,
    #[serde(default)]
    pub end_over: Option<bool>,
    #[serde(default)]
    pub swap_innings: Option<bool>,
    #[serde(default)]
    pub complete_match: Option<bool>,
    #[serde(default)]
    pub squad: Option<Vec<SquadMember>>,
}

impl ScoreRequest {
    fn operations(&self) -> Vec<&'static str> {
        let flag = |v: Option<bool>| v.unwrap_or(false);
        let mut ops = Vec::new();
        if self.runs.is_some() {
            ops.push("runs");
        }
        if flag(self.is_wicket) {
            ops.push("isWicket");
        }
        if self.extra_type.is_some() {
            ops.push("extraType");
        }
        if flag(self.is_undo) {
            ops.push("isUndo");
        }
        if self.toss.is_some() {
            ops.push("toss");
        }
        if self.select_batsman.is_some() {
            ops.push("selectBatsman");
        }
        if self.select_bowler.is_some() {
            ops.push("selectBowler");
        }
        if flag(self.switch_strike) {
            ops.push("switchStrike");
        }
        if flag(self.end_over) {
            ops.push("endOver");
        }
        if flag(self.swap_innings) {
            ops.push("swapInnings");
        }
        if flag(self.complete_match) {
            ops.push("completeMatch");
        }
        if self.squad.is_some() {
            ops.push("squad");
        }
        ops
    }

    fn team_side(&self) -> Result<TeamSide> {
        let raw = self
            .team
            .as_deref()
            .ok_or_else(|| ScoringError::validation("team is required"))?;
        parse_side(raw)
    }
}

fn parse_side(raw: &str) -> Result<TeamSide> {
    TeamSide::parse(raw)
        .ok_or_else(|| ScoringError::validation(format!("unrecognized team side: {}", raw)))
}

impl TryFrom<ScoreRequest> for Command {
    type Error = ScoringError;

    fn try_from(req: ScoreRequest) -> Result<Self> {
        let ops = req.operations();
        match ops.len() {
            0 => return Err(ScoringError::validation("request carries no operation")),
            1 => {}
            _ => {
                return Err(ScoringError::validation(format!(
                    "request carries more than one operation: {}",
                    ops.join(", ")
                )))
            }
        }

        if let Some(runs) = req.runs {
            let runs = u32::try_from(runs)
                .map_err(|_| ScoringError::validation(format!("run value {} is negative", runs)))?;
            return Ok(Command::runs(req.team_side()?, runs));
        }
        if req.is_wicket == Some(true) {
            return Ok(Command::Ball {
                team: req.team_side()?,
                event: BallEvent::Wicket {
                    dismissal: req.wicket_type.unwrap_or_default(),
                    fielder: req.fielder,
                },
            });
        }
        if let Some(raw) = req.extra_type.as_deref() {
            let extra = ExtraKind::parse(raw)
                .ok_or_else(|| ScoringError::validation(format!("unrecognized extra type: {}", raw)))?;
            return Ok(Command::extra(req.team_side()?, extra));
        }
        if req.is_undo == Some(true) {
            return Ok(Command::Undo);
        }
        if let Some(toss) = req.toss {
            return Ok(Command::Toss {
                winner: parse_side(&toss.winner)?,
                decision: toss.decision,
            });
        }
        if let Some(select) = req.select_batsman {
            let slot = CreaseSlot::parse(&select.slot).ok_or_else(|| {
                ScoringError::validation(format!("unrecognized batting slot: {}", select.slot))
            })?;
            return Ok(Command::SelectBatsman {
                player: select.player,
                slot,
            });
        }
        if let Some(player) = req.select_bowler {
            return Ok(Command::SelectBowler { player });
        }
        if req.switch_strike == Some(true) {
            return Ok(Command::SwitchStrike);
        }
        if req.end_over == Some(true) {
            return Ok(Command::EndOver);
        }
        if req.swap_innings == Some(true) {
            return Ok(Command::SwapInnings);
        }
        if req.complete_match == Some(true) {
            return Ok(Command::CompleteMatch);
        }
        let team = req.team_side()?;
        let players = req.squad.unwrap_or_default();
        Ok(Command::UpdateSquad { team, players })
    }
}
