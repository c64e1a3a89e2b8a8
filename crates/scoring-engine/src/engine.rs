//! Match state machine
//!
//! Applies one [`Command`] at a time to a [`MatchState`]. Every operation
//! validates first and mutates second, and [`ScoringEngine::apply`] works on
//! a clone, so a rejected command never leaves a partially updated match.
//!
//! State flow: SCHEDULED -> LIVE (first ball) -> COMPLETED (terminal).

use chrono::Utc;
use common::{PlayerId, TeamSide};
use std::cmp::Ordering;
use tracing::{debug, info};

use crate::command::{BallEvent, Command, SquadMember};
use crate::crease::CreaseSlot;
use crate::error::ScoringError;
use crate::history::{HistoryEntry, RollbackFrame, DEFAULT_HISTORY_CAPACITY};
use crate::over::DEFAULT_OVER_BUFFER_CAPACITY;
use crate::player::{DismissalKind, PlayerRef};
use crate::score::MAX_RUNS_PER_BALL;
use crate::state::{
    FallOfWicket, MatchOutcome, MatchState, MatchStatus, Toss, TossDecision, WinMargin,
};
use crate::Result;

/// Cricket scoring engine
///
/// Stateless apart from the bounds it stamps on newly scheduled matches;
/// all match data lives in the [`MatchState`] passed in.
#[derive(Debug, Clone, Copy)]
pub struct ScoringEngine {
    history_capacity: usize,
    over_buffer_capacity: usize,
}

impl ScoringEngine {
    /// Engine with the default history (50) and over buffer (60) bounds
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_HISTORY_CAPACITY, DEFAULT_OVER_BUFFER_CAPACITY)
    }

    pub fn with_limits(history_capacity: usize, over_buffer_capacity: usize) -> Self {
        Self {
            history_capacity,
            over_buffer_capacity,
        }
    }

    /// Create a SCHEDULED match
    pub fn schedule(&self, team_a: impl Into<String>, team_b: impl Into<String>) -> MatchState {
        let state = MatchState::schedule(team_a, team_b)
            .with_limits(self.history_capacity, self.over_buffer_capacity);
        info!(
            match_id = %state.id,
            team_a = %state.team_a.name,
            team_b = %state.team_b.name,
            "Match scheduled"
        );
        state
    }

    /// Apply a command and return the resulting state
    ///
    /// `state` is never modified. On success the returned state has its
    /// `version` bumped.
    pub fn apply(&self, state: &MatchState, command: Command) -> Result<MatchState> {
        let mut next = state.clone();
        self.dispatch(&mut next, command)?;
        next.version += 1;
        next.updated_at = Utc::now();
        Ok(next)
    }

    fn dispatch(&self, state: &mut MatchState, command: Command) -> Result<()> {
        match command {
            Command::Toss { winner, decision } => self.apply_toss(state, winner, decision),
            Command::Ball { team, event } => self.apply_ball_event(state, team, event),
            Command::Undo => self.undo_last(state),
            Command::SelectBatsman { player, slot } => self.select_batsman(state, &player, slot),
            Command::SelectBowler { player } => self.select_bowler(state, &player),
            Command::SwitchStrike => self.switch_strike(state),
            Command::EndOver => self.end_over(state),
            Command::SwapInnings => self.swap_innings(state),
            Command::CompleteMatch => self.complete_match(state),
            Command::UpdateSquad { team, players } => self.update_squad(state, team, &players),
        }
    }

    // ========================================================================
    // Toss
    // ========================================================================

    /// Record the toss and derive the side batting first
    pub fn apply_toss(
        &self,
        state: &mut MatchState,
        winner: TeamSide,
        decision: TossDecision,
    ) -> Result<()> {
        if state.status != MatchStatus::Scheduled {
            return Err(ScoringError::invalid_state(format!(
                "toss cannot change once the match is {}",
                state.status
            )));
        }

        let toss = Toss { winner, decision };
        state.toss = Some(toss);
        state.batting = Some(toss.batting_first());
        info!(
            match_id = %state.id,
            winner = %winner,
            decision = ?decision,
            batting = %toss.batting_first(),
            "Toss recorded"
        );
        Ok(())
    }

    // ========================================================================
    // Deliveries
    // ========================================================================

    /// Apply a single delivery
    pub fn apply_ball_event(
        &self,
        state: &mut MatchState,
        team: TeamSide,
        event: BallEvent,
    ) -> Result<()> {
        ensure_open(state)?;
        if let BallEvent::Runs { runs } = event {
            if runs > MAX_RUNS_PER_BALL {
                return Err(ScoringError::validation(format!(
                    "run value {} outside [0, {}]",
                    runs, MAX_RUNS_PER_BALL
                )));
            }
        }

        let batting = batting_side(state)?;
        if batting != team {
            return Err(ScoringError::validation(format!(
                "team {} is not batting, team {} is",
                team, batting
            )));
        }
        let bowling = batting.opponent();

        if state.score(batting).is_all_out() {
            return Err(ScoringError::invalid_state(format!(
                "team {} is all out",
                batting
            )));
        }
        let (striker_id, bowler_id) = state.crease.ready_for_delivery()?;
        let striker_before = state
            .squad(batting)
            .get(striker_id)
            .cloned()
            .ok_or_else(|| ScoringError::not_found(format!("striker {}", striker_id)))?;
        let bowler_before = state
            .squad(bowling)
            .get(bowler_id)
            .cloned()
            .ok_or_else(|| ScoringError::not_found(format!("bowler {}", bowler_id)))?;

        let before = *state.score(batting);
        let rollback = RollbackFrame {
            innings: state.innings,
            status: state.status,
            batting: state.batting,
            crease: state.crease,
            over: state.current_over.clone(),
            striker: striker_before,
            bowler: bowler_before,
            fall_of_wickets: state.fall_of_wickets.len(),
        };

        // Ledger goes first: it is the only step that can still fail
        match event {
            BallEvent::Runs { runs } => state.scores.add_runs(batting, runs)?,
            BallEvent::Wicket { .. } => state.scores.record_wicket(batting)?,
            BallEvent::Extra { extra } => state.scores.record_extra(batting, extra),
        }

        if state.status == MatchStatus::Scheduled {
            state.status = MatchStatus::Live;
            info!(match_id = %state.id, batting = %batting, "Match live");
        }

        let now = Utc::now();
        let outcome = event.outcome();
        let effect = state.current_over.record(&outcome);

        let (batting_squad, bowling_squad) = state.squads.split_mut(batting);
        if let Some(bowler) = bowling_squad.get_mut(bowler_id) {
            let credited = matches!(
                event,
                BallEvent::Wicket { dismissal, .. } if dismissal.credited_to_bowler()
            );
            bowler.bowling.bowl(&outcome, credited);
            if effect.over_completed.is_some_and(|over| over.maiden) {
                bowler.bowling.maidens += 1;
            }
        }
        if let Some(striker) = batting_squad.get_mut(striker_id) {
            striker.batting.face(&outcome);
            if let BallEvent::Wicket { dismissal, fielder } = event {
                striker.batting.dismiss(dismissal, dismissed_by(dismissal, fielder, bowler_id));
                let total = state.scores.get(batting);
                let fow = FallOfWicket {
                    team: batting,
                    wicket_number: total.wickets,
                    player: striker_id,
                    player_runs: striker.batting.runs,
                    player_balls: striker.batting.balls_faced,
                    team_runs: total.runs,
                    team_overs: total.overs,
                    dismissal,
                    timestamp: now,
                };
                info!(
                    match_id = %state.id,
                    team = %batting,
                    wicket = fow.wicket_number,
                    player = %striker_id,
                    dismissal = %dismissal,
                    score = %total,
                    "Wicket"
                );
                state.fall_of_wickets.push(fow);
            }
        }

        if matches!(event, BallEvent::Wicket { .. }) {
            state.crease.clear_striker();
        }
        if effect.rotate_strike {
            state.crease.swap_strike();
        }
        sync_flags(state);

        let after = *state.score(batting);
        if let Some(over) = effect.over_completed {
            info!(
                match_id = %state.id,
                bowler = %bowler_id,
                runs_conceded = over.runs_conceded,
                maiden = over.maiden,
                overs = %after.overs,
                "Over completed"
            );
        }
        debug!(
            match_id = %state.id,
            team = %batting,
            ball = %outcome.label(),
            score = %after,
            "Delivery applied"
        );

        state.history.push(HistoryEntry {
            timestamp: now,
            team: batting,
            action: event.label(),
            before,
            after,
            rollback,
        });
        Ok(())
    }

    /// Revert the most recent delivery
    ///
    /// Restores the ledger, both batters' and the bowler's figures, the
    /// crease, the over in progress and fall-of-wicket records. Deliveries
    /// from a closed innings cannot be undone.
    pub fn undo_last(&self, state: &mut MatchState) -> Result<()> {
        ensure_open(state)?;
        let last = state.history.last().ok_or(ScoringError::NoHistory)?;
        if last.rollback.innings != state.innings {
            return Err(ScoringError::invalid_state(
                "last delivery belongs to a closed innings",
            ));
        }
        let entry = state.history.pop().ok_or(ScoringError::NoHistory)?;

        let HistoryEntry {
            team,
            action,
            before,
            rollback,
            ..
        } = entry;
        state.scores.restore(team, before);
        state.status = rollback.status;
        state.batting = rollback.batting;
        state.crease = rollback.crease;
        state.current_over = rollback.over;
        state.fall_of_wickets.truncate(rollback.fall_of_wickets);
        state.squads.get_mut(team).restore_figures(rollback.striker);
        state.squads.get_mut(team.opponent()).restore_figures(rollback.bowler);
        sync_flags(state);

        info!(
            match_id = %state.id,
            team = %team,
            action = %action,
            score = %before,
            "Delivery undone"
        );
        Ok(())
    }

    // ========================================================================
    // Crease
    // ========================================================================

    /// Bind a batter to a slot; an unseen named player joins the batting squad
    pub fn select_batsman(
        &self,
        state: &mut MatchState,
        player: &PlayerRef,
        slot: CreaseSlot,
    ) -> Result<()> {
        ensure_open(state)?;
        let batting = batting_side(state)?;
        if state.squad(batting.opponent()).contains(player.id) {
            return Err(ScoringError::validation(format!(
                "player {} belongs to the fielding side",
                player.id
            )));
        }
        let squad = state.squad(batting);
        squad.can_resolve(player)?;
        if squad.get(player.id).is_some_and(|p| p.batting.is_out) {
            return Err(ScoringError::invalid_state(format!(
                "player {} is already out",
                player.id
            )));
        }
        state.crease.check_batter(slot, player.id)?;

        state.squads.get_mut(batting).resolve(player)?;
        let replaced = state.crease.bind_batter(slot, player.id)?;
        sync_flags(state);
        info!(
            match_id = %state.id,
            player = %player.id,
            slot = ?slot,
            replaced = ?replaced,
            "Batsman selected"
        );
        Ok(())
    }

    /// Put a bowler on; an unseen named player joins the fielding squad
    pub fn select_bowler(&self, state: &mut MatchState, player: &PlayerRef) -> Result<()> {
        ensure_open(state)?;
        let bowling = batting_side(state)?.opponent();
        if state.squad(bowling.opponent()).contains(player.id) {
            return Err(ScoringError::validation(format!(
                "player {} belongs to the batting side",
                player.id
            )));
        }
        state.squad(bowling).can_resolve(player)?;

        state.squads.get_mut(bowling).resolve(player)?;
        let replaced = state.crease.bind_bowler(player.id);
        sync_flags(state);
        info!(
            match_id = %state.id,
            player = %player.id,
            replaced = ?replaced,
            "Bowler selected"
        );
        Ok(())
    }

    /// Manual strike correction
    pub fn switch_strike(&self, state: &mut MatchState) -> Result<()> {
        ensure_open(state)?;
        state.crease.swap_strike();
        sync_flags(state);
        debug!(match_id = %state.id, "Strike switched");
        Ok(())
    }

    /// Close the over administratively
    ///
    /// Only valid at an over boundary. Clears the display buffer and takes
    /// the bowler off so the next over needs a fresh selection. Strike is
    /// left alone; the sixth legal ball already rotated it.
    pub fn end_over(&self, state: &mut MatchState) -> Result<()> {
        ensure_open(state)?;
        if state.current_over.legal_balls() > 0 {
            return Err(ScoringError::invalid_state(format!(
                "over in progress ({} legal balls bowled)",
                state.current_over.legal_balls()
            )));
        }
        state.current_over.reset();
        let released = state.crease.release_bowler();
        sync_flags(state);
        info!(match_id = %state.id, bowler = ?released, "Over closed");
        Ok(())
    }

    // ========================================================================
    // Innings / Completion
    // ========================================================================

    /// Close the first innings and start the chase
    pub fn swap_innings(&self, state: &mut MatchState) -> Result<()> {
        ensure_open(state)?;
        if state.innings != 1 {
            return Err(ScoringError::invalid_state("second innings already in progress"));
        }
        let batting = batting_side(state)?;

        let target = state.score(batting).runs + 1;
        state.target = Some(target);
        state.batting = Some(batting.opponent());
        state.innings = 2;
        state.crease.reset();
        state.current_over.reset();
        sync_flags(state);

        info!(
            match_id = %state.id,
            batting = %batting.opponent(),
            target,
            "Innings swapped"
        );
        Ok(())
    }

    /// Freeze the match and decide the result
    pub fn complete_match(&self, state: &mut MatchState) -> Result<()> {
        ensure_open(state)?;

        let winner = match state.scores.a.runs.cmp(&state.scores.b.runs) {
            Ordering::Greater => Some(TeamSide::A),
            Ordering::Less => Some(TeamSide::B),
            Ordering::Equal => None,
        };
        let outcome = match winner {
            Some(winner) => MatchOutcome::Won {
                winner,
                margin: win_margin(state, winner),
            },
            None => MatchOutcome::Tie,
        };

        state.status = MatchStatus::Completed;
        state.winner = winner;
        state.outcome = Some(outcome);
        info!(match_id = %state.id, outcome = ?outcome, "Match completed");
        Ok(())
    }

    // ========================================================================
    // Squads
    // ========================================================================

    /// Insert or rename players; existing figures are kept
    pub fn update_squad(
        &self,
        state: &mut MatchState,
        team: TeamSide,
        players: &[SquadMember],
    ) -> Result<()> {
        ensure_open(state)?;
        let other = state.squad(team.opponent());
        if let Some(clash) = players.iter().find(|p| other.contains(p.id)) {
            return Err(ScoringError::validation(format!(
                "player {} already belongs to team {}",
                clash.id,
                team.opponent()
            )));
        }

        let squad = state.squads.get_mut(team);
        for member in players {
            squad.upsert(member.id, member.name.clone());
        }
        sync_flags(state);
        info!(match_id = %state.id, team = %team, players = players.len(), "Squad updated");
        Ok(())
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_open(state: &MatchState) -> Result<()> {
    if state.is_completed() {
        return Err(ScoringError::invalid_state(format!(
            "match {} is completed",
            state.id
        )));
    }
    Ok(())
}

fn batting_side(state: &MatchState) -> Result<TeamSide> {
    state
        .batting
        .ok_or_else(|| ScoringError::invalid_state("batting side not decided yet"))
}

/// Fielder for run-outs, bowler otherwise
fn dismissed_by(
    dismissal: DismissalKind,
    fielder: Option<PlayerId>,
    bowler: PlayerId,
) -> Option<PlayerId> {
    match dismissal {
        DismissalKind::RunOut | DismissalKind::Other => fielder,
        _ => Some(bowler),
    }
}

fn win_margin(state: &MatchState, winner: TeamSide) -> Option<WinMargin> {
    if state.innings != 2 {
        return None;
    }
    let chasing = state.batting?;
    if winner == chasing {
        Some(WinMargin::Wickets(state.wickets_in_hand(chasing)))
    } else {
        let lead = state.score(winner).runs - state.score(chasing).runs;
        Some(WinMargin::Runs(lead))
    }
}

/// Re-derive squad flags from the crease
fn sync_flags(state: &mut MatchState) {
    match state.batting {
        Some(batting) => {
            let (batting_squad, bowling_squad) = state.squads.split_mut(batting);
            state.crease.apply_flags(batting_squad, bowling_squad);
        }
        None => {
            state.squads.a.clear_flags();
            state.squads.b.clear_flags();
        }
    }
}
