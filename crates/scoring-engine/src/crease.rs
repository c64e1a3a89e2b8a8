//! Turn manager
//!
//! Which two batters are in (striker / non-striker) and who is bowling.
//! Slots hold stable [`PlayerId`]s; squad flags are derived from the slots
//! with [`Crease::apply_flags`] after every change.

use common::PlayerId;
use serde::{Deserialize, Serialize};

use crate::error::ScoringError;
use crate::player::Squad;
use crate::Result;

/// Batting slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CreaseSlot {
    Striker,
    NonStriker,
}

impl CreaseSlot {
    /// Parse a request label
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['_', '-'], "").as_str() {
            "striker" => Some(CreaseSlot::Striker),
            "nonstriker" => Some(CreaseSlot::NonStriker),
            _ => None,
        }
    }
}

/// Current batters and bowler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Crease {
    striker: Option<PlayerId>,
    non_striker: Option<PlayerId>,
    bowler: Option<PlayerId>,
}

impl Crease {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn striker(&self) -> Option<PlayerId> {
        self.striker
    }

    pub fn non_striker(&self) -> Option<PlayerId> {
        self.non_striker
    }

    pub fn bowler(&self) -> Option<PlayerId> {
        self.bowler
    }

    /// Check a batter can take a slot without touching the crease
    pub fn check_batter(&self, slot: CreaseSlot, player: PlayerId) -> Result<()> {
        let other = match slot {
            CreaseSlot::Striker => self.non_striker,
            CreaseSlot::NonStriker => self.striker,
        };
        if other == Some(player) {
            return Err(ScoringError::validation(format!(
                "player {} already occupies the other batting slot",
                player
            )));
        }
        Ok(())
    }

    /// Put a batter in a slot, returning whoever was there
    pub fn bind_batter(&mut self, slot: CreaseSlot, player: PlayerId) -> Result<Option<PlayerId>> {
        self.check_batter(slot, player)?;
        let target = match slot {
            CreaseSlot::Striker => &mut self.striker,
            CreaseSlot::NonStriker => &mut self.non_striker,
        };
        Ok(target.replace(player))
    }

    /// Put a bowler on, returning the previous bowler
    pub fn bind_bowler(&mut self, player: PlayerId) -> Option<PlayerId> {
        self.bowler.replace(player)
    }

    /// Striker and non-striker change ends
    pub fn swap_strike(&mut self) {
        std::mem::swap(&mut self.striker, &mut self.non_striker);
    }

    /// Empty the striker slot (dismissal)
    pub fn clear_striker(&mut self) -> Option<PlayerId> {
        self.striker.take()
    }

    /// Take the bowler off (end of over)
    pub fn release_bowler(&mut self) -> Option<PlayerId> {
        self.bowler.take()
    }

    /// Empty every slot (innings change)
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Striker and bowler that will take part in the next delivery
    pub fn ready_for_delivery(&self) -> Result<(PlayerId, PlayerId)> {
        let striker = self
            .striker
            .ok_or_else(|| ScoringError::invalid_state("no striker selected"))?;
        let bowler = self
            .bowler
            .ok_or_else(|| ScoringError::invalid_state("no bowler selected"))?;
        Ok((striker, bowler))
    }

    /// Mirror the slots onto squad flags
    pub fn apply_flags(&self, batting: &mut Squad, bowling: &mut Squad) {
        batting.clear_flags();
        bowling.clear_flags();

        if let Some(entry) = self.striker.and_then(|id| batting.get_mut(id)) {
            entry.batting.current_batsman = true;
            entry.batting.on_strike = true;
        }
        if let Some(entry) = self.non_striker.and_then(|id| batting.get_mut(id)) {
            entry.batting.current_batsman = true;
        }
        if let Some(entry) = self.bowler.and_then(|id| bowling.get_mut(id)) {
            entry.bowling.current_bowler = true;
        }
    }
}
