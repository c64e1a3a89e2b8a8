//! Common types used across LiveScore
//!
//! This module provides the identifiers shared by the engine, the store
//! and the HTTP layer. Players are always referenced by [`PlayerId`];
//! display names live on squad entries and are only used for presentation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(pub Uuid);

impl MatchId {
    /// Create a new random MatchId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a MatchId from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    /// Create a new random PlayerId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a PlayerId from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for teams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub Uuid);

impl TeamId {
    /// Create a new random TeamId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TeamId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which of the two teams in a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamSide {
    /// Home / first-listed team
    A,
    /// Away / second-listed team
    B,
}

impl TeamSide {
    /// Returns the other team
    pub fn opponent(&self) -> Self {
        match self {
            TeamSide::A => TeamSide::B,
            TeamSide::B => TeamSide::A,
        }
    }

    /// Parse a side label ("A"/"B", case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "A" | "a" => Some(TeamSide::A),
            "B" | "b" => Some(TeamSide::B),
            _ => None,
        }
    }
}

impl std::str::FromStr for TeamSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unrecognized team side: {}", s))
    }
}

impl std::fmt::Display for TeamSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeamSide::A => write!(f, "A"),
            TeamSide::B => write!(f, "B"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_side_opponent() {
        assert_eq!(TeamSide::A.opponent(), TeamSide::B);
        assert_eq!(TeamSide::B.opponent(), TeamSide::A);
    }

    #[test]
    fn test_team_side_parse() {
        assert_eq!("A".parse::<TeamSide>(), Ok(TeamSide::A));
        assert_eq!("b".parse::<TeamSide>(), Ok(TeamSide::B));
        assert!("C".parse::<TeamSide>().is_err());
        assert!("".parse::<TeamSide>().is_err());
    }

    #[test]
    fn test_ids_serialize_as_plain_uuid() {
        let id = PlayerId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.0));

        let side = serde_json::to_string(&TeamSide::B).unwrap();
        assert_eq!(side, "\"B\"");
    }
}
