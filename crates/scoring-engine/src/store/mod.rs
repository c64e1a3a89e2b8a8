//! Match storage
//!
//! The store holds the authoritative [`MatchState`](crate::state::MatchState)
//! for every match. Only [`ScoringService`](crate::service::ScoringService)
//! writes to it.

mod memory;
mod traits;

pub use memory::InMemoryMatchStore;
pub use traits::*;
