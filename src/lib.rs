//! Samurai duel engine
//!
//! A deterministic two-player duel on a five-cell line. Each turn both
//! duelists secretly pick two plays, which then resolve in two half-turns of
//! movement followed by combat.

pub mod core;
pub mod error;
pub mod game;
pub mod tournament;

pub use error::{DuelError, Result};
