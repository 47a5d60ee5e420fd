//! Strongly-typed wrappers for duel concepts
//!
//! Newtypes keep display names, mention handles, and emblems from being
//! mixed up with each other or with narrative text.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the board a duelist occupies
///
/// Player 1 starts on cell 0 and advances toward higher cells; player 2
/// starts on the last cell and advances toward lower cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Seat {
    P1,
    P2,
}

impl Seat {
    pub fn opponent(self) -> Seat {
        match self {
            Seat::P1 => Seat::P2,
            Seat::P2 => Seat::P1,
        }
    }

    /// Sign applied to forward offsets and move magnitudes
    pub fn direction(self) -> i32 {
        match self {
            Seat::P1 => 1,
            Seat::P2 => -1,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Seat::P1 => 0,
            Seat::P2 => 1,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seat::P1 => write!(f, "p1"),
            Seat::P2 => write!(f, "p2"),
        }
    }
}

/// Display name of a duelist
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DuelistName(String);

impl DuelistName {
    pub fn new(s: impl Into<String>) -> Self {
        DuelistName(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DuelistName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DuelistName {
    fn from(s: String) -> Self {
        DuelistName(s)
    }
}

impl From<&str> for DuelistName {
    fn from(s: &str) -> Self {
        DuelistName(s.to_string())
    }
}

/// Emblem drawn on the board to mark a duelist's cell
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Emblem(String);

/// Emblems handed out when the caller does not supply one
pub const EMBLEM_POOL: [&str; 9] = ["🐻", "🐯", "🐲", "🦅", "🐍", "🦉", "🐗", "🐸", "🐺"];

impl Emblem {
    pub fn new(s: impl Into<String>) -> Self {
        Emblem(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Pick a pool emblem that differs from `exclude`
    pub fn random_excluding<R: Rng + ?Sized>(rng: &mut R, exclude: Option<&Emblem>) -> Emblem {
        let candidates: Vec<&str> = EMBLEM_POOL
            .iter()
            .copied()
            .filter(|e| exclude.map_or(true, |x| x.as_str() != *e))
            .collect();
        // The pool has nine entries, so excluding one always leaves a candidate
        let choice = candidates.choose(rng).copied().unwrap_or(EMBLEM_POOL[0]);
        Emblem::new(choice)
    }
}

impl fmt::Display for Emblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Emblem {
    fn from(s: &str) -> Self {
        Emblem(s.to_string())
    }
}

/// Identity of a duelist as supplied by the hosting layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuelistIdentity {
    pub name: DuelistName,
    /// Handle used to address the duelist in narrative (e.g. "@alice")
    pub mention: String,
    /// Preferred emblem, if any
    pub emblem: Option<Emblem>,
}

impl DuelistIdentity {
    pub fn new(name: impl Into<DuelistName>, mention: impl Into<String>) -> Self {
        DuelistIdentity {
            name: name.into(),
            mention: mention.into(),
            emblem: None,
        }
    }

    pub fn with_emblem(mut self, emblem: impl Into<String>) -> Self {
        self.emblem = Some(Emblem::new(emblem));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    #[test]
    fn test_seat_opponent() {
        assert_eq!(Seat::P1.opponent(), Seat::P2);
        assert_eq!(Seat::P2.opponent(), Seat::P1);
        assert_eq!(Seat::P1.direction(), 1);
        assert_eq!(Seat::P2.direction(), -1);
    }

    #[test]
    fn test_random_emblem_excludes() {
        let mut rng = ChaCha12Rng::seed_from_u64(7);
        let taken = Emblem::new("🐻");
        for _ in 0..50 {
            let e = Emblem::random_excluding(&mut rng, Some(&taken));
            assert_ne!(e, taken);
            assert!(EMBLEM_POOL.contains(&e.as_str()));
        }
    }

    #[test]
    fn test_identity_builder() {
        let id = DuelistIdentity::new("Alice", "@alice").with_emblem("🐺");
        assert_eq!(id.name.as_str(), "Alice");
        assert_eq!(id.emblem, Some(Emblem::new("🐺")));
    }
}
