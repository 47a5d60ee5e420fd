//! Half-turn resolution and end-of-turn locks

use crate::core::{CardCatalog, Seat};
use crate::game::{CombatOutcome, DuelLogger, DuelState};
use crate::Result;
use serde::{Deserialize, Serialize};

/// One of the two resolution passes in a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Half {
    First,
    Second,
}

impl Half {
    pub fn index(self) -> usize {
        match self {
            Half::First => 0,
            Half::Second => 1,
        }
    }
}

impl DuelState {
    /// Resolve one half-turn: movement, then combat
    pub fn resolve_half_turn(
        &mut self,
        catalog: &CardCatalog,
        half: Half,
        logger: &DuelLogger,
    ) -> Result<CombatOutcome> {
        let p1_play = self.p1.play_for_half(half.index())?;
        let p2_play = self.p2.play_for_half(half.index())?;

        logger.verbose(&format!(
            "Resolving {:?} half: {} plays {}, {} plays {}",
            half,
            self.p1.name,
            catalog.play_name(p1_play),
            self.p2.name,
            catalog.play_name(p2_play)
        ));

        self.resolve_movement(catalog, p1_play, p2_play, logger);
        self.resolve_combat(catalog, p1_play, p2_play, logger)
    }

    /// Lock each duelist out of the family they played in half two
    ///
    /// Specials are never locked; their once-per-duel flag already limits them.
    pub fn update_locks(&mut self, catalog: &CardCatalog) -> Result<()> {
        for seat in [Seat::P1, Seat::P2] {
            let play = self.duelist(seat).play_for_half(Half::Second.index())?;
            let lock = if catalog.is_special(play) {
                None
            } else {
                Some(catalog.family_of(play))
            };
            self.duelist_mut(seat).lock(lock);
        }
        Ok(())
    }
}
