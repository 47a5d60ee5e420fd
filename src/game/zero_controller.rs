//! Zero controller for testing and automation
//!
//! Always chooses the first offered play. Legal plays are ordered by name, so
//! the result is fully deterministic.

use crate::core::{Play, Seat};
use crate::game::choice::{ChoiceStep, DuelistView};
use crate::game::controller::DuelistController;

/// A controller that always chooses the first available play (index 0)
///
/// This is useful for:
/// - Automated testing
/// - Running duels without interaction
/// - Benchmarking the engine
pub struct ZeroController {
    seat: Seat,
}

impl ZeroController {
    pub fn new(seat: Seat) -> Self {
        ZeroController { seat }
    }
}

impl DuelistController for ZeroController {
    fn seat(&self) -> Seat {
        self.seat
    }

    fn choose_play(
        &mut self,
        _view: &DuelistView,
        _step: ChoiceStep,
        _header: &str,
        options: &[Play],
    ) -> Option<Play> {
        options.first().copied()
    }
}
