//! Random AI controller for testing and baseline play
//!
//! Picks uniformly among the offered plays. Serves as the baseline opponent
//! and drives the tournament runner.

use crate::core::{Play, Seat};
use crate::game::choice::{ChoiceStep, DuelistView};
use crate::game::controller::DuelistController;
use rand::Rng;

/// A controller that makes random choices
pub struct RandomController {
    seat: Seat,
    rng: Box<dyn rand::RngCore + Send>,
}

impl RandomController {
    /// Create a new random controller with an entropy-seeded RNG
    pub fn new(seat: Seat) -> Self {
        use rand::SeedableRng;
        RandomController {
            seat,
            rng: Box::new(rand::rngs::StdRng::from_entropy()),
        }
    }

    /// Create a random controller with a seeded RNG (for deterministic testing)
    pub fn with_seed(seat: Seat, seed: u64) -> Self {
        use rand::SeedableRng;
        RandomController {
            seat,
            rng: Box::new(rand::rngs::StdRng::seed_from_u64(seed)),
        }
    }
}

impl DuelistController for RandomController {
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
        if options.is_empty() {
            None
        } else {
            let index = self.rng.gen_range(0..options.len());
            Some(options[index])
        }
    }
}
