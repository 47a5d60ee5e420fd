//! Fixed script controller for deterministic testing
//!
//! Follows a predetermined sequence of option indices, making it ideal for
//! replaying specific duel scenarios. Once the script is exhausted it defaults
//! to choosing the first option (index 0).

use crate::core::{Play, Seat};
use crate::game::choice::{ChoiceStep, DuelistView};
use crate::game::controller::DuelistController;

/// A controller that follows a fixed script of choices
///
/// Each entry indexes into the offered plays for one choice step, two steps
/// per turn. An index past the end of the offered list falls back to 0.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FixedScriptController {
    seat: Seat,
    /// The predetermined sequence of choice indices
    script: Vec<usize>,
    /// Current position in the script
    pub current_index: usize,
}

impl FixedScriptController {
    /// Create a scripted controller, e.g. `vec![0, 3, 1, 1]` for two turns
    pub fn new(seat: Seat, script: Vec<usize>) -> Self {
        FixedScriptController {
            seat,
            script,
            current_index: 0,
        }
    }

    /// Parse a script from a space- or comma-separated list of indices
    pub fn parse_script(input: &str) -> crate::Result<Vec<usize>> {
        input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<usize>().map_err(|_| {
                    crate::DuelError::InvalidConfig(format!("invalid script index '{}'", s))
                })
            })
            .collect()
    }

    pub fn is_exhausted(&self) -> bool {
        self.current_index >= self.script.len()
    }

    /// Next index from the script, or 0 once the script runs out
    fn next_choice(&mut self) -> usize {
        if let Some(&choice) = self.script.get(self.current_index) {
            self.current_index += 1;
            choice
        } else {
            0
        }
    }
}

impl DuelistController for FixedScriptController {
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
        let index = self.next_choice();
        options.get(index).or_else(|| options.first()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AttackId, MoveId};
    use crate::game::choice::OpponentSnapshot;
    use crate::game::DuelState;

    fn view() -> DuelistView {
        let state = DuelState::new_two_duelist("Alice", "Bob");
        DuelistView::new(&state.p1, &OpponentSnapshot::from(&state.p2))
    }

    fn options() -> Vec<Play> {
        vec![
            Play::Move(MoveId::Approach),
            Play::Attack(AttackId::BalancedStrike),
            Play::Move(MoveId::Charge),
        ]
    }

    #[test]
    fn test_script_controller_creation() {
        let controller = FixedScriptController::new(Seat::P1, vec![1, 2]);
        assert_eq!(controller.seat(), Seat::P1);
        assert_eq!(controller.current_index, 0);
        assert!(!controller.is_exhausted());
    }

    #[test]
    fn test_follows_script_in_order() {
        let mut controller = FixedScriptController::new(Seat::P1, vec![2, 1]);
        let v = view();
        let opts = options();
        assert_eq!(
            controller.choose_play(&v, ChoiceStep::First, "", &opts),
            Some(Play::Move(MoveId::Charge))
        );
        assert_eq!(
            controller.choose_play(&v, ChoiceStep::Second, "", &opts),
            Some(Play::Attack(AttackId::BalancedStrike))
        );
        assert!(controller.is_exhausted());
    }

    #[test]
    fn test_exhausted_script_defaults_to_zero() {
        let mut controller = FixedScriptController::new(Seat::P1, vec![]);
        let opts = options();
        assert_eq!(
            controller.choose_play(&view(), ChoiceStep::First, "", &opts),
            Some(Play::Move(MoveId::Approach))
        );
    }

    #[test]
    fn test_out_of_range_index_falls_back() {
        let mut controller = FixedScriptController::new(Seat::P1, vec![9]);
        let opts = options();
        assert_eq!(
            controller.choose_play(&view(), ChoiceStep::First, "", &opts),
            Some(Play::Move(MoveId::Approach))
        );
    }

    #[test]
    fn test_parse_script() {
        assert_eq!(FixedScriptController::parse_script("0 3,1  2").unwrap(), vec![0, 3, 1, 2]);
        assert!(FixedScriptController::parse_script("0 x").is_err());
    }
}
