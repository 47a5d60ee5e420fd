//! Movement resolution
//!
//! Runs before combat in every half-turn. Duelists can never pass each other:
//! player 1 is clamped to `[0, p2.cell]` and player 2 to `[p1.cell, last]`.

use crate::core::{CardCatalog, Play, Seat, Stance};
use crate::game::{DuelLogger, DuelState, LogCategory, BOARD_SIZE};

/// Line emitted when the duelists end a half-turn on the same cell
pub const CLOSED_TO_MELEE: &str = "The two warriors come toe to toe!";

/// Cell both duelists snap to when their moves would cross
///
/// Raw midpoints within half a cell of the board center snap to the center;
/// beyond that they round away from it (up on the far side, down on the
/// near side).
pub fn find_midpoint(p1_cell: usize, p2_cell: usize) -> usize {
    let center = BOARD_SIZE / 2;
    // Compare doubled values to stay in integers: |sum/2 - center| <= 0.5
    let sum = p1_cell + p2_cell;
    if sum.abs_diff(2 * center) <= 1 {
        center
    } else if sum > 2 * center {
        (sum + 1) / 2
    } else {
        sum / 2
    }
}

impl DuelState {
    /// Whether both forward moves would carry the duelists past each other
    fn moves_would_pass(&self, p1_magnitude: i32, p2_magnitude: i32) -> bool {
        self.p1.cell as i32 + p1_magnitude > self.p2.cell as i32 - p2_magnitude
    }

    /// Apply both duelists' movement for one half-turn
    pub fn resolve_movement(
        &mut self,
        catalog: &CardCatalog,
        p1_play: Play,
        p2_play: Play,
        logger: &DuelLogger,
    ) {
        let p1_magnitude = catalog.magnitude(p1_play);
        let p2_magnitude = catalog.magnitude(p2_play);
        let started_together = self.p1.cell == self.p2.cell;

        if self.p1.stance == self.p2.stance
            && p1_magnitude > 0
            && p2_magnitude > 0
            && self.moves_would_pass(p1_magnitude, p2_magnitude)
        {
            let midpoint = find_midpoint(self.p1.cell, self.p2.cell);
            logger.categorized(
                crate::game::VerbosityLevel::Verbose,
                LogCategory::Movement,
                &format!(
                    "moves cross ({} +{} vs {} -{}), both snap to cell {}",
                    self.p1.cell, p1_magnitude, self.p2.cell, p2_magnitude, midpoint
                ),
            );
            self.p1.cell = midpoint;
            self.p2.cell = midpoint;
            self.narrate_move(catalog, Seat::P1, p1_play);
            self.narrate_move(catalog, Seat::P2, p2_play);
        } else {
            // Heaven moves first; equal stances fall back to player 1
            let order = if self.p1.stance == self.p2.stance || self.p1.stance == Stance::Heaven {
                [Seat::P1, Seat::P2]
            } else {
                [Seat::P2, Seat::P1]
            };
            let plays = [p1_play, p2_play];
            for seat in order {
                self.move_duelist(catalog, seat, plays[seat.index()], logger);
            }
        }

        if self.p1.cell == self.p2.cell && !started_together {
            self.push_line(CLOSED_TO_MELEE);
        }
    }

    /// Move one duelist, clamped against the opponent's current cell
    fn move_duelist(&mut self, catalog: &CardCatalog, seat: Seat, play: Play, logger: &DuelLogger) {
        let Some(action_id) = play.as_move() else {
            return;
        };
        let action = catalog.move_action(action_id);

        let (low, high) = match seat {
            Seat::P1 => (0, self.p2.cell),
            Seat::P2 => (self.p1.cell, BOARD_SIZE - 1),
        };
        let from = self.duelist(seat).cell;
        let target = from as i32 + seat.direction() * action.magnitude;
        let to = target.clamp(low as i32, high as i32) as usize;

        // Narrate before flipping so {other_stance} names the stance being entered
        let line = self.narrate(&action.template, seat);

        let duelist = self.duelist_mut(seat);
        duelist.cell = to;
        if action.changes_stance {
            duelist.change_stance();
        }
        logger.categorized(
            crate::game::VerbosityLevel::Verbose,
            LogCategory::Movement,
            &format!(
                "{} {} from {} to {} (stance {})",
                duelist.name, action.name, from, to, duelist.stance
            ),
        );
        self.push_line(line);
    }

    fn narrate_move(&mut self, catalog: &CardCatalog, seat: Seat, play: Play) {
        if let Some(action_id) = play.as_move() {
            let line = self.narrate(&catalog.move_action(action_id).template, seat);
            self.push_line(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AttackId, MoveId};

    fn setup(p1_cell: usize, p2_cell: usize) -> (DuelState, DuelLogger) {
        let mut state = DuelState::new_two_duelist("Alice", "Bob");
        state.p1.cell = p1_cell;
        state.p2.cell = p2_cell;
        (state, DuelLogger::with_verbosity(crate::game::VerbosityLevel::Silent))
    }

    #[test]
    fn test_find_midpoint() {
        assert_eq!(find_midpoint(0, 4), 2);
        assert_eq!(find_midpoint(1, 2), 2);
        assert_eq!(find_midpoint(2, 3), 2);
        assert_eq!(find_midpoint(3, 4), 4);
        assert_eq!(find_midpoint(3, 3), 3);
        assert_eq!(find_midpoint(2, 4), 3);
        assert_eq!(find_midpoint(0, 1), 0);
        assert_eq!(find_midpoint(0, 2), 1);
        assert_eq!(find_midpoint(4, 4), 4);
    }

    #[test]
    fn test_double_charge_meets_in_the_middle() {
        let catalog = CardCatalog::standard();
        let (mut state, logger) = setup(0, 4);
        state.resolve_movement(
            &catalog,
            Play::Move(MoveId::Charge),
            Play::Move(MoveId::Charge),
            &logger,
        );
        assert_eq!(state.p1.cell, 2);
        assert_eq!(state.p2.cell, 2);
        assert_eq!(
            state.turn_summary,
            vec![
                "Alice charges forward!".to_string(),
                "Bob charges forward!".to_string(),
                CLOSED_TO_MELEE.to_string(),
            ]
        );
    }

    #[test]
    fn test_crossing_moves_snap_to_midpoint() {
        let catalog = CardCatalog::standard();
        let (mut state, logger) = setup(1, 3);
        state.resolve_movement(
            &catalog,
            Play::Move(MoveId::Charge),
            Play::Move(MoveId::Approach),
            &logger,
        );
        assert_eq!(state.p1.cell, 2);
        assert_eq!(state.p2.cell, 2);
    }

    #[test]
    fn test_clamped_against_opponent() {
        let catalog = CardCatalog::standard();
        let (mut state, logger) = setup(2, 3);
        // p1 charges; p2 stands still with an attack
        state.resolve_movement(
            &catalog,
            Play::Move(MoveId::Charge),
            Play::Attack(AttackId::HighStrike),
            &logger,
        );
        assert_eq!(state.p1.cell, 3);
        assert_eq!(state.p2.cell, 3);
        assert!(state.p1.cell <= state.p2.cell);
    }

    #[test]
    fn test_retreat_clamped_to_board_edge() {
        let catalog = CardCatalog::standard();
        let (mut state, logger) = setup(0, 4);
        state.resolve_movement(
            &catalog,
            Play::Move(MoveId::Retreat),
            Play::Move(MoveId::Retreat),
            &logger,
        );
        assert_eq!(state.p1.cell, 0);
        assert_eq!(state.p2.cell, 4);
        assert_eq!(state.turn_summary, vec!["Alice steps back.", "Bob steps back."]);
    }

    #[test]
    fn test_heaven_moves_first() {
        let catalog = CardCatalog::standard();
        // p1 Earth, p2 Heaven: p2 moves first and takes the contested cell
        let (mut state, logger) = setup(1, 3);
        state.p1.stance = Stance::Earth;
        state.resolve_movement(
            &catalog,
            Play::Move(MoveId::Charge),
            Play::Move(MoveId::Charge),
            &logger,
        );
        assert_eq!(state.p2.cell, 1);
        assert_eq!(state.p1.cell, 1);
        assert_eq!(state.turn_summary[0], "Bob charges forward!");
        assert_eq!(state.turn_summary[1], "Alice charges forward!");
    }

    #[test]
    fn test_change_stance_during_movement() {
        let catalog = CardCatalog::standard();
        let (mut state, logger) = setup(0, 4);
        state.resolve_movement(
            &catalog,
            Play::Move(MoveId::ChangeStance),
            Play::Move(MoveId::ChangeStance),
            &logger,
        );
        assert_eq!(state.p1.stance, Stance::Earth);
        assert_eq!(state.p2.stance, Stance::Earth);
        assert_eq!(
            state.turn_summary,
            vec![
                "Alice shifts into Earth stance.",
                "Bob shifts into Earth stance.",
            ]
        );
    }

    #[test]
    fn test_no_melee_line_when_already_together() {
        let catalog = CardCatalog::standard();
        let (mut state, logger) = setup(2, 2);
        state.resolve_movement(
            &catalog,
            Play::Attack(AttackId::BalancedStrike),
            Play::Attack(AttackId::BalancedStrike),
            &logger,
        );
        assert!(state.turn_summary.is_empty());
    }
}
