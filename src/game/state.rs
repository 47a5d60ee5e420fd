//! Duel state: both duelists, the board, and the narrative log

use crate::core::{
    AttackId, CardCatalog, Duelist, DuelistIdentity, Emblem, Seat, STARTING_HP,
};
use crate::game::DuelConfig;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of cells on the dueling line
pub const BOARD_SIZE: usize = 5;

/// Complete duel state
///
/// Sole owner of truth for positions, stances, hit points, and locks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuelState {
    pub p1: Duelist,
    pub p2: Duelist,

    /// Narrative lines accumulated since the last turn board was emitted
    pub turn_summary: Vec<String>,

    pub in_progress: bool,

    /// Turns started so far (1 during the first turn)
    pub turn_number: u32,
}

impl DuelState {
    /// Set up a fresh duel
    ///
    /// Player 1 starts on cell 0 and player 2 on the last cell. Each gets a
    /// distinct random special; emblems are taken from the identities when
    /// supplied and distinct, random otherwise.
    pub fn new<R: Rng + ?Sized>(
        a: DuelistIdentity,
        b: DuelistIdentity,
        config: &DuelConfig,
        rng: &mut R,
    ) -> Self {
        let p1_special = *AttackId::SPECIAL_POOL
            .choose(rng)
            .unwrap_or(&AttackId::SPECIAL_POOL[0]);
        let remaining: Vec<AttackId> = AttackId::SPECIAL_POOL
            .iter()
            .copied()
            .filter(|s| *s != p1_special)
            .collect();
        let p2_special = *remaining.choose(rng).unwrap_or(&remaining[0]);

        let p1_emblem = match a.emblem {
            Some(e) => e,
            None => Emblem::random_excluding(rng, None),
        };
        let p2_emblem = match b.emblem {
            Some(e) if e != p1_emblem => e,
            _ => Emblem::random_excluding(rng, Some(&p1_emblem)),
        };

        let p1 = Duelist::new(
            Seat::P1,
            a.name,
            a.mention,
            p1_emblem,
            0,
            p1_special,
            config.starting_hp,
        );
        let p2 = Duelist::new(
            Seat::P2,
            b.name,
            b.mention,
            p2_emblem,
            BOARD_SIZE - 1,
            p2_special,
            config.starting_hp,
        );

        Self::from_duelists(p1, p2)
    }

    /// Build a state around two prepared duelists
    pub fn from_duelists(p1: Duelist, p2: Duelist) -> Self {
        DuelState {
            p1,
            p2,
            turn_summary: Vec::new(),
            in_progress: true,
            turn_number: 0,
        }
    }

    /// Default pair of duelists on their starting cells, for tests and demos
    pub fn new_two_duelist(p1_name: &str, p2_name: &str) -> Self {
        let p1 = Duelist::new(
            Seat::P1,
            p1_name,
            format!("@{}", p1_name.to_lowercase()),
            Emblem::new("🐻"),
            0,
            AttackId::ZanTetsu,
            STARTING_HP,
        );
        let p2 = Duelist::new(
            Seat::P2,
            p2_name,
            format!("@{}", p2_name.to_lowercase()),
            Emblem::new("🐯"),
            BOARD_SIZE - 1,
            AttackId::Kesa,
            STARTING_HP,
        );
        Self::from_duelists(p1, p2)
    }

    pub fn board_size(&self) -> usize {
        BOARD_SIZE
    }

    pub fn duelist(&self, seat: Seat) -> &Duelist {
        match seat {
            Seat::P1 => &self.p1,
            Seat::P2 => &self.p2,
        }
    }

    pub fn duelist_mut(&mut self, seat: Seat) -> &mut Duelist {
        match seat {
            Seat::P1 => &mut self.p1,
            Seat::P2 => &mut self.p2,
        }
    }

    /// Fill a narrative template from `seat`'s point of view
    ///
    /// `{a}` is the actor, `{b}` the opponent, `{other_stance}` the stance
    /// opposite the actor's current one.
    pub fn narrate(&self, template: &str, seat: Seat) -> String {
        let actor = self.duelist(seat);
        let other = self.duelist(seat.opponent());
        template
            .replace("{a}", actor.name.as_str())
            .replace("{b}", other.name.as_str())
            .replace("{other_stance}", actor.stance.flipped().as_str())
    }

    pub fn push_line(&mut self, line: impl Into<String>) {
        self.turn_summary.push(line.into());
    }

    fn symbol_for_cell(&self, index: usize) -> String {
        let p1_here = self.p1.cell == index;
        let p2_here = self.p2.cell == index;
        match (p1_here, p2_here) {
            (true, true) => format!("[{}{}]", self.p1.emblem, self.p2.emblem),
            (true, false) => self.p1.emblem.to_string(),
            (false, true) => self.p2.emblem.to_string(),
            (false, false) => "\\_".to_string(),
        }
    }

    /// One-line board rendering
    pub fn render_board(&self) -> String {
        (0..BOARD_SIZE)
            .map(|i| self.symbol_for_cell(i))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Board followed by both status lines
    pub fn render_board_and_status(&self, catalog: &CardCatalog) -> String {
        format!(
            "{}\n\n{}\n{}",
            self.render_board(),
            self.p1.status_line(catalog),
            self.p2.status_line(catalog)
        )
    }

    /// (winner, loser) once either duelist is out of hit points
    pub fn check_for_duel_end(&self) -> Option<(Seat, Seat)> {
        if self.p1.is_dead() {
            Some((Seat::P2, Seat::P1))
        } else if self.p2.is_dead() {
            Some((Seat::P1, Seat::P2))
        } else {
            None
        }
    }
}
