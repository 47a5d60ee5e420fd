//! Duelist representation

use crate::core::{AttackId, CardCatalog, DuelistName, Emblem, Family, Play, Seat, Stance};
use crate::{DuelError, Result};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Hit points a duelist starts with
pub const STARTING_HP: u8 = 2;

/// Per-duelist mutable state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Duelist {
    /// Which side of the board this duelist plays from
    pub seat: Seat,

    pub name: DuelistName,

    /// Handle used to address the duelist (e.g. "@alice")
    pub mention: String,

    pub emblem: Emblem,

    /// Board cell index
    pub cell: usize,

    pub hp: u8,

    pub stance: Stance,

    /// Special attack assigned at duel start
    pub special: AttackId,

    pub special_used: bool,

    /// Family locked out for the turn after it was played in half two
    pub locked: Option<Family>,

    /// Plays chosen this turn, in resolution order
    pub chosen_plays: SmallVec<[Play; 2]>,
}

impl Duelist {
    pub fn new(
        seat: Seat,
        name: impl Into<DuelistName>,
        mention: impl Into<String>,
        emblem: Emblem,
        cell: usize,
        special: AttackId,
        starting_hp: u8,
    ) -> Self {
        Duelist {
            seat,
            name: name.into(),
            mention: mention.into(),
            emblem,
            cell,
            hp: starting_hp,
            stance: Stance::Heaven,
            special,
            special_used: false,
            locked: None,
            chosen_plays: SmallVec::new(),
        }
    }

    /// Lose one hit point
    ///
    /// A duelist already at zero cannot be hit again; the duel must have
    /// ended at the previous check.
    pub fn take_hit(&mut self) -> Result<()> {
        self.hp = self.hp.checked_sub(1).ok_or_else(|| {
            DuelError::InvariantViolation(format!("{} took a hit with no hit points left", self.name))
        })?;
        Ok(())
    }

    pub fn is_dead(&self) -> bool {
        self.hp == 0
    }

    pub fn change_stance(&mut self) {
        self.stance = self.stance.flipped();
    }

    pub fn lock(&mut self, family: Option<Family>) {
        self.locked = family;
    }

    pub fn clear_plays(&mut self) {
        self.chosen_plays.clear();
    }

    pub fn add_queued_play(&mut self, play: Play) {
        self.chosen_plays.push(play);
    }

    /// Play recorded for a half-turn (0 or 1)
    pub fn play_for_half(&self, half: usize) -> Result<Play> {
        self.chosen_plays.get(half).copied().ok_or_else(|| {
            DuelError::InvariantViolation(format!(
                "{} has no play recorded for half {}",
                self.name,
                half + 1
            ))
        })
    }

    /// Status line: emblem, name, hearts, stance, special and lock
    pub fn status_line(&self, catalog: &CardCatalog) -> String {
        let hearts = vec!["♥"; self.hp as usize].join(" ");
        let special = if self.special_used {
            "Special ✖"
        } else {
            "Special ✔"
        };
        let mut line = format!(
            "{} {} | {} | {} {} | {}",
            self.emblem,
            self.name,
            hearts,
            self.stance.symbol(),
            self.stance,
            special
        );
        if let Some(family) = self.locked {
            line.push_str(&format!(" | 🔒 {}", catalog.family_name(family)));
        }
        line
    }
}
