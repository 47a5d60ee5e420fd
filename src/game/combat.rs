//! Combat resolution for one half-turn
//!
//! Runs after movement. Each strike is checked against the opponent's cell,
//! then the pair of results is classified into a single outcome.

use crate::core::{CardCatalog, NarrativeTemplates, Play, Seat};
use crate::game::{DuelLogger, DuelState, LogCategory, VerbosityLevel};
use crate::{DuelError, Result};

pub const CLASH_LINE: &str = "Sparks fly as the blades clash! No damage!";

/// What one duelist did this half-turn, as far as combat cares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttackReport {
    /// Played a striking attack card (Counter does not count)
    pub attacked: bool,
    /// Played the Counter pseudo-card
    pub countering: bool,
    /// The strike's threatened cells contain the opponent's cell
    pub success: bool,
}

/// Result of combat for a half-turn; the first matching rule wins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatOutcome {
    /// Both strikes land and cancel out
    Clash,
    /// A landing strike met a counter; the attacker takes the hit
    Countered { attacker: Seat },
    /// A counter was played but the opponent never attacked
    BraceWasted { braced: Seat },
    /// A counter was played against a strike that missed anyway
    BracedButMissed { attacker: Seat },
    /// The attacker's strike lands on the opponent
    Hit { attacker: Seat },
    /// Nothing landed
    NoHit,
}

/// Classify the outcome from both duelists' reports
pub fn classify(p1: AttackReport, p2: AttackReport) -> CombatOutcome {
    if p1.success && p2.success {
        CombatOutcome::Clash
    } else if p1.success && p2.countering {
        CombatOutcome::Countered { attacker: Seat::P1 }
    } else if p2.success && p1.countering {
        CombatOutcome::Countered { attacker: Seat::P2 }
    } else if p2.countering && !p1.attacked {
        CombatOutcome::BraceWasted { braced: Seat::P2 }
    } else if p1.countering && !p2.attacked {
        CombatOutcome::BraceWasted { braced: Seat::P1 }
    } else if p2.countering && p1.attacked && !p1.success {
        CombatOutcome::BracedButMissed { attacker: Seat::P1 }
    } else if p1.countering && p2.attacked && !p2.success {
        CombatOutcome::BracedButMissed { attacker: Seat::P2 }
    } else if p1.success {
        CombatOutcome::Hit { attacker: Seat::P1 }
    } else if p2.success {
        CombatOutcome::Hit { attacker: Seat::P2 }
    } else {
        CombatOutcome::NoHit
    }
}

fn templates_for(catalog: &CardCatalog, play: Play) -> Result<&NarrativeTemplates> {
    play.as_attack()
        .and_then(|id| catalog.attack(id).templates.as_ref())
        .ok_or_else(|| {
            DuelError::IllegalPlay(format!(
                "{} has no combat narrative",
                catalog.play_name(play)
            ))
        })
}

impl DuelState {
    /// Whether `seat`'s attack card lands from the current positions
    pub fn attack_hits(&self, catalog: &CardCatalog, seat: Seat, play: Play) -> bool {
        let Some(id) = play.as_attack() else {
            return false;
        };
        let attacker = self.duelist(seat).cell as i32;
        let target = self.duelist(seat.opponent()).cell as i32;
        catalog
            .attack(id)
            .hits_cells
            .iter()
            .any(|offset| attacker + seat.direction() * i32::from(*offset) == target)
    }

    fn attack_report(&self, catalog: &CardCatalog, seat: Seat, play: Play) -> AttackReport {
        let attacked = play.is_strike();
        AttackReport {
            attacked,
            countering: play.is_counter(),
            success: attacked && self.attack_hits(catalog, seat, play),
        }
    }

    fn narrate_template(
        &mut self,
        catalog: &CardCatalog,
        seat: Seat,
        play: Play,
        pick: fn(&NarrativeTemplates) -> &String,
    ) -> Result<()> {
        let line = self.narrate(pick(templates_for(catalog, play)?), seat);
        self.push_line(line);
        Ok(())
    }

    /// Resolve combat for a half-turn, applying damage and stance changes
    pub fn resolve_combat(
        &mut self,
        catalog: &CardCatalog,
        p1_play: Play,
        p2_play: Play,
        logger: &DuelLogger,
    ) -> Result<CombatOutcome> {
        let plays = [p1_play, p2_play];
        let p1 = self.attack_report(catalog, Seat::P1, p1_play);
        let p2 = self.attack_report(catalog, Seat::P2, p2_play);
        let reports = [p1, p2];
        let outcome = classify(p1, p2);

        logger.categorized(
            VerbosityLevel::Verbose,
            LogCategory::Combat,
            &format!("p1 {:?} at {}, p2 {:?} at {} => {:?}", p1, self.p1.cell, p2, self.p2.cell, outcome),
        );

        match outcome {
            CombatOutcome::Clash => {
                self.narrate_template(catalog, Seat::P1, p1_play, |t| &t.clash)?;
                self.narrate_template(catalog, Seat::P2, p2_play, |t| &t.clash)?;
                self.push_line(CLASH_LINE);
            }
            CombatOutcome::Countered { attacker } => {
                let braced = attacker.opponent();
                self.narrate_template(catalog, attacker, plays[attacker.index()], |t| &t.counter)?;
                let line = format!(
                    "-- but {} reverses the blow with a perfect counter!",
                    self.duelist(braced).name
                );
                self.push_line(line);
                self.duelist_mut(attacker).take_hit()?;
            }
            CombatOutcome::BraceWasted { braced } => {
                let line = format!(
                    "{} braces to counter an attack that never comes!",
                    self.duelist(braced).name
                );
                self.push_line(line);
            }
            CombatOutcome::BracedButMissed { attacker } => {
                let braced = attacker.opponent();
                self.narrate_template(catalog, attacker, plays[attacker.index()], |t| &t.counter)?;
                let line = format!(
                    "-- {} is braced to counter, but the attack goes wide!",
                    self.duelist(braced).name
                );
                self.push_line(line);
            }
            CombatOutcome::Hit { attacker } => {
                let defender = attacker.opponent();
                if reports[defender.index()].attacked {
                    self.narrate_template(catalog, defender, plays[defender.index()], |t| &t.miss)?;
                }
                self.narrate_template(catalog, attacker, plays[attacker.index()], |t| &t.success)?;
                self.duelist_mut(defender).take_hit()?;
            }
            CombatOutcome::NoHit => {
                for seat in [Seat::P1, Seat::P2] {
                    if reports[seat.index()].attacked {
                        self.narrate_template(catalog, seat, plays[seat.index()], |t| &t.miss)?;
                    }
                }
            }
        }

        // Stance-changing attacks flip after damage, hit or miss
        for seat in [Seat::P1, Seat::P2] {
            let play = plays[seat.index()];
            if reports[seat.index()].attacked && catalog.changes_stance(play) {
                let duelist = self.duelist_mut(seat);
                duelist.change_stance();
                let line = format!(
                    "{}'s technique leaves them in {} stance.",
                    duelist.name, duelist.stance
                );
                self.push_line(line);
            }
        }

        Ok(outcome)
    }
}
