//! Legal play computation
//!
//! Pure function of a duelist's state: which attack cards and move actions
//! may be offered at a decision point.

use crate::core::{CardCatalog, Duelist, Family, Play};

/// Compute the legal plays for `duelist`
///
/// - `first_play`: the play already chosen this turn, if any. Its family
///   (the attack card itself, or the move card owning the action) is excluded.
/// - `pending_stance_flip`: the first play will flip the duelist's stance, so
///   stance requirements are checked against the flipped stance.
///
/// Attack cards exclude the locked card, every special other than the
/// duelist's own, and the own special once used. Move actions come from move
/// cards that are neither locked nor the first play's family. The result is
/// ordered by name.
pub fn legal_plays(
    catalog: &CardCatalog,
    duelist: &Duelist,
    first_play: Option<Play>,
    pending_stance_flip: bool,
) -> Vec<Play> {
    let first_family = first_play.map(|p| catalog.family_of(p));
    let effective_stance = if pending_stance_flip {
        duelist.stance.flipped()
    } else {
        duelist.stance
    };

    let is_blocked = |family: Family| duelist.locked == Some(family) || first_family == Some(family);

    let attacks = catalog
        .attacks()
        .iter()
        .filter(|card| {
            if card.is_special {
                card.id == duelist.special && !duelist.special_used
            } else {
                true
            }
        })
        .filter(|card| !is_blocked(Family::Attack(card.id)))
        .filter(|card| card.requires_stance.map_or(true, |s| s == effective_stance))
        .map(|card| Play::Attack(card.id));

    let moves = catalog
        .move_cards()
        .iter()
        .filter(|card| !is_blocked(Family::Move(card.id)))
        .flat_map(|card| card.actions.iter().map(|id| Play::Move(*id)));

    let mut plays: Vec<Play> = attacks.chain(moves).collect();
    plays.sort_by(|a, b| catalog.play_name(*a).cmp(catalog.play_name(*b)));
    plays
}
