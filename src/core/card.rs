//! Card catalog: attack cards, move actions, and move cards
//!
//! The catalog is immutable and built once per process. Cards are referred to
//! everywhere else by small enum tags ([`AttackId`], [`MoveId`], [`MoveCardId`])
//! so that equality is by value and plays can be serialized.

use crate::{DuelError, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};
use std::fmt;
use std::sync::OnceLock;

/// Combat posture of a duelist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Stance {
    #[default]
    Heaven,
    Earth,
}

impl Stance {
    pub fn flipped(self) -> Stance {
        match self {
            Stance::Heaven => Stance::Earth,
            Stance::Earth => Stance::Heaven,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stance::Heaven => "Heaven",
            Stance::Earth => "Earth",
        }
    }

    /// Glyph shown in status lines
    pub fn symbol(self) -> &'static str {
        match self {
            Stance::Heaven => "⚡",
            Stance::Earth => "🏔",
        }
    }
}

impl fmt::Display for Stance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tag for every attack-type card, including the Counter pseudo-card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttackId {
    ZanTetsu,
    Kesa,
    Counter,
    LowStrike,
    HighStrike,
    BalancedStrike,
}

impl AttackId {
    /// Catalog order; `AttackId as usize` indexes into it
    pub const ALL: [AttackId; 6] = [
        AttackId::ZanTetsu,
        AttackId::Kesa,
        AttackId::Counter,
        AttackId::LowStrike,
        AttackId::HighStrike,
        AttackId::BalancedStrike,
    ];

    /// Specials handed out at duel start, one per duelist
    pub const SPECIAL_POOL: [AttackId; 3] = [AttackId::ZanTetsu, AttackId::Kesa, AttackId::Counter];
}

/// Tag for a single movement option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MoveId {
    Approach,
    Retreat,
    Charge,
    ChangeStance,
}

impl MoveId {
    pub const ALL: [MoveId; 4] = [
        MoveId::Approach,
        MoveId::Retreat,
        MoveId::Charge,
        MoveId::ChangeStance,
    ];
}

/// Tag for a move card, the family two sibling move actions belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MoveCardId {
    Footwork,
    Tactics,
}

impl MoveCardId {
    pub const ALL: [MoveCardId; 2] = [MoveCardId::Footwork, MoveCardId::Tactics];
}

/// A single choice a duelist can make for one half-turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Play {
    Attack(AttackId),
    Move(MoveId),
}

impl Play {
    /// The Counter pseudo-card flags a defensive brace; it never attacks
    pub fn is_counter(&self) -> bool {
        matches!(self, Play::Attack(AttackId::Counter))
    }

    /// True for attack cards that actually strike (everything but Counter)
    pub fn is_strike(&self) -> bool {
        matches!(self, Play::Attack(id) if *id != AttackId::Counter)
    }

    pub fn as_attack(&self) -> Option<AttackId> {
        match self {
            Play::Attack(id) => Some(*id),
            Play::Move(_) => None,
        }
    }

    pub fn as_move(&self) -> Option<MoveId> {
        match self {
            Play::Move(id) => Some(*id),
            Play::Attack(_) => None,
        }
    }
}

/// What a lock or a "no repeat within a turn" rule applies to
///
/// Attack cards are their own family; move actions lock their whole move card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Family {
    Attack(AttackId),
    Move(MoveCardId),
}

/// The four narrative lines an attack card can produce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeTemplates {
    pub success: String,
    pub miss: String,
    pub counter: String,
    pub clash: String,
}

/// Immutable definition of an attack card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackCard {
    pub id: AttackId,
    pub name: String,
    /// Button label shown by choice surfaces
    pub label: String,
    /// Specials may be played once per duel by the duelist who owns them
    pub is_special: bool,
    pub requires_stance: Option<Stance>,
    pub changes_stance: bool,
    /// Forward offsets from the attacker's cell that this card threatens
    pub hits_cells: SmallVec<[u8; 2]>,
    /// `None` only for the Counter pseudo-card
    pub templates: Option<NarrativeTemplates>,
}

/// Immutable definition of a move action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveAction {
    pub id: MoveId,
    pub name: String,
    pub label: String,
    /// Forward movement; negative retreats, zero for a pure stance change
    pub magnitude: i32,
    pub changes_stance: bool,
    pub template: String,
    /// Move card this action belongs to
    pub card: MoveCardId,
}

/// A move card groups two sibling actions for lock-out purposes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveCard {
    pub id: MoveCardId,
    pub name: String,
    pub actions: [MoveId; 2],
}

fn templates(success: &str, miss: &str, counter: &str, clash: &str) -> Option<NarrativeTemplates> {
    Some(NarrativeTemplates {
        success: success.to_string(),
        miss: miss.to_string(),
        counter: counter.to_string(),
        clash: clash.to_string(),
    })
}

/// Normalize a card name for lookup: ASCII-folded, lowercase, trimmed
fn normalize_name(name: &str) -> String {
    deunicode::deunicode(name).trim().to_lowercase()
}

/// Process-wide immutable card catalog
#[derive(Debug, Clone)]
pub struct CardCatalog {
    attacks: Vec<AttackCard>,
    moves: Vec<MoveAction>,
    move_cards: Vec<MoveCard>,
    by_name: FxHashMap<String, Play>,
}

static GLOBAL_CATALOG: OnceLock<CardCatalog> = OnceLock::new();

impl CardCatalog {
    /// Shared catalog, built on first use
    pub fn global() -> &'static CardCatalog {
        GLOBAL_CATALOG.get_or_init(CardCatalog::standard)
    }

    /// Build the standard card set
    pub fn standard() -> Self {
        let attacks = vec![
            AttackCard {
                id: AttackId::ZanTetsu,
                name: "Zan-Tetsu Strike".to_string(),
                label: "Zan-Tetsu Strike (2 & 3)".to_string(),
                is_special: true,
                requires_stance: Some(Stance::Earth),
                changes_stance: true,
                hits_cells: smallvec![2, 3],
                templates: templates(
                    "{a} rises and unleashes a devastating Zan-Tetsu strike, and {b} takes the full force of the blow!",
                    "{a} rises and attempts a Zan-Tetsu strike, but {b} deftly evades!",
                    "{a} rises and attempts a Zan-Tetsu strike...",
                    "{a} rises and attempts a Zan-Tetsu strike...",
                ),
            },
            AttackCard {
                id: AttackId::Kesa,
                name: "Kesa Strike".to_string(),
                label: "Kesa Strike (same cell & 1)".to_string(),
                is_special: true,
                requires_stance: Some(Stance::Heaven),
                changes_stance: true,
                hits_cells: smallvec![0, 1],
                templates: templates(
                    "{a} drops low and launches a piercing Kesa strike! {b} can't turn it aside!",
                    "{a} drops low and attempts a Kesa strike, but {b} manages to evade!",
                    "{a} drops low and attempts a Kesa strike...",
                    "{a} drops low and attempts a Kesa strike...",
                ),
            },
            AttackCard {
                id: AttackId::Counter,
                name: "Counterattack".to_string(),
                label: "Counterattack".to_string(),
                is_special: true,
                requires_stance: None,
                changes_stance: false,
                hits_cells: SmallVec::new(),
                templates: None,
            },
            AttackCard {
                id: AttackId::LowStrike,
                name: "Low Strike".to_string(),
                label: "Low Strike (1)".to_string(),
                is_special: false,
                requires_stance: Some(Stance::Earth),
                changes_stance: false,
                hits_cells: smallvec![1],
                templates: templates(
                    "{a} throws out a swift low strike, and the attack finds its mark!",
                    "{a} attempts a low strike, but {b} bats it aside!",
                    "{a} delivers a swift low strike...",
                    "{a} delivers a swift low strike...",
                ),
            },
            AttackCard {
                id: AttackId::HighStrike,
                name: "High Strike".to_string(),
                label: "High Strike (2)".to_string(),
                is_special: false,
                requires_stance: Some(Stance::Heaven),
                changes_stance: false,
                hits_cells: smallvec![2],
                templates: templates(
                    "{a} brings down a fierce high strike directly onto {b}!",
                    "{a} attempts a high strike, but {b} avoids the blow!",
                    "{a} attempts a fierce high strike...",
                    "{a} attempts a fierce high strike...",
                ),
            },
            AttackCard {
                id: AttackId::BalancedStrike,
                name: "Balanced Strike".to_string(),
                label: "Balanced Strike (same cell)".to_string(),
                is_special: false,
                requires_stance: None,
                changes_stance: false,
                hits_cells: smallvec![0],
                templates: templates(
                    "{a} delivers a balanced strike!",
                    "{a} attempts a balanced strike, but {b} dodges!",
                    "{a} delivers a balanced strike...",
                    "{a} delivers a balanced strike...",
                ),
            },
        ];

        let moves = vec![
            MoveAction {
                id: MoveId::Approach,
                name: "Approach".to_string(),
                label: "Footwork: Approach (1)".to_string(),
                magnitude: 1,
                changes_stance: false,
                template: "{a} steps forward.".to_string(),
                card: MoveCardId::Footwork,
            },
            MoveAction {
                id: MoveId::Retreat,
                name: "Retreat".to_string(),
                label: "Footwork: Retreat (1)".to_string(),
                magnitude: -1,
                changes_stance: false,
                template: "{a} steps back.".to_string(),
                card: MoveCardId::Footwork,
            },
            MoveAction {
                id: MoveId::Charge,
                name: "Charge".to_string(),
                label: "Tactics: Charge! (2)".to_string(),
                magnitude: 2,
                changes_stance: false,
                template: "{a} charges forward!".to_string(),
                card: MoveCardId::Tactics,
            },
            MoveAction {
                id: MoveId::ChangeStance,
                name: "Change Stance".to_string(),
                label: "Tactics: Change Stance".to_string(),
                magnitude: 0,
                changes_stance: true,
                template: "{a} shifts into {other_stance} stance.".to_string(),
                card: MoveCardId::Tactics,
            },
        ];

        let move_cards = vec![
            MoveCard {
                id: MoveCardId::Footwork,
                name: "Footwork".to_string(),
                actions: [MoveId::Approach, MoveId::Retreat],
            },
            MoveCard {
                id: MoveCardId::Tactics,
                name: "Tactics".to_string(),
                actions: [MoveId::Charge, MoveId::ChangeStance],
            },
        ];

        let mut by_name = FxHashMap::default();
        for card in &attacks {
            by_name.insert(normalize_name(&card.name), Play::Attack(card.id));
        }
        for action in &moves {
            by_name.insert(normalize_name(&action.name), Play::Move(action.id));
        }

        CardCatalog {
            attacks,
            moves,
            move_cards,
            by_name,
        }
    }

    pub fn attack(&self, id: AttackId) -> &AttackCard {
        &self.attacks[id as usize]
    }

    pub fn move_action(&self, id: MoveId) -> &MoveAction {
        &self.moves[id as usize]
    }

    pub fn move_card(&self, id: MoveCardId) -> &MoveCard {
        &self.move_cards[id as usize]
    }

    pub fn attacks(&self) -> &[AttackCard] {
        &self.attacks
    }

    pub fn move_actions(&self) -> &[MoveAction] {
        &self.moves
    }

    pub fn move_cards(&self) -> &[MoveCard] {
        &self.move_cards
    }

    /// Display name of a play
    pub fn play_name(&self, play: Play) -> &str {
        match play {
            Play::Attack(id) => &self.attack(id).name,
            Play::Move(id) => &self.move_action(id).name,
        }
    }

    /// Button label of a play
    pub fn play_label(&self, play: Play) -> &str {
        match play {
            Play::Attack(id) => &self.attack(id).label,
            Play::Move(id) => &self.move_action(id).label,
        }
    }

    /// Whether choosing this play flips the duelist's stance
    pub fn changes_stance(&self, play: Play) -> bool {
        match play {
            Play::Attack(id) => self.attack(id).changes_stance,
            Play::Move(id) => self.move_action(id).changes_stance,
        }
    }

    pub fn is_special(&self, play: Play) -> bool {
        match play {
            Play::Attack(id) => self.attack(id).is_special,
            Play::Move(_) => false,
        }
    }

    /// Movement delta of a play (zero for anything but a move action)
    pub fn magnitude(&self, play: Play) -> i32 {
        match play {
            Play::Move(id) => self.move_action(id).magnitude,
            Play::Attack(_) => 0,
        }
    }

    /// Family used for locks and the no-repeat rule
    pub fn family_of(&self, play: Play) -> Family {
        match play {
            Play::Attack(id) => Family::Attack(id),
            Play::Move(id) => Family::Move(self.move_action(id).card),
        }
    }

    pub fn family_name(&self, family: Family) -> &str {
        match family {
            Family::Attack(id) => &self.attack(id).name,
            Family::Move(id) => &self.move_card(id).name,
        }
    }

    /// Resolve a card or action by display name
    ///
    /// Matching is case-insensitive and folds unicode to ASCII, so
    /// "zan-tetsu strike" and "Zan-Tetsu Strike" both resolve.
    pub fn lookup(&self, name: &str) -> Result<Play> {
        self.by_name
            .get(&normalize_name(name))
            .copied()
            .ok_or_else(|| DuelError::UnknownPlay(name.to_string()))
    }
}

impl Default for CardCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl Play {
    /// Resolve a play by name against the global catalog
    pub fn from_name(name: &str) -> Result<Play> {
        CardCatalog::global().lookup(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_indexes_match_tags() {
        let catalog = CardCatalog::standard();
        for id in AttackId::ALL {
            assert_eq!(catalog.attack(id).id, id);
        }
        for id in MoveId::ALL {
            assert_eq!(catalog.move_action(id).id, id);
        }
        for id in MoveCardId::ALL {
            assert_eq!(catalog.move_card(id).id, id);
        }
    }

    #[test]
    fn test_move_card_membership() {
        let catalog = CardCatalog::standard();
        for card in catalog.move_cards() {
            for action in card.actions {
                assert_eq!(catalog.move_action(action).card, card.id);
            }
        }
        assert_eq!(
            catalog.family_of(Play::Move(MoveId::Retreat)),
            Family::Move(MoveCardId::Footwork)
        );
        assert_eq!(
            catalog.family_of(Play::Move(MoveId::ChangeStance)),
            Family::Move(MoveCardId::Tactics)
        );
    }

    #[test]
    fn test_counter_is_special_without_templates() {
        let catalog = CardCatalog::standard();
        let counter = catalog.attack(AttackId::Counter);
        assert!(counter.is_special);
        assert!(counter.hits_cells.is_empty());
        assert!(counter.templates.is_none());
        assert!(Play::Attack(AttackId::Counter).is_counter());
        assert!(!Play::Attack(AttackId::Counter).is_strike());
        assert!(Play::Attack(AttackId::Kesa).is_strike());
    }

    #[test]
    fn test_every_special_pool_entry_is_special() {
        let catalog = CardCatalog::standard();
        for id in AttackId::SPECIAL_POOL {
            assert!(catalog.attack(id).is_special);
        }
        let regulars: Vec<_> = catalog
            .attacks()
            .iter()
            .filter(|c| !c.is_special)
            .map(|c| c.id)
            .collect();
        assert_eq!(
            regulars,
            vec![AttackId::LowStrike, AttackId::HighStrike, AttackId::BalancedStrike]
        );
    }

    #[test]
    fn test_lookup_by_name() {
        let catalog = CardCatalog::standard();
        assert_eq!(catalog.lookup("Low Strike").unwrap(), Play::Attack(AttackId::LowStrike));
        assert_eq!(
            catalog.lookup("  zan-tetsu STRIKE ").unwrap(),
            Play::Attack(AttackId::ZanTetsu)
        );
        assert_eq!(catalog.lookup("change stance").unwrap(), Play::Move(MoveId::ChangeStance));
        assert!(matches!(catalog.lookup("Fireball"), Err(DuelError::UnknownPlay(_))));
    }

    #[test]
    fn test_play_properties() {
        let catalog = CardCatalog::global();
        assert_eq!(catalog.magnitude(Play::Move(MoveId::Charge)), 2);
        assert_eq!(catalog.magnitude(Play::Move(MoveId::Retreat)), -1);
        assert_eq!(catalog.magnitude(Play::Attack(AttackId::HighStrike)), 0);
        assert!(catalog.changes_stance(Play::Move(MoveId::ChangeStance)));
        assert!(catalog.changes_stance(Play::Attack(AttackId::ZanTetsu)));
        assert!(!catalog.changes_stance(Play::Attack(AttackId::Counter)));
        assert_eq!(catalog.play_label(Play::Move(MoveId::Charge)), "Tactics: Charge! (2)");
    }
}
