//! Core duel types: card catalog, duelists, and identity newtypes

pub mod card;
pub mod duelist;
pub mod types;

pub use card::{
    AttackCard, AttackId, CardCatalog, Family, MoveAction, MoveCard, MoveCardId, MoveId,
    NarrativeTemplates, Play, Stance,
};
pub use duelist::{Duelist, STARTING_HP};
pub use types::{DuelistIdentity, DuelistName, Emblem, Seat, EMBLEM_POOL};
