//! Duel state, turn structure, and the controllers that drive it

pub mod channel;
pub mod choice;
pub mod choice_filter;
pub mod combat;
pub mod config;
pub mod controller;
pub mod duel_loop;
pub mod fixed_script_controller;
pub mod half_turn;
pub mod interactive_controller;
pub mod logger;
pub mod movement;
pub mod random_controller;
pub mod state;
pub mod zero_controller;

pub use channel::{ChannelMessage, DuelChannel, MemoryChannel, NullChannel, StdoutChannel};
pub use choice::{
    collect_turn_plays, ChoiceOutcome, ChoiceRequest, ChoiceStep, ChoiceSurface, ChoiceTicket,
    DuelistView, OpponentSnapshot, RejectedAnswer, RejectionLog, Resolution, TurnPlays,
};
pub use choice_filter::legal_plays;
pub use combat::{AttackReport, CombatOutcome, CLASH_LINE};
pub use config::{DuelConfig, DEFAULT_CHOICE_TIMEOUT_SECS};
pub use controller::{BlockingSurface, ControllerSurface, DuelistController, SilentController};
pub use duel_loop::{start_duel, DuelLoop, DuelResult, MUTUAL_FORFEIT};
pub use fixed_script_controller::FixedScriptController;
pub use half_turn::Half;
pub use interactive_controller::InteractiveController;
pub use logger::{DuelLogger, LogCategory, LogEntry, OutputMode, VerbosityLevel};
pub use movement::{find_midpoint, CLOSED_TO_MELEE};
pub use random_controller::RandomController;
pub use state::{DuelState, BOARD_SIZE};
pub use zero_controller::ZeroController;
