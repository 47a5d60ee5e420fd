//! Duel loop implementation
//!
//! Drives the turn state machine: post the board, collect both duelists'
//! plays concurrently, resolve two half-turns, and stop at the first death or
//! forfeit.

/// Conditional logging that compiles away without the verbose-logging feature
macro_rules! log_if_verbose {
    ($self:expr, $($arg:tt)*) => {
        #[cfg(feature = "verbose-logging")]
        {
            $self.logger.categorized(
                $crate::game::VerbosityLevel::Verbose,
                $crate::game::LogCategory::Duel,
                &format!($($arg)*),
            );
        }
        #[cfg(not(feature = "verbose-logging"))]
        {
            let _ = &$self;
        }
    };
}

use crate::core::{CardCatalog, DuelistIdentity, Seat};
use crate::game::choice::{
    collect_turn_plays, ChoiceSurface, DuelistView, OpponentSnapshot, RejectionLog, TurnPlays,
};
use crate::game::{DuelChannel, DuelConfig, DuelLogger, DuelState, Half, LogCategory, VerbosityLevel};
use crate::{DuelError, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

/// Line posted when neither duelist answered in time
pub const MUTUAL_FORFEIT: &str = "Both duelists timed out. The duel is abandoned.";

/// Line posted when the turn limit is reached
pub const STALEMATE: &str = "Neither duelist gives ground. The duel ends in a stalemate.";

/// How a finished duel came out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuelResult {
    /// None on mutual forfeit
    pub winner: Option<Seat>,
    /// None on mutual forfeit
    pub loser: Option<Seat>,
    /// The duel ended on a timeout rather than a death
    pub forfeited: bool,
    /// Turns started, including the one that ended the duel
    pub turns_played: u32,
}

impl DuelResult {
    pub fn is_mutual_forfeit(&self) -> bool {
        self.forfeited && self.winner.is_none()
    }

    /// Ended by the turn limit with nobody defeated
    pub fn is_stalemate(&self) -> bool {
        !self.forfeited && self.winner.is_none()
    }
}

/// Duel loop manager
///
/// Owns the duel state for one duel. Created by [`start_duel`]; the caller
/// supplies one choice surface per duelist to [`DuelLoop::run_until_end`].
pub struct DuelLoop<'a> {
    /// The duel state
    pub state: DuelState,
    catalog: &'a CardCatalog,
    config: DuelConfig,
    channel: &'a mut dyn DuelChannel,
    /// Diagnostic logger
    pub logger: DuelLogger,
    /// Answers the tickets refused, waiting to be logged
    rejections: RejectionLog,
    result: Option<DuelResult>,
}

/// Set up a duel between two distinct identities
///
/// Specials and emblems are assigned from a ChaCha RNG seeded from the
/// config, or from entropy when no seed is set.
pub fn start_duel<'a>(
    a: DuelistIdentity,
    b: DuelistIdentity,
    channel: &'a mut dyn DuelChannel,
    config: DuelConfig,
) -> Result<DuelLoop<'a>> {
    config.validate()?;
    if a.mention == b.mention {
        return Err(DuelError::InvalidConfig(format!(
            "a duelist cannot fight themselves ({})",
            a.mention
        )));
    }

    let mut rng = match config.seed {
        Some(seed) => ChaCha12Rng::seed_from_u64(seed),
        None => ChaCha12Rng::from_entropy(),
    };
    let state = DuelState::new(a, b, &config, &mut rng);
    Ok(DuelLoop::new(state, CardCatalog::global(), channel, config))
}

impl<'a> DuelLoop<'a> {
    /// Wrap an already prepared state
    pub fn new(
        state: DuelState,
        catalog: &'a CardCatalog,
        channel: &'a mut dyn DuelChannel,
        config: DuelConfig,
    ) -> Self {
        let logger = DuelLogger::with_verbosity(config.verbosity);
        DuelLoop {
            state,
            catalog,
            config,
            channel,
            logger,
            rejections: RejectionLog::new(),
            result: None,
        }
    }

    pub fn config(&self) -> &DuelConfig {
        &self.config
    }

    /// The result, once the duel is over
    pub fn result(&self) -> Option<DuelResult> {
        self.result
    }

    /// Run turns until the duel ends
    ///
    /// `p1_surface` and `p2_surface` present choices to player 1 and player 2.
    /// Both surfaces are told the outcome before this returns.
    pub async fn run_until_end(
        &mut self,
        p1_surface: &mut dyn ChoiceSurface,
        p2_surface: &mut dyn ChoiceSurface,
    ) -> Result<DuelResult> {
        if let Some(result) = self.result {
            return Ok(result);
        }
        loop {
            if let Some(result) = self.run_turn_once(p1_surface, p2_surface).await? {
                self.notify_duel_end(result, p1_surface, p2_surface);
                return Ok(result);
            }
        }
    }

    /// Run exactly one turn; `Some` when it ended the duel
    pub async fn run_turn_once(
        &mut self,
        p1_surface: &mut dyn ChoiceSurface,
        p2_surface: &mut dyn ChoiceSurface,
    ) -> Result<Option<DuelResult>> {
        if let Some(result) = self.result {
            return Ok(Some(result));
        }

        self.state.turn_number += 1;
        self.post_turn_board();
        self.state.turn_summary.clear();
        self.state.p1.clear_plays();
        self.state.p2.clear_plays();

        log_if_verbose!(self, "Turn {}: collecting choices", self.state.turn_number);

        let (p1_plays, p2_plays) = self.collect_both(p1_surface, p2_surface).await?;
        self.rejections.report(self.catalog, &self.logger);
        match (p1_plays, p2_plays) {
            (TurnPlays::TimedOut, TurnPlays::TimedOut) => {
                self.channel.emit_line(MUTUAL_FORFEIT);
                return Ok(Some(self.finish(None, None, true)));
            }
            (TurnPlays::TimedOut, TurnPlays::Chosen(..)) => {
                return Ok(Some(self.forfeit(Seat::P2, Seat::P1)));
            }
            (TurnPlays::Chosen(..), TurnPlays::TimedOut) => {
                return Ok(Some(self.forfeit(Seat::P1, Seat::P2)));
            }
            (TurnPlays::Chosen(..), TurnPlays::Chosen(..)) => {}
        }

        self.state.resolve_half_turn(self.catalog, Half::First, &self.logger)?;
        if let Some((winner, loser)) = self.state.check_for_duel_end() {
            return Ok(Some(self.win(winner, loser)));
        }

        self.state.resolve_half_turn(self.catalog, Half::Second, &self.logger)?;
        self.state.update_locks(self.catalog)?;
        if let Some((winner, loser)) = self.state.check_for_duel_end() {
            return Ok(Some(self.win(winner, loser)));
        }

        if self.config.max_turns.is_some_and(|max| self.state.turn_number >= max) {
            self.post_turn_board();
            self.channel.emit_line(STALEMATE);
            return Ok(Some(self.finish(None, None, false)));
        }

        Ok(None)
    }

    /// Run both duelists' two-step collections side by side
    async fn collect_both(
        &mut self,
        p1_surface: &mut dyn ChoiceSurface,
        p2_surface: &mut dyn ChoiceSurface,
    ) -> Result<(TurnPlays, TurnPlays)> {
        let timeout = self.config.choice_timeout();
        let catalog = self.catalog;
        let logger = &self.logger;
        let rejections = &self.rejections;
        let seen_by_p1 = OpponentSnapshot::from(&self.state.p2);
        let seen_by_p2 = OpponentSnapshot::from(&self.state.p1);
        let DuelState { p1, p2, .. } = &mut self.state;

        let (r1, r2) = tokio::join!(
            collect_turn_plays(catalog, p1, seen_by_p1, p1_surface, timeout, rejections, logger),
            collect_turn_plays(catalog, p2, seen_by_p2, p2_surface, timeout, rejections, logger),
        );
        Ok((r1?, r2?))
    }

    /// Post the start-of-turn board with last turn's narrative
    fn post_turn_board(&mut self) {
        let mut parts = Vec::new();
        if self.state.turn_number == 1 {
            parts.push(format!(
                "**{} and {}, your duel begins!**",
                self.state.p1.mention, self.state.p2.mention
            ));
        }
        if !self.state.turn_summary.is_empty() {
            parts.push(self.state.turn_summary.join("\n"));
        }
        parts.push(self.state.render_board_and_status(self.catalog));
        self.channel.emit_turn_board(&parts.join("\n\n"));
    }

    fn forfeit(&mut self, winner: Seat, loser: Seat) -> DuelResult {
        let line = format!(
            "{} wins by forfeit; their opponent failed to act in time.",
            self.state.duelist(winner).mention
        );
        self.channel.emit_line(&line);
        self.finish(Some(winner), Some(loser), true)
    }

    fn win(&mut self, winner: Seat, loser: Seat) -> DuelResult {
        let mut parts = Vec::new();
        if !self.state.turn_summary.is_empty() {
            parts.push(self.state.turn_summary.join("\n"));
        }
        parts.push(self.state.render_board_and_status(self.catalog));
        parts.push(format!("{} wins the duel!", self.state.duelist(winner).mention));
        self.channel.emit_line(&parts.join("\n\n"));
        self.finish(Some(winner), Some(loser), false)
    }

    fn finish(&mut self, winner: Option<Seat>, loser: Option<Seat>, forfeited: bool) -> DuelResult {
        self.state.in_progress = false;
        self.rejections.report(self.catalog, &self.logger);
        let result = DuelResult {
            winner,
            loser,
            forfeited,
            turns_played: self.state.turn_number,
        };
        self.logger.categorized(
            VerbosityLevel::Minimal,
            LogCategory::Duel,
            &match winner {
                Some(seat) => format!(
                    "{} wins after {} turn(s){}",
                    self.state.duelist(seat).name,
                    result.turns_played,
                    if forfeited { " by forfeit" } else { "" }
                ),
                None if forfeited => format!("abandoned after {} turn(s)", result.turns_played),
                None => format!("stalemate after {} turn(s)", result.turns_played),
            },
        );
        self.result = Some(result);
        result
    }

    fn notify_duel_end(
        &self,
        result: DuelResult,
        p1_surface: &mut dyn ChoiceSurface,
        p2_surface: &mut dyn ChoiceSurface,
    ) {
        let p1_view = DuelistView::new(&self.state.p1, &OpponentSnapshot::from(&self.state.p2));
        let p2_view = DuelistView::new(&self.state.p2, &OpponentSnapshot::from(&self.state.p1));
        p1_surface.on_duel_end(&p1_view, result.winner == Some(Seat::P1));
        p2_surface.on_duel_end(&p2_view, result.winner == Some(Seat::P2));
    }
}
