//! Tournament mode for running many bot duels in parallel
//!
//! Duels run concurrently on rayon's pool, each inside its own
//! single-threaded tokio runtime, and feed a shared statistics table.

use crate::core::{CardCatalog, DuelistIdentity, Seat};
use crate::game::{
    start_duel, ControllerSurface, DuelConfig, DuelResult, DuelistController, NullChannel,
    RandomController, VerbosityLevel, ZeroController,
};
use crate::{DuelError, Result};
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Turn limit for bot duels; mirrored zero controllers never finish otherwise
pub const TOURNEY_MAX_TURNS: u32 = 500;

/// Controller type for tournament duels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerType {
    Zero,
    Random,
}

/// What to run
#[derive(Debug, Clone)]
pub struct TourneyOptions {
    pub games: Option<usize>,
    pub seconds: Option<u64>,
    pub p1: ControllerType,
    pub p2: ControllerType,
    pub seed: Option<u64>,
}

/// Statistics collected during a tournament
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TournamentStats {
    pub games: usize,
    pub p1_wins: usize,
    pub p2_wins: usize,
    /// Wins by reducing the opponent to zero hit points
    pub normal_wins: usize,
    /// Wins because the opponent timed out
    pub forfeit_wins: usize,
    pub mutual_forfeits: usize,
    /// Duels stopped by the turn limit
    pub stalemates: usize,
    pub failures: usize,
    pub total_turns: u64,
    /// Wins keyed by the winner's special
    pub special_wins: HashMap<String, usize>,
}

impl TournamentStats {
    /// Fold one finished duel into the table
    pub fn record(&mut self, result: &DuelResult, winner_special: Option<&str>) {
        self.games += 1;
        self.total_turns += u64::from(result.turns_played);
        match result.winner {
            Some(Seat::P1) => self.p1_wins += 1,
            Some(Seat::P2) => self.p2_wins += 1,
            None => {}
        }
        if result.is_stalemate() {
            self.stalemates += 1;
        } else if result.is_mutual_forfeit() {
            self.mutual_forfeits += 1;
        } else if result.forfeited {
            self.forfeit_wins += 1;
        } else {
            self.normal_wins += 1;
        }
        if let Some(special) = winner_special {
            *self.special_wins.entry(special.to_string()).or_insert(0) += 1;
        }
    }

    pub fn average_turns(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.total_turns as f64 / self.games as f64
        }
    }

    /// Human-readable report
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let pct = |n: usize| {
            if self.games == 0 {
                0.0
            } else {
                100.0 * n as f64 / self.games as f64
            }
        };
        let _ = writeln!(out, "=== Seat Statistics ===");
        let _ = writeln!(out, "P1 wins: {} ({:.1}%)", self.p1_wins, pct(self.p1_wins));
        let _ = writeln!(out, "P2 wins: {} ({:.1}%)", self.p2_wins, pct(self.p2_wins));
        let _ = writeln!(out, "Normal wins: {}", self.normal_wins);
        let _ = writeln!(out, "Forfeit wins: {}", self.forfeit_wins);
        let _ = writeln!(out, "Mutual forfeits: {}", self.mutual_forfeits);
        let _ = writeln!(out, "Stalemates: {}", self.stalemates);
        let _ = writeln!(out, "Average turns: {:.2}", self.average_turns());
        if self.failures > 0 {
            let _ = writeln!(out, "Failed duels: {}", self.failures);
        }

        let _ = writeln!(out, "\n=== Wins by Special ===");
        let mut specials: Vec<_> = self.special_wins.iter().collect();
        specials.sort_by_key(|(name, _)| name.as_str());
        for (name, wins) in specials {
            let _ = writeln!(out, "  {}: {}", name, wins);
        }
        out
    }
}

fn lock_stats(stats: &Mutex<TournamentStats>) -> MutexGuard<'_, TournamentStats> {
    match stats.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn make_controller(kind: ControllerType, seat: Seat, seed: u64) -> Box<dyn DuelistController> {
    match kind {
        ControllerType::Zero => Box::new(ZeroController::new(seat)),
        ControllerType::Random => Box::new(RandomController::with_seed(seat, seed)),
    }
}

/// Play one silent bot duel to completion
///
/// Returns the result and the winner's special name.
pub fn run_single_duel(
    p1: ControllerType,
    p2: ControllerType,
    game_seed: u64,
) -> Result<(DuelResult, Option<String>)> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    runtime.block_on(async {
        let mut channel = NullChannel;
        let config = DuelConfig::default()
            .with_seed(game_seed)
            .with_verbosity(VerbosityLevel::Silent)
            .with_max_turns(TOURNEY_MAX_TURNS);
        let mut duel = start_duel(
            DuelistIdentity::new("Player 1", "@player1"),
            DuelistIdentity::new("Player 2", "@player2"),
            &mut channel,
            config,
        )?;

        let mut s1 = ControllerSurface::new(make_controller(
            p1,
            Seat::P1,
            game_seed.wrapping_add(0x1234_5678_9ABC_DEF0),
        ));
        let mut s2 = ControllerSurface::new(make_controller(
            p2,
            Seat::P2,
            game_seed.wrapping_add(0xFEDC_BA98_7654_3210),
        ));
        let result = duel.run_until_end(&mut s1, &mut s2).await?;

        let special = result.winner.map(|seat| {
            CardCatalog::global()
                .attack(duel.state.duelist(seat).special)
                .name
                .clone()
        });
        Ok::<_, DuelError>((result, special))
    })
}

/// Run tournament mode and return the collected statistics
pub fn run_tourney(options: &TourneyOptions) -> Result<TournamentStats> {
    if options.games.is_none() && options.seconds.is_none() {
        return Err(DuelError::InvalidConfig(
            "Must specify either --games or --seconds".to_string(),
        ));
    }

    // Time-bounded runs stop at the deadline instead
    let total_games = options.games.unwrap_or(1_000_000);
    let stats = Mutex::new(TournamentStats::default());
    let start_time = Instant::now();
    let deadline = options.seconds.map(|s| start_time + Duration::from_secs(s));
    let master_seed = options.seed.unwrap_or(42);

    (0..total_games).into_par_iter().for_each(|game_idx| {
        if let Some(deadline_time) = deadline {
            if Instant::now() >= deadline_time {
                return;
            }
        }

        // Per-game seed derived from the master seed and the game index
        let mut seed_rng =
            rand_xoshiro::Xoshiro256PlusPlus::seed_from_u64(master_seed.wrapping_add(game_idx as u64));
        let game_seed: u64 = seed_rng.gen();

        match run_single_duel(options.p1, options.p2, game_seed) {
            Ok((result, special)) => {
                let mut stats = lock_stats(&stats);
                stats.record(&result, special.as_deref());
                if stats.games % 1000 == 0 {
                    println!("Completed {} duels", stats.games);
                }
            }
            Err(e) => {
                eprintln!("Warning: duel {} failed: {}", game_idx, e);
                lock_stats(&stats).failures += 1;
            }
        }
    });

    let stats = match stats.into_inner() {
        Ok(stats) => stats,
        Err(poisoned) => poisoned.into_inner(),
    };
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_counts_outcomes() {
        let mut stats = TournamentStats::default();
        stats.record(
            &DuelResult { winner: Some(Seat::P1), loser: Some(Seat::P2), forfeited: false, turns_played: 3 },
            Some("Kesa Strike"),
        );
        stats.record(
            &DuelResult { winner: Some(Seat::P2), loser: Some(Seat::P1), forfeited: true, turns_played: 1 },
            Some("Counterattack"),
        );
        stats.record(
            &DuelResult { winner: None, loser: None, forfeited: true, turns_played: 2 },
            None,
        );

        assert_eq!(stats.games, 3);
        assert_eq!(stats.p1_wins, 1);
        assert_eq!(stats.p2_wins, 1);
        assert_eq!(stats.normal_wins, 1);
        assert_eq!(stats.forfeit_wins, 1);
        assert_eq!(stats.mutual_forfeits, 1);
        assert_eq!(stats.average_turns(), 2.0);
        assert_eq!(stats.special_wins.get("Kesa Strike"), Some(&1));
        assert!(stats.summary().contains("Mutual forfeits: 1"));
    }

    #[test]
    fn test_single_duel_is_deterministic() {
        let (a, sa) = run_single_duel(ControllerType::Random, ControllerType::Random, 99).unwrap();
        let (b, sb) = run_single_duel(ControllerType::Random, ControllerType::Random, 99).unwrap();
        assert_eq!(a, b);
        assert_eq!(sa, sb);
        assert!(!a.forfeited);
        assert!(a.winner.is_some());
    }

    #[test]
    fn test_small_tourney() {
        let options = TourneyOptions {
            games: Some(8),
            seconds: None,
            p1: ControllerType::Random,
            p2: ControllerType::Zero,
            seed: Some(5),
        };
        let stats = run_tourney(&options).unwrap();
        assert_eq!(stats.games, 8);
        assert_eq!(stats.failures, 0);
        assert_eq!(stats.p1_wins + stats.p2_wins + stats.stalemates, 8);
    }

    #[test]
    fn test_zero_mirror_is_a_stalemate() {
        let (result, special) = run_single_duel(ControllerType::Zero, ControllerType::Zero, 1).unwrap();
        assert!(result.is_stalemate());
        assert_eq!(result.turns_played, TOURNEY_MAX_TURNS);
        assert_eq!(special, None);
    }

    #[test]
    fn test_requires_games_or_seconds() {
        let options = TourneyOptions {
            games: None,
            seconds: None,
            p1: ControllerType::Zero,
            p2: ControllerType::Zero,
            seed: None,
        };
        assert!(matches!(run_tourney(&options), Err(DuelError::InvalidConfig(_))));
    }
}
