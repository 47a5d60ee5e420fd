//! Samurai duel - main binary
//!
//! Runs a single duel in the terminal or a batch of bot duels.

use clap::{Parser, Subcommand, ValueEnum};
use samurai_duel::{
    core::{DuelistIdentity, Seat},
    game::{
        start_duel, BlockingSurface, ChoiceSurface, ControllerSurface, DuelConfig,
        DuelistController, FixedScriptController, InteractiveController, RandomController,
        SilentController, StdoutChannel, VerbosityLevel, ZeroController,
    },
    tournament::{self, TourneyOptions},
    DuelError, Result,
};
use std::path::PathBuf;

/// Controller type for a duelist
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ControllerType {
    /// Always chooses the first offered play
    Zero,
    /// Makes random choices
    Random,
    /// Text UI controller for human play via stdin
    Tui,
    /// Fixed script controller with predetermined choices (requires --pN-fixed-inputs)
    Fixed,
    /// Never answers; forfeits when the choice timeout runs out
    Silent,
}

/// Controller type for tournament duels
#[derive(Debug, Clone, Copy, ValueEnum)]
enum BotType {
    Zero,
    Random,
}

impl From<BotType> for tournament::ControllerType {
    fn from(bot: BotType) -> Self {
        match bot {
            BotType::Zero => tournament::ControllerType::Zero,
            BotType::Random => tournament::ControllerType::Random,
        }
    }
}

/// Verbosity level (custom parser supporting both names and numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(VerbosityLevel);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityArg(VerbosityLevel::Silent)),
            "minimal" | "1" => Ok(VerbosityArg(VerbosityLevel::Minimal)),
            "normal" | "2" => Ok(VerbosityArg(VerbosityLevel::Normal)),
            "verbose" | "3" => Ok(VerbosityArg(VerbosityLevel::Verbose)),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)"
            )),
        }
    }
}

impl From<VerbosityArg> for VerbosityLevel {
    fn from(arg: VerbosityArg) -> Self {
        arg.0
    }
}

#[derive(Parser)]
#[command(name = "duel")]
#[command(about = "Samurai duel - stance-based two-player dueling engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one duel in the terminal
    Play {
        /// Player 1 controller type
        #[arg(long, value_enum, default_value = "tui")]
        p1: ControllerType,

        /// Player 2 controller type
        #[arg(long, value_enum, default_value = "random")]
        p2: ControllerType,

        /// Player 1 name
        #[arg(long, default_value = "Player 1")]
        p1_name: String,

        /// Player 2 name
        #[arg(long, default_value = "Player 2")]
        p2_name: String,

        /// Player 1 emblem (random when omitted)
        #[arg(long)]
        p1_emblem: Option<String>,

        /// Player 2 emblem (random, or re-rolled when it matches player 1's)
        #[arg(long)]
        p2_emblem: Option<String>,

        /// Fixed script input for player 1 (space or comma separated indices, e.g., "0 3" or "0,3")
        #[arg(long, value_name = "CHOICES")]
        p1_fixed_inputs: Option<String>,

        /// Fixed script input for player 2
        #[arg(long, value_name = "CHOICES")]
        p2_fixed_inputs: Option<String>,

        /// Seed for special and emblem assignment (and the random controllers)
        #[arg(long)]
        seed: Option<u64>,

        /// Seconds each duelist has per choice step
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// End the duel as a stalemate after this many turns
        #[arg(long)]
        max_turns: Option<u32>,

        /// Diagnostic verbosity (0=silent, 1=minimal, 2=normal, 3=verbose)
        #[arg(long, short = 'v')]
        verbosity: Option<VerbosityArg>,

        /// JSON config file; flags override its values
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Run many bot duels in parallel and print statistics
    Tourney {
        /// Number of duels to run
        #[arg(long, short = 'g')]
        games: Option<usize>,

        /// Run for this many seconds instead of a fixed count
        #[arg(long)]
        seconds: Option<u64>,

        /// Player 1 bot
        #[arg(long, value_enum, default_value = "random")]
        p1: BotType,

        /// Player 2 bot
        #[arg(long, value_enum, default_value = "random")]
        p2: BotType,

        /// Master seed for the per-duel seeds
        #[arg(long)]
        seed: Option<u64>,
    },
}

/// Mention handle derived from a display name
fn mention_for(name: &str) -> String {
    let handle: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    format!("@{handle}")
}

fn identity(name: String, emblem: Option<String>) -> DuelistIdentity {
    let mention = mention_for(&name);
    let id = DuelistIdentity::new(name, mention);
    match emblem {
        Some(e) => id.with_emblem(e),
        None => id,
    }
}

/// Choice surface for one seat
///
/// The terminal controller blocks on stdin, so it is moved off the duel's
/// task; the bots answer inline.
fn make_surface(
    kind: ControllerType,
    seat: Seat,
    fixed_inputs: Option<&str>,
    seed: Option<u64>,
) -> Result<Box<dyn ChoiceSurface>> {
    let controller: Box<dyn DuelistController> = match kind {
        ControllerType::Tui => {
            return Ok(Box::new(BlockingSurface::new(InteractiveController::new(seat))));
        }
        ControllerType::Zero => Box::new(ZeroController::new(seat)),
        ControllerType::Random => match seed {
            Some(s) => Box::new(RandomController::with_seed(seat, s.wrapping_add(seat.index() as u64 + 1))),
            None => Box::new(RandomController::new(seat)),
        },
        ControllerType::Fixed => {
            let inputs = fixed_inputs.ok_or_else(|| {
                DuelError::InvalidConfig(format!("--{seat}-fixed-inputs is required for a fixed controller"))
            })?;
            Box::new(FixedScriptController::new(
                seat,
                FixedScriptController::parse_script(inputs)?,
            ))
        }
        ControllerType::Silent => Box::new(SilentController::new(seat)),
    };
    Ok(Box::new(ControllerSurface::new(controller)))
}

#[allow(clippy::too_many_arguments)]
async fn run_play(
    p1: ControllerType,
    p2: ControllerType,
    p1_name: String,
    p2_name: String,
    p1_emblem: Option<String>,
    p2_emblem: Option<String>,
    p1_fixed_inputs: Option<String>,
    p2_fixed_inputs: Option<String>,
    seed: Option<u64>,
    timeout_secs: Option<u64>,
    max_turns: Option<u32>,
    verbosity: Option<VerbosityArg>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => DuelConfig::load_from_file(path)?,
        None => DuelConfig::default().with_verbosity(VerbosityLevel::Minimal),
    };
    if let Some(s) = seed {
        config = config.with_seed(s);
    }
    if let Some(t) = timeout_secs {
        config = config.with_choice_timeout_secs(t);
    }
    if let Some(m) = max_turns {
        config = config.with_max_turns(m);
    }
    if let Some(v) = verbosity {
        config = config.with_verbosity(v.into());
    }

    let mut s1 = make_surface(p1, Seat::P1, p1_fixed_inputs.as_deref(), config.seed)?;
    let mut s2 = make_surface(p2, Seat::P2, p2_fixed_inputs.as_deref(), config.seed)?;

    let mut channel = StdoutChannel;
    let mut duel = start_duel(
        identity(p1_name, p1_emblem),
        identity(p2_name, p2_emblem),
        &mut channel,
        config,
    )?;
    let result = duel.run_until_end(&mut *s1, &mut *s2).await?;
    duel.logger.minimal(&format!(
        "Duel over after {} turn(s){}",
        result.turns_played,
        if result.forfeited { " (forfeit)" } else { "" }
    ));
    Ok(())
}

fn run_tourney_cmd(
    games: Option<usize>,
    seconds: Option<u64>,
    p1: BotType,
    p2: BotType,
    seed: Option<u64>,
) -> Result<()> {
    println!("=== Samurai Duel - Tournament Mode ===\n");
    if let Some(s) = seed {
        println!("Using tournament seed: {s}");
    }
    println!("Controllers: P1={:?}, P2={:?}\n", p1, p2);

    let options = TourneyOptions {
        games,
        seconds,
        p1: p1.into(),
        p2: p2.into(),
        seed,
    };
    let start = std::time::Instant::now();
    let stats = tournament::run_tourney(&options)?;
    let elapsed = start.elapsed();

    println!("\n=== Tournament Complete ===");
    println!("Total duels played: {}", stats.games);
    println!("Elapsed time: {:.2}s", elapsed.as_secs_f64());
    println!(
        "Duels per second: {:.2}\n",
        stats.games as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );
    print!("{}", stats.summary());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            p1,
            p2,
            p1_name,
            p2_name,
            p1_emblem,
            p2_emblem,
            p1_fixed_inputs,
            p2_fixed_inputs,
            seed,
            timeout_secs,
            max_turns,
            verbosity,
            config,
        } => {
            // A terminal prompt can still be waiting on stdin when the duel
            // ends, so the runtime is shut down without joining its blocking pool.
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            let outcome = runtime.block_on(run_play(
                p1,
                p2,
                p1_name,
                p2_name,
                p1_emblem,
                p2_emblem,
                p1_fixed_inputs,
                p2_fixed_inputs,
                seed,
                timeout_secs,
                max_turns,
                verbosity,
                config,
            ));
            runtime.shutdown_background();
            outcome?
        }
        Commands::Tourney {
            games,
            seconds,
            p1,
            p2,
            seed,
        } => run_tourney_cmd(games, seconds, p1, p2, seed)?,
    }

    Ok(())
}
