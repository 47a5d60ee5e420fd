//! Interactive TUI controller for human duelists
//!
//! Prints the prompt and the offered plays, then reads a choice from stdin.
//! A choice can be given by index or by play name (case- and
//! accent-insensitive). End of input leaves the choice unanswered.
//!
//! Reading blocks, so in a duel this controller sits behind a
//! [`BlockingSurface`](crate::game::BlockingSurface) to keep the choice
//! timeout in force.

use crate::core::{CardCatalog, Play, Seat};
use crate::game::choice::{ChoiceStep, DuelistView};
use crate::game::controller::DuelistController;
use std::io::{self, BufRead, Write};

/// A controller that prompts a human for decisions
pub struct InteractiveController {
    seat: Seat,
    input: Box<dyn BufRead + Send>,
    output: Box<dyn Write + Send>,
}

impl InteractiveController {
    /// Controller reading from stdin and writing to stdout
    pub fn new(seat: Seat) -> Self {
        InteractiveController {
            seat,
            input: Box::new(io::BufReader::new(io::stdin())),
            output: Box::new(io::stdout()),
        }
    }

    /// Controller over arbitrary streams
    pub fn with_io(seat: Seat, input: Box<dyn BufRead + Send>, output: Box<dyn Write + Send>) -> Self {
        InteractiveController { seat, input, output }
    }

    fn display_help(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n=== Help ===")?;
        writeln!(self.output, "  <n>     - choose option n")?;
        writeln!(self.output, "  <name>  - choose a play by name (e.g. 'charge')")?;
        writeln!(self.output, "  s       - show your status")?;
        writeln!(self.output, "  ?       - show this help")?;
        writeln!(self.output)
    }

    fn display_status(&mut self, view: &DuelistView) -> io::Result<()> {
        writeln!(
            self.output,
            "You: cell {} | hp {} | {} stance | distance {}",
            view.cell,
            view.hp,
            view.stance,
            view.distance()
        )?;
        writeln!(
            self.output,
            "Opponent: cell {} | hp {} | {} stance",
            view.opponent_cell, view.opponent_hp, view.opponent_stance
        )
    }

    fn display_options(&mut self, header: &str, options: &[Play]) -> io::Result<()> {
        let catalog = CardCatalog::global();
        writeln!(self.output, "\n{}", header)?;
        for (i, play) in options.iter().enumerate() {
            writeln!(self.output, "  [{}] {}", i, catalog.play_label(*play))?;
        }
        Ok(())
    }

    /// Resolve a line of input to one of the offered plays
    fn parse_choice(input: &str, options: &[Play]) -> Option<Play> {
        if let Ok(index) = input.parse::<usize>() {
            return options.get(index).copied();
        }
        CardCatalog::global()
            .lookup(input)
            .ok()
            .filter(|play| options.contains(play))
    }

    /// Prompt until a valid choice arrives; `Ok(None)` on end of input
    fn prompt(&mut self, view: &DuelistView, header: &str, options: &[Play]) -> io::Result<Option<Play>> {
        self.display_options(header, options)?;
        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            let trimmed = line.trim();
            match trimmed {
                "" => continue,
                "?" => {
                    self.display_help()?;
                    continue;
                }
                "s" => {
                    self.display_status(view)?;
                    continue;
                }
                _ => {}
            }

            match Self::parse_choice(trimmed, options) {
                Some(play) => return Ok(Some(play)),
                None => writeln!(
                    self.output,
                    "Invalid choice. Enter 0-{} or a play name.",
                    options.len().saturating_sub(1)
                )?,
            }
        }
    }
}

impl DuelistController for InteractiveController {
    fn seat(&self) -> Seat {
        self.seat
    }

    fn choose_play(
        &mut self,
        view: &DuelistView,
        _step: ChoiceStep,
        header: &str,
        options: &[Play],
    ) -> Option<Play> {
        match self.prompt(view, header, options) {
            Ok(choice) => choice,
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                None
            }
        }
    }

    fn on_duel_end(&mut self, _view: &DuelistView, won: bool) {
        let _ = writeln!(
            self.output,
            "{}",
            if won { "You won the duel." } else { "You lost the duel." }
        );
    }
}
