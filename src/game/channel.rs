//! Outbound channel for public duel messages
//!
//! Everything both duelists see (boards, narratives, end-of-duel lines) goes
//! through a [`DuelChannel`]. Choice prompts are private and go through each
//! duelist's choice surface instead.

use std::io::{self, Write};

/// One message posted to the channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelMessage {
    /// Board and status block shown at the start of a turn
    TurnBoard(String),
    /// Any other public line or block
    Line(String),
}

impl ChannelMessage {
    pub fn text(&self) -> &str {
        match self {
            ChannelMessage::TurnBoard(t) | ChannelMessage::Line(t) => t,
        }
    }
}

/// Sink for public duel output
pub trait DuelChannel {
    /// Post a public line (narrative, headers, results)
    fn emit_line(&mut self, text: &str);

    /// Post the start-of-turn board; replaces the previous turn's board on
    /// channels that can edit
    fn emit_turn_board(&mut self, text: &str) {
        self.emit_line(text);
    }
}

/// Channel that prints to stdout
#[derive(Debug, Default)]
pub struct StdoutChannel;

impl DuelChannel for StdoutChannel {
    fn emit_line(&mut self, text: &str) {
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "{}", text);
    }

    fn emit_turn_board(&mut self, text: &str) {
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "\n{}", text);
    }
}

/// Channel that records messages in memory
#[derive(Debug, Default, Clone)]
pub struct MemoryChannel {
    messages: Vec<ChannelMessage>,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChannelMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChannelMessage> {
        self.messages.last()
    }

    /// Every message's text joined with newlines
    pub fn transcript(&self) -> String {
        self.messages
            .iter()
            .map(ChannelMessage::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn boards(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().filter_map(|m| match m {
            ChannelMessage::TurnBoard(t) => Some(t.as_str()),
            ChannelMessage::Line(_) => None,
        })
    }
}

impl DuelChannel for MemoryChannel {
    fn emit_line(&mut self, text: &str) {
        self.messages.push(ChannelMessage::Line(text.to_string()));
    }

    fn emit_turn_board(&mut self, text: &str) {
        self.messages.push(ChannelMessage::TurnBoard(text.to_string()));
    }
}

/// Channel that drops everything, for benchmarks and tournaments
#[derive(Debug, Default)]
pub struct NullChannel;

impl DuelChannel for NullChannel {
    fn emit_line(&mut self, _text: &str) {}
}
