//! Diagnostic logger for the duel engine
//!
//! Diagnostics (who chose what, how movement resolved, why combat went the
//! way it did) are kept apart from the narrative lines sent to the duel's
//! channel. Entries can go to stdout, to an in-memory buffer, or both.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;

/// Verbosity level for diagnostic output
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum VerbosityLevel {
    /// Nothing at all
    Silent = 0,
    /// Only how each duel ended
    Minimal = 1,
    /// Chosen plays and timeouts
    #[default]
    Normal = 2,
    /// Movement and combat internals
    Verbose = 3,
}

/// Output destination for log messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputMode {
    #[default]
    Stdout,
    /// In-memory buffer only
    Memory,
    Both,
}

/// Which part of the engine produced an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogCategory {
    Choice,
    Movement,
    Combat,
    Duel,
}

impl LogCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            LogCategory::Choice => "choice",
            LogCategory::Movement => "movement",
            LogCategory::Combat => "combat",
            LogCategory::Duel => "duel",
        }
    }
}

impl fmt::Display for LogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A captured log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: VerbosityLevel,
    pub category: Option<LogCategory>,
    pub message: String,
}

/// Diagnostic logger owned by one duel
///
/// Capturing keeps every entry regardless of verbosity, so tests can look at
/// verbose internals while stdout stays quiet.
pub struct DuelLogger {
    verbosity: VerbosityLevel,
    output_mode: OutputMode,
    captured: RefCell<Vec<LogEntry>>,
}

impl DuelLogger {
    pub fn new() -> Self {
        Self::with_verbosity(VerbosityLevel::default())
    }

    pub fn with_verbosity(verbosity: VerbosityLevel) -> Self {
        DuelLogger {
            verbosity,
            output_mode: OutputMode::default(),
            captured: RefCell::new(Vec::new()),
        }
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        self.verbosity
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    pub fn set_output_mode(&mut self, mode: OutputMode) {
        self.output_mode = mode;
    }

    /// Capture to memory only (suppresses stdout)
    pub fn enable_capture(&mut self) {
        self.output_mode = OutputMode::Memory;
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.output_mode, OutputMode::Memory | OutputMode::Both)
    }

    /// Snapshot of everything captured so far
    pub fn entries(&self) -> Vec<LogEntry> {
        self.captured.borrow().clone()
    }

    /// Captured messages of one category, oldest first
    pub fn messages_in(&self, category: LogCategory) -> Vec<String> {
        self.captured
            .borrow()
            .iter()
            .filter(|e| e.category == Some(category))
            .map(|e| e.message.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.captured.borrow_mut().clear();
    }

    fn log(&self, level: VerbosityLevel, category: Option<LogCategory>, message: &str) {
        let capture = self.is_capturing();
        let print = matches!(self.output_mode, OutputMode::Stdout | OutputMode::Both)
            && level <= self.verbosity;

        if capture {
            self.captured.borrow_mut().push(LogEntry {
                level,
                category,
                message: message.to_string(),
            });
        }

        if print {
            match category {
                Some(c) => println!("  [{c}] {message}"),
                None => println!("{message}"),
            }
        }
    }

    #[inline]
    pub fn minimal(&self, message: &str) {
        self.log(VerbosityLevel::Minimal, None, message);
    }

    #[inline]
    pub fn verbose(&self, message: &str) {
        self.log(VerbosityLevel::Verbose, None, message);
    }

    #[inline]
    pub fn categorized(&self, level: VerbosityLevel, category: LogCategory, message: &str) {
        self.log(level, Some(category), message);
    }

    /// A duelist's selection, at Normal level
    #[inline]
    pub fn duelist_choice(&self, duelist_name: &str, message: &str) {
        self.log(
            VerbosityLevel::Normal,
            Some(LogCategory::Choice),
            &format!("{duelist_name}: {message}"),
        );
    }
}

impl Default for DuelLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DuelLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DuelLogger")
            .field("verbosity", &self.verbosity)
            .field("output_mode", &self.output_mode)
            .field("captured", &self.captured.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_logger_prints_without_capturing() {
        let logger = DuelLogger::new();
        assert_eq!(logger.verbosity(), VerbosityLevel::Normal);
        assert_eq!(logger.output_mode(), OutputMode::Stdout);
        assert!(!logger.is_capturing());
    }

    #[test]
    fn test_capture_records_categories() {
        let mut logger = DuelLogger::new();
        logger.enable_capture();

        logger.minimal("Alice wins");
        logger.duelist_choice("Alice", "chose Approach");
        logger.categorized(VerbosityLevel::Verbose, LogCategory::Movement, "p1 0 -> 1");

        let entries = logger.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].category, None);
        assert_eq!(entries[1].message, "Alice: chose Approach");
        assert_eq!(logger.messages_in(LogCategory::Choice), vec!["Alice: chose Approach"]);
        assert_eq!(logger.messages_in(LogCategory::Movement), vec!["p1 0 -> 1"]);
    }

    #[test]
    fn test_capture_ignores_verbosity() {
        let mut logger = DuelLogger::with_verbosity(VerbosityLevel::Silent);
        logger.enable_capture();
        logger.verbose("movement detail");
        assert_eq!(logger.entries()[0].level, VerbosityLevel::Verbose);

        logger.clear();
        assert!(logger.entries().is_empty());
    }

    #[test]
    fn test_category_names() {
        assert_eq!(LogCategory::Combat.to_string(), "combat");
        assert_eq!(LogCategory::Duel.as_str(), "duel");
    }
}
