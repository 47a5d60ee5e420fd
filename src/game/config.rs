//! Duel configuration
//!
//! Loaded from JSON or assembled from CLI flags; every field has a default so
//! partial config files are accepted.

use crate::core::STARTING_HP;
use crate::game::VerbosityLevel;
use crate::{DuelError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Seconds a duelist has to answer each choice step
pub const DEFAULT_CHOICE_TIMEOUT_SECS: u64 = 800;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuelConfig {
    /// Hit points each duelist starts with
    pub starting_hp: u8,

    /// Per-step choice timeout, in seconds
    pub choice_timeout_secs: u64,

    /// Seed for special and emblem assignment (random when absent)
    pub seed: Option<u64>,

    /// Diagnostic verbosity
    pub verbosity: VerbosityLevel,

    /// Stop as a stalemate after this many turns (unbounded when absent)
    pub max_turns: Option<u32>,
}

impl Default for DuelConfig {
    fn default() -> Self {
        DuelConfig {
            starting_hp: STARTING_HP,
            choice_timeout_secs: DEFAULT_CHOICE_TIMEOUT_SECS,
            seed: None,
            verbosity: VerbosityLevel::default(),
            max_turns: None,
        }
    }
}

impl DuelConfig {
    /// Load a config from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: DuelConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.starting_hp == 0 {
            return Err(DuelError::InvalidConfig(
                "starting_hp must be at least 1".to_string(),
            ));
        }
        if self.choice_timeout_secs == 0 {
            return Err(DuelError::InvalidConfig(
                "choice_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.max_turns == Some(0) {
            return Err(DuelError::InvalidConfig(
                "max_turns must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn choice_timeout(&self) -> Duration {
        Duration::from_secs(self.choice_timeout_secs)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_choice_timeout_secs(mut self, secs: u64) -> Self {
        self.choice_timeout_secs = secs;
        self
    }

    pub fn with_verbosity(mut self, verbosity: VerbosityLevel) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = Some(max_turns);
        self
    }
}
