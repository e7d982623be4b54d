//! Capability traits for the grammar engine.

use crate::error::Result;
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Which engine call was running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Generation,
    Parsing,
    Environment,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Generation => write!(f, "sentence generation"),
            Stage::Parsing => write!(f, "sentence testing"),
            Stage::Environment => write!(f, "environment switch"),
        }
    }
}

pub trait SentenceGenerator {
    /// Generate up to `count` sentences from `grammar`, giving up after `timeout`.
    ///
    /// Returns the raw output, banner lines included.
    fn generate(&self, grammar: &Path, count: usize, timeout: Duration) -> Result<String>;
}

pub trait GrammarParser {
    /// Parse every sentence of `sentences` (one per line) with `grammar`.
    ///
    /// Returns the raw output: one XML parse result per sentence, concatenated.
    fn parse(&self, grammar: &Path, sentences: &Path) -> Result<String>;
}

pub trait EnvironmentSwitcher {
    /// Make `environment` the active engine installation for the following calls.
    fn activate(&self, environment: &str) -> Result<()>;
}

/// Everything a regression run needs from the engine.
pub trait GrammarEngine: SentenceGenerator + GrammarParser + EnvironmentSwitcher {}

impl<T> GrammarEngine for T where T: SentenceGenerator + GrammarParser + EnvironmentSwitcher {}
