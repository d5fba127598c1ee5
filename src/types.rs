//! This module defines the core data structures and types shared by the engine: symbols,
//! head directions, transitions, tuning constants, and the crate-wide error type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use thiserror::Error;

use crate::Rule;

/// The blank symbol used when a program does not declare one.
pub const DEFAULT_BLANK_SYMBOL: char = '#';
/// Width the state label is right-justified to in trace output.
pub const LABEL_WIDTH: usize = 4;
/// The maximum allowed size for a textual program in bytes.
pub const MAX_PROGRAM_SIZE: usize = 65536; // 64KB
/// Step budget for programs that do not declare one.
pub const MAX_EXECUTION_STEPS: usize = 10000;

/// A value that can occupy a single tape cell.
///
/// Anything comparable, hashable and printable qualifies; the parser and the built-in
/// programs use `char`.
pub trait Symbol: Clone + Eq + Hash + fmt::Debug + fmt::Display {}

impl<T> Symbol for T where T: Clone + Eq + Hash + fmt::Debug + fmt::Display {}

/// Represents the possible directions the head can move after a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    #[serde(alias = "L")]
    Left,
    /// Move the head one position to the right.
    #[serde(alias = "R")]
    Right,
    /// Keep the head in the same position.
    #[serde(alias = "S")]
    Stay,
}

impl Direction {
    /// The signed offset applied to the head position.
    pub fn offset(self) -> isize {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
            Direction::Stay => 0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Direction::Left => 'L',
            Direction::Right => 'R',
            Direction::Stay => 'S',
        };
        write!(f, "{c}")
    }
}

/// The action taken for one `(symbol, state)` key of a transition table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition<S> {
    /// The symbol written under the head. May equal the symbol read.
    pub write: S,
    /// Where the head moves after writing.
    pub direction: Direction,
    /// The state the machine enters.
    pub next_state: String,
}

impl<S> Transition<S> {
    pub fn new(write: S, direction: Direction, next_state: impl Into<String>) -> Self {
        Self {
            write,
            direction,
            next_state: next_state.into(),
        }
    }
}

/// Represents the errors that can occur while building or running a machine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MachineError {
    /// The table has no entry for the symbol under the head in the current state.
    #[error("No transition defined for symbol '{symbol}' in state {state}")]
    MissingTransition { symbol: String, state: String },
    /// A fixed-window tape was read or written outside its cells.
    #[error("Tape index {0} is outside the fixed tape window")]
    TapeBounds(isize),
    /// Indicates an error during the parsing of a textual program.
    #[error("Program parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// Indicates a program or table that is structurally or logically inconsistent.
    #[error("Program validation error: {0}")]
    ValidationError(String),
    /// Indicates a structured (JSON) program description that could not be decoded.
    #[error("Program configuration error: {0}")]
    ConfigError(String),
}

impl MachineError {
    pub(crate) fn missing<S: Symbol>(symbol: &S, state: &str) -> Self {
        MachineError::MissingTransition {
            symbol: symbol.to_string(),
            state: state.to_string(),
        }
    }
}
