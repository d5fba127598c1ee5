//! This module defines `Program`, a complete machine description: the transition table
//! together with the initial tape, head, state and run settings.

use crate::analyzer::analyze;
use crate::machine::{Configuration, Run, TuringMachine};
use crate::table::TransitionTable;
use crate::tape::{Tape, TapePolicy};
use crate::types::{MachineError, DEFAULT_BLANK_SYMBOL, MAX_EXECUTION_STEPS};
use serde::{Deserialize, Serialize};

fn default_blank() -> char {
    DEFAULT_BLANK_SYMBOL
}

/// A machine description over `char` symbols.
///
/// Programs come from [`crate::parser::parse`], from [`Program::from_json`], or are built
/// directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// The name of the program.
    pub name: String,
    /// The state the machine starts in.
    pub initial_state: String,
    /// The symbol every unwritten cell holds.
    #[serde(default = "default_blank")]
    pub blank: char,
    /// Initial tape contents, placed from index 0.
    #[serde(default)]
    pub tape: Vec<char>,
    /// Length of the initial tape window. Never shorter than `tape`.
    #[serde(default)]
    pub length: usize,
    /// Initial head position.
    #[serde(default)]
    pub head: isize,
    /// What happens when the head leaves the initial window.
    #[serde(default)]
    pub policy: TapePolicy,
    /// Step budget for [`Program::run`]. `None` means [`MAX_EXECUTION_STEPS`].
    #[serde(default)]
    pub steps: Option<usize>,
    /// States at which [`Program::run`] stops before stepping.
    #[serde(default)]
    pub halt: Vec<String>,
    /// The transition rules.
    pub table: TransitionTable<char>,
}

impl Program {
    /// Decodes and validates a JSON program description.
    pub fn from_json(json: &str) -> Result<Self, MachineError> {
        let program: Program =
            serde_json::from_str(json).map_err(|e| MachineError::ConfigError(e.to_string()))?;

        analyze(&program)?;

        Ok(program)
    }

    pub fn to_json(&self) -> Result<String, MachineError> {
        serde_json::to_string_pretty(self).map_err(|e| MachineError::ConfigError(e.to_string()))
    }

    /// Builds the initial tape.
    pub fn initial_tape(&self) -> Tape<char> {
        Tape::seeded(self.tape.iter().copied(), self.length, self.blank, self.policy)
    }

    pub fn configuration(&self) -> Configuration<char> {
        Configuration::new(self.initial_tape(), self.head, self.initial_state.clone())
    }

    pub fn machine(&self) -> TuringMachine<'_, char> {
        TuringMachine::new(&self.table, self.configuration())
    }

    /// The step budget of [`Program::run`].
    pub fn step_budget(&self) -> usize {
        self.steps.unwrap_or(MAX_EXECUTION_STEPS)
    }

    /// Returns true if `state` is one of the program's halt states.
    pub fn is_halt_state(&self, state: &str) -> bool {
        self.halt.iter().any(|h| h == state)
    }

    /// Runs the program for its step budget, stopping early at a halt state.
    pub fn run(&self) -> Run<'_, char> {
        self.machine()
            .run_until(self.step_budget(), move |config| {
                self.is_halt_state(config.state())
            })
    }
}
