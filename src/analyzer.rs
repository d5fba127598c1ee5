//! This module provides functions for analyzing programs to detect common errors and
//! inconsistencies before execution. This includes checks for valid head positions, defined
//! states, reachable states, and handled tape symbols.

use crate::program::Program;
use crate::tape::TapePolicy;
use crate::types::MachineError;
use std::collections::HashSet;

/// Represents various errors that can be found during the analysis of a program.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// The initial head lies outside a fixed tape window.
    InvalidHead(isize),
    /// The initial state has no transitions.
    InvalidStartState(String),
    /// Transitions lead to states that have no transitions and are not halt states.
    UndefinedNextStates(Vec<String>),
    /// States with transitions that cannot be reached from the initial state.
    UnreachableStates(Vec<String>),
    /// The initial tape contains symbols that no transition reads.
    InvalidTapeSymbols(Vec<char>),
    /// Structural problems such as a fixed tape with no cells.
    StructuralError(String),
}

impl From<AnalysisError> for MachineError {
    /// Converts an `AnalysisError` into a `MachineError::ValidationError`.
    fn from(error: AnalysisError) -> Self {
        match error {
            AnalysisError::InvalidHead(pos) => {
                MachineError::ValidationError(format!("Invalid head position: {}", pos))
            }
            AnalysisError::InvalidStartState(state) => {
                MachineError::ValidationError(format!("Invalid start state: {}", state))
            }
            AnalysisError::UndefinedNextStates(transitions) => MachineError::ValidationError(
                format!("Transitions reference undefined states: {:?}", transitions),
            ),
            AnalysisError::UnreachableStates(states) => MachineError::ValidationError(format!(
                "Unreachable states detected: {:?}",
                states
            )),
            AnalysisError::InvalidTapeSymbols(symbols) => {
                MachineError::ValidationError(format!(
                    "Initial tape contains symbols not handled by any transition: {:?}",
                    symbols
                ))
            }
            AnalysisError::StructuralError(msg) => MachineError::ValidationError(msg),
        }
    }
}

/// Analyzes a `Program` for structural and logical errors.
///
/// # Returns
///
/// * `Ok(())` if no errors are found.
/// * `Err(MachineError::ValidationError)` describing the first violated check.
pub fn analyze(program: &Program) -> Result<(), MachineError> {
    let first_error = [
        check_structure,
        check_head,
        check_valid_start_state,
        check_undefined_next_states,
        check_unreachable_states,
        check_tape_symbols,
    ]
    .iter()
    .find_map(|f| f(program).err());

    match first_error {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}

fn check_structure(program: &Program) -> Result<(), AnalysisError> {
    if program.table.is_empty() {
        return Err(AnalysisError::StructuralError(
            "No transitions defined".to_string(),
        ));
    }

    if program.policy == TapePolicy::Fixed && program.length.max(program.tape.len()) == 0 {
        return Err(AnalysisError::StructuralError(
            "A fixed tape needs at least one cell".to_string(),
        ));
    }

    Ok(())
}

/// A fixed tape cannot start with the head outside its window. A growable tape accepts a
/// head at most one window length beyond either edge, since the cells up to the head are
/// realized.
fn check_head(program: &Program) -> Result<(), AnalysisError> {
    let window = program.length.max(program.tape.len()) as isize;

    let allowed = match program.policy {
        TapePolicy::Fixed => 0..window,
        TapePolicy::Grow => {
            let reach = window.max(1);
            -reach..window + reach
        }
    };

    if !allowed.contains(&program.head) {
        return Err(AnalysisError::InvalidHead(program.head));
    }

    Ok(())
}

fn check_valid_start_state(program: &Program) -> Result<(), AnalysisError> {
    if !program.table.has_state(&program.initial_state) {
        return Err(AnalysisError::InvalidStartState(
            program.initial_state.clone(),
        ));
    }

    Ok(())
}

/// Checks that every `next_state` either has transitions of its own or is a halt state.
///
/// Without this, a run would stop with a missing transition fault on entering the state.
fn check_undefined_next_states(program: &Program) -> Result<(), AnalysisError> {
    let mut undefined: Vec<String> = program
        .table
        .entries()
        .iter()
        .filter(|entry| {
            let next = &entry.transition.next_state;
            !program.table.has_state(next) && !program.is_halt_state(next)
        })
        .map(|entry| {
            format!(
                "{}[{}] -> {}",
                entry.state, entry.read, entry.transition.next_state
            )
        })
        .collect();

    if !undefined.is_empty() {
        undefined.sort();
        return Err(AnalysisError::UndefinedNextStates(undefined));
    }

    Ok(())
}

/// Checks for unreachable states with a traversal from the initial state.
fn check_unreachable_states(program: &Program) -> Result<(), AnalysisError> {
    let mut visited = HashSet::new();
    let mut queue = vec![program.initial_state.as_str()];

    while let Some(state) = queue.pop() {
        if !visited.insert(state) {
            continue;
        }

        for entry in program.table.entries() {
            if entry.state == state && !visited.contains(entry.transition.next_state.as_str()) {
                queue.push(&entry.transition.next_state);
            }
        }
    }

    let mut unreachable: Vec<String> = program
        .table
        .states()
        .into_iter()
        .filter(|state| !visited.contains(state))
        .map(str::to_string)
        .collect();

    if !unreachable.is_empty() {
        unreachable.sort();
        return Err(AnalysisError::UnreachableStates(unreachable));
    }

    Ok(())
}

/// Checks that every symbol on the initial tape is read by at least one transition.
fn check_tape_symbols(program: &Program) -> Result<(), AnalysisError> {
    let handled: HashSet<char> = program
        .table
        .entries()
        .iter()
        .map(|entry| entry.read)
        .chain(std::iter::once(program.blank))
        .collect();

    let mut unhandled: Vec<char> = program
        .tape
        .iter()
        .filter(|c| !handled.contains(*c))
        .copied()
        .collect();

    if !unhandled.is_empty() {
        unhandled.sort();
        unhandled.dedup();
        return Err(AnalysisError::InvalidTapeSymbols(unhandled));
    }

    Ok(())
}
