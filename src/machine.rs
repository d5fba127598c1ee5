//! This module defines the execution engine: the `Configuration` of a running machine,
//! the pure `step` transition, and the `TuringMachine`/`Run` drivers that produce a
//! lazy sequence of `StepRecord`s.

use crate::table::TransitionTable;
use crate::tape::Tape;
use crate::types::{MachineError, Symbol, Transition};
use serde::Serialize;
use std::iter::FusedIterator;

/// The complete instantaneous state of a machine: tape contents, head position and state.
///
/// For growable tapes the head always lies inside the realized tape window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration<S> {
    tape: Tape<S>,
    head: isize,
    state: String,
    steps: usize,
}

impl<S: Symbol> Configuration<S> {
    pub fn new(tape: Tape<S>, head: isize, state: impl Into<String>) -> Self {
        let mut tape = tape;
        tape.extend_to(head);

        Self {
            tape,
            head,
            state: state.into(),
            steps: 0,
        }
    }

    pub fn tape(&self) -> &Tape<S> {
        &self.tape
    }

    pub fn head(&self) -> isize {
        self.head
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    /// Number of steps taken to reach this configuration.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// The symbol under the head.
    pub fn symbol(&self) -> Result<&S, MachineError> {
        self.tape.read(self.head)
    }

    /// Executes one step in place and returns the record of the configuration it left.
    ///
    /// On error the configuration is left untouched.
    pub fn advance(&mut self, table: &TransitionTable<S>) -> Result<StepRecord<S>, MachineError> {
        let read = self.symbol()?.clone();

        let transition = match table.lookup(&read, &self.state) {
            Ok(transition) => transition.clone(),
            Err(e) => {
                tracing::warn!(step = self.steps, head = self.head, "{}", e);
                return Err(e);
            }
        };

        let record = StepRecord {
            index: self.steps,
            state: self.state.clone(),
            tape: self.tape.snapshot(),
            head: (self.head - self.tape.start()) as usize,
            position: self.head,
            read,
            transition: transition.clone(),
        };

        self.tape.write(self.head, transition.write)?;
        self.head += transition.direction.offset();
        self.tape.extend_to(self.head);
        self.state = transition.next_state;
        self.steps += 1;

        tracing::debug!(
            step = record.index,
            from = %record.state,
            to = %self.state,
            head = self.head,
            "step"
        );

        Ok(record)
    }
}

/// What a single step saw and did, captured before the step was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord<S> {
    /// Zero-based index of the step within its run.
    pub index: usize,
    /// The state the machine was in.
    pub state: String,
    /// The tape window before the write.
    pub tape: Vec<S>,
    /// Offset of the head into `tape`.
    pub head: usize,
    /// Absolute tape index of the head.
    pub position: isize,
    /// The symbol under the head.
    pub read: S,
    /// The transition that was applied.
    pub transition: Transition<S>,
}

/// Performs one step without touching `config`.
///
/// Returns the successor configuration and the record of the step. Identical inputs
/// always produce identical outputs.
pub fn step<S: Symbol>(
    config: &Configuration<S>,
    table: &TransitionTable<S>,
) -> Result<(Configuration<S>, StepRecord<S>), MachineError> {
    let mut next = config.clone();
    let record = next.advance(table)?;
    Ok((next, record))
}

/// Runs `steps` steps from `config`, lazily.
pub fn run<S: Symbol>(
    config: Configuration<S>,
    table: &TransitionTable<S>,
    steps: usize,
) -> Run<'_, S> {
    TuringMachine::new(table, config).run(steps)
}

/// A machine driving a configuration through a borrowed transition table.
#[derive(Debug, Clone)]
pub struct TuringMachine<'t, S: Symbol> {
    table: &'t TransitionTable<S>,
    initial: Configuration<S>,
    config: Configuration<S>,
}

impl<'t, S: Symbol> TuringMachine<'t, S> {
    pub fn new(table: &'t TransitionTable<S>, config: Configuration<S>) -> Self {
        Self {
            table,
            initial: config.clone(),
            config,
        }
    }

    /// Executes a single step of the computation.
    ///
    /// # Returns
    ///
    /// * `Ok(StepRecord)` describing the configuration the step started from.
    /// * `Err(MachineError::MissingTransition)` if the table has no entry for the symbol
    ///   under the head in the current state.
    /// * `Err(MachineError::TapeBounds)` if a fixed tape is addressed outside its window.
    pub fn step(&mut self) -> Result<StepRecord<S>, MachineError> {
        self.config.advance(self.table)
    }

    /// Consumes the machine into a lazy run of at most `steps` steps.
    pub fn run(self, steps: usize) -> Run<'t, S> {
        Run {
            machine: self,
            remaining: steps,
            halt: None,
            halted: false,
            failed: false,
        }
    }

    /// Like [`run`](Self::run) but stops before stepping any configuration for which
    /// `halt` returns true.
    pub fn run_until<F>(self, steps: usize, halt: F) -> Run<'t, S>
    where
        F: Fn(&Configuration<S>) -> bool + 't,
    {
        Run {
            halt: Some(Box::new(halt)),
            ..self.run(steps)
        }
    }

    /// Restores the configuration the machine was created with.
    pub fn reset(&mut self) {
        self.config = self.initial.clone();
    }

    pub fn configuration(&self) -> &Configuration<S> {
        &self.config
    }

    pub fn into_configuration(self) -> Configuration<S> {
        self.config
    }

    pub fn table(&self) -> &'t TransitionTable<S> {
        self.table
    }

    pub fn state(&self) -> &str {
        self.config.state()
    }

    pub fn head(&self) -> isize {
        self.config.head()
    }

    pub fn tape(&self) -> &Tape<S> {
        self.config.tape()
    }

    /// Returns the total number of steps executed since creation or the last reset.
    pub fn step_count(&self) -> usize {
        self.config.steps() - self.initial.steps()
    }
}

type HaltPredicate<'t, S> = Box<dyn Fn(&Configuration<S>) -> bool + 't>;

/// A lazy, finite sequence of step records.
///
/// The sequence ends when the step budget is spent, when the halting predicate holds,
/// or right after the first error, which is yielded once.
pub struct Run<'t, S: Symbol> {
    machine: TuringMachine<'t, S>,
    remaining: usize,
    halt: Option<HaltPredicate<'t, S>>,
    halted: bool,
    failed: bool,
}

impl<'t, S: Symbol> Run<'t, S> {
    /// Returns true if the halting predicate stopped the run.
    pub fn halted(&self) -> bool {
        self.halted
    }

    /// Returns true if the run ended on an error.
    pub fn failed(&self) -> bool {
        self.failed
    }

    pub fn configuration(&self) -> &Configuration<S> {
        self.machine.configuration()
    }

    pub fn into_machine(self) -> TuringMachine<'t, S> {
        self.machine
    }
}

impl<S: Symbol> Iterator for Run<'_, S> {
    type Item = Result<StepRecord<S>, MachineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.halted || self.remaining == 0 {
            return None;
        }

        if let Some(halt) = &self.halt {
            if halt(self.machine.configuration()) {
                tracing::debug!(state = self.machine.state(), "halted");
                self.halted = true;
                return None;
            }
        }

        self.remaining -= 1;
        let result = self.machine.step();
        self.failed = result.is_err();
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed || self.halted {
            (0, Some(0))
        } else {
            (0, Some(self.remaining))
        }
    }
}

impl<S: Symbol> FusedIterator for Run<'_, S> {}
