//! This crate provides a reusable, table-driven Turing machine engine.
//! It includes modules for transition tables, tapes, step-by-step execution with textual
//! traces, parsing and analyzing machine descriptions, and a small set of built-in programs.

pub mod analyzer;
pub mod machine;
pub mod parser;
pub mod program;
pub mod programs;
pub mod render;
pub mod table;
pub mod tape;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `analyze` function and `AnalysisError` enum from the analyzer module.
pub use analyzer::{analyze, AnalysisError};
/// Re-exports the execution engine.
pub use machine::{run, step, Configuration, Run, StepRecord, TuringMachine};
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports the `Program` description.
pub use program::Program;
/// Re-exports `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{ProgramInfo, ProgramManager, PROGRAMS};
/// Re-exports the trace renderer.
pub use render::{render, TraceRenderer};
/// Re-exports the transition table.
pub use table::{TableEntry, TransitionTable};
/// Re-exports the tape and its out-of-window policy.
pub use tape::{Tape, TapePolicy};
/// Re-exports the shared types from the types module.
pub use types::{Direction, MachineError, Symbol, Transition, MAX_PROGRAM_SIZE};
