//! This module defines the `Tape`, a window of cells over signed indices with a blank
//! fill value, and the policy governing what happens outside that window.

use crate::types::{MachineError, Symbol};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Controls how a tape behaves when it is addressed outside its current window.
///
/// - `Grow` (default): the tape is logically unbounded. Reads outside the window return
///   the blank symbol and writes extend the window with blank cells.
/// - `Fixed`: the window is the whole tape. Any read or write outside `[0, length)` is a
///   `MachineError::TapeBounds` fault.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TapePolicy {
    #[default]
    Grow,
    Fixed,
}

/// A tape of symbols addressed by signed index.
///
/// The realized cells cover `[start, end)`; every index outside that range holds the
/// blank symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape<S> {
    cells: VecDeque<S>,
    start: isize,
    blank: S,
    policy: TapePolicy,
}

impl<S: Symbol> Tape<S> {
    /// Creates a growable tape whose window `[0, length)` is filled with `blank`.
    pub fn new(length: usize, blank: S) -> Self {
        Self::with_policy(length, blank, TapePolicy::Grow)
    }

    /// Creates a tape of `length` blank cells with the given out-of-window policy.
    pub fn with_policy(length: usize, blank: S, policy: TapePolicy) -> Self {
        Self {
            cells: std::iter::repeat(blank.clone()).take(length).collect(),
            start: 0,
            blank,
            policy,
        }
    }

    /// Creates a tape holding `symbols` from index 0, padded with blanks up to `length`.
    ///
    /// The window is never shorter than the seeded content.
    pub fn seeded<I>(symbols: I, length: usize, blank: S, policy: TapePolicy) -> Self
    where
        I: IntoIterator<Item = S>,
    {
        let mut cells: VecDeque<S> = symbols.into_iter().collect();
        if cells.len() < length {
            cells.resize(length, blank.clone());
        }

        Self {
            cells,
            start: 0,
            blank,
            policy,
        }
    }

    /// Returns the symbol at `index`.
    ///
    /// Unwritten cells read as blank. A fixed tape fails outside its window.
    pub fn read(&self, index: isize) -> Result<&S, MachineError> {
        match self.slot(index) {
            Some(slot) => Ok(&self.cells[slot]),
            None => match self.policy {
                TapePolicy::Grow => Ok(&self.blank),
                TapePolicy::Fixed => Err(MachineError::TapeBounds(index)),
            },
        }
    }

    /// Overwrites the cell at `index`, extending a growable tape when needed.
    pub fn write(&mut self, index: isize, symbol: S) -> Result<(), MachineError> {
        if self.slot(index).is_none() {
            match self.policy {
                TapePolicy::Grow => self.extend_to(index),
                TapePolicy::Fixed => return Err(MachineError::TapeBounds(index)),
            }
        }

        let slot = index - self.start;
        self.cells[slot as usize] = symbol;
        Ok(())
    }

    /// Makes sure `index` lies inside the window of a growable tape.
    ///
    /// Fixed tapes are left untouched.
    pub fn extend_to(&mut self, index: isize) {
        if self.policy == TapePolicy::Fixed {
            return;
        }

        if self.cells.is_empty() {
            self.start = index;
            self.cells.push_back(self.blank.clone());
            return;
        }

        while index < self.start {
            self.cells.push_front(self.blank.clone());
            self.start -= 1;
        }
        while index >= self.end() {
            self.cells.push_back(self.blank.clone());
        }
    }

    /// The cells of the current window, leftmost first.
    pub fn snapshot(&self) -> Vec<S> {
        self.cells.iter().cloned().collect()
    }

    /// Returns true if `index` lies inside the window.
    pub fn contains(&self, index: isize) -> bool {
        self.slot(index).is_some()
    }

    /// Index of the leftmost realized cell.
    pub fn start(&self) -> isize {
        self.start
    }

    /// One past the index of the rightmost realized cell.
    pub fn end(&self) -> isize {
        self.start + self.cells.len() as isize
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn blank(&self) -> &S {
        &self.blank
    }

    pub fn policy(&self) -> TapePolicy {
        self.policy
    }

    fn slot(&self, index: isize) -> Option<usize> {
        (index >= self.start && index < self.end()).then(|| (index - self.start) as usize)
    }
}

impl<S: Symbol> fmt::Display for Tape<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.cells {
            write!(f, "{symbol}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tape_reads_blank_everywhere() {
        let tape = Tape::new(16, '#');

        assert_eq!(tape.len(), 16);
        for i in -20..40 {
            assert_eq!(tape.read(i), Ok(&'#'), "index {}", i);
        }
        assert_eq!(tape.to_string(), "################");
    }

    #[test]
    fn test_write_then_read() {
        let mut tape = Tape::new(4, 'B');
        tape.write(1, 'X').unwrap();

        assert_eq!(tape.read(1), Ok(&'X'));
        assert_eq!(tape.read(0), Ok(&'B'));
        assert_eq!(tape.snapshot(), vec!['B', 'X', 'B', 'B']);
    }

    #[test]
    fn test_grow_extends_both_sides() {
        let mut tape = Tape::new(2, 'B');

        tape.write(-2, 'X').unwrap();
        assert_eq!(tape.start(), -2);
        assert_eq!(tape.to_string(), "XBBB");

        tape.write(5, 'Y').unwrap();
        assert_eq!(tape.end(), 6);
        assert_eq!(tape.to_string(), "XBBBBBBY");
        assert_eq!(tape.read(-2), Ok(&'X'));
        assert_eq!(tape.read(5), Ok(&'Y'));
    }

    #[test]
    fn test_reads_do_not_grow() {
        let tape = Tape::new(2, 'B');
        assert_eq!(tape.read(10), Ok(&'B'));
        assert_eq!(tape.len(), 2);
    }

    #[test]
    fn test_empty_tape_extends_around_first_index() {
        let mut tape = Tape::new(0, '_');
        assert!(tape.is_empty());

        tape.extend_to(3);
        assert_eq!(tape.start(), 3);
        assert_eq!(tape.len(), 1);
    }

    #[test]
    fn test_fixed_tape_faults_outside_window() {
        let mut tape = Tape::with_policy(2, 'B', TapePolicy::Fixed);

        assert_eq!(tape.read(2), Err(MachineError::TapeBounds(2)));
        assert_eq!(tape.read(-1), Err(MachineError::TapeBounds(-1)));
        assert_eq!(tape.write(2, 'X'), Err(MachineError::TapeBounds(2)));

        tape.extend_to(5);
        assert_eq!(tape.len(), 2);
        assert!(tape.write(1, 'X').is_ok());
        assert_eq!(tape.to_string(), "BX");
    }

    #[test]
    fn test_seeded_tape_is_padded() {
        let tape = Tape::seeded("(1+1)".chars(), 8, '#', TapePolicy::Grow);
        assert_eq!(tape.to_string(), "(1+1)###");

        let tape = Tape::seeded("abc".chars(), 1, '#', TapePolicy::Fixed);
        assert_eq!(tape.len(), 3);
    }

    #[test]
    fn test_policy_serialization() {
        assert_eq!(
            serde_json::to_string(&TapePolicy::Fixed).unwrap(),
            "\"fixed\""
        );
        let policy: TapePolicy = serde_json::from_str("\"grow\"").unwrap();
        assert_eq!(policy, TapePolicy::Grow);
    }
}
