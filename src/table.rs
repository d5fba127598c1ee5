//! This module defines `TransitionTable`, the immutable partial function from
//! `(symbol, state)` to `Transition` that drives a machine.

use crate::types::{Direction, MachineError, Symbol, Transition};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

/// One `(read, state) -> transition` entry of a table.
///
/// This is also the serialized form of a table: a list of flat records
/// `{ read, state, write, direction, next_state }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntry<S> {
    /// The symbol under the head.
    pub read: S,
    /// The current state.
    pub state: String,
    #[serde(flatten)]
    pub transition: Transition<S>,
}

impl<S> TableEntry<S> {
    /// Builds an entry from the tuple layout of a mapping literal:
    /// `(read, state) -> (write, direction, next_state)`.
    pub fn new(
        read: S,
        state: impl Into<String>,
        write: S,
        direction: Direction,
        next_state: impl Into<String>,
    ) -> Self {
        Self {
            read,
            state: state.into(),
            transition: Transition::new(write, direction, next_state),
        }
    }
}

/// A transition table with at most one transition per `(symbol, state)` pair.
///
/// Entries are kept in declaration order; lookups go through a per-state index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable<S: Symbol> {
    entries: Vec<TableEntry<S>>,
    index: HashMap<String, HashMap<S, usize>>,
}

impl<S: Symbol> TransitionTable<S> {
    /// Builds a table from its entries.
    ///
    /// # Returns
    ///
    /// * `Ok(TransitionTable)` if every `(symbol, state)` key is unique.
    /// * `Err(MachineError::ValidationError)` naming the first duplicated key otherwise.
    pub fn new<I>(entries: I) -> Result<Self, MachineError>
    where
        I: IntoIterator<Item = TableEntry<S>>,
    {
        let mut table = Self {
            entries: Vec::new(),
            index: HashMap::new(),
        };

        for entry in entries {
            let slot = table.entries.len();
            let by_symbol = table.index.entry(entry.state.clone()).or_default();
            if by_symbol.contains_key(&entry.read) {
                return Err(MachineError::ValidationError(format!(
                    "Duplicate transition for symbol '{}' in state {}",
                    entry.read, entry.state
                )));
            }
            by_symbol.insert(entry.read.clone(), slot);
            table.entries.push(entry);
        }

        Ok(table)
    }

    /// Returns the transition for `symbol` in `state`.
    ///
    /// Fails with `MachineError::MissingTransition` when the pair is not mapped.
    pub fn lookup(&self, symbol: &S, state: &str) -> Result<&Transition<S>, MachineError> {
        self.get(symbol, state)
            .ok_or_else(|| MachineError::missing(symbol, state))
    }

    /// Like [`lookup`](Self::lookup) but returns `None` for an unmapped pair.
    pub fn get(&self, symbol: &S, state: &str) -> Option<&Transition<S>> {
        self.index
            .get(state)
            .and_then(|by_symbol| by_symbol.get(symbol))
            .map(|&slot| &self.entries[slot].transition)
    }

    pub fn contains(&self, symbol: &S, state: &str) -> bool {
        self.get(symbol, state).is_some()
    }

    /// Returns true if `state` has at least one outgoing transition.
    pub fn has_state(&self, state: &str) -> bool {
        self.index.contains_key(state)
    }

    /// States with outgoing transitions, in order of first appearance.
    pub fn states(&self) -> Vec<&str> {
        let mut states: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !states.contains(&entry.state.as_str()) {
                states.push(&entry.state);
            }
        }
        states
    }

    /// All entries in declaration order.
    pub fn entries(&self) -> &[TableEntry<S>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Symbol + Serialize> Serialize for TransitionTable<S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        serializer.collect_seq(&self.entries)
    }
}

impl<'de, S: Symbol + Deserialize<'de>> Deserialize<'de> for TransitionTable<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<TableEntry<S>>::deserialize(deserializer)?;
        TransitionTable::new(entries).map_err(de::Error::custom)
    }
}
