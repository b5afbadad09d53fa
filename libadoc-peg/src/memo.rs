//! Packrat memoization.
//!
//! Rule results are cached per (offset, rule expression, inversion) so that
//! calling a rule again at the same place replays the recorded outcome
//! instead of walking its expression again. An entry also remembers the
//! semantic state it was computed under and is only reused while that state
//! is unchanged.

use crate::action::State;
use crate::position::Savepoint;
use crate::value::Value;
use hashbrown::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoKey {
    pub offset: usize,
    /// Identity of the expression node
    pub node: usize,
    /// Whether the evaluation happened inside a negative lookahead
    pub inverted: bool,
}

/// A memoized evaluation result
#[derive(Debug, Clone)]
pub struct MemoEntry<N> {
    /// The produced value, `None` for a mismatch
    pub value: Option<Value<N>>,

    /// Cursor after the evaluation
    pub end: Savepoint,

    /// Semantic state the evaluation started from
    pub state_before: State,

    /// Semantic state the evaluation left behind
    pub state_after: State,
}

impl<N> MemoEntry<N> {
    /// Whether this entry may be replayed from `state`.
    pub fn is_valid_for(&self, state: &State) -> bool {
        self.state_before == *state
    }

    pub fn matched(&self) -> bool {
        self.value.is_some()
    }
}

/// Memoization table for one parse
#[derive(Debug)]
pub struct MemoTable<N> {
    entries: HashMap<MemoKey, MemoEntry<N>>,
}

impl<N> Default for MemoTable<N> {
    fn default() -> Self {
        MemoTable {
            entries: HashMap::new(),
        }
    }
}

impl<N> MemoTable<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &MemoKey) -> Option<&MemoEntry<N>> {
        self.entries.get(key)
    }

    /// Insert or replace an entry
    pub fn insert(&mut self, key: MemoKey, entry: MemoEntry<N>) -> Option<MemoEntry<N>> {
        self.entries.insert(key, entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
