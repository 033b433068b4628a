//! State identifiers and bit sets of states.

use fixedbitset::FixedBitSet;
use std::fmt;

/// A state identifier: the index of the state's label in its automaton.
pub type StateId = u32;

/// A set of states over a fixed universe `0..universe`.
///
/// Every set belonging to one automaton is created with that automaton's
/// state count as universe, so two sets of the same automaton compare and
/// hash by content.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StateSet {
    bits: FixedBitSet,
}

impl StateSet {
    /// An empty set over `universe` states.
    pub fn empty(universe: usize) -> Self {
        Self {
            bits: FixedBitSet::with_capacity(universe),
        }
    }

    /// A set holding every state of the universe.
    pub fn full(universe: usize) -> Self {
        let mut bits = FixedBitSet::with_capacity(universe);
        bits.insert_range(..);
        Self { bits }
    }

    /// A set holding only `state`.
    pub fn singleton(state: StateId, universe: usize) -> Self {
        let mut set = Self::empty(universe);
        set.insert(state);
        set
    }

    /// The number of states this set can hold.
    pub fn universe(&self) -> usize {
        self.bits.len()
    }

    /// Insert a state. Returns `true` if it was not present yet.
    ///
    /// # Panics
    /// If `state` lies outside the universe.
    pub fn insert(&mut self, state: StateId) -> bool {
        !self.bits.put(state as usize)
    }

    pub fn contains(&self, state: StateId) -> bool {
        self.bits.contains(state as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_clear()
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones(..)
    }

    /// Iterate over the members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = StateId> + '_ {
        self.bits.ones().map(|i| i as StateId)
    }

    /// Add every member of `other` to this set.
    pub fn union_with(&mut self, other: &StateSet) {
        self.bits.union_with(&other.bits);
    }

    pub fn intersects(&self, other: &StateSet) -> bool {
        !self.bits.is_disjoint(&other.bits)
    }

    /// Members of `self` that are not in `other`.
    pub fn difference(&self, other: &StateSet) -> StateSet {
        let mut result = self.clone();
        result.bits.difference_with(&other.bits);
        result
    }

    /// Canonical key of the set: its members in ascending order.
    pub fn to_vec(&self) -> Vec<StateId> {
        self.iter().collect()
    }
}

impl fmt::Debug for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
