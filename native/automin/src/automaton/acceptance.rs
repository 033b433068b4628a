//! Simulation of automata over finite words.

use crate::automaton::model::Automaton;
use crate::automaton::state::{StateId, StateSet};
use crate::automaton::symbol::SymbolId;
use crate::error::{AutomatonError, Result};

impl Automaton {
    /// Resolve symbol labels into ids, rejecting any label outside the alphabet.
    pub fn resolve_word<S: AsRef<str>>(&self, word: &[S]) -> Result<Vec<SymbolId>> {
        word.iter()
            .map(|symbol| {
                let symbol = symbol.as_ref();
                self.symbol_id(symbol).ok_or_else(|| AutomatonError::Symbol {
                    symbol: symbol.to_string(),
                })
            })
            .collect()
    }

    /// Whether the automaton accepts `word`.
    ///
    /// Every symbol is checked against the alphabet before the run starts,
    /// so an unknown symbol is reported even if the run would die earlier.
    pub fn accepts<S: AsRef<str>>(&self, word: &[S]) -> Result<bool> {
        let word = self.resolve_word(word)?;
        Ok(self.accepts_ids(&word))
    }

    /// Whether the automaton accepts a word given as symbol ids.
    ///
    /// # Panics
    /// If a symbol id is outside the alphabet.
    pub fn accepts_ids(&self, word: &[SymbolId]) -> bool {
        if self.is_deterministic() {
            self.walk(word)
                .is_some_and(|state| self.is_accepting(state))
        } else {
            self.frontier(word).intersects(self.accepting())
        }
    }

    /// Deterministic run: the state reached after `word`, or `None` if a
    /// transition is missing on the way.
    pub fn walk(&self, word: &[SymbolId]) -> Option<StateId> {
        assert!(word.iter().all(|&s| (s as usize) < self.num_symbols()));
        word.iter()
            .try_fold(self.initial(), |state, &symbol| self.successor(state, symbol))
    }

    /// Nondeterministic run: every state reachable by reading `word`.
    ///
    /// Once the frontier is empty it stays empty.
    pub fn frontier(&self, word: &[SymbolId]) -> StateSet {
        assert!(word.iter().all(|&s| (s as usize) < self.num_symbols()));
        let mut current = StateSet::singleton(self.initial(), self.num_states());

        for &symbol in word {
            let mut next = StateSet::empty(self.num_states());
            for state in current.iter() {
                if let Some(targets) = self.successors(state, symbol) {
                    next.union_with(targets);
                }
            }
            if next.is_empty() {
                return next;
            }
            current = next;
        }

        current
    }
}
