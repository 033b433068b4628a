//! The shared finite automaton representation.
//!
//! A single transition relation `(state, symbol) -> set of states` covers
//! both deterministic and nondeterministic automata. Labels are interned
//! into dense indices at construction; all algorithms work on the indices.

use crate::automaton::state::{StateId, StateSet};
use crate::automaton::symbol::SymbolId;
use crate::error::{Result, StructuralError};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;

/// The two variants an automaton can be declared as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Kind {
    #[default]
    #[serde(rename = "DFA", alias = "AFD")]
    Deterministic,
    #[serde(rename = "NFA", alias = "AFND")]
    Nondeterministic,
}

/// An immutable finite automaton over a finite alphabet.
///
/// Transformations never mutate an automaton; they return a new one.
#[derive(Debug, Clone)]
pub struct Automaton {
    /// State labels; a state's id is its index here
    states: IndexSet<String>,
    /// Symbol labels; a symbol's id is its index here
    alphabet: IndexSet<String>,
    initial: StateId,
    accepting: StateSet,
    /// Transitions: (source, symbol) -> set of destinations, never empty
    transitions: HashMap<(StateId, SymbolId), StateSet>,
    /// Every (state, symbol) pair has at most one destination
    deterministic: bool,
}

/// Borrowed, unvalidated pieces of an automaton.
pub(crate) struct Parts<'a> {
    /// When `Some(Kind::Deterministic)`, several destinations for one pair are rejected
    pub declared: Option<Kind>,
    pub states: Vec<&'a str>,
    pub alphabet: Vec<&'a str>,
    pub transitions: Vec<(&'a str, &'a str, &'a str)>,
    pub initial: &'a str,
    pub accepting: Vec<&'a str>,
}

impl Automaton {
    /// Build an automaton from labels, checking every structural invariant.
    ///
    /// Fails with the first violated invariant. Repeated transition records
    /// are merged; several destinations for the same pair make the result
    /// nondeterministic.
    pub fn new<'a>(
        states: impl IntoIterator<Item = &'a str>,
        alphabet: impl IntoIterator<Item = &'a str>,
        transitions: impl IntoIterator<Item = (&'a str, &'a str, &'a str)>,
        initial: &'a str,
        accepting: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self> {
        let parts = Parts {
            declared: None,
            states: states.into_iter().collect(),
            alphabet: alphabet.into_iter().collect(),
            transitions: transitions.into_iter().collect(),
            initial,
            accepting: accepting.into_iter().collect(),
        };
        Self::assemble(parts).map_err(|mut errors| errors.swap_remove(0).into())
    }

    /// Validate and intern `parts`, collecting every violation found.
    pub(crate) fn assemble(parts: Parts<'_>) -> std::result::Result<Self, Vec<StructuralError>> {
        let mut errors = Vec::new();

        if parts.states.is_empty() {
            errors.push(StructuralError::NoStates);
        }

        let mut states = IndexSet::with_capacity(parts.states.len());
        for label in &parts.states {
            if !states.insert(label.to_string()) {
                errors.push(StructuralError::DuplicateState(label.to_string()));
            }
        }

        let mut alphabet = IndexSet::with_capacity(parts.alphabet.len());
        for label in &parts.alphabet {
            if !alphabet.insert(label.to_string()) {
                errors.push(StructuralError::DuplicateSymbol(label.to_string()));
            }
        }

        if alphabet.is_empty() && states.len() > 1 {
            errors.push(StructuralError::EmptyAlphabet {
                states: states.len(),
            });
        }

        let universe = states.len();
        let state_id = |label: &str| states.get_index_of(label).map(|i| i as StateId);

        let initial = state_id(parts.initial);
        if initial.is_none() && !states.is_empty() {
            errors.push(StructuralError::UnknownInitial(parts.initial.to_string()));
        }

        let mut accepting = StateSet::empty(universe);
        for label in &parts.accepting {
            match state_id(label) {
                Some(id) => {
                    accepting.insert(id);
                }
                None => errors.push(StructuralError::UnknownAccepting(label.to_string())),
            }
        }

        let mut transitions: HashMap<(StateId, SymbolId), StateSet> = HashMap::new();
        for &(source, symbol, destination) in &parts.transitions {
            let src = state_id(source);
            let sym = alphabet.get_index_of(symbol).map(|i| i as SymbolId);
            let dst = state_id(destination);

            if src.is_none() {
                errors.push(StructuralError::UnknownSource(source.to_string()));
            }
            if sym.is_none() {
                errors.push(StructuralError::UnknownSymbol(symbol.to_string()));
            }
            if dst.is_none() {
                errors.push(StructuralError::UnknownDestination(destination.to_string()));
            }

            if let (Some(src), Some(sym), Some(dst)) = (src, sym, dst) {
                let targets = transitions
                    .entry((src, sym))
                    .or_insert_with(|| StateSet::empty(universe));
                // Report a conflicting pair once, on its second destination.
                if targets.insert(dst)
                    && targets.len() == 2
                    && parts.declared == Some(Kind::Deterministic)
                {
                    errors.push(StructuralError::MultipleDestinations {
                        state: source.to_string(),
                        symbol: symbol.to_string(),
                    });
                }
            }
        }

        match initial {
            Some(initial) if errors.is_empty() => Ok(Self::from_parts(
                states,
                alphabet,
                initial,
                accepting,
                transitions,
            )),
            _ => Err(errors),
        }
    }

    /// Assemble an automaton from already consistent, interned parts.
    pub(crate) fn from_parts(
        states: IndexSet<String>,
        alphabet: IndexSet<String>,
        initial: StateId,
        accepting: StateSet,
        transitions: HashMap<(StateId, SymbolId), StateSet>,
    ) -> Self {
        debug_assert!((initial as usize) < states.len());
        debug_assert_eq!(accepting.universe(), states.len());
        debug_assert!(transitions.values().all(|t| !t.is_empty()));

        let deterministic = transitions.values().all(|targets| targets.len() <= 1);
        Self {
            states,
            alphabet,
            initial,
            accepting,
            transitions,
            deterministic,
        }
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn num_symbols(&self) -> usize {
        self.alphabet.len()
    }

    /// Number of (source, symbol, destination) triples.
    pub fn num_transitions(&self) -> usize {
        self.transitions.values().map(StateSet::len).sum()
    }

    /// State labels in id order.
    pub fn states(&self) -> impl Iterator<Item = &str> + '_ {
        self.states.iter().map(String::as_str)
    }

    /// Symbol labels in id order.
    pub fn alphabet(&self) -> impl Iterator<Item = &str> + '_ {
        self.alphabet.iter().map(String::as_str)
    }

    pub(crate) fn symbol_labels(&self) -> &IndexSet<String> {
        &self.alphabet
    }

    /// Label of a state.
    ///
    /// # Panics
    /// If `state` is not a state of this automaton.
    pub fn state_label(&self, state: StateId) -> &str {
        &self.states[state as usize]
    }

    /// Label of a symbol.
    ///
    /// # Panics
    /// If `symbol` is not in the alphabet.
    pub fn symbol_label(&self, symbol: SymbolId) -> &str {
        &self.alphabet[symbol as usize]
    }

    pub fn state_id(&self, label: &str) -> Option<StateId> {
        self.states.get_index_of(label).map(|i| i as StateId)
    }

    pub fn symbol_id(&self, label: &str) -> Option<SymbolId> {
        self.alphabet.get_index_of(label).map(|i| i as SymbolId)
    }

    pub fn symbol_ids(&self) -> impl Iterator<Item = SymbolId> + Clone + use<> {
        (0..self.alphabet.len()).map(|i| i as SymbolId)
    }

    pub fn initial(&self) -> StateId {
        self.initial
    }

    pub fn accepting(&self) -> &StateSet {
        &self.accepting
    }

    pub fn is_accepting(&self, state: StateId) -> bool {
        self.accepting.contains(state)
    }

    /// Destinations of `source` on `symbol`, `None` if there are none.
    pub fn successors(&self, source: StateId, symbol: SymbolId) -> Option<&StateSet> {
        self.transitions.get(&(source, symbol))
    }

    /// The single destination of `source` on `symbol`.
    ///
    /// Only meaningful on deterministic automata; on a nondeterministic
    /// pair this returns the smallest destination.
    pub fn successor(&self, source: StateId, symbol: SymbolId) -> Option<StateId> {
        self.successors(source, symbol)
            .and_then(|targets| targets.iter().next())
    }

    /// All transitions, ordered by source, then symbol, then destination.
    pub fn transitions(&self) -> impl Iterator<Item = (StateId, SymbolId, StateId)> + '_ {
        (0..self.num_states() as StateId).flat_map(move |source| {
            self.symbol_ids().flat_map(move |symbol| {
                self.successors(source, symbol)
                    .into_iter()
                    .flat_map(|targets| targets.iter())
                    .map(move |destination| (source, symbol, destination))
            })
        })
    }

    /// True iff every (state, symbol) pair maps to at most one destination.
    pub fn is_deterministic(&self) -> bool {
        self.deterministic
    }

    /// True iff every (state, symbol) pair has at least one destination.
    pub fn is_complete(&self) -> bool {
        self.transitions.len() == self.num_states() * self.num_symbols()
    }

    /// The variant this automaton belongs to, judged by its transitions.
    pub fn kind(&self) -> Kind {
        if self.deterministic {
            Kind::Deterministic
        } else {
            Kind::Nondeterministic
        }
    }

    /// All states reachable from the initial state, found breadth-first.
    pub fn reachable_states(&self) -> StateSet {
        let mut reachable = StateSet::empty(self.num_states());
        let mut queue = VecDeque::new();
        reachable.insert(self.initial);
        queue.push_back(self.initial);

        while let Some(state) = queue.pop_front() {
            for symbol in self.symbol_ids() {
                let Some(targets) = self.successors(state, symbol) else {
                    continue;
                };
                for next in targets.iter() {
                    if reachable.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }

        reachable
    }

    /// States no word leads to from the initial state.
    pub fn unreachable_states(&self) -> StateSet {
        StateSet::full(self.num_states()).difference(&self.reachable_states())
    }

    /// (state, symbol) pairs without any destination.
    pub fn missing_transitions(&self) -> impl Iterator<Item = (StateId, SymbolId)> + '_ {
        (0..self.num_states() as StateId).flat_map(move |state| {
            self.symbol_ids()
                .filter(move |&symbol| self.successors(state, symbol).is_none())
                .map(move |symbol| (state, symbol))
        })
    }
}

impl fmt::Display for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.kind() {
            Kind::Deterministic => "DFA",
            Kind::Nondeterministic => "NFA",
        };
        write!(
            f,
            "{tag}(states={}, alphabet={{{}}})",
            self.num_states(),
            self.alphabet.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
        )
    }
}

/// Return `wanted`, or `wanted` primed until it does not clash with `taken`.
pub(crate) fn fresh_label(taken: &IndexSet<String>, wanted: String) -> String {
    let mut label = wanted;
    while taken.contains(&label) {
        label.push('\'');
    }
    label
}
