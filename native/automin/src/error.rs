//! Error types shared by every operation of the crate.

use thiserror::Error;

/// A violated invariant in an automaton description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("automaton has no states")]
    NoStates,

    #[error("state '{0}' is listed more than once")]
    DuplicateState(String),

    #[error("symbol '{0}' is listed more than once")]
    DuplicateSymbol(String),

    #[error("alphabet is empty but the automaton has {states} states")]
    EmptyAlphabet { states: usize },

    #[error("initial state '{0}' is not in the set of states")]
    UnknownInitial(String),

    #[error("accepting state '{0}' is not in the set of states")]
    UnknownAccepting(String),

    #[error("transition source '{0}' is not in the set of states")]
    UnknownSource(String),

    #[error("transition destination '{0}' is not in the set of states")]
    UnknownDestination(String),

    #[error("transition symbol '{0}' is not in the alphabet")]
    UnknownSymbol(String),

    #[error("deterministic automaton maps ('{state}', '{symbol}') to more than one state")]
    MultipleDestinations { state: String, symbol: String },
}

/// Errors reported by construction, conversion, minimization and acceptance.
#[derive(Debug, Error)]
pub enum AutomatonError {
    #[error("malformed automaton: {0}")]
    Structural(#[from] StructuralError),

    #[error("{operation} requires {reason}")]
    Precondition {
        operation: &'static str,
        reason: &'static str,
    },

    #[error("symbol '{symbol}' is not in the alphabet")]
    Symbol { symbol: String },

    #[error("subset construction exceeded the limit of {limit} states")]
    ResourceLimit { limit: usize },

    #[error("automata disagree on word {word:?}")]
    LanguageMismatch { word: Vec<String> },

    #[error("invalid interchange document: {0}")]
    Interchange(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AutomatonError>;
