//! The JSON interchange record for automata.
//!
//! ```json
//! {
//!   "type": "NFA",
//!   "states": ["p0", "p1"],
//!   "alphabet": ["a"],
//!   "transitions": [{"source": "p0", "symbol": "a", "destination": "p1"}],
//!   "initial": "p0",
//!   "accepting": ["p1"]
//! }
//! ```
//!
//! A nondeterministic record may list several transitions sharing the same
//! source and symbol. Spanish keys (`tipo`, `estados`, `alfabeto`,
//! `transiciones`, `origen`, `simbolo`, `destino`, `estado_inicial`,
//! `estados_finales`) are accepted on input.

use crate::automaton::{Automaton, Kind, Parts};
use crate::error::{AutomatonError, Result};
use serde::{Deserialize, Serialize};

/// One `(source, symbol, destination)` record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransitionRecord {
    #[serde(alias = "origen")]
    pub source: String,
    #[serde(alias = "simbolo")]
    pub symbol: String,
    #[serde(alias = "destino")]
    pub destination: String,
}

/// Summary written alongside an automaton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub num_states: usize,
    pub num_symbols: usize,
    pub num_transitions: usize,
    pub is_complete: bool,
}

/// An automaton as listed in an interchange document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomatonDescription {
    #[serde(rename = "type", alias = "tipo", default)]
    pub kind: Kind,
    #[serde(alias = "estados")]
    pub states: Vec<String>,
    #[serde(alias = "alfabeto")]
    pub alphabet: Vec<String>,
    #[serde(alias = "transiciones")]
    pub transitions: Vec<TransitionRecord>,
    #[serde(alias = "estado_inicial")]
    pub initial: String,
    #[serde(alias = "estados_finales")]
    pub accepting: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "metadatos")]
    pub metadata: Option<Metadata>,
}

impl AutomatonDescription {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Attach a summary computed from `automaton`.
    pub fn with_metadata(mut self, automaton: &Automaton) -> Self {
        self.metadata = Some(Metadata {
            num_states: automaton.num_states(),
            num_symbols: automaton.num_symbols(),
            num_transitions: automaton.num_transitions(),
            is_complete: automaton.is_complete(),
        });
        self
    }

    pub(crate) fn parts(&self) -> Parts<'_> {
        Parts {
            declared: Some(self.kind),
            states: self.states.iter().map(String::as_str).collect(),
            alphabet: self.alphabet.iter().map(String::as_str).collect(),
            transitions: self
                .transitions
                .iter()
                .map(|t| (t.source.as_str(), t.symbol.as_str(), t.destination.as_str()))
                .collect(),
            initial: &self.initial,
            accepting: self.accepting.iter().map(String::as_str).collect(),
        }
    }
}

impl Automaton {
    /// Build an automaton from an interchange record.
    ///
    /// A record tagged deterministic may be partial but must not map a pair
    /// to several states.
    pub fn from_description(description: &AutomatonDescription) -> Result<Self> {
        Self::assemble(description.parts()).map_err(|mut errors| errors.swap_remove(0).into())
    }

    /// The interchange record of this automaton, listed in id order.
    pub fn to_description(&self) -> AutomatonDescription {
        AutomatonDescription {
            kind: self.kind(),
            states: self.states().map(str::to_string).collect(),
            alphabet: self.alphabet().map(str::to_string).collect(),
            transitions: self
                .transitions()
                .map(|(source, symbol, destination)| TransitionRecord {
                    source: self.state_label(source).to_string(),
                    symbol: self.symbol_label(symbol).to_string(),
                    destination: self.state_label(destination).to_string(),
                })
                .collect(),
            initial: self.state_label(self.initial()).to_string(),
            accepting: self
                .accepting()
                .iter()
                .map(|state| self.state_label(state).to_string())
                .collect(),
            metadata: None,
        }
    }
}

impl TryFrom<&AutomatonDescription> for Automaton {
    type Error = AutomatonError;

    fn try_from(description: &AutomatonDescription) -> Result<Self> {
        Self::from_description(description)
    }
}
