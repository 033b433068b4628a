//! Finite automata and the algorithms that transform them.
//!
//! This module provides:
//! - a single model for deterministic and nondeterministic automata
//! - acceptance of finite words
//! - subset construction (NFA to DFA conversion)
//! - DFA minimization by partition refinement

mod acceptance;
mod minimize;
mod model;
mod state;
mod subset_construction;
mod symbol;

pub use minimize::{minimize, Minimization};
pub(crate) use model::Parts;
pub use model::{Automaton, Kind};
pub use state::{StateId, StateSet};
pub use subset_construction::{convert, subset_construction, ConversionOptions, DEAD_STATE_LABEL};
pub use symbol::{chars, SymbolId};
