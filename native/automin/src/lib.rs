//! Conversion of finite automata to minimal deterministic form.
//!
//! An [`Automaton`] is built once from validated input and never mutated.
//! [`convert`] turns a nondeterministic automaton into a total DFA by
//! subset construction, [`minimize`] reduces a DFA to its minimal
//! equivalent, and [`Automaton::accepts`] runs either kind on a word.
//! [`pipeline::process`] chains these steps and checks that the language
//! is preserved.

pub mod automaton;
pub mod error;
pub mod interchange;
pub mod pipeline;
pub mod validation;

pub use automaton::{
    chars, convert, minimize, subset_construction, Automaton, ConversionOptions, Kind,
    Minimization, StateId, StateSet, SymbolId,
};
pub use error::{AutomatonError, Result, StructuralError};
pub use interchange::{AutomatonDescription, TransitionRecord};
pub use pipeline::{process, PipelineOptions, ProcessReport, Statistics};
pub use validation::{validate, ValidationReport};
