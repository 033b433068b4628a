//! Load, convert, minimize and verify in one call.

use crate::automaton::{convert, Automaton, ConversionOptions, Minimization, SymbolId};
use crate::error::{AutomatonError, Result};
use crate::interchange::AutomatonDescription;
use itertools::Itertools;
use serde::Serialize;
use std::borrow::Cow;
use tracing::{debug, info, warn};

/// Knobs of [`process`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Run subset construction even when the input is already deterministic
    pub force_conversion: bool,
    /// Longest word compared between the input and the result
    pub verify_max_len: usize,
    /// Maximum number of words compared; longer lengths are skipped once exceeded
    pub verify_word_budget: usize,
    pub conversion: ConversionOptions,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            force_conversion: false,
            verify_max_len: 6,
            verify_word_budget: 1 << 16,
            conversion: ConversionOptions::default(),
        }
    }
}

/// A stage of the pipeline that completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Construct,
    Convert,
    Minimize,
    Verify,
}

/// Size of the input compared to the result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub states_before: usize,
    pub states_after: usize,
    pub transitions_before: usize,
    pub transitions_after: usize,
    /// Whether subset construction ran
    pub was_converted: bool,
    /// Unreachable states of the minimizer's input that were discarded
    pub unreachable_removed: usize,
    pub state_reduction_percent: f64,
}

impl Statistics {
    fn new(
        before: &Automaton,
        after: &Automaton,
        was_converted: bool,
        unreachable_removed: usize,
    ) -> Self {
        let states_before = before.num_states();
        let states_after = after.num_states();
        let state_reduction_percent = if states_before > 0 {
            (states_before as f64 - states_after as f64) / states_before as f64 * 100.0
        } else {
            0.0
        };
        Self {
            states_before,
            states_after,
            transitions_before: before.num_transitions(),
            transitions_after: after.num_transitions(),
            was_converted,
            unreachable_removed,
            state_reduction_percent,
        }
    }
}

/// Outcome of [`process`].
#[derive(Debug, Clone, Default)]
pub struct ProcessReport {
    pub success: bool,
    pub automaton: Option<Automaton>,
    pub statistics: Option<Statistics>,
    pub operations: Vec<Operation>,
    pub errors: Vec<String>,
}

/// Build the automaton, determinize it if needed, minimize it and check the
/// result against the input on every short word.
///
/// Failures never escape: they are listed in the report, which is then
/// unsuccessful and carries no automaton.
pub fn process(raw: &AutomatonDescription, options: &PipelineOptions) -> ProcessReport {
    let mut report = ProcessReport::default();
    match run(raw, options, &mut report) {
        Ok(automaton) => {
            info!(
                operations = ?report.operations,
                states = automaton.num_states(),
                "pipeline finished"
            );
            report.success = true;
            report.automaton = Some(automaton);
        }
        Err(e) => {
            warn!(error = %e, "pipeline failed");
            report.errors.push(e.to_string());
        }
    }
    report
}

fn run(
    raw: &AutomatonDescription,
    options: &PipelineOptions,
    report: &mut ProcessReport,
) -> Result<Automaton> {
    let source = Automaton::from_description(raw)?;
    report.operations.push(Operation::Construct);
    info!(automaton = %source, "constructed");

    let was_converted = options.force_conversion || !source.is_deterministic();
    let dfa = if was_converted {
        let dfa = convert(&source, &options.conversion)?;
        report.operations.push(Operation::Convert);
        info!(states = dfa.num_states(), "converted to a DFA");
        Cow::Owned(dfa)
    } else {
        Cow::Borrowed(&source)
    };

    let minimization = Minimization::run(&dfa)?;
    report.operations.push(Operation::Minimize);
    let unreachable_removed = minimization.unreachable();
    let minimized = minimization.into_automaton();
    info!(
        before = dfa.num_states(),
        after = minimized.num_states(),
        unreachable = unreachable_removed,
        "minimized"
    );

    check_equivalence(
        &source,
        &minimized,
        options.verify_max_len,
        options.verify_word_budget,
    )?;
    report.operations.push(Operation::Verify);

    report.statistics = Some(Statistics::new(
        &source,
        &minimized,
        was_converted,
        unreachable_removed,
    ));
    Ok(minimized)
}

/// Compare two automata over the same alphabet on every word of at most
/// `max_len` symbols, stopping before a length whose words would exceed
/// `budget`.
///
/// Fails with [`AutomatonError::LanguageMismatch`] on the first word they
/// disagree on.
pub fn check_equivalence(
    left: &Automaton,
    right: &Automaton,
    max_len: usize,
    budget: usize,
) -> Result<usize> {
    if !left.alphabet().eq(right.alphabet()) {
        return Err(AutomatonError::Precondition {
            operation: "equivalence check",
            reason: "automata over the same alphabet",
        });
    }

    let disagree = |word: &[SymbolId]| left.accepts_ids(word) != right.accepts_ids(word);
    let mismatch = |word: &[SymbolId]| AutomatonError::LanguageMismatch {
        word: word
            .iter()
            .map(|&s| left.symbol_label(s).to_string())
            .collect(),
    };

    if disagree(&[]) {
        return Err(mismatch(&[]));
    }
    let mut checked: usize = 1;

    let symbols = left.num_symbols();
    for len in 1..=max_len {
        let words = symbols.checked_pow(len as u32).unwrap_or(usize::MAX);
        if symbols == 0 || checked.saturating_add(words) > budget {
            break;
        }
        for word in itertools::repeat_n(left.symbol_ids(), len).multi_cartesian_product() {
            if disagree(&word) {
                return Err(mismatch(&word));
            }
        }
        checked += words;
    }

    debug!(words = checked, "automata agree");
    Ok(checked)
}
