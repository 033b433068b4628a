//! A non-failing inspection of an automaton description.

use crate::automaton::{Automaton, Kind, StateId};
use crate::interchange::AutomatonDescription;
use serde::Serialize;

/// Facts about a structurally valid automaton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Properties {
    pub kind: Kind,
    pub num_states: usize,
    pub num_symbols: usize,
    pub num_transitions: usize,
    pub num_accepting: usize,
    pub num_reachable: usize,
    pub deterministic: bool,
    pub complete: bool,
}

/// Everything wrong or suspicious about a description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// `None` when the description has errors
    pub properties: Option<Properties>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check `description`, reporting every structural error instead of the
/// first one, and warn about legal but unusual shapes.
pub fn validate(description: &AutomatonDescription) -> ValidationReport {
    let automaton = match Automaton::assemble(description.parts()) {
        Ok(automaton) => automaton,
        Err(errors) => {
            return ValidationReport {
                errors: errors.iter().map(ToString::to_string).collect(),
                ..Default::default()
            };
        }
    };

    let mut warnings = Vec::new();
    if automaton.num_symbols() == 0 {
        warnings.push("alphabet is empty".to_string());
    }
    if automaton.accepting().is_empty() {
        warnings.push("no accepting states; the language is empty".to_string());
    }

    let unreachable: Vec<&str> = automaton
        .unreachable_states()
        .iter()
        .map(|id| automaton.state_label(id))
        .collect();
    if !unreachable.is_empty() {
        warnings.push(format!("unreachable states: {}", unreachable.join(", ")));
    }

    if description.kind == Kind::Deterministic {
        for (state, symbol) in automaton.missing_transitions() {
            warnings.push(format!(
                "missing transition ({}, {}); words reaching it are rejected",
                automaton.state_label(state),
                automaton.symbol_label(symbol)
            ));
        }
    } else {
        for state in 0..automaton.num_states() as StateId {
            for symbol in automaton.symbol_ids() {
                let Some(targets) = automaton.successors(state, symbol) else {
                    continue;
                };
                if targets.len() > 1 {
                    warnings.push(format!(
                        "nondeterministic transition ({}, {}) -> {} states",
                        automaton.state_label(state),
                        automaton.symbol_label(symbol),
                        targets.len()
                    ));
                }
            }
        }
    }

    ValidationReport {
        errors: Vec::new(),
        warnings,
        properties: Some(Properties {
            kind: description.kind,
            num_states: automaton.num_states(),
            num_symbols: automaton.num_symbols(),
            num_transitions: automaton.num_transitions(),
            num_accepting: automaton.accepting().len(),
            num_reachable: automaton.num_states() - unreachable.len(),
            deterministic: automaton.is_deterministic(),
            complete: automaton.is_complete(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interchange::TransitionRecord;

    fn record(source: &str, symbol: &str, destination: &str) -> TransitionRecord {
        TransitionRecord {
            source: source.to_string(),
            symbol: symbol.to_string(),
            destination: destination.to_string(),
        }
    }

    fn description(kind: Kind, transitions: Vec<TransitionRecord>) -> AutomatonDescription {
        AutomatonDescription {
            kind,
            states: vec!["q0".into(), "q1".into(), "q2".into()],
            alphabet: vec!["a".into(), "b".into()],
            transitions,
            initial: "q0".into(),
            accepting: vec!["q1".into()],
            metadata: None,
        }
    }

    #[test]
    fn test_collects_every_error() {
        let mut d = description(
            Kind::Deterministic,
            vec![record("q0", "c", "q1"), record("q9", "a", "q1")],
        );
        d.accepting.push("nowhere".into());
        let report = validate(&d);
        assert!(!report.is_valid());
        assert_eq!(report.errors.len(), 3);
        assert!(report.properties.is_none());
    }

    #[test]
    fn test_warnings_on_partial_dfa() {
        let d = description(
            Kind::Deterministic,
            vec![record("q0", "a", "q1"), record("q1", "b", "q0")],
        );
        let report = validate(&d);
        assert!(report.is_valid());
        assert!(report.warnings.iter().any(|w| w == "unreachable states: q2"));
        // q0-b, q1-a, q2-a, q2-b
        let missing = report
            .warnings
            .iter()
            .filter(|w| w.starts_with("missing transition"))
            .count();
        assert_eq!(missing, 4);

        let properties = report.properties.unwrap();
        assert_eq!(properties.num_reachable, 2);
        assert!(properties.deterministic);
        assert!(!properties.complete);
    }

    #[test]
    fn test_warnings_on_nfa() {
        let d = description(
            Kind::Nondeterministic,
            vec![
                record("q0", "a", "q1"),
                record("q0", "a", "q2"),
                record("q1", "a", "q2"),
            ],
        );
        let report = validate(&d);
        assert_eq!(
            report.warnings,
            vec!["nondeterministic transition (q0, a) -> 2 states".to_string()]
        );
        assert!(!report.properties.unwrap().deterministic);
    }
}
