//! Subset construction algorithm for converting an NFA to a DFA.

use crate::automaton::model::{fresh_label, Automaton};
use crate::automaton::state::{StateId, StateSet};
use crate::automaton::symbol::SymbolId;
use crate::error::{AutomatonError, Result};
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Label of the synthetic state standing for the empty subset.
pub const DEAD_STATE_LABEL: &str = "∅";

/// Limits applied while converting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionOptions {
    /// Maximum number of DFA states, the dead state included (`None` = unlimited)
    pub max_states: Option<usize>,
}

/// Convert an NFA into an equivalent total DFA.
pub fn subset_construction(nfa: &Automaton) -> Automaton {
    match convert(nfa, &ConversionOptions::default()) {
        Ok(dfa) => dfa,
        Err(_) => unreachable!("conversion without a state limit cannot fail"),
    }
}

/// Convert an NFA into an equivalent total DFA, honoring `options`.
///
/// DFA states are the subsets of NFA states reachable from `{initial}`.
/// Subsets are deduplicated by content; state ids follow discovery order.
/// Empty images all lead to a single dead state, created on first need.
pub fn convert(nfa: &Automaton, options: &ConversionOptions) -> Result<Automaton> {
    debug!(
        states = nfa.num_states(),
        symbols = nfa.num_symbols(),
        "starting subset construction"
    );

    let mut builder = SubsetBuilder::new(nfa, options.max_states);
    let (initial, _) = builder.discover(vec![nfa.initial()])?;

    let dead_ended = nfa
        .symbol_ids()
        .all(|symbol| nfa.successors(nfa.initial(), symbol).is_none_or(StateSet::is_empty));
    if dead_ended && !nfa.is_accepting(nfa.initial()) {
        // {initial} already rejects everything and serves as the dead state.
        builder.adopt_dead_state(initial);
        let dfa = builder.finish(initial);
        debug!("initial state is dead-ended, single-state DFA");
        return Ok(dfa);
    }

    // DFA states whose outgoing transitions are not computed yet
    let mut worklist: Vec<StateId> = vec![initial];

    while let Some(current_id) = worklist.pop() {
        let Some(current) = builder.arena[current_id as usize].clone() else {
            continue;
        };

        for symbol in nfa.symbol_ids() {
            let mut image = StateSet::empty(nfa.num_states());
            for &state in &current {
                if let Some(targets) = nfa.successors(state, symbol) {
                    image.union_with(targets);
                }
            }

            let next_id = if image.is_empty() {
                builder.dead_state()?
            } else {
                let (id, is_new) = builder.discover(image.to_vec())?;
                if is_new {
                    worklist.push(id);
                }
                id
            };

            builder.transitions.push((current_id, symbol, next_id));
        }
    }

    let dfa = builder.finish(initial);
    debug!(states = dfa.num_states(), "finished subset construction");
    Ok(dfa)
}

/// Output under construction, scoped to one conversion.
struct SubsetBuilder<'a> {
    nfa: &'a Automaton,
    limit: Option<usize>,
    /// DFA state id -> its sorted NFA subset; `None` for the dead state
    arena: Vec<Option<Vec<StateId>>>,
    /// Sorted NFA subset -> DFA state id
    mapping: IndexMap<Vec<StateId>, StateId>,
    dead: Option<StateId>,
    transitions: Vec<(StateId, SymbolId, StateId)>,
}

impl<'a> SubsetBuilder<'a> {
    fn new(nfa: &'a Automaton, limit: Option<usize>) -> Self {
        Self {
            nfa,
            limit,
            arena: Vec::new(),
            mapping: IndexMap::new(),
            dead: None,
            transitions: Vec::new(),
        }
    }

    /// Reserve the next state id, failing once the limit is reached.
    fn allocate(&mut self, subset: Option<Vec<StateId>>) -> Result<StateId> {
        if let Some(limit) = self.limit {
            if self.arena.len() >= limit {
                return Err(AutomatonError::ResourceLimit { limit });
            }
        }
        let id = self.arena.len() as StateId;
        self.arena.push(subset);
        Ok(id)
    }

    /// Id of `subset` and whether it was allocated by this call.
    fn discover(&mut self, subset: Vec<StateId>) -> Result<(StateId, bool)> {
        if let Some(&id) = self.mapping.get(&subset) {
            return Ok((id, false));
        }
        let id = self.allocate(Some(subset.clone()))?;
        trace!(id, ?subset, "discovered subset");
        self.mapping.insert(subset, id);
        Ok((id, true))
    }

    fn dead_state(&mut self) -> Result<StateId> {
        if let Some(dead) = self.dead {
            return Ok(dead);
        }
        let id = self.allocate(None)?;
        trace!(id, "created dead state");
        self.adopt_dead_state(id);
        Ok(id)
    }

    /// Use an already allocated, non-accepting state as the dead state.
    fn adopt_dead_state(&mut self, id: StateId) {
        for symbol in self.nfa.symbol_ids() {
            self.transitions.push((id, symbol, id));
        }
        self.dead = Some(id);
    }

    fn finish(self, initial: StateId) -> Automaton {
        let total = self.arena.len();
        let mut states = IndexSet::with_capacity(total);
        let mut accepting = StateSet::empty(total);

        for (id, subset) in self.arena.iter().enumerate() {
            let wanted = match subset {
                Some(subset) => {
                    if subset.iter().any(|&s| self.nfa.is_accepting(s)) {
                        accepting.insert(id as StateId);
                    }
                    let names: Vec<&str> =
                        subset.iter().map(|&s| self.nfa.state_label(s)).collect();
                    format!("{{{}}}", names.join(","))
                }
                None => DEAD_STATE_LABEL.to_string(),
            };
            let label = fresh_label(&states, wanted);
            states.insert(label);
        }

        let mut transitions: HashMap<(StateId, SymbolId), StateSet> = HashMap::new();
        for (source, symbol, destination) in self.transitions {
            transitions.insert((source, symbol), StateSet::singleton(destination, total));
        }

        Automaton::from_parts(
            states,
            self.nfa.symbol_labels().clone(),
            initial,
            accepting,
            transitions,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::symbol::chars;

    /// The running example: δ(p0,a)={p1,p2}, δ(p0,b)={p0}, δ(p1,a)={p2}, δ(p2,b)={p2}.
    fn example_nfa() -> Automaton {
        Automaton::new(
            ["p0", "p1", "p2"],
            ["a", "b"],
            [
                ("p0", "a", "p1"),
                ("p0", "a", "p2"),
                ("p0", "b", "p0"),
                ("p1", "a", "p2"),
                ("p2", "b", "p2"),
            ],
            "p0",
            ["p2"],
        )
        .unwrap()
    }

    #[test]
    fn test_subset_construction_basic() {
        let nfa = example_nfa();
        let dfa = subset_construction(&nfa);

        assert!(dfa.is_deterministic());
        assert!(dfa.is_complete());
        assert_eq!(dfa.state_label(dfa.initial()), "{p0}");
        // {p0}, {p1,p2}, {p2}, and the dead state
        assert_eq!(dfa.num_states(), 4);
        assert!(dfa.state_id("{p1,p2}").is_some());
        assert!(dfa.state_id(DEAD_STATE_LABEL).is_some());
        assert!(!dfa.is_accepting(dfa.state_id(DEAD_STATE_LABEL).unwrap()));
        assert_eq!(dfa.alphabet().collect::<Vec<_>>(), vec!["a", "b"]);

        for word in ["", "a", "ab", "aa", "b", "ba", "bab", "abba", "aab"] {
            assert_eq!(
                nfa.accepts(&chars(word)).unwrap(),
                dfa.accepts(&chars(word)).unwrap(),
                "disagreement on {word:?}"
            );
        }
    }

    #[test]
    fn test_dead_state_is_shared_and_absorbing() {
        let nfa = Automaton::new(
            ["s", "t"],
            ["a", "b"],
            [("s", "a", "t")],
            "s",
            ["t"],
        )
        .unwrap();
        let dfa = subset_construction(&nfa);
        let dead = dfa.state_id(DEAD_STATE_LABEL).unwrap();
        assert_eq!(dfa.num_states(), 3);
        for symbol in dfa.symbol_ids() {
            assert_eq!(dfa.successor(dead, symbol), Some(dead));
        }
        let dead_edges = dfa.transitions().filter(|&(_, _, d)| d == dead).count();
        // s-b, t-a, t-b, and two self loops
        assert_eq!(dead_edges, 5);
    }

    #[test]
    fn test_dead_ended_initial() {
        let nfa = Automaton::new(["p", "q"], ["a", "b"], [("q", "a", "p")], "p", ["q"]).unwrap();
        let dfa = subset_construction(&nfa);
        assert_eq!(dfa.num_states(), 1);
        assert_eq!(dfa.states().collect::<Vec<_>>(), vec!["{p}"]);
        assert!(dfa.accepting().is_empty());
        assert!(dfa.is_complete());
        assert_eq!(dfa.transitions().collect::<Vec<_>>(), vec![(0, 0, 0), (0, 1, 0)]);
        assert!(!dfa.accepts::<&str>(&[]).unwrap());
        assert!(!dfa.accepts(&["a", "b"]).unwrap());
    }

    #[test]
    fn test_dead_ended_accepting_initial_keeps_dead_state() {
        // Only ε is accepted, so {p} and the dead state must stay apart.
        let nfa = Automaton::new(["p", "q"], ["a"], [("q", "a", "p")], "p", ["p"]).unwrap();
        let dfa = subset_construction(&nfa);
        assert_eq!(dfa.num_states(), 2);
        assert!(dfa.accepts::<&str>(&[]).unwrap());
        assert!(!dfa.accepts(&["a"]).unwrap());
    }

    #[test]
    fn test_empty_alphabet() {
        let nfa = Automaton::new(["only"], [], [], "only", []).unwrap();
        let dfa = subset_construction(&nfa);
        assert_eq!(dfa.num_states(), 1);
        assert_eq!(dfa.num_transitions(), 0);
    }

    #[test]
    fn test_deterministic_output() {
        let nfa = example_nfa();
        let first = subset_construction(&nfa);
        let second = subset_construction(&nfa);
        assert_eq!(
            first.states().collect::<Vec<_>>(),
            second.states().collect::<Vec<_>>()
        );
        assert_eq!(
            first.transitions().collect::<Vec<_>>(),
            second.transitions().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_state_limit() {
        let nfa = example_nfa();
        let options = ConversionOptions {
            max_states: Some(2),
        };
        assert!(matches!(
            convert(&nfa, &options),
            Err(AutomatonError::ResourceLimit { limit: 2 })
        ));

        let options = ConversionOptions {
            max_states: Some(4),
        };
        assert_eq!(convert(&nfa, &options).unwrap().num_states(), 4);
    }
}
