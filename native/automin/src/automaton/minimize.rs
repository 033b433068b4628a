//! DFA minimization by partition refinement.
//!
//! The minimizer works on dense local indices: reachable states in
//! ascending id order, followed by a synthetic sink when some reachable
//! state lacks a transition. A partition is an index -> block array, and
//! each pass splits every block by the blocks its members move to, reading
//! only the previous pass's array. Blocks are always numbered by their
//! smallest member, which fixes the output order.
//!
//! A sink that ends up equivalent to no original state is left out of the
//! output, whose transitions into it stay undefined. The result never has
//! more states than the input has reachable ones.

use crate::automaton::model::Automaton;
use crate::automaton::state::{StateId, StateSet};
use crate::automaton::symbol::SymbolId;
use crate::error::{AutomatonError, Result};
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Assignment of local state indices to blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Partition {
    block_of: Vec<usize>,
    blocks: usize,
}

impl Partition {
    /// Number blocks by the first index carrying each key.
    fn from_keys<K: Eq + std::hash::Hash>(keys: impl IntoIterator<Item = K>) -> Self {
        let mut numbering: HashMap<K, usize> = HashMap::new();
        let block_of = keys
            .into_iter()
            .map(|key| {
                let next = numbering.len();
                *numbering.entry(key).or_insert(next)
            })
            .collect();
        Self {
            block_of,
            blocks: numbering.len(),
        }
    }

    /// Split accepting from non-accepting states; an empty side yields no block.
    fn initial(accepting: &[bool]) -> Self {
        Self::from_keys(accepting.iter().copied())
    }

    /// One refinement pass: states stay together iff they share a block and,
    /// for every symbol, their successors share a block.
    fn refine(&self, delta: &[usize], symbols: usize) -> Self {
        Self::from_keys((0..self.block_of.len()).map(|state| {
            let mut signature = Vec::with_capacity(symbols + 1);
            signature.push(self.block_of[state]);
            signature.extend(
                delta[state * symbols..(state + 1) * symbols]
                    .iter()
                    .map(|&next| self.block_of[next]),
            );
            signature
        }))
    }

    /// Smallest local index of every block, in block order.
    fn representatives(&self) -> Vec<usize> {
        let mut representatives = vec![usize::MAX; self.blocks];
        for (state, &block) in self.block_of.iter().enumerate() {
            if representatives[block] == usize::MAX {
                representatives[block] = state;
            }
        }
        representatives
    }
}

/// The result of minimizing a DFA, with bookkeeping about the run.
#[derive(Debug, Clone)]
pub struct Minimization {
    automaton: Automaton,
    /// Original states merged into each output state, ascending; the sink is not listed
    classes: Vec<Vec<StateId>>,
    /// Original label -> label of the output state it was merged into
    equivalences: IndexMap<String, String>,
    unreachable: usize,
    passes: usize,
    added_sink: bool,
}

impl Minimization {
    /// Minimize `dfa`, which must be deterministic. Partial DFAs are
    /// totalized with a non-accepting sink before refinement; the output is
    /// total only if the sink merged into an original state.
    pub fn run(dfa: &Automaton) -> Result<Self> {
        if !dfa.is_deterministic() {
            return Err(AutomatonError::Precondition {
                operation: "minimization",
                reason: "a deterministic automaton",
            });
        }

        let reachable = dfa.reachable_states();
        let members: Vec<StateId> = reachable.to_vec();
        let unreachable = dfa.num_states() - members.len();
        debug!(
            states = dfa.num_states(),
            unreachable, "starting minimization"
        );

        let mut local = vec![usize::MAX; dfa.num_states()];
        for (index, &state) in members.iter().enumerate() {
            local[state as usize] = index;
        }

        let symbols = dfa.num_symbols();
        let needs_sink = members
            .iter()
            .any(|&state| dfa.symbol_ids().any(|a| dfa.successor(state, a).is_none()));
        let sink = members.len();
        let size = members.len() + usize::from(needs_sink);

        // Successor table: delta[state * symbols + symbol]
        let mut delta = vec![sink; size * symbols];
        for (index, &state) in members.iter().enumerate() {
            for symbol in dfa.symbol_ids() {
                if let Some(next) = dfa.successor(state, symbol) {
                    delta[index * symbols + symbol as usize] = local[next as usize];
                }
            }
        }

        let accepting: Vec<bool> = (0..size)
            .map(|index| index < sink && dfa.is_accepting(members[index]))
            .collect();

        let mut partition = Partition::initial(&accepting);
        let mut passes = 0;
        loop {
            passes += 1;
            let refined = partition.refine(&delta, symbols);
            trace!(pass = passes, blocks = refined.blocks, "refinement pass");
            // Refinement only splits, so an unchanged count is a fixed point.
            if refined.blocks == partition.blocks {
                break;
            }
            partition = refined;
        }

        let mut representatives = partition.representatives();
        // The sink has the largest index, so it represents a block only when
        // it is alone there. Such a sink only rejects, as a missing
        // transition already does, and is dropped.
        if needs_sink && representatives.last() == Some(&sink) {
            representatives.pop();
        }
        let kept = representatives.len();

        let states: IndexSet<String> = representatives
            .iter()
            .map(|&rep| dfa.state_label(members[rep]).to_string())
            .collect();

        let mut final_states = StateSet::empty(kept);
        let mut transitions = HashMap::new();
        for (block, &rep) in representatives.iter().enumerate() {
            if accepting[rep] {
                final_states.insert(block as StateId);
            }
            for symbol in 0..symbols {
                let next = partition.block_of[delta[rep * symbols + symbol]];
                if next < kept {
                    transitions.insert(
                        (block as StateId, symbol as SymbolId),
                        StateSet::singleton(next as StateId, kept),
                    );
                }
            }
        }

        let mut classes = vec![Vec::new(); kept];
        let mut equivalences = IndexMap::with_capacity(members.len());
        for (index, &state) in members.iter().enumerate() {
            let block = partition.block_of[index];
            classes[block].push(state);
            equivalences.insert(
                dfa.state_label(state).to_string(),
                states[block].clone(),
            );
        }

        let initial = partition.block_of[local[dfa.initial() as usize]] as StateId;
        let automaton = Automaton::from_parts(
            states,
            dfa.symbol_labels().clone(),
            initial,
            final_states,
            transitions,
        );
        debug!(
            states = automaton.num_states(),
            passes, "finished minimization"
        );

        Ok(Self {
            automaton,
            classes,
            equivalences,
            unreachable,
            passes,
            added_sink: needs_sink,
        })
    }

    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }

    pub fn into_automaton(self) -> Automaton {
        self.automaton
    }

    /// For every output state, the original states it stands for.
    pub fn classes(&self) -> &[Vec<StateId>] {
        &self.classes
    }

    /// Maps every reachable original state label to its output state label.
    pub fn equivalence_table(&self) -> &IndexMap<String, String> {
        &self.equivalences
    }

    /// Number of unreachable states discarded before refinement.
    pub fn unreachable(&self) -> usize {
        self.unreachable
    }

    /// Number of refinement passes, the final stable pass included.
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Whether a sink was added to totalize the input during refinement.
    pub fn added_sink(&self) -> bool {
        self.added_sink
    }
}

/// Reduce a DFA to its minimal equivalent.
pub fn minimize(dfa: &Automaton) -> Result<Automaton> {
    Minimization::run(dfa).map(Minimization::into_automaton)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::subset_construction::subset_construction;
    use crate::automaton::symbol::chars;
    use pretty_assertions::assert_eq;

    /// Accepts words ending in `b`; q0 and q1 agree on every suffix.
    fn ends_in_b_redundant() -> Automaton {
        Automaton::new(
            ["q0", "q1", "q2"],
            ["a", "b"],
            [
                ("q0", "a", "q1"),
                ("q0", "b", "q2"),
                ("q1", "a", "q1"),
                ("q1", "b", "q2"),
                ("q2", "a", "q1"),
                ("q2", "b", "q2"),
            ],
            "q0",
            ["q2"],
        )
        .unwrap()
    }

    #[test]
    fn test_partition_numbering() {
        let p = Partition::initial(&[false, true, false, true]);
        assert_eq!(p.block_of, vec![0, 1, 0, 1]);
        assert_eq!(p.blocks, 2);
        assert_eq!(p.representatives(), vec![0, 1]);

        let all_accepting = Partition::initial(&[true, true]);
        assert_eq!(all_accepting.blocks, 1);
    }

    #[test]
    fn test_table_filling_example() {
        let dfa = ends_in_b_redundant();
        let result = Minimization::run(&dfa).unwrap();
        let min = result.automaton();

        // q0 and q1 go to q1 on a and q2 on b: equivalent. q2 is accepting.
        assert_eq!(min.num_states(), 2);
        assert_eq!(result.classes().to_vec(), vec![vec![0, 1], vec![2]]);
        let table = result.equivalence_table();
        assert_eq!(table["q0"], "q0");
        assert_eq!(table["q1"], "q0");
        assert_eq!(table["q2"], "q2");
        assert_ne!(table["q1"], table["q2"]);
        assert!(!result.added_sink());

        for word in ["", "a", "b", "ab", "ba", "abb", "bba"] {
            assert_eq!(
                dfa.accepts(&chars(word)).unwrap(),
                min.accepts(&chars(word)).unwrap()
            );
        }
    }

    #[test]
    fn test_already_minimal() {
        // Even number of a's: both states are needed.
        let dfa = Automaton::new(
            ["e", "o"],
            ["a"],
            [("e", "a", "o"), ("o", "a", "e")],
            "e",
            ["e"],
        )
        .unwrap();
        let min = minimize(&dfa).unwrap();
        assert_eq!(min.num_states(), 2);
        assert_eq!(min.states().collect::<Vec<_>>(), vec!["e", "o"]);
    }

    #[test]
    fn test_converted_example() {
        let nfa = Automaton::new(
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
        .unwrap();
        let min = minimize(&subset_construction(&nfa)).unwrap();

        // b* a (ε | (a|b) b*): {p0}, {p1,p2}, {p2} and the dead state are all distinct.
        assert_eq!(min.num_states(), 4);
        let accepted = ["a", "ab", "ba", "aa", "aab", "bab", "abbb"];
        let rejected = ["", "b", "bb", "aaa", "abab", "aba"];
        for word in accepted {
            assert!(min.accepts(&chars(word)).unwrap(), "{word:?} should be accepted");
        }
        for word in rejected {
            assert!(!min.accepts(&chars(word)).unwrap(), "{word:?} should be rejected");
        }
    }

    #[test]
    fn test_universal_language() {
        let dfa = Automaton::new(
            ["x", "y", "z"],
            ["a", "b"],
            [
                ("x", "a", "y"),
                ("x", "b", "z"),
                ("y", "a", "z"),
                ("y", "b", "x"),
                ("z", "a", "x"),
                ("z", "b", "y"),
            ],
            "x",
            ["x", "y", "z"],
        )
        .unwrap();
        let min = minimize(&dfa).unwrap();
        assert_eq!(min.num_states(), 1);
        assert!(min.is_accepting(min.initial()));
        for symbol in min.symbol_ids() {
            assert_eq!(min.successor(min.initial(), symbol), Some(min.initial()));
        }
    }

    #[test]
    fn test_empty_language() {
        let dfa = Automaton::new(
            ["x", "y"],
            ["a"],
            [("x", "a", "y"), ("y", "a", "x")],
            "x",
            [],
        )
        .unwrap();
        let min = minimize(&dfa).unwrap();
        assert_eq!(min.num_states(), 1);
        assert!(min.accepting().is_empty());
        assert!(!min.accepts(&chars("aaa")).unwrap());
    }

    #[test]
    fn test_partial_dfa_drops_distinct_sink() {
        let dfa = Automaton::new(["q0", "q1"], ["a", "b"], [("q0", "a", "q1")], "q0", ["q1"])
            .unwrap();
        let result = Minimization::run(&dfa).unwrap();
        let min = result.automaton();
        assert!(result.added_sink());
        assert_eq!(min.num_states(), dfa.reachable_states().len());
        assert_eq!(min.states().collect::<Vec<_>>(), vec!["q0", "q1"]);
        assert!(!min.is_complete());
        assert_eq!(min.transitions().collect::<Vec<_>>(), vec![(0, 0, 1)]);
        assert_eq!(result.classes().to_vec(), vec![vec![0], vec![1]]);

        assert!(min.accepts(&["a"]).unwrap());
        assert!(!min.accepts(&["a", "b"]).unwrap());
        assert!(!min.accepts(&["b"]).unwrap());
        assert!(!min.accepts::<&str>(&[]).unwrap());

        let again = minimize(min).unwrap();
        assert_eq!(again.states().collect::<Vec<_>>(), vec!["q0", "q1"]);
    }

    #[test]
    fn test_partial_dfa_merges_redundant_states() {
        // q1 and q2 both accept exactly ε: they merge, and the sink goes away.
        let dfa = Automaton::new(
            ["q0", "q1", "q2"],
            ["a", "b"],
            [("q0", "a", "q1"), ("q0", "b", "q2")],
            "q0",
            ["q1", "q2"],
        )
        .unwrap();
        let min = minimize(&dfa).unwrap();
        assert_eq!(min.states().collect::<Vec<_>>(), vec!["q0", "q1"]);
        assert!(min.accepts(&["a"]).unwrap());
        assert!(min.accepts(&["b"]).unwrap());
        assert!(!min.accepts(&["a", "a"]).unwrap());
    }

    #[test]
    fn test_sink_merges_with_existing_dead_state() {
        let dfa = Automaton::new(
            ["q0", "q1", "trap"],
            ["a", "b"],
            [
                ("q0", "a", "q1"),
                ("q0", "b", "trap"),
                ("trap", "a", "trap"),
                ("trap", "b", "trap"),
            ],
            "q0",
            ["q1"],
        )
        .unwrap();
        let result = Minimization::run(&dfa).unwrap();
        assert!(result.added_sink());
        assert_eq!(result.automaton().num_states(), 3);
        assert_eq!(
            result.automaton().states().collect::<Vec<_>>(),
            vec!["q0", "q1", "trap"]
        );
    }

    #[test]
    fn test_unreachable_states_are_dropped() {
        let dfa = Automaton::new(
            ["start", "ghost"],
            ["a"],
            [("start", "a", "start"), ("ghost", "a", "start")],
            "start",
            ["ghost"],
        )
        .unwrap();
        let result = Minimization::run(&dfa).unwrap();
        assert_eq!(result.unreachable(), 1);
        assert_eq!(result.automaton().num_states(), 1);
        assert!(!result.equivalence_table().contains_key("ghost"));
    }

    #[test]
    fn test_idempotent_and_reproducible() {
        let dfa = ends_in_b_redundant();
        let once = minimize(&dfa).unwrap();
        let twice = minimize(&once).unwrap();
        assert_eq!(once.num_states(), twice.num_states());

        let again = minimize(&dfa).unwrap();
        assert_eq!(
            once.states().collect::<Vec<_>>(),
            again.states().collect::<Vec<_>>()
        );
        assert_eq!(
            once.transitions().collect::<Vec<_>>(),
            again.transitions().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_rejects_nfa() {
        let nfa = Automaton::new(
            ["p", "q"],
            ["a"],
            [("p", "a", "p"), ("p", "a", "q")],
            "p",
            ["q"],
        )
        .unwrap();
        assert!(matches!(
            minimize(&nfa),
            Err(AutomatonError::Precondition { .. })
        ));
    }

    #[test]
    fn test_initial_not_smallest_state() {
        let dfa = Automaton::new(
            ["z", "start"],
            ["a"],
            [("start", "a", "z"), ("z", "a", "z")],
            "start",
            ["z"],
        )
        .unwrap();
        let min = minimize(&dfa).unwrap();
        assert_eq!(min.state_label(min.initial()), "start");
        assert!(min.accepts(&["a"]).unwrap());
        assert!(!min.accepts::<&str>(&[]).unwrap());
    }
}
