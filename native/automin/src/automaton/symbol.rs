//! Symbol identifiers for automata transitions.

/// A symbol identifier: the index of the symbol's label in the alphabet.
pub type SymbolId = u32;

/// Split a word into single-character symbols.
///
/// Alphabets loaded from text are usually made of one-character labels, so
/// `"abba"` reads as the sequence `["a", "b", "b", "a"]`.
pub fn chars(word: &str) -> Vec<String> {
    word.chars().map(String::from).collect()
}
