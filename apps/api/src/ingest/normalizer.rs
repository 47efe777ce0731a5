//! Text normalization for extracted document text.
//!
//! Steps, in order:
//! 1. Unicode NFKD (compatibility decomposition; accents become base + combining mark)
//! 2. Remove literal `\uXXXX` escape sequences left behind by bad encoders
//! 3. Drop everything that is not a word character or whitespace (punctuation included)
//! 4. Collapse whitespace runs to a single space and trim
//!
//! The result is idempotent: `normalize(normalize(x)) == normalize(x)`.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static UNICODE_ESCAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\u[0-9a-fA-F]{4}").unwrap());
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Canonicalizes raw extracted text into a stable, comparable string.
///
/// Case is preserved. Sentence punctuation is removed along with every other
/// non-word character.
pub fn normalize(text: &str) -> String {
    let decomposed: String = text.nfkd().collect();
    let unescaped = UNICODE_ESCAPE.replace_all(&decomposed, "");
    let words_only = NON_WORD.replace_all(&unescaped, "");
    // Removing a starter between two combining marks can leave them out of
    // canonical order; re-decomposing restores it without changing any char class.
    let reordered: String = words_only.nfkd().collect();
    WHITESPACE_RUN.replace_all(&reordered, " ").trim().to_string()
}
