//! Deterministic tokenization of document text
//!
//! Tokens are lowercase ASCII runs of letters, digits and hyphens. Whether a
//! token may take part in an n-gram is a separate decision made by
//! [`TokenPolicy`], so one token stream can serve several reports.

use super::sanitize::normalize;

/// Split text into tokens
///
/// Pure function: identical input always yields identical output, and
/// re-tokenizing the joined tokens reproduces them.
///
/// # Examples
///
/// ```
/// use trendline::text::tokenizer::{tokenize, tokens_to_text};
///
/// let tokens = tokenize("Best <b>Air-Fryer</b> recipes!! https://t.co/x");
/// assert_eq!(tokens, vec!["best", "air-fryer", "recipes"]);
/// assert_eq!(tokenize(&tokens_to_text(&tokens)), tokens);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Join tokens back into a single-spaced string
pub fn tokens_to_text<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether the token contains at least one ASCII letter
#[must_use]
pub fn has_letter(token: &str) -> bool {
    token.bytes().any(|b| b.is_ascii_alphabetic())
}

/// Whether the token is made only of digits (hyphens allowed, e.g. `2024-25`)
#[must_use]
pub fn is_numeric(token: &str) -> bool {
    !token.is_empty()
        && token.bytes().any(|b| b.is_ascii_digit())
        && token.bytes().all(|b| b.is_ascii_digit() || b == b'-')
}

/// Eligibility rules for n-gram components
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPolicy {
    /// Minimum token length in characters
    pub min_len: usize,

    /// Reject tokens made only of digits
    pub reject_numeric: bool,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            min_len: 2,
            reject_numeric: true,
        }
    }
}

impl TokenPolicy {
    /// Check one token against the policy
    ///
    /// A token always needs at least one letter; length and the numeric
    /// check are configurable.
    #[must_use]
    pub fn is_eligible(&self, token: &str) -> bool {
        if token.len() < self.min_len || !has_letter(token) {
            return false;
        }
        !(self.reject_numeric && is_numeric(token))
    }
}
