//! Search term sanitization.
//!
//! Turns arbitrary user text into prefix-matching tokens for MySQL boolean-mode
//! full-text search. Only ASCII letters and digits survive, so none of the
//! boolean-mode operators (`+ - < > ( ) ~ " @`) can reach the engine.
//! Accented letters are folded to their base letter first.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Boolean-mode prefix operator appended to every token.
pub const WILDCARD: char = '*';

/// Ordered, wildcard-marked search tokens.
///
/// Empty means "match everything"; it never holds an empty token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSet {
    tokens: Vec<String>,
}

impl TokenSet {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// The single string bound as the `AGAINST (...)` argument.
    pub fn to_boolean_query(&self) -> String {
        self.tokens.join(" ")
    }
}

/// Normalize and tokenize a raw search term. Never fails.
pub fn sanitize(raw: Option<&str>) -> TokenSet {
    let normalized: String = raw
        .unwrap_or_default()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .filter_map(|c| {
            if c.is_whitespace() {
                Some(' ')
            } else if c.is_ascii_alphanumeric() {
                Some(c)
            } else {
                None
            }
        })
        .collect();

    let tokens = normalized
        .split_whitespace()
        .map(|word| format!("{}{}", word, WILDCARD))
        .collect();

    TokenSet { tokens }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_safe(tokens: &TokenSet) {
        for token in tokens.tokens() {
            let (word, marker) = token.split_at(token.len() - 1);
            assert_eq!(marker, "*");
            assert!(!word.is_empty());
            assert!(word.chars().all(|c| c.is_ascii_alphanumeric()), "{token}");
        }
    }

    #[test]
    fn empty_inputs_yield_empty_token_set() {
        assert!(sanitize(None).is_empty());
        assert!(sanitize(Some("")).is_empty());
        assert!(sanitize(Some("   ")).is_empty());
        assert!(sanitize(Some("\t\n ")).is_empty());
        assert!(sanitize(Some("!!! ... ;;")).is_empty());
        assert_eq!(sanitize(Some("  ")).to_boolean_query(), "");
    }

    #[test]
    fn tokens_get_wildcard_and_single_spaces() {
        let tokens = sanitize(Some("  rust   web\tframework "));
        assert_eq!(tokens.tokens(), ["rust*", "web*", "framework*"]);
        assert_eq!(tokens.to_boolean_query(), "rust* web* framework*");
    }

    #[test]
    fn punctuation_is_stripped_not_split() {
        let tokens = sanitize(Some("don't +stop -me \"now\" (ok)~ @2"));
        assert_eq!(tokens.tokens(), ["dont*", "stop*", "me*", "now*", "ok*", "2*"]);
        assert_safe(&tokens);
    }

    #[test]
    fn statement_breaking_characters_never_survive() {
        let tokens = sanitize(Some("x'); DROP TABLE articles; -- *"));
        assert_eq!(tokens.tokens(), ["x*", "DROP*", "TABLE*", "articles*"]);
        assert_safe(&tokens);
    }

    #[test]
    fn accents_fold_and_other_scripts_drop() {
        assert_eq!(sanitize(Some("Café crème")).tokens(), ["Cafe*", "creme*"]);
        assert_eq!(sanitize(Some("東京 tokyo")).tokens(), ["tokyo*"]);
        assert_safe(&sanitize(Some("ﬁnance ①")));
    }

    #[test]
    fn digits_are_kept() {
        assert_eq!(sanitize(Some("ipv6 2024")).tokens(), ["ipv6*", "2024*"]);
    }
}
