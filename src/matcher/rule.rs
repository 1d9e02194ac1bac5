//! Match rule implementation.

use std::fmt;

use regex::Regex;

use crate::crypto::{ALPHABET, ENCODED_LEN};

/// Errors raised while building a match rule.
#[derive(Debug, thiserror::Error)]
pub enum MatchRuleError {
    #[error("prefix cannot be empty")]
    EmptyPrefix,

    #[error("prefix {prefix:?} is {len} characters, addresses are only 52")]
    PrefixTooLong { prefix: String, len: usize },

    #[error("prefix {prefix:?} ends in {last:?}, a full-length address can only end in 'A' or 'Q'")]
    UnreachablePrefix { prefix: String, last: char },

    #[error("prefix {prefix:?} contains {ch:?}, which is not in the base32 alphabet (A-Z, 2-7)")]
    InvalidPrefixChar { prefix: String, ch: char },

    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A predicate over encoded addresses.
///
/// Built once at startup and shared read-only by every worker.
#[derive(Debug, Clone)]
pub enum MatchRule {
    /// Case-sensitive prefix test against an upper-cased literal.
    LiteralPrefix(String),
    /// Case-insensitive regular expression over the full address.
    Pattern(Regex),
}

impl MatchRule {
    /// Creates a literal prefix rule. The prefix is upper-cased here, once.
    pub fn prefix(prefix: &str) -> Result<Self, MatchRuleError> {
        let prefix = prefix.to_ascii_uppercase();

        if prefix.is_empty() {
            return Err(MatchRuleError::EmptyPrefix);
        }

        if let Some(ch) = prefix.chars().find(|c| !ALPHABET.contains(*c)) {
            return Err(MatchRuleError::InvalidPrefixChar { prefix, ch });
        }

        if prefix.len() > ENCODED_LEN {
            let len = prefix.len();
            return Err(MatchRuleError::PrefixTooLong { prefix, len });
        }

        // The final character carries one data bit followed by four zero bits
        if prefix.len() == ENCODED_LEN {
            if let Some(last) = prefix.chars().last().filter(|c| !matches!(c, 'A' | 'Q')) {
                return Err(MatchRuleError::UnreachablePrefix { prefix, last });
            }
        }

        Ok(MatchRule::LiteralPrefix(prefix))
    }

    /// Compiles a case-insensitive pattern rule.
    pub fn pattern(pattern: &str) -> Result<Self, MatchRuleError> {
        Regex::new(&format!("(?i){}", pattern))
            .map(MatchRule::Pattern)
            .map_err(|source| MatchRuleError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    /// Tests an encoded address, or a truncated prefix of one when
    /// [`required_prefix_len`](Self::required_prefix_len) is `Some`.
    #[inline]
    pub fn matches(&self, encoded: &str) -> bool {
        match self {
            MatchRule::LiteralPrefix(prefix) => encoded.as_bytes().starts_with(prefix.as_bytes()),
            MatchRule::Pattern(regex) => regex.is_match(encoded),
        }
    }

    /// Number of leading address characters the rule needs to inspect, if the
    /// rule can say so statically. Patterns always need the full address.
    #[inline]
    pub fn required_prefix_len(&self) -> Option<usize> {
        match self {
            MatchRule::LiteralPrefix(prefix) => Some(prefix.len()),
            MatchRule::Pattern(_) => None,
        }
    }

    /// Returns the short name of the rule kind.
    pub fn kind(&self) -> &'static str {
        match self {
            MatchRule::LiteralPrefix(_) => "prefix",
            MatchRule::Pattern(_) => "pattern",
        }
    }

    /// Returns the rule text as the user will recognise it.
    pub fn text(&self) -> &str {
        match self {
            MatchRule::LiteralPrefix(prefix) => prefix,
            MatchRule::Pattern(regex) => {
                let text = regex.as_str();
                text.strip_prefix("(?i)").unwrap_or(text)
            }
        }
    }

    /// Returns the expected number of attempts per hit.
    ///
    /// Each base32 character has 32 possible values, so a prefix of length
    /// `n` needs `32^n` attempts on average. Patterns have no estimate.
    pub fn estimated_difficulty(&self) -> Option<u64> {
        match self {
            MatchRule::LiteralPrefix(prefix) => Some(32u64.saturating_pow(prefix.len() as u32)),
            MatchRule::Pattern(_) => None,
        }
    }

    /// Returns a human-readable difficulty estimate.
    pub fn difficulty_description(&self) -> String {
        match self.estimated_difficulty() {
            None => "Unknown (pattern)".into(),
            Some(0..=1_000) => "Very Easy (< 1 second)".into(),
            Some(1_001..=100_000) => "Easy (seconds)".into(),
            Some(100_001..=10_000_000) => "Medium (minutes)".into(),
            Some(10_000_001..=1_000_000_000) => "Hard (hours)".into(),
            Some(_) => "Very Hard (days or more)".into(),
        }
    }
}

impl fmt::Display for MatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.text())
    }
}
