//! Match rules for encoded addresses.
//!
//! Supports two strategies:
//! - Literal prefix: case-sensitive test against an upper-cased prefix,
//!   able to run on a truncated encoding
//! - Pattern: case-insensitive regular expression over the full address

mod rule;

pub use rule::{MatchRule, MatchRuleError};
