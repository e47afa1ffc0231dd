//! Rule-based text matching for the text modality.
//!
//! This crate provides:
//! - YAML rule documents (`kind: TextRules`) with serde deserialization
//! - A loader for rule files plus the bundled default scam-intent table
//! - Structural validation with path-addressed errors
//! - A compiled, case-insensitive regex matcher behind the [`RuleMatcher`] trait

pub mod loader;
pub mod matcher;
pub mod schema;
pub mod validation;

pub use loader::{default_rule_set, load_rule_set, parse_rule_set, RuleError};
pub use matcher::{CompiledRuleSet, RuleMatch, RuleMatcher, RuleScoring};
pub use schema::{CommonMetadata, TextRule, TextRuleSet, TextRuleSpec, TEXT_PENALTY_CEILING};
