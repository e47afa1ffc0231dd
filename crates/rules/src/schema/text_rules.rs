//! TextRules rule kind: keyword patterns with severities and the
//! penalty weighting applied to their matches.

use serde::{Deserialize, Serialize};

use super::CommonMetadata;

/// The `kind` value every text rule document must carry.
pub const TEXT_RULES_KIND: &str = "TextRules";

/// Highest penalty the text modality may ever contribute.
pub const TEXT_PENALTY_CEILING: u32 = 60;

/// Top-level TextRules document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TextRuleSet {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: CommonMetadata,
    pub spec: TextRuleSpec,
}

/// Specification section of a TextRules document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TextRuleSpec {
    /// Penalty points per unit of matched severity.
    #[serde(default = "default_weight")]
    pub weight: u32,
    /// Ceiling applied to the summed text penalty, `1..=TEXT_PENALTY_CEILING`.
    #[serde(default = "default_penalty_cap")]
    pub penalty_cap: u32,
    pub rules: Vec<TextRule>,
}

/// A single keyword pattern.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TextRule {
    /// Regular expression, matched case-insensitively.
    pub pattern: String,
    pub flag: String,
    /// 1..=5
    pub severity: u8,
}

fn default_weight() -> u32 {
    4
}

fn default_penalty_cap() -> u32 {
    TEXT_PENALTY_CEILING
}
