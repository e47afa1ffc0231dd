//! Compiled text matcher.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::loader::{Result, RuleError};
use crate::schema::{TextRuleSet, TEXT_PENALTY_CEILING};

/// One matched rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMatch {
    pub flag: String,
    pub severity: u8,
}

/// Weighting applied to matches when turning them into a penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleScoring {
    pub weight: u32,
    pub penalty_cap: u32,
}

impl Default for RuleScoring {
    fn default() -> Self {
        Self {
            weight: 4,
            penalty_cap: TEXT_PENALTY_CEILING,
        }
    }
}

/// Rule-based text matcher.
///
/// Implemented by [`CompiledRuleSet`] and test doubles. A rule contributes
/// at most one match per text, in rule declaration order.
pub trait RuleMatcher: Send + Sync {
    fn match_text(&self, text: &str) -> Vec<RuleMatch>;

    fn scoring(&self) -> RuleScoring {
        RuleScoring::default()
    }
}

struct CompiledRule {
    regex: Regex,
    flag: String,
    severity: u8,
}

/// A [`TextRuleSet`] with every pattern compiled case-insensitively.
pub struct CompiledRuleSet {
    id: String,
    enabled: bool,
    scoring: RuleScoring,
    rules: Vec<CompiledRule>,
}

impl CompiledRuleSet {
    pub fn compile(set: &TextRuleSet) -> Result<Self> {
        let rules = set
            .spec
            .rules
            .iter()
            .map(|rule| {
                let regex = RegexBuilder::new(&rule.pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| RuleError::Pattern {
                        flag: rule.flag.clone(),
                        source,
                    })?;
                Ok(CompiledRule {
                    regex,
                    flag: rule.flag.clone(),
                    severity: rule.severity,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            id: set.metadata.id.clone(),
            enabled: set.metadata.enabled,
            scoring: RuleScoring {
                weight: set.spec.weight,
                penalty_cap: set.spec.penalty_cap,
            },
            rules,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl RuleMatcher for CompiledRuleSet {
    fn match_text(&self, text: &str) -> Vec<RuleMatch> {
        if !self.enabled {
            return Vec::new();
        }
        let matches: Vec<RuleMatch> = self
            .rules
            .iter()
            .filter(|rule| rule.regex.is_match(text))
            .map(|rule| RuleMatch {
                flag: rule.flag.clone(),
                severity: rule.severity,
            })
            .collect();
        debug!(rule_set = %self.id, matches = matches.len(), "text rules evaluated");
        matches
    }

    fn scoring(&self) -> RuleScoring {
        self.scoring
    }
}
