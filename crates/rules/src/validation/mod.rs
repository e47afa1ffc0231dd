//! Structural validation for text rule documents.
//!
//! Returns a [`ValidationResult`] with errors (block loading) and warnings (advisory).

use std::collections::HashSet;

use atrust_core::{MAX_SEVERITY, MIN_SEVERITY};
use serde::{Deserialize, Serialize};

use crate::schema::{TextRuleSet, TEXT_PENALTY_CEILING, TEXT_RULES_KIND};

// ── Result types ────────────────────────────────────────────────────

/// Overall validation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

/// A blocking validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// JSON-path-like location, e.g. `"spec.rules[3].severity"`.
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// A non-blocking advisory warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationResult {
    pub(crate) fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            suggestion: None,
        });
    }

    pub(crate) fn error_with_suggestion(
        &mut self,
        path: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            suggestion: Some(suggestion.into()),
        });
    }

    pub(crate) fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            path: path.into(),
            message: message.into(),
        });
    }
}

// ── Public API ──────────────────────────────────────────────────────

/// Validate a parsed [`TextRuleSet`].
pub fn validate_rule_set(set: &TextRuleSet) -> ValidationResult {
    let mut result = ValidationResult::new();

    if set.kind != TEXT_RULES_KIND {
        if set.kind.eq_ignore_ascii_case(TEXT_RULES_KIND) {
            result.error_with_suggestion(
                "kind",
                format!("unknown kind '{}'", set.kind),
                format!("Did you mean '{}'?", TEXT_RULES_KIND),
            );
        } else {
            result.error("kind", format!("expected '{}', got '{}'", TEXT_RULES_KIND, set.kind));
        }
    }
    if set.api_version != "v1" {
        result.warn("apiVersion", format!("unrecognized apiVersion '{}'", set.api_version));
    }
    if set.metadata.id.trim().is_empty() {
        result.error("metadata.id", "id must not be empty");
    }
    if !set.metadata.enabled {
        result.warn("metadata.enabled", "rule set is disabled and will match nothing");
    }

    let spec = &set.spec;
    if spec.weight == 0 {
        result.error("spec.weight", "weight must be >= 1");
    }
    if spec.penalty_cap == 0 {
        result.error("spec.penalty_cap", "penalty_cap must be >= 1");
    } else if spec.penalty_cap > TEXT_PENALTY_CEILING {
        result.error(
            "spec.penalty_cap",
            format!(
                "penalty_cap must be <= {}, got {}",
                TEXT_PENALTY_CEILING, spec.penalty_cap
            ),
        );
    }
    if spec.rules.is_empty() {
        result.error("spec.rules", "at least one rule is required");
    }

    let mut seen_flags = HashSet::new();
    for (i, rule) in spec.rules.iter().enumerate() {
        let path = format!("spec.rules[{}]", i);
        if rule.pattern.trim().is_empty() {
            result.error(format!("{path}.pattern"), "pattern must not be empty");
        } else if let Err(e) = regex::Regex::new(&rule.pattern) {
            result.error(format!("{path}.pattern"), format!("invalid pattern: {e}"));
        }
        if rule.flag.trim().is_empty() {
            result.error(format!("{path}.flag"), "flag must not be empty");
        } else {
            if !seen_flags.insert(rule.flag.as_str()) {
                result.error(format!("{path}.flag"), format!("duplicate flag '{}'", rule.flag));
            }
            if !rule.flag.starts_with("text:") {
                result.warn(
                    format!("{path}.flag"),
                    format!("flag '{}' is not namespaced with 'text:'", rule.flag),
                );
            }
        }
        if !(MIN_SEVERITY..=MAX_SEVERITY).contains(&rule.severity) {
            result.error(
                format!("{path}.severity"),
                format!(
                    "severity must be within {}..={}, got {}",
                    MIN_SEVERITY, MAX_SEVERITY, rule.severity
                ),
            );
        }
    }

    result
}
