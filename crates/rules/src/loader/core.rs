//! Rule document loading: bundled default table and filesystem documents.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::schema::TextRuleSet;
use crate::validation::validate_rule_set;

use super::error::{Result, RuleError};

/// The bundled scam-intent table used when no rule file is configured.
pub const DEFAULT_RULES_YAML: &str = include_str!("../../../../data/rules/text/scam-intent.yml");

/// Parse and validate a TextRules document from YAML.
///
/// Validation errors are joined into a single [`RuleError::Validation`].
pub fn parse_rule_set(yaml: &str) -> Result<TextRuleSet> {
    let set: TextRuleSet = serde_yaml::from_str(yaml)?;
    let result = validate_rule_set(&set);
    if !result.valid {
        let joined = result
            .errors
            .iter()
            .map(|e| {
                if e.path.is_empty() {
                    e.message.clone()
                } else {
                    format!("{}: {}", e.path, e.message)
                }
            })
            .collect::<Vec<_>>()
            .join("; ");
        return Err(RuleError::Validation(joined));
    }
    Ok(set)
}

/// Load a TextRules document from disk.
pub fn load_rule_set(path: &Path) -> Result<TextRuleSet> {
    let yaml = fs::read_to_string(path)?;
    let set = parse_rule_set(&yaml)?;
    info!(
        rule_id = %set.metadata.id,
        rules = set.spec.rules.len(),
        path = %path.display(),
        "loaded text rules"
    );
    Ok(set)
}

/// The bundled default rule set.
pub fn default_rule_set() -> Result<TextRuleSet> {
    parse_rule_set(DEFAULT_RULES_YAML)
}
