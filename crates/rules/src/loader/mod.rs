//! Loading text rule documents from YAML files or the bundled default.

mod core;
mod error;


pub use self::core::{default_rule_set, load_rule_set, parse_rule_set, DEFAULT_RULES_YAML};
pub use self::error::{Result, RuleError};
