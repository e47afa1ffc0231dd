//! YAML DSL schema types for text rule documents.

mod metadata;
mod text_rules;

pub use metadata::*;
pub use text_rules::*;
