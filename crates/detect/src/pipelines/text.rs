use atrust_core::{DetectionResult, Modality};
use atrust_rules::RuleMatcher;

use crate::normalize::normalize_rule_matches;

pub const EVIDENCE_TYPE: &str = "scam_intent_rules";

pub fn scan(matcher: &dyn RuleMatcher, text: &str) -> DetectionResult {
    let matches = matcher.match_text(text);
    normalize_rule_matches(Modality::Text, EVIDENCE_TYPE, &matches, matcher.scoring())
}
