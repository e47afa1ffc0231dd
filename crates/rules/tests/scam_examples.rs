//! Integration tests running realistic messages through the bundled
//! scam-intent table.

use atrust_rules::{default_rule_set, CompiledRuleSet, RuleMatch, RuleMatcher};

fn matcher() -> CompiledRuleSet {
    let set = default_rule_set().expect("bundled rules parse");
    CompiledRuleSet::compile(&set).expect("bundled rules compile")
}

fn flags(matches: &[RuleMatch]) -> Vec<&str> {
    matches.iter().map(|m| m.flag.as_str()).collect()
}

// ── impersonation ───────────────────────────────────────────

#[test]
fn bank_impersonation_message() {
    let text = "Dear customer, your account blocked due to pending KYC. \
                Click here to verify your account and share OTP. RBI notice.";
    let m = matcher().match_text(text);
    assert_eq!(
        flags(&m),
        vec![
            "text:otp_mentioned",
            "text:kyc_mentioned",
            "text:account_threat",
            "text:phishing_link",
            "text:account_verify",
            "text:impersonation",
        ]
    );
    assert!(m.iter().any(|x| x.severity >= 5));
}

// ── lottery ─────────────────────────────────────────────────

#[test]
fn lottery_message() {
    let text = "Congratulations! You have won prize money. Pay now via UPI, offer expires today.";
    let m = matcher().match_text(text);
    assert_eq!(
        flags(&m),
        vec![
            "text:upi_mentioned",
            "text:immediate_transfer",
            "text:lottery_scam",
            "text:urgency_pressure",
        ]
    );
}

// ── benign ──────────────────────────────────────────────────

#[test]
fn ordinary_conversation() {
    let text = "Running late, first meeting moved to 3pm. Pinned the agenda in the channel.";
    assert!(matcher().match_text(text).is_empty());
}
