//! Input and output guardrails
//!
//! Redacts personal data from user input, blocks a small list of toxic
//! words, and cleans up model output.

use regex::Regex;
use std::sync::OnceLock;
use tracing::warn;

/// Words that block input and flag output
pub const TOXIC_WORDS: [&str; 3] = ["idiot", "hate", "stupid"];

/// Output replacement for empty answers
pub const EMPTY_OUTPUT: &str = "[Error] Output was empty.";

/// Output replacement for answers containing toxic words
pub const INAPPROPRIATE_OUTPUT: &str = "[Warning] The output contains inappropriate content.";

const AI_DISCLAIMER: &str = "as an ai language model";

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b").expect("email pattern is valid")
    })
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\d{10,}\b").expect("phone pattern is valid"))
}

fn credit_card_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(?:\d[ -]*?){13,16}\b").expect("card pattern is valid"))
}

fn disclaimer_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^\s*as an ai language model,").expect("disclaimer pattern is valid"))
}

/// Redact emails, phone numbers and card numbers
pub fn sanitize_input(text: &str) -> String {
    let text = email_regex().replace_all(text, "[REDACTED_EMAIL]");
    let text = phone_regex().replace_all(&text, "[REDACTED_PHONE]");
    credit_card_regex()
        .replace_all(&text, "[REDACTED_CREDIT_CARD]")
        .into_owned()
}

/// Reason the text is toxic, if it is
pub fn detect_toxic_input(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    TOXIC_WORDS
        .iter()
        .find(|word| lower.contains(*word))
        .map(|word| format!("Toxic content detected: '{}'", word))
}

/// Whether the input may be sent to the model
pub fn validate_input(text: &str) -> bool {
    match detect_toxic_input(&sanitize_input(text)) {
        Some(reason) => {
            warn!(reason = %reason, "Blocked input");
            false
        }
        None => true,
    }
}

/// Clean up a model answer before showing it
pub fn validate_output(text: &str) -> String {
    if text.trim().is_empty() {
        return EMPTY_OUTPUT.to_string();
    }

    let lower = text.to_lowercase();
    if TOXIC_WORDS.iter().any(|w| lower.contains(w)) {
        return INAPPROPRIATE_OUTPUT.to_string();
    }
    if lower.contains(AI_DISCLAIMER) {
        return disclaimer_regex().replace(text, "").trim().to_string();
    }
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_redacts_personal_data() {
        let input = "Mail jane.doe@example.com or call 5551234567, card 4111 1111 1111 1111";
        let clean = sanitize_input(input);

        assert!(clean.contains("[REDACTED_EMAIL]"));
        assert!(clean.contains("[REDACTED_PHONE]"));
        assert!(clean.contains("[REDACTED_CREDIT_CARD]"));
        assert!(!clean.contains("example.com"));
        assert!(!clean.contains("4111"));
    }

    #[test]
    fn test_toxic_detection() {
        assert_eq!(
            detect_toxic_input("You are an IDIOT"),
            Some("Toxic content detected: 'idiot'".to_string())
        );
        assert!(!validate_input("I hate this"));
        assert!(validate_input("What is the refund policy?"));
    }

    #[test]
    fn test_validate_output() {
        assert_eq!(validate_output("   "), EMPTY_OUTPUT);
        assert_eq!(validate_output("That was stupid"), INAPPROPRIATE_OUTPUT);
        assert_eq!(
            validate_output("As an AI language model, I suggest a refund."),
            "I suggest a refund."
        );
        assert_eq!(validate_output("Refunds take 14 days."), "Refunds take 14 days.");
    }

    #[test]
    fn test_disclaimer_only_stripped_when_leading() {
        assert_eq!(
            validate_output("Note: as an AI language model I cannot browse."),
            "Note: as an AI language model I cannot browse."
        );
        assert_eq!(
            validate_output("As an AI language model I cannot browse."),
            "As an AI language model I cannot browse."
        );
        assert_eq!(
            validate_output("  as an AI language model, refunds take 14 days. "),
            "refunds take 14 days."
        );
    }
}
