//! Intent classification and model routing

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use tracing::info;

/// What a query is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Prices, costs, fees
    Pricing,
    /// Errors and failures
    Troubleshooting,
    /// Anything else
    General,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pricing => "pricing",
            Self::Troubleshooting => "troubleshooting",
            Self::General => "general",
        })
    }
}

fn pricing_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)price|cost|fee").expect("pricing pattern is valid"))
}

fn troubleshooting_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)error|issue|problem|fail").expect("troubleshooting pattern is valid")
    })
}

/// Keyword-based intent
pub fn classify_intent(query: &str) -> Intent {
    if pricing_regex().is_match(query) {
        Intent::Pricing
    } else if troubleshooting_regex().is_match(query) {
        Intent::Troubleshooting
    } else {
        Intent::General
    }
}

/// Model used for an intent
pub fn route_to_model(intent: Intent) -> &'static str {
    let model = match intent {
        Intent::Pricing => "gpt-4",
        Intent::Troubleshooting | Intent::General => "gpt-3.5-turbo",
    };
    info!(intent = %intent, model, "Routing query");
    model
}
