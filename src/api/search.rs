use regex::Regex;
use std::sync::OnceLock;

/// How a free-form search box value is sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentLookup {
    All,
    Id(String),
    Title(String),
}

impl AssignmentLookup {
    /// A 36-character run of hex digits and hyphens is an identifier; any
    /// other non-empty text is a title substring.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.is_empty() {
            AssignmentLookup::All
        } else if looks_like_identifier(input) {
            AssignmentLookup::Id(input.to_string())
        } else {
            AssignmentLookup::Title(input.to_string())
        }
    }
}

pub fn looks_like_identifier(input: &str) -> bool {
    static IDENTIFIER_RE: OnceLock<Regex> = OnceLock::new();
    IDENTIFIER_RE
        .get_or_init(|| Regex::new(r"^[0-9a-fA-F-]{36}$").unwrap())
        .is_match(input)
}
