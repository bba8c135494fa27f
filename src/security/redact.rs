use regex::Regex;
use std::sync::OnceLock;

/// Mask credential-looking values before they reach the logs.
pub fn redact_secrets(message: &str) -> String {
    static REDACTION_RE: OnceLock<Regex> = OnceLock::new();
    let regex = REDACTION_RE.get_or_init(|| {
        Regex::new(r#"(?i)(bearer\s+|"?(?:token|secret|password|key)"?\s*[=:]\s*"?)([^\s",}]+)"#).unwrap()
    });

    regex
        .replace_all(message, |caps: &regex::Captures| format!("{}[REDACTED]", &caps[1]))
        .into_owned()
}
