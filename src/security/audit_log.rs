use tracing::{info, warn};

/// Structured session and authorization events, emitted under the `audit` target.
#[derive(Debug, Clone, Default)]
pub struct AuditLogger;

impl AuditLogger {
    pub fn new() -> Self {
        Self
    }

    pub fn session_started(&self, real_name: &str) {
        info!(target: "audit", event = "session_started", real_name);
    }

    pub fn session_cleared(&self) {
        info!(target: "audit", event = "session_cleared");
    }

    /// `session_age_secs` is how long the rejected session had been in place, when known.
    pub fn unauthorized_response(
        &self,
        method: &str,
        path: &str,
        request_id: Option<&str>,
        session_age_secs: Option<i64>,
    ) {
        warn!(
            target: "audit",
            event = "unauthorized_response",
            method,
            path,
            request_id = request_id.unwrap_or(""),
            session_age_secs = session_age_secs.unwrap_or(-1)
        );
    }

    pub fn redirect_to_login(&self, login_path: &str) {
        info!(target: "audit", event = "redirect_to_login", login_path);
    }

    pub fn session_clear_failed(&self, error_msg: &str) {
        warn!(target: "audit", event = "session_clear_failed", error = error_msg);
    }
}
