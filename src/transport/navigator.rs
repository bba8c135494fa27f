use tokio::sync::mpsc;
use tracing::{info, warn};

/// Receiver of forced navigations, e.g. "go to the login page" after a 401.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Logs the redirect and does nothing else. Default for headless callers.
#[derive(Debug, Clone, Default)]
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn navigate(&self, path: &str) {
        info!(path, "session ended, sign in again");
    }
}

/// Forwards each navigation to a UI loop over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNavigator {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelNavigator {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, path: &str) {
        if self.tx.send(path.to_string()).is_err() {
            warn!(path, "navigation receiver dropped");
        }
    }
}
