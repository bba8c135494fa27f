pub mod api;
pub mod config;
pub mod error;
pub mod security;
pub mod transport;
pub mod utils;

pub use config::{ApiKeySurface, ClientConfig};
pub use error::{ApiError, Result};
pub use security::{Credential, Session};
pub use transport::{ApiClient, Navigator};

// Crate version exposed for runtime queries
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
