pub mod audit_log;
pub mod redact;
pub mod session;
pub mod storage;

pub use session::{Credential, Session};
pub use storage::{CredentialStorage, FileStorage, MemoryStorage, StorageError};
