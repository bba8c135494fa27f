//! Typed resource access: one `ApiClient` method per backend operation.

pub mod ai_models;
pub mod api_keys;
pub mod assignments;
pub mod classes;
pub mod search;
pub mod status;
pub mod students;
pub mod submissions;

pub use ai_models::{AiModel, AiModelUsageSetting, NewUsageSetting, UsageSettingUpdate};
pub use api_keys::{ApiKey, ApiKeyUpdate, NewApiKey};
pub use assignments::{Assignment, AssignmentFields, AssignmentUpdate, NewAssignment};
pub use classes::{Class, ClassUpdate, NewClass};
pub use search::AssignmentLookup;
pub use status::ServerStatus;
pub use students::{NewStudent, Student, StudentFilter, StudentUpdate};
pub use submissions::{ImageUpload, Submission, SubmissionFilter, SubmissionStatus, UploadReceipt};
