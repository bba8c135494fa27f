use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{ApiError, Result};
use crate::transport::{ApiClient, ApiRequest, MultipartForm};

const SUBMISSION_ROUTE: &str = "/EssaySubmission";
const SUBMISSION_SEARCH_ROUTE: &str = "/EssaySubmissionSearch";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionStatus {
    Submitted,
    Evaluating,
    Evaluated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub student_id: String,
    pub assignment_id: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub parsed_text: Option<String>,
    /// Per-model evaluation records; shape is owned by the backend.
    #[serde(default)]
    pub ai_results: Vec<Value>,
    #[serde(default)]
    pub judge_result: Option<String>,
    #[serde(default)]
    pub final_score: Option<f64>,
    pub status: SubmissionStatus,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub submission_date: Option<String>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub assignment_title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionFilter {
    pub assignment_id: Option<String>,
    pub student_id: Option<String>,
    /// Result-count cap.
    pub top: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub submission_id: String,
}

/// Scanned essay image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::InvalidRequest(format!("reading {}: {e}", path.display())))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let mime = mime_for(path).to_string();
        debug!(file = %file_name, mime = %mime, bytes = bytes.len(), "loaded essay image");
        Ok(Self { file_name, mime, bytes })
    }
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}

pub(crate) fn search_request(filter: &SubmissionFilter) -> ApiRequest {
    ApiRequest::get(SUBMISSION_SEARCH_ROUTE)
        .query_opt("assignmentId", filter.assignment_id.as_deref())
        .query_opt("studentId", filter.student_id.as_deref())
        .query_opt("top", filter.top.filter(|t| *t > 0))
}

/// Exactly three fields: assignment id, image, column count.
pub(crate) fn upload_form(assignment_id: &str, image: ImageUpload, column_count: u32) -> MultipartForm {
    MultipartForm::new()
        .text("essayAssignmentId", assignment_id)
        .file("imageFile", image.file_name, image.mime, image.bytes)
        .text("columnCount", column_count.to_string())
}

impl ApiClient {
    pub async fn search_submissions(&self, filter: &SubmissionFilter) -> Result<Vec<Submission>> {
        self.send_json(search_request(filter)).await
    }

    pub async fn get_submission(&self, id: &str) -> Result<Submission> {
        self.send_json(ApiRequest::get(format!("{SUBMISSION_ROUTE}/{id}"))).await
    }

    /// Upload a scanned essay; `column_count` tells the OCR how the page is laid out.
    pub async fn upload_submission(
        &self,
        assignment_id: &str,
        image: ImageUpload,
        column_count: u32,
    ) -> Result<UploadReceipt> {
        let form = upload_form(assignment_id, image, column_count);
        self.send_json(ApiRequest::post(SUBMISSION_ROUTE).multipart(form)).await
    }

    /// Queue the submission for AI evaluation.
    pub async fn evaluate_submission(&self, id: &str) -> Result<()> {
        self.send_unit(ApiRequest::post(format!("{SUBMISSION_ROUTE}/{id}/evaluate")))
            .await
    }

    /// Returns the updated submission if the backend sends one back.
    pub async fn update_submission_score(&self, id: &str, score: f64) -> Result<Option<Submission>> {
        let req = ApiRequest::put(format!("{SUBMISSION_ROUTE}/{id}")).json(&json!({ "finalScore": score }))?;
        self.send_json_opt(req).await
    }
}
