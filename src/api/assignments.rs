use serde::{Deserialize, Serialize};

use crate::api::search::AssignmentLookup;
use crate::error::Result;
use crate::transport::{ApiClient, ApiRequest};

const ASSIGNMENT_ROUTE: &str = "/EssayAssignment";

/// Essay prompt/quiz. `title_context` is the authoritative title field;
/// `title` and `description` are read when the backend supplies them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub title_context: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub word_limit: Option<u32>,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub base_score: Option<f64>,
    #[serde(default)]
    pub total_score: Option<f64>,
    #[serde(default)]
    pub scoring_criteria: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Writable assignment fields. Also used for partial updates: `None` is omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scoring_criteria: Option<String>,
}

pub type NewAssignment = AssignmentFields;
pub type AssignmentUpdate = AssignmentFields;

pub(crate) fn search_request(lookup: &AssignmentLookup) -> ApiRequest {
    let req = ApiRequest::get(ASSIGNMENT_ROUTE);
    match lookup {
        AssignmentLookup::All => req,
        AssignmentLookup::Id(id) => req.query_opt("id", Some(id)),
        AssignmentLookup::Title(title) => req.query_opt("title", Some(title)),
    }
}

impl ApiClient {
    pub async fn get_assignments(&self) -> Result<Vec<Assignment>> {
        self.send_json(ApiRequest::get(ASSIGNMENT_ROUTE)).await
    }

    pub async fn get_assignment(&self, id: &str) -> Result<Assignment> {
        self.send_json(ApiRequest::get(format!("{ASSIGNMENT_ROUTE}/{id}"))).await
    }

    /// Search box lookup: identifier-shaped input queries by `id`, anything
    /// else by `title`, and empty input lists everything.
    pub async fn search_assignments(&self, input: &str) -> Result<Vec<Assignment>> {
        let lookup = AssignmentLookup::parse(input);
        self.send_json(search_request(&lookup)).await
    }

    pub async fn create_assignment(&self, assignment: &NewAssignment) -> Result<Assignment> {
        self.send_json(ApiRequest::post(ASSIGNMENT_ROUTE).json(assignment)?).await
    }

    pub async fn update_assignment(&self, id: &str, update: &AssignmentUpdate) -> Result<Option<Assignment>> {
        self.send_json_opt(ApiRequest::put(format!("{ASSIGNMENT_ROUTE}/{id}")).json(update)?)
            .await
    }

    pub async fn delete_assignment(&self, id: &str) -> Result<()> {
        self.send_unit(ApiRequest::delete(format!("{ASSIGNMENT_ROUTE}/{id}"))).await
    }
}
