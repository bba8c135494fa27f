use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::transport::{ApiClient, ApiRequest};

const STUDENT_ROUTE: &str = "/Student";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    /// Student number, distinct from the record id.
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub class_id: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    pub name: String,
    pub student_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Partial update; only `Some` fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentFilter {
    pub class_id: Option<String>,
    pub search_term: Option<String>,
}

pub(crate) fn list_request(filter: &StudentFilter) -> ApiRequest {
    ApiRequest::get(STUDENT_ROUTE)
        .query_opt("classId", filter.class_id.as_deref())
        .query_opt("searchTerm", filter.search_term.as_deref())
}

impl ApiClient {
    /// `GET /Student`, optionally narrowed by class and search term.
    pub async fn get_students(&self, filter: &StudentFilter) -> Result<Vec<Student>> {
        self.send_json(list_request(filter)).await
    }

    pub async fn get_student(&self, id: &str) -> Result<Student> {
        self.send_json(ApiRequest::get(format!("{STUDENT_ROUTE}/{id}"))).await
    }

    pub async fn create_student(&self, student: &NewStudent) -> Result<Student> {
        self.send_json(ApiRequest::post(STUDENT_ROUTE).json(student)?).await
    }

    /// `None` when the backend answers 204 without echoing the record.
    pub async fn update_student(&self, id: &str, update: &StudentUpdate) -> Result<Option<Student>> {
        self.send_json_opt(ApiRequest::put(format!("{STUDENT_ROUTE}/{id}")).json(update)?)
            .await
    }

    pub async fn delete_student(&self, id: &str) -> Result<()> {
        self.send_unit(ApiRequest::delete(format!("{STUDENT_ROUTE}/{id}"))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_request_only_search_term() {
        let req = list_request(&StudentFilter {
            class_id: None,
            search_term: Some("abc".into()),
        });
        assert_eq!(req.path_and_query(), "/Student?searchTerm=abc");
    }

    #[test]
    fn test_list_request_empty_filters_mean_no_constraint() {
        let req = list_request(&StudentFilter {
            class_id: Some(String::new()),
            search_term: None,
        });
        assert_eq!(req.path_and_query(), "/Student");
    }

    #[test]
    fn test_list_request_both_filters() {
        let req = list_request(&StudentFilter {
            class_id: Some("c-1".into()),
            search_term: Some("li".into()),
        });
        assert_eq!(req.path_and_query(), "/Student?classId=c-1&searchTerm=li");
    }

    #[test]
    fn test_update_sends_only_present_fields() {
        let update = StudentUpdate {
            email: Some("a@b.cn".into()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"email": "a@b.cn"}));
    }

    #[test]
    fn test_student_decodes_wire_names() {
        let s: Student = serde_json::from_value(json!({
            "id": "s1",
            "name": "Li Lei",
            "studentId": "2024001",
            "classId": "c1",
            "className": "Class 3"
        }))
        .unwrap();
        assert_eq!(s.student_id, "2024001");
        assert_eq!(s.class_name.as_deref(), Some("Class 3"));
        assert_eq!(s.phone, None);
    }
}
