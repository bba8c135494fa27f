pub mod client;
pub mod multipart;
pub mod navigator;
pub mod pipeline;

use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

pub use client::{ApiClient, ApiClientBuilder};
pub use multipart::{FormPart, MultipartForm, PartValue};
pub use navigator::{ChannelNavigator, LoggingNavigator, Navigator};
pub use pipeline::{RequestStage, ResponseStage};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Wire encoding of a request body, chosen explicitly by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Json,
    Multipart,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(MultipartForm),
}

impl RequestBody {
    pub fn encoding(&self) -> Encoding {
        match self {
            RequestBody::Multipart(_) => Encoding::Multipart,
            RequestBody::Empty | RequestBody::Json(_) => Encoding::Json,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            RequestBody::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_multipart(&self) -> Option<&MultipartForm> {
        match self {
            RequestBody::Multipart(f) => Some(f),
            _ => None,
        }
    }
}

/// One outgoing call, before the pipeline stages have run.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Route relative to the base URL, e.g. `/Student/42`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Adds `name=value` only for a present, non-empty value. A missing filter
    /// means "no constraint", never "match empty".
    pub fn query_opt<V: ToString>(mut self, name: &str, value: Option<V>) -> Self {
        if let Some(v) = value {
            let v = v.to_string();
            if !v.is_empty() {
                self.query.push((name.to_string(), v));
            }
        }
        self
    }

    pub fn json<T: Serialize>(mut self, payload: &T) -> Result<Self> {
        self.body = RequestBody::Json(serde_json::to_value(payload)?);
        Ok(self)
    }

    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    /// Path plus encoded query, as it appears on the wire.
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let encoded = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.path, encoded)
    }

    pub fn request_id(&self) -> Option<&str> {
        self.headers.get(REQUEST_ID_HEADER).and_then(|v| v.to_str().ok())
    }
}

/// A successful (2xx) response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Like `decode`, but a blank body (204 No Content) yields `None`.
    pub fn decode_opt<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        self.decode().map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_opt_skips_absent_and_empty() {
        let req = ApiRequest::get("/Student")
            .query_opt("classId", None::<String>)
            .query_opt("searchTerm", Some("abc"))
            .query_opt("top", Some(""));
        assert_eq!(req.query, vec![("searchTerm".to_string(), "abc".to_string())]);
        assert_eq!(req.path_and_query(), "/Student?searchTerm=abc");
    }

    #[test]
    fn test_path_and_query_encodes_values() {
        let req = ApiRequest::get("/EssayAssignment").query_opt("title", Some("My Essay & more"));
        assert_eq!(req.path_and_query(), "/EssayAssignment?title=My%20Essay%20%26%20more");
    }

    #[test]
    fn test_body_encoding_follows_variant() {
        let req = ApiRequest::post("/Class").json(&json!({"name": "3A"})).unwrap();
        assert_eq!(req.body.encoding(), Encoding::Json);
        assert_eq!(req.body.as_json(), Some(&json!({"name": "3A"})));

        let req = ApiRequest::post("/EssaySubmission").multipart(MultipartForm::new().text("a", "b"));
        assert_eq!(req.body.encoding(), Encoding::Multipart);
        assert!(req.body.as_multipart().is_some());

        assert_eq!(RequestBody::Empty.encoding(), Encoding::Json);
    }

    #[test]
    fn test_raw_response_decode() {
        let raw = RawResponse {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: br#"{"submissionId":"s-1"}"#.to_vec(),
        };
        let v: Value = raw.decode().unwrap();
        assert_eq!(v["submissionId"], "s-1");

        let bad = RawResponse {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: b"<html>".to_vec(),
        };
        assert!(bad.decode::<Value>().is_err());
    }

    #[test]
    fn test_raw_response_decode_opt_blank_body() {
        let empty = RawResponse {
            status: StatusCode::NO_CONTENT,
            headers: HeaderMap::new(),
            body: Vec::new(),
        };
        assert_eq!(empty.decode_opt::<Value>().unwrap(), None);

        let filled = RawResponse {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: br#"{"id":"c1"}"#.to_vec(),
        };
        assert_eq!(filled.decode_opt::<Value>().unwrap(), Some(json!({"id": "c1"})));

        let bad = RawResponse {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: b"<html>".to_vec(),
        };
        assert!(bad.decode_opt::<Value>().is_err());
    }
}
