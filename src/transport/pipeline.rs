use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::debug;
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::security::audit_log::AuditLogger;
use crate::security::session::Session;
use crate::transport::navigator::Navigator;
use crate::transport::{ApiRequest, Encoding, RawResponse, REQUEST_ID_HEADER};

/// Transform applied to every outgoing request, in pipeline order.
/// An error aborts the call and is returned unchanged.
#[async_trait]
pub trait RequestStage: Send + Sync {
    fn name(&self) -> &'static str;

    async fn apply(&self, req: &mut ApiRequest) -> Result<()>;
}

/// Observer/transform for every completed call, success or failure.
#[async_trait]
pub trait ResponseStage: Send + Sync {
    fn name(&self) -> &'static str;

    async fn inspect(&self, req: &ApiRequest, outcome: Result<RawResponse>) -> Result<RawResponse>;
}

/// Tags the request with a fresh `X-Request-Id` unless the caller set one.
#[derive(Debug, Clone, Default)]
pub struct RequestIdStage;

#[async_trait]
impl RequestStage for RequestIdStage {
    fn name(&self) -> &'static str {
        "request_id"
    }

    async fn apply(&self, req: &mut ApiRequest) -> Result<()> {
        if !req.headers.contains_key(REQUEST_ID_HEADER) {
            let id = HeaderValue::from_str(&Uuid::new_v4().to_string())
                .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
            req.headers.insert(REQUEST_ID_HEADER, id);
        }
        Ok(())
    }
}

/// Presents the session token as a bearer credential.
#[derive(Debug, Clone)]
pub struct BearerAuthStage {
    session: Session,
}

impl BearerAuthStage {
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

#[async_trait]
impl RequestStage for BearerAuthStage {
    fn name(&self) -> &'static str {
        "bearer_auth"
    }

    async fn apply(&self, req: &mut ApiRequest) -> Result<()> {
        let token = self.session.token().await;
        if token.is_empty() {
            req.headers.remove(AUTHORIZATION);
            return Ok(());
        }
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ApiError::InvalidRequest("session token is not a valid header value".into()))?;
        value.set_sensitive(true);
        req.headers.insert(AUTHORIZATION, value);
        Ok(())
    }
}

/// Sets the content type from the body's declared encoding.
///
/// JSON and empty bodies carry the configured default. Multipart bodies carry
/// no preset type; the transport writes `multipart/form-data` with its boundary.
#[derive(Debug, Clone)]
pub struct ContentTypeStage {
    json: HeaderValue,
}

impl ContentTypeStage {
    pub fn new(default_content_type: &str) -> Result<Self> {
        let json = HeaderValue::from_str(default_content_type)
            .map_err(|_| ApiError::InvalidRequest(format!("invalid content type: {default_content_type}")))?;
        Ok(Self { json })
    }
}

#[async_trait]
impl RequestStage for ContentTypeStage {
    fn name(&self) -> &'static str {
        "content_type"
    }

    async fn apply(&self, req: &mut ApiRequest) -> Result<()> {
        match req.body.encoding() {
            Encoding::Multipart => {
                req.headers.remove(CONTENT_TYPE);
            }
            Encoding::Json => {
                req.headers.insert(CONTENT_TYPE, self.json.clone());
            }
        }
        Ok(())
    }
}

/// On 401: drop the session, send the user to the login page, and still fail
/// the call with the original error.
pub struct UnauthorizedStage {
    session: Session,
    navigator: Arc<dyn Navigator>,
    login_path: String,
    audit: AuditLogger,
}

impl UnauthorizedStage {
    pub fn new(session: Session, navigator: Arc<dyn Navigator>, login_path: impl Into<String>) -> Self {
        Self {
            session,
            navigator,
            login_path: login_path.into(),
            audit: AuditLogger::new(),
        }
    }
}

#[async_trait]
impl ResponseStage for UnauthorizedStage {
    fn name(&self) -> &'static str {
        "unauthorized"
    }

    async fn inspect(&self, req: &ApiRequest, outcome: Result<RawResponse>) -> Result<RawResponse> {
        let err = match outcome {
            Err(err) if err.is_unauthorized() => err,
            other => return other,
        };

        let age = self.session.age_secs().await;
        self.audit
            .unauthorized_response(req.method.as_str(), &req.path, req.request_id(), age);
        if let Err(e) = self.session.clear().await {
            self.audit.session_clear_failed(&e.to_string());
        }
        self.audit.redirect_to_login(&self.login_path);
        self.navigator.navigate(&self.login_path);

        debug!(path = %req.path, "propagating 401 to caller");
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MultipartForm;
    use reqwest::header::HeaderMap;
    use reqwest::StatusCode;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNavigator {
        visits: Mutex<Vec<String>>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, path: &str) {
            self.visits.lock().unwrap().push(path.to_string());
        }
    }

    fn ok_response() -> RawResponse {
        RawResponse {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: b"[]".to_vec(),
        }
    }

    #[tokio::test]
    async fn test_bearer_attached_when_token_present() {
        let session = Session::in_memory();
        session.set_session("tok-1", "n", "p").await.unwrap();

        let mut req = ApiRequest::get("/Class");
        BearerAuthStage::new(session).apply(&mut req).await.unwrap();
        assert_eq!(req.headers.get(AUTHORIZATION).unwrap(), "Bearer tok-1");
    }

    #[tokio::test]
    async fn test_no_bearer_without_token() {
        let mut req = ApiRequest::get("/Class");
        req.headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer stale"));

        BearerAuthStage::new(Session::in_memory()).apply(&mut req).await.unwrap();
        assert!(req.headers.get(AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn test_invalid_token_aborts_request() {
        let session = Session::in_memory();
        session.set_session("bad\ntoken", "n", "p").await.unwrap();

        let mut req = ApiRequest::get("/Class");
        let err = BearerAuthStage::new(session).apply(&mut req).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_content_type_json_and_multipart() {
        let stage = ContentTypeStage::new("application/json").unwrap();

        let mut req = ApiRequest::post("/Class").json(&serde_json::json!({"name": "x"})).unwrap();
        stage.apply(&mut req).await.unwrap();
        assert_eq!(req.headers.get(CONTENT_TYPE).unwrap(), "application/json");

        let mut req = ApiRequest::post("/EssaySubmission").multipart(MultipartForm::new().text("a", "b"));
        req.headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        stage.apply(&mut req).await.unwrap();
        assert!(req.headers.get(CONTENT_TYPE).is_none());
    }

    #[tokio::test]
    async fn test_request_id_is_kept_when_preset() {
        let mut req = ApiRequest::get("/api/Status");
        RequestIdStage.apply(&mut req).await.unwrap();
        let first = req.request_id().unwrap().to_string();
        assert_eq!(first.len(), 36);

        RequestIdStage.apply(&mut req).await.unwrap();
        assert_eq!(req.request_id(), Some(first.as_str()));
    }

    #[tokio::test]
    async fn test_unauthorized_clears_and_navigates_once() {
        let session = Session::in_memory();
        session.set_session("tok", "n", "p").await.unwrap();
        let nav = Arc::new(RecordingNavigator::default());
        let stage = UnauthorizedStage::new(session.clone(), nav.clone(), "/login");

        let req = ApiRequest::get("/Student");
        let outcome = Err(ApiError::Status {
            status: StatusCode::UNAUTHORIZED,
            body: String::new(),
        });
        let err = stage.inspect(&req, outcome).await.unwrap_err();

        assert!(err.is_unauthorized());
        assert!(!session.is_authenticated().await);
        assert_eq!(*nav.visits.lock().unwrap(), vec!["/login".to_string()]);
    }

    #[tokio::test]
    async fn test_other_outcomes_pass_through() {
        let session = Session::in_memory();
        session.set_session("tok", "n", "p").await.unwrap();
        let nav = Arc::new(RecordingNavigator::default());
        let stage = UnauthorizedStage::new(session.clone(), nav.clone(), "/login");
        let req = ApiRequest::get("/Student");

        let ok = stage.inspect(&req, Ok(ok_response())).await.unwrap();
        assert_eq!(ok.body, b"[]");

        let err = stage
            .inspect(
                &req,
                Err(ApiError::Status {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: "boom".into(),
                }),
            )
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));

        assert!(session.is_authenticated().await);
        assert!(nav.visits.lock().unwrap().is_empty());
    }
}
