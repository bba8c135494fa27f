use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use essay_judge_client::api::{ImageUpload, StudentFilter};
use essay_judge_client::security::{FileStorage, Session};
use essay_judge_client::transport::{ApiRequest, ChannelNavigator, RequestStage};
use essay_judge_client::{ApiClient, ApiError, ClientConfig};
use mockito::{Matcher, Server};
use serde_json::json;

/// Records every request exactly as it leaves the pipeline.
#[derive(Default)]
struct CaptureStage {
    seen: Mutex<Vec<ApiRequest>>,
}

#[async_trait]
impl RequestStage for CaptureStage {
    fn name(&self) -> &'static str {
        "capture"
    }

    async fn apply(&self, req: &mut ApiRequest) -> essay_judge_client::Result<()> {
        self.seen.lock().unwrap().push(req.clone());
        Ok(())
    }
}

async fn signed_in(token: &str) -> Session {
    let session = Session::in_memory();
    session
        .set_session(token, "Zhang Wei", "13900000000")
        .await
        .unwrap();
    session
}

#[tokio::test]
async fn bearer_token_is_attached_while_signed_in() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/Class")
        .match_header("authorization", "Bearer token-abc")
        .match_header("content-type", "application/json")
        .match_header("x-request-id", Matcher::Regex("^[0-9a-f-]{36}$".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"id":"c1","name":"Class 1","studentCount":32}]"#)
        .create_async()
        .await;

    let client = ApiClient::new(ClientConfig::with_base_url(server.url()), signed_in("token-abc").await).unwrap();
    let classes = client.get_classes().await.expect("classes should load");

    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].student_count, Some(32));
    mock.assert_async().await;
}

#[tokio::test]
async fn no_authorization_header_when_signed_out() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/Status")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body(
            json!({
                "serverStatus": "Running",
                "serverTimeUtc": "2025-05-01T10:00:00Z",
                "uptime": "1.02:03:04",
                "build": {"version": "1.4.0", "gitCommit": "abc123"},
                "application": {
                    "environment": "Production",
                    "framework": ".NET 8",
                    "processId": 4242,
                    "memoryUsage": "120 MB",
                    "totalAllocatedMemory": "2 GB",
                    "threadCount": 31
                },
                "system": {
                    "hostName": "judge-01",
                    "serverIpAddresses": "10.0.0.5",
                    "os": "Linux",
                    "osArchitecture": "X64",
                    "processorCount": 8
                },
                "request": {"clientIp": "10.0.0.9"},
                "databaseStatus": "Connected"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = ApiClient::new(ClientConfig::with_base_url(server.url()), Session::in_memory()).unwrap();
    let status = client.get_server_status().await.expect("status should load");

    assert_eq!(status.build.version, "1.4.0");
    assert_eq!(status.system.processor_count, 8);
    mock.assert_async().await;
}

#[tokio::test]
async fn token_change_is_picked_up_by_next_request() {
    let mut server = Server::new_async().await;
    let first = server
        .mock("DELETE", "/Class/c1")
        .match_header("authorization", "Bearer old")
        .with_status(204)
        .create_async()
        .await;
    let second = server
        .mock("DELETE", "/Class/c2")
        .match_header("authorization", "Bearer new")
        .with_status(204)
        .create_async()
        .await;

    let session = signed_in("old").await;
    let client = ApiClient::new(ClientConfig::with_base_url(server.url()), session.clone()).unwrap();

    client.delete_class("c1").await.unwrap();
    session.set_session("new", "Zhang Wei", "139").await.unwrap();
    client.delete_class("c2").await.unwrap();

    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn unauthorized_clears_session_navigates_once_and_still_fails() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/Student")
        .with_status(401)
        .with_body("token expired")
        .expect(1)
        .create_async()
        .await;

    let dir = tempfile::TempDir::new().unwrap();
    let storage = Arc::new(FileStorage::new(dir.path().join("session.json")));
    let session = Session::restore(storage.clone()).unwrap();
    session.set_session("stale", "Zhang Wei", "139").await.unwrap();

    let (navigator, mut visits) = ChannelNavigator::new();
    let client = ApiClient::builder(ClientConfig::with_base_url(server.url()), session.clone())
        .navigator(Arc::new(navigator))
        .build()
        .unwrap();

    let err = client
        .get_students(&StudentFilter::default())
        .await
        .expect_err("401 must reach the caller");

    match &err {
        ApiError::Status { status, body } => {
            assert_eq!(status.as_u16(), 401);
            assert_eq!(body, "token expired");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let cred = session.get().await;
    assert!(cred.token.is_empty());
    assert!(cred.real_name.is_empty());
    assert!(cred.phone_number.is_empty());

    let restored = Session::restore(storage).unwrap();
    assert!(!restored.is_authenticated().await);

    assert_eq!(visits.try_recv().ok().as_deref(), Some("/login"));
    assert!(visits.try_recv().is_err(), "exactly one navigation per 401");
    mock.assert_async().await;
}

#[tokio::test]
async fn each_unauthorized_response_navigates() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/Class")
        .with_status(401)
        .expect(2)
        .create_async()
        .await;

    let (navigator, mut visits) = ChannelNavigator::new();
    let mut cfg = ClientConfig::with_base_url(server.url());
    cfg.login_path = "/auth/login".into();
    let client = ApiClient::builder(cfg, signed_in("t").await)
        .navigator(Arc::new(navigator))
        .build()
        .unwrap();

    assert!(client.get_classes().await.unwrap_err().is_unauthorized());
    assert!(client.get_classes().await.unwrap_err().is_unauthorized());

    assert_eq!(visits.try_recv().ok().as_deref(), Some("/auth/login"));
    assert_eq!(visits.try_recv().ok().as_deref(), Some("/auth/login"));
    assert!(visits.try_recv().is_err());
}

#[tokio::test]
async fn other_failures_leave_session_alone() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/Class")
        .with_status(403)
        .with_body("forbidden")
        .create_async()
        .await;

    let (navigator, mut visits) = ChannelNavigator::new();
    let session = signed_in("t").await;
    let client = ApiClient::builder(ClientConfig::with_base_url(server.url()), session.clone())
        .navigator(Arc::new(navigator))
        .build()
        .unwrap();

    let err = client.get_classes().await.unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(403));
    assert!(session.is_authenticated().await);
    assert!(visits.try_recv().is_err());
}

#[tokio::test]
async fn multipart_upload_uses_multipart_content_type() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/EssaySubmission")
        .match_header("authorization", "Bearer t")
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data; boundary=.+$".into()),
        )
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="essayAssignmentId"\r\n\r\na-1\r\n"#.into()),
            Matcher::Regex(r#"name="imageFile"; filename="essay.png""#.into()),
            Matcher::Regex(r#"name="columnCount"\r\n\r\n2\r\n"#.into()),
        ]))
        .with_status(200)
        .with_body(r#"{"submissionId":"s-77"}"#)
        .create_async()
        .await;

    let capture = Arc::new(CaptureStage::default());
    let client = ApiClient::builder(ClientConfig::with_base_url(server.url()), signed_in("t").await)
        .request_stage(capture.clone())
        .build()
        .unwrap();

    let receipt = client
        .upload_submission("a-1", ImageUpload::new("essay.png", "image/png", b"PNGDATA".to_vec()), 2)
        .await
        .expect("upload should succeed");
    assert_eq!(receipt.submission_id, "s-77");
    mock.assert_async().await;

    let seen = capture.seen.lock().unwrap();
    let form = seen[0].body.as_multipart().expect("multipart body");
    assert_eq!(form.field_names(), vec!["essayAssignmentId", "imageFile", "columnCount"]);
    assert!(seen[0].headers.get("content-type").is_none());
}

#[tokio::test]
async fn invalid_token_fails_before_sending() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/Class")
        .expect(0)
        .create_async()
        .await;

    let client = ApiClient::new(ClientConfig::with_base_url(server.url()), signed_in("bad\ntoken").await).unwrap();
    let err = client.get_classes().await.unwrap_err();

    assert!(matches!(err, ApiError::InvalidRequest(_)));
    mock.assert_async().await;
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/Class")
        .with_status(200)
        .with_body("<html>oops</html>")
        .create_async()
        .await;

    let client = ApiClient::new(ClientConfig::with_base_url(server.url()), Session::in_memory()).unwrap();
    assert!(matches!(client.get_classes().await, Err(ApiError::Decode(_))));
}
