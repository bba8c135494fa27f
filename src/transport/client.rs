use std::sync::Arc;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::config::{ApiKeySurface, ClientConfig};
use crate::error::{ApiError, Result};
use crate::security::redact::redact_secrets;
use crate::security::session::Session;
use crate::security::storage::FileStorage;
use crate::transport::navigator::{LoggingNavigator, Navigator};
use crate::transport::pipeline::{
    BearerAuthStage, ContentTypeStage, RequestIdStage, RequestStage, ResponseStage, UnauthorizedStage,
};
use crate::transport::{ApiRequest, RawResponse, RequestBody};

struct Inner {
    http: Client,
    config: ClientConfig,
    session: Session,
    request_stages: Vec<Arc<dyn RequestStage>>,
    response_stages: Vec<Arc<dyn ResponseStage>>,
}

/// The one configured request pipeline shared by every resource call.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.config.base_url)
            .field("request_stages", &self.inner.request_stages.iter().map(|s| s.name()).collect::<Vec<_>>())
            .field("response_stages", &self.inner.response_stages.iter().map(|s| s.name()).collect::<Vec<_>>())
            .finish()
    }
}

pub struct ApiClientBuilder {
    config: ClientConfig,
    session: Session,
    navigator: Arc<dyn Navigator>,
    request_stages: Vec<Arc<dyn RequestStage>>,
    response_stages: Vec<Arc<dyn ResponseStage>>,
}

impl ApiClientBuilder {
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    /// Runs after the built-in request stages.
    pub fn request_stage(mut self, stage: Arc<dyn RequestStage>) -> Self {
        self.request_stages.push(stage);
        self
    }

    /// Runs after the built-in response stages.
    pub fn response_stage(mut self, stage: Arc<dyn ResponseStage>) -> Self {
        self.response_stages.push(stage);
        self
    }

    pub fn build(self) -> Result<ApiClient> {
        Url::parse(&self.config.base_url)
            .map_err(|e| ApiError::InvalidRequest(format!("invalid base url {}: {e}", self.config.base_url)))?;

        let http = Client::builder()
            .timeout(self.config.timeout())
            .build()
            .map_err(ApiError::Network)?;

        let mut request_stages: Vec<Arc<dyn RequestStage>> = vec![
            Arc::new(RequestIdStage),
            Arc::new(BearerAuthStage::new(self.session.clone())),
            Arc::new(ContentTypeStage::new(&self.config.default_content_type)?),
        ];
        request_stages.extend(self.request_stages);

        let mut response_stages: Vec<Arc<dyn ResponseStage>> = vec![Arc::new(UnauthorizedStage::new(
            self.session.clone(),
            self.navigator,
            self.config.login_path.clone(),
        ))];
        response_stages.extend(self.response_stages);

        debug!(
            base_url = %self.config.base_url,
            timeout_secs = self.config.timeout_secs,
            "api client initialized"
        );

        Ok(ApiClient {
            inner: Arc::new(Inner {
                http,
                config: self.config,
                session: self.session,
                request_stages,
                response_stages,
            }),
        })
    }
}

impl ApiClient {
    pub fn builder(config: ClientConfig, session: Session) -> ApiClientBuilder {
        ApiClientBuilder {
            config,
            session,
            navigator: Arc::new(LoggingNavigator),
            request_stages: Vec::new(),
            response_stages: Vec::new(),
        }
    }

    /// Default pipeline with a logging navigator.
    pub fn new(config: ClientConfig, session: Session) -> Result<Self> {
        Self::builder(config, session).build()
    }

    /// Client whose session is restored from the configured session file.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let storage = match &config.session_file {
            Some(path) => FileStorage::new(path),
            None => FileStorage::default_location()?,
        };
        let session = Session::restore(Arc::new(storage))?;
        Self::new(config, session)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    pub(crate) fn api_key_surface(&self) -> ApiKeySurface {
        self.inner.config.api_key_surface
    }

    /// Run the full pipeline for one request.
    pub async fn execute(&self, mut req: ApiRequest) -> Result<RawResponse> {
        for stage in &self.inner.request_stages {
            trace!(stage = stage.name(), "request stage");
            stage.apply(&mut req).await?;
        }

        let mut outcome = self.dispatch(&req).await;

        for stage in &self.inner.response_stages {
            trace!(stage = stage.name(), "response stage");
            outcome = stage.inspect(&req, outcome).await;
        }
        outcome
    }

    /// Execute and decode the body as `T`.
    pub async fn send_json<T: DeserializeOwned>(&self, req: ApiRequest) -> Result<T> {
        self.execute(req).await?.decode()
    }

    /// Execute and decode the body as `T` when there is one.
    pub async fn send_json_opt<T: DeserializeOwned>(&self, req: ApiRequest) -> Result<Option<T>> {
        self.execute(req).await?.decode_opt()
    }

    /// Execute and discard the body.
    pub async fn send_unit(&self, req: ApiRequest) -> Result<()> {
        self.execute(req).await.map(|_| ())
    }

    async fn dispatch(&self, req: &ApiRequest) -> Result<RawResponse> {
        let url = self.inner.config.url_for(&req.path_and_query());
        let url = Url::parse(&url).map_err(|e| ApiError::InvalidRequest(format!("invalid url {url}: {e}")))?;

        debug!(
            method = %req.method,
            path = %req.path,
            request_id = req.request_id().unwrap_or(""),
            "sending request"
        );

        let mut builder = self
            .inner
            .http
            .request(req.method.clone(), url)
            .headers(req.headers.clone());

        builder = match &req.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.body(serde_json::to_vec(value)?),
            RequestBody::Multipart(form) => builder.multipart(form.to_reqwest()?),
        };

        let resp = builder.send().await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await?;

        debug!(
            method = %req.method,
            path = %req.path,
            status = status.as_u16(),
            bytes = body.len(),
            "response received"
        );

        if !status.is_success() {
            let body = String::from_utf8_lossy(&body).into_owned();
            debug!(status = status.as_u16(), body = %redact_secrets(&body), "request failed");
            return Err(ApiError::Status { status, body });
        }

        Ok(RawResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}
