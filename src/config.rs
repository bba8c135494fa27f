use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Which API-key route version the backend deployment exposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeySurface {
    /// `/ApiKey` with JSON bodies.
    Json,
    /// `/api/ApiKey` with multipart bodies and model associations.
    #[default]
    Multipart,
}

impl std::str::FromStr for ApiKeySurface {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ApiKeySurface::Json),
            "multipart" => Ok(ApiKeySurface::Multipart),
            other => bail!("unknown api key surface: {other}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub login_path: String,
    pub default_content_type: String,
    pub api_key_surface: ApiKeySurface,
    /// Session file; `None` means `~/.essay-judge/session.json`.
    pub session_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            default_content_type: DEFAULT_CONTENT_TYPE.to_string(),
            api_key_surface: ApiKeySurface::default(),
            session_file: None,
        }
    }
}

impl ClientConfig {
    /// Defaults pointed at `base_url`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut cfg = Self {
            base_url: base_url.into(),
            ..Self::default()
        };
        cfg.normalize();
        cfg
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let raw = fs::read_to_string(path).context("reading config file")?;
        let mut cfg: ClientConfig = serde_json::from_str(&raw).context("parsing config JSON")?;
        cfg.normalize();
        Ok(cfg)
    }

    /// File (or defaults when no path is given), then environment overrides.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        cfg.apply_env()?;
        Ok(cfg)
    }

    /// Environment variables:
    /// - `ESSAY_API_BASE_URL`
    /// - `ESSAY_API_TIMEOUT_SECS`
    /// - `ESSAY_LOGIN_PATH`
    /// - `ESSAY_API_KEY_SURFACE` (`json` or `multipart`)
    /// - `ESSAY_SESSION_FILE`
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("ESSAY_API_BASE_URL") {
            self.base_url = url;
        }
        if let Ok(secs) = std::env::var("ESSAY_API_TIMEOUT_SECS") {
            self.timeout_secs = secs
                .parse()
                .with_context(|| format!("ESSAY_API_TIMEOUT_SECS is not a number: {secs}"))?;
        }
        if let Ok(path) = std::env::var("ESSAY_LOGIN_PATH") {
            self.login_path = path;
        }
        if let Ok(surface) = std::env::var("ESSAY_API_KEY_SURFACE") {
            self.api_key_surface = surface.parse()?;
        }
        if let Ok(file) = std::env::var("ESSAY_SESSION_FILE") {
            self.session_file = Some(PathBuf::from(file));
        }
        self.normalize();
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Absolute URL for a route such as `/Student/42`.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn normalize(&mut self) {
        while self.base_url.ends_with('/') {
            self.base_url.pop();
        }
    }
}
