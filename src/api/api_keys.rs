use serde::{Deserialize, Serialize};

use crate::api::ai_models::AiModel;
use crate::config::ApiKeySurface;
use crate::error::Result;
use crate::transport::{ApiClient, ApiRequest, MultipartForm};

const JSON_ROUTE: &str = "/ApiKey";
const MULTIPART_ROUTE: &str = "/api/ApiKey";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    pub id: String,
    pub service_type: String,
    pub key: String,
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_enabled: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(rename = "AIModels", alias = "aiModels", default)]
    pub ai_models: Vec<AiModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApiKey {
    pub service_type: String,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_ids: Option<Vec<String>>,
}

/// Partial update.
///
/// `model_ids: None` leaves the key's model associations untouched;
/// `Some(vec![])` asks the backend to remove them all.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_ids: Option<Vec<String>>,
}

fn route(surface: ApiKeySurface) -> &'static str {
    match surface {
        ApiKeySurface::Json => JSON_ROUTE,
        ApiKeySurface::Multipart => MULTIPART_ROUTE,
    }
}

pub(crate) fn create_form(key: &NewApiKey) -> MultipartForm {
    let form = MultipartForm::new()
        .text("serviceType", key.service_type.as_str())
        .text("key", key.key.as_str())
        .text_opt("secret", key.secret.as_deref())
        .text_opt("endpoint", key.endpoint.as_deref())
        .text_opt("description", key.description.as_deref())
        .text_opt("isEnabled", key.is_enabled);
    match &key.model_ids {
        Some(ids) => form.repeated("modelIds", ids.iter().map(String::as_str)),
        None => form,
    }
}

pub(crate) fn update_form(update: &ApiKeyUpdate) -> MultipartForm {
    let form = MultipartForm::new()
        .text_opt("serviceType", update.service_type.as_deref())
        .text_opt("key", update.key.as_deref())
        .text_opt("secret", update.secret.as_deref())
        .text_opt("endpoint", update.endpoint.as_deref())
        .text_opt("description", update.description.as_deref())
        .text_opt("isEnabled", update.is_enabled);
    match &update.model_ids {
        None => form,
        // A bare key keeps "clear all" distinguishable from "leave as is".
        Some(ids) if ids.is_empty() => form.text("modelIds", ""),
        Some(ids) => form.repeated("modelIds", ids.iter().map(String::as_str)),
    }
}

pub(crate) fn create_request(surface: ApiKeySurface, key: &NewApiKey) -> Result<ApiRequest> {
    let req = ApiRequest::post(route(surface));
    match surface {
        ApiKeySurface::Json => req.json(key),
        ApiKeySurface::Multipart => Ok(req.multipart(create_form(key))),
    }
}

pub(crate) fn update_request(surface: ApiKeySurface, id: &str, update: &ApiKeyUpdate) -> Result<ApiRequest> {
    let req = ApiRequest::put(format!("{}/{id}", route(surface)));
    match surface {
        ApiKeySurface::Json => req.json(update),
        ApiKeySurface::Multipart => Ok(req.multipart(update_form(update))),
    }
}

impl ApiClient {
    pub async fn get_api_keys(&self) -> Result<Vec<ApiKey>> {
        self.send_json(ApiRequest::get(route(self.api_key_surface()))).await
    }

    pub async fn get_api_key(&self, id: &str) -> Result<ApiKey> {
        let path = format!("{}/{id}", route(self.api_key_surface()));
        self.send_json(ApiRequest::get(path)).await
    }

    pub async fn create_api_key(&self, key: &NewApiKey) -> Result<ApiKey> {
        self.send_json(create_request(self.api_key_surface(), key)?).await
    }

    pub async fn update_api_key(&self, id: &str, update: &ApiKeyUpdate) -> Result<()> {
        self.send_unit(update_request(self.api_key_surface(), id, update)?).await
    }

    pub async fn delete_api_key(&self, id: &str) -> Result<()> {
        let path = format!("{}/{id}", route(self.api_key_surface()));
        self.send_unit(ApiRequest::delete(path)).await
    }
}
