use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::transport::{ApiClient, ApiRequest, MultipartForm};

const ALL_MODELS_ROUTE: &str = "/api/ApiKey/all-models";
const USAGE_SETTINGS_ROUTE: &str = "/api/ApiKey/model-usage-settings";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiModel {
    pub id: String,
    pub model_id: String,
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub api_key_id: Option<String>,
}

/// Which model serves a given purpose (e.g. OCR, scoring).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiModelUsageSetting {
    pub id: String,
    pub usage_type: String,
    pub ai_model_id: String,
    #[serde(default)]
    pub ai_model: Option<AiModel>,
    #[serde(default)]
    pub is_enabled: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUsageSetting {
    pub usage_type: String,
    pub ai_model_id: String,
    pub is_enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageSettingUpdate {
    pub usage_type: Option<String>,
    pub ai_model_id: Option<String>,
    pub is_enabled: Option<bool>,
}

pub(crate) fn create_form(setting: &NewUsageSetting) -> MultipartForm {
    MultipartForm::new()
        .text("usageType", setting.usage_type.as_str())
        .text("aiModelId", setting.ai_model_id.as_str())
        .text("isEnabled", setting.is_enabled.to_string())
}

pub(crate) fn update_form(update: &UsageSettingUpdate) -> MultipartForm {
    MultipartForm::new()
        .text_opt("usageType", update.usage_type.as_deref())
        .text_opt("aiModelId", update.ai_model_id.as_deref())
        .text_opt("isEnabled", update.is_enabled)
}

impl ApiClient {
    /// Every model known to the backend, across all API keys.
    pub async fn get_all_ai_models(&self) -> Result<Vec<AiModel>> {
        self.send_json(ApiRequest::get(ALL_MODELS_ROUTE)).await
    }

    pub async fn get_usage_settings(&self) -> Result<Vec<AiModelUsageSetting>> {
        self.send_json(ApiRequest::get(USAGE_SETTINGS_ROUTE)).await
    }

    pub async fn create_usage_setting(&self, setting: &NewUsageSetting) -> Result<AiModelUsageSetting> {
        let req = ApiRequest::post(USAGE_SETTINGS_ROUTE).multipart(create_form(setting));
        self.send_json(req).await
    }

    pub async fn update_usage_setting(&self, id: &str, update: &UsageSettingUpdate) -> Result<()> {
        let req = ApiRequest::put(format!("{USAGE_SETTINGS_ROUTE}/{id}")).multipart(update_form(update));
        self.send_unit(req).await
    }

    pub async fn delete_usage_setting(&self, id: &str) -> Result<()> {
        self.send_unit(ApiRequest::delete(format!("{USAGE_SETTINGS_ROUTE}/{id}")))
            .await
    }
}
