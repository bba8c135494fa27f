use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::transport::{ApiClient, ApiRequest};

const CLASS_ROUTE: &str = "/Class";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub student_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewClass {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ApiClient {
    pub async fn get_classes(&self) -> Result<Vec<Class>> {
        self.send_json(ApiRequest::get(CLASS_ROUTE)).await
    }

    pub async fn get_class(&self, id: &str) -> Result<Class> {
        self.send_json(ApiRequest::get(format!("{CLASS_ROUTE}/{id}"))).await
    }

    pub async fn create_class(&self, class: &NewClass) -> Result<Class> {
        self.send_json(ApiRequest::post(CLASS_ROUTE).json(class)?).await
    }

    pub async fn update_class(&self, id: &str, update: &ClassUpdate) -> Result<Option<Class>> {
        self.send_json_opt(ApiRequest::put(format!("{CLASS_ROUTE}/{id}")).json(update)?)
            .await
    }

    pub async fn delete_class(&self, id: &str) -> Result<()> {
        self.send_unit(ApiRequest::delete(format!("{CLASS_ROUTE}/{id}"))).await
    }
}
