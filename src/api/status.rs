use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::transport::{ApiClient, ApiRequest};

const STATUS_ROUTE: &str = "/api/Status";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatus {
    pub server_status: String,
    pub server_time_utc: String,
    pub uptime: String,
    pub build: BuildInfo,
    pub application: ApplicationInfo,
    pub system: SystemInfo,
    pub request: RequestInfo,
    pub database_status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    pub version: String,
    pub git_commit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationInfo {
    pub environment: String,
    pub framework: String,
    pub process_id: u32,
    pub memory_usage: String,
    pub total_allocated_memory: String,
    pub thread_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub host_name: String,
    pub server_ip_addresses: String,
    pub os: String,
    pub os_architecture: String,
    pub processor_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestInfo {
    pub client_ip: String,
}

impl ApiClient {
    pub async fn get_server_status(&self) -> Result<ServerStatus> {
        self.send_json(ApiRequest::get(STATUS_ROUTE)).await
    }
}
