use crate::api_config::ApiConfig;
use crate::constants::api::http;
use crate::error::{DashError, Result};
use crate::records::{BackupWire, ServiceConfig, VerificationWire};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error};

/// 面板数据来源
pub trait DataSource {
    /// 获取全部备份记录
    fn fetch_backups(&self) -> impl Future<Output = Result<Vec<BackupWire>>>;

    /// 获取全部校验记录
    fn fetch_verifications(&self) -> impl Future<Output = Result<Vec<VerificationWire>>>;

    /// 获取服务配置
    fn fetch_services(&self) -> impl Future<Output = Result<Vec<ServiceConfig>>>;
}

/// API 客户端
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
}

impl ApiClient {
    /// 创建新的 API 客户端
    pub fn new(config: ApiConfig, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(http::USER_AGENT)
            .build()?;

        Ok(Self { client, config })
    }

    /// 获取当前API配置
    pub fn get_config(&self) -> &ApiConfig {
        &self.config
    }

    /// 发送GET请求并解析JSON响应
    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        debug!("请求{}: {}", what, url);
        let response = self.client.get(url).send().await?;

        if response.status().is_success() {
            let body = response.json().await?;
            Ok(body)
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            error!("获取{}失败: {} - {}", what, status, text);
            Err(DashError::api(format!("获取{what}失败: {status} - {text}")))
        }
    }
}

impl DataSource for ApiClient {
    async fn fetch_backups(&self) -> Result<Vec<BackupWire>> {
        let url = self.config.get_backups_url();
        self.get_json(&url, "备份列表").await
    }

    async fn fetch_verifications(&self) -> Result<Vec<VerificationWire>> {
        let url = self.config.get_verifications_url();
        self.get_json(&url, "校验列表").await
    }

    async fn fetch_services(&self) -> Result<Vec<ServiceConfig>> {
        let url = self.config.get_services_url();
        self.get_json(&url, "服务配置").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_keeps_config() {
        let client = ApiClient::new(ApiConfig::with_base_url("http://backups.local"), 5).unwrap();
        assert_eq!(client.get_config().base_url, "http://backups.local");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_an_http_error() {
        // 端口1上不会有服务监听
        let client = ApiClient::new(ApiConfig::with_base_url("http://127.0.0.1:1"), 2).unwrap();
        let result = client.fetch_backups().await;
        assert!(matches!(result, Err(DashError::Http(_))));
    }
}
