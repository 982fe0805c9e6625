//! API配置模块 - 服务端端点与页面链接
use crate::constants::api;
use crate::views::template::fill;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// API端点配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEndpoints {
    /// 备份记录列表端点
    pub backups: String,
    /// 校验记录列表端点
    pub verifications: String,
    /// 服务配置列表端点
    pub services: String,
}

/// API配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// 基础URL
    pub base_url: String,
    /// API端点
    pub endpoints: ApiEndpoints,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::with_base_url(api::DEFAULT_BASE_URL)
    }
}

impl ApiConfig {
    /// 使用指定服务器地址创建配置
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            endpoints: ApiEndpoints {
                backups: api::endpoints::BACKUPS.to_string(),
                verifications: api::endpoints::VERIFICATIONS.to_string(),
                services: api::endpoints::SERVICES.to_string(),
            },
        }
    }

    /// 获取完整的端点URL
    pub fn get_endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// 获取备份列表完整URL
    pub fn get_backups_url(&self) -> String {
        self.get_endpoint_url(&self.endpoints.backups)
    }

    /// 获取校验列表完整URL
    pub fn get_verifications_url(&self) -> String {
        self.get_endpoint_url(&self.endpoints.verifications)
    }

    /// 获取服务配置完整URL
    pub fn get_services_url(&self) -> String {
        self.get_endpoint_url(&self.endpoints.services)
    }

    /// 获取所有端点信息，用于CLI帮助显示
    pub fn get_endpoints_info(&self) -> Vec<(&str, String)> {
        vec![
            ("服务器地址", self.base_url.clone()),
            ("备份列表", self.get_backups_url()),
            ("校验列表", self.get_verifications_url()),
            ("服务配置", self.get_services_url()),
        ]
    }
}

impl fmt::Display for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "当前API配置:")?;
        writeln!(f, "服务器地址: {}", self.base_url)?;
        writeln!(f, "\n主要端点:")?;
        for (name, url) in self.get_endpoints_info() {
            writeln!(f, "  {name}: {url}")?;
        }
        writeln!(f, "\n页面链接:")?;
        writeln!(f, "  备份日志: {}", api::links::BACKUP_LOG)?;
        writeln!(f, "  校验日志: {}", api::links::VERIFICATION_LOG)?;
        writeln!(f, "  文件下载: {}", api::links::DOWNLOAD)?;
        writeln!(f, "  备份详情: {}", api::links::DETAIL)?;
        Ok(())
    }
}

/// 对单个路径段做百分号编码
fn encode_segment(segment: &str) -> String {
    let Ok(mut url) = Url::parse("http://localhost/") else {
        return segment.to_string();
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().push(segment);
    }
    url.path().trim_start_matches('/').to_string()
}

fn link(pattern: &str, values: &[(&str, &str)]) -> String {
    let encoded: Vec<(&str, String)> = values
        .iter()
        .map(|(key, value)| (*key, encode_segment(value)))
        .collect();
    let pairs: Vec<(&str, &str)> = encoded
        .iter()
        .map(|(key, value)| (*key, value.as_str()))
        .collect();
    fill(pattern, &pairs)
}

/// 备份日志链接
pub fn backup_log_link(service: &str, id: &str) -> String {
    link(api::links::BACKUP_LOG, &[("service", service), ("id", id)])
}

/// 校验日志链接
pub fn verification_log_link(service: &str, id: &str) -> String {
    link(api::links::VERIFICATION_LOG, &[("service", service), ("id", id)])
}

/// 备份文件下载链接
pub fn download_link(service: &str, id: &str, filename: &str) -> String {
    link(
        api::links::DOWNLOAD,
        &[("service", service), ("id", id), ("filename", filename)],
    )
}

/// 备份详情页链接
pub fn detail_link(service: &str, id: &str) -> String {
    link(api::links::DETAIL, &[("service", service), ("id", id)])
}
