use crate::api_config::ApiConfig;
use crate::constants::{api, config, dashboard};
use crate::error::{DashError, Result};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use toml;

/// 应用配置结构
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub dashboard: DashboardConfig,
}

/// 服务端相关配置
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

/// 面板相关配置
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DashboardConfig {
    pub window_days: u32,
    pub output_dir: String,
    pub refresh_interval_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_offset_minutes: Option<i32>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                base_url: api::DEFAULT_BASE_URL.to_string(),
                timeout_secs: api::http::DEFAULT_TIMEOUT,
            },
            dashboard: DashboardConfig {
                window_days: dashboard::DEFAULT_WINDOW_DAYS,
                output_dir: dashboard::DEFAULT_OUTPUT_DIR.to_string(),
                refresh_interval_secs: dashboard::DEFAULT_REFRESH_INTERVAL,
                utc_offset_minutes: None,
            },
        }
    }
}

impl AppConfig {
    /// 智能查找并加载配置文件
    /// 按优先级查找：dashboard.toml -> backups-dash.toml -> .backups-dash.toml
    pub fn find_and_load_config() -> Result<Self> {
        Self::find_in_dir(Path::new("."))
    }

    /// 在指定目录中按默认文件名查找配置
    pub fn find_in_dir(dir: &Path) -> Result<Self> {
        for config_file in &config::CONFIG_FILE_CANDIDATES {
            let path = dir.join(config_file);
            if path.exists() {
                tracing::info!("找到配置文件: {}", path.display());
                return Self::load_from_file(&path);
            }
        }

        tracing::warn!("未找到配置文件");
        Err(DashError::ConfigNotFound)
    }

    /// 优先加载指定路径，不存在时按默认文件名查找
    pub fn load_or_find<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            tracing::info!("使用配置文件: {}", path.as_ref().display());
            Self::load_from_file(path)
        } else {
            Self::find_and_load_config()
        }
    }

    /// 从指定文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;

        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_toml_with_comments();
        fs::write(&path, content)?;
        Ok(())
    }

    /// 生成带注释的TOML配置
    fn to_toml_with_comments(&self) -> String {
        const TEMPLATE: &str = include_str!("../templates/config.toml.template");

        let utc_offset_line = match self.dashboard.utc_offset_minutes {
            Some(minutes) => format!("utc_offset_minutes = {minutes}"),
            None => "# utc_offset_minutes = 0".to_string(),
        };

        TEMPLATE
            .replace("{base_url}", &self.server.base_url)
            .replace("{timeout_secs}", &self.server.timeout_secs.to_string())
            .replace("{window_days}", &self.dashboard.window_days.to_string())
            .replace("{output_dir}", &self.dashboard.output_dir)
            .replace(
                "{refresh_interval_secs}",
                &self.dashboard.refresh_interval_secs.to_string(),
            )
            .replace("{utc_offset_line}", &utc_offset_line)
    }

    /// 校验配置取值
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.server.base_url)?;

        if self.server.timeout_secs == 0 {
            return Err(DashError::invalid_config("timeout_secs 必须大于0"));
        }
        if self.dashboard.window_days == 0 {
            return Err(DashError::invalid_config("window_days 必须大于0"));
        }
        if self.dashboard.refresh_interval_secs == 0 {
            return Err(DashError::invalid_config("refresh_interval_secs 必须大于0"));
        }
        if let Some(minutes) = self.dashboard.utc_offset_minutes {
            if minutes.abs() >= 24 * 60 {
                return Err(DashError::invalid_config(format!(
                    "utc_offset_minutes 超出范围: {minutes}"
                )));
            }
        }

        Ok(())
    }

    /// 获取API配置
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::with_base_url(&self.server.base_url)
    }

    /// 获取HTML输出目录
    pub fn get_output_dir(&self) -> PathBuf {
        PathBuf::from(&self.dashboard.output_dir)
    }

    /// 确保输出目录存在
    pub fn ensure_output_dir(&self) -> Result<PathBuf> {
        let dir = self.get_output_dir();
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// 显示用的时区偏移，未配置时使用本机时区
    pub fn display_offset(&self) -> FixedOffset {
        self.dashboard
            .utc_offset_minutes
            .and_then(|minutes| FixedOffset::east_opt(minutes * 60))
            .unwrap_or_else(crate::format::local_offset)
    }
}
