use dashboard_core::{
    api::ApiClient, config::AppConfig, dashboard::Dashboard, dashboard::RenderSettings,
    error::Result,
};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::cli::Commands;
use crate::commands;

#[derive(Debug, Clone)]
pub struct CliApp {
    pub config: AppConfig,
    pub config_path: PathBuf,
    pub api_client: ApiClient,
}

impl CliApp {
    /// 加载配置并初始化CLI应用
    pub fn new_with_config(config_path: &Path) -> Result<Self> {
        let config = AppConfig::load_or_find(config_path)?;
        Self::from_config(config, config_path.to_path_buf())
    }

    pub fn from_config(config: AppConfig, config_path: PathBuf) -> Result<Self> {
        let api_client = ApiClient::new(config.api_config(), config.server.timeout_secs)?;

        Ok(Self {
            config,
            config_path,
            api_client,
        })
    }

    /// 按配置创建空面板
    pub fn new_dashboard(&self) -> Dashboard {
        Dashboard::new(RenderSettings::from_config(&self.config))
    }

    /// 刷新面板数据
    ///
    /// 备份数据拿到了就继续显示，其余数据失败只记录警告。
    pub async fn refresh(&self, dashboard: &mut Dashboard) -> Result<()> {
        if let Err(e) = dashboard.refresh(&self.api_client).await {
            if dashboard.store().backups.is_none() {
                return Err(e);
            }
            warn!("⚠️  部分数据获取失败，显示的内容可能不完整: {}", e);
        }
        Ok(())
    }

    /// 运行应用命令
    pub async fn run_command(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Init { force } => crate::init::run_init(&self.config_path, force).await,
            Commands::ApiInfo => commands::run_api_info(self).await,
            Commands::Status { html } => commands::run_status(self, html).await,
            Commands::History { html } => commands::run_history(self, html).await,
            Commands::Detail { service, id, html } => {
                commands::run_detail(self, &service, &id, html).await
            }
            Commands::Watch {
                interval,
                output_dir,
            } => commands::run_watch(self, interval, output_dir).await,
            Commands::Dump { view, service, id } => {
                commands::run_dump(self, view, service, id).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_app_uses_configured_server() {
        let mut config = AppConfig::default();
        config.server.base_url = "http://backups.internal:9000/".to_string();
        let app = CliApp::from_config(config, PathBuf::from("dashboard.toml")).unwrap();

        assert_eq!(
            app.api_client.get_config().get_backups_url(),
            "http://backups.internal:9000/api/backup"
        );
    }

    #[test]
    fn test_app_loads_explicit_config_path() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("custom.toml");
        let mut config = AppConfig::default();
        config.dashboard.window_days = 3;
        config.save_to_file(&path).unwrap();

        let app = CliApp::new_with_config(&path).unwrap();
        assert_eq!(app.config.dashboard.window_days, 3);
        assert_eq!(app.new_dashboard().settings().window_days, 3);
    }
}
