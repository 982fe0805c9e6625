use crate::project_info::get_version_string;
use dashboard_core::{config::AppConfig, error::Result};
use std::path::Path;
use tracing::{info, warn};

/// 创建默认配置文件
pub async fn run_init(config_path: &Path, force: bool) -> Result<()> {
    info!("📊 {} 初始化", get_version_string());
    info!("============================");

    if !force && config_path.exists() {
        warn!("⚠️  配置文件已存在: {}", config_path.display());
        info!("如果您要重新初始化，请使用 --force 参数");
        info!("示例: backups-dash init --force");
        return Ok(());
    }

    let config = AppConfig::default();
    config.save_to_file(config_path)?;
    info!("   ✅ 创建配置文件: {}", config_path.display());

    info!("🎉 初始化完成！");
    info!("");
    info!("📝 接下来的步骤:");
    info!("   1️⃣  编辑 {}，把 base_url 指向备份服务", config_path.display());
    info!("   2️⃣  运行 'backups-dash status' 查看最近 {} 天的备份状态", config.dashboard.window_days);
    info!("   3️⃣  运行 'backups-dash watch' 持续生成 HTML 页面到 {}/", config.dashboard.output_dir);
    info!("");
    info!("💡 提示:");
    info!("   - 使用 'backups-dash api-info' 查看当前 API 端点");
    info!("   - 使用 'backups-dash --help' 查看所有可用命令");

    Ok(())
}
