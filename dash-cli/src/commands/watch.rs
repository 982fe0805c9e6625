use crate::app::CliApp;
use chrono::Local;
use dashboard_core::api::DataSource;
use dashboard_core::dashboard::Dashboard;
use dashboard_core::error::{DashError, Result};
use dashboard_core::views::{HistoryView, StatusGridView};
use std::fs;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{error, info, warn};

/// 定时刷新并把视图写入输出目录，直到收到 Ctrl-C
pub async fn run_watch(app: &CliApp, interval: Option<u64>, output_dir: Option<PathBuf>) -> Result<()> {
    let interval_secs = interval.unwrap_or(app.config.dashboard.refresh_interval_secs);
    if interval_secs == 0 {
        return Err(DashError::invalid_config("刷新间隔必须大于0"));
    }
    let output_dir = match output_dir {
        Some(dir) => {
            fs::create_dir_all(&dir)?;
            dir
        }
        None => app.config.ensure_output_dir()?,
    };

    let mut dashboard = app.new_dashboard().with_output_dir(&output_dir);
    dashboard.register(StatusGridView).register(HistoryView);

    // 数据到达前先写出占位页面
    dashboard.render_all()?;

    info!("👀 开始监控备份状态");
    info!("   输出目录: {}", output_dir.display());
    info!("   刷新间隔: {} 秒", interval_secs);
    info!("   按 Ctrl-C 退出");

    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    watch_loop(&mut dashboard, &app.api_client, ticker, tokio::signal::ctrl_c()).await;
    Ok(())
}

/// 每个节拍刷新一次；退出信号到达时立即结束，包括正在进行的刷新
async fn watch_loop<S, F>(dashboard: &mut Dashboard, source: &S, mut ticker: Interval, shutdown: F)
where
    S: DataSource,
    F: Future<Output = std::io::Result<()>>,
{
    tokio::pin!(shutdown);

    loop {
        let stop = tokio::select! {
            _ = ticker.tick() => {
                tokio::select! {
                    result = dashboard.refresh(source) => {
                        match result {
                            Ok(()) => info!("🔄 [{}] 视图已更新", Local::now().format("%H:%M:%S")),
                            Err(e) => warn!("⚠️  [{}] 刷新失败，保留上次数据: {}", Local::now().format("%H:%M:%S"), e),
                        }
                        false
                    }
                    result = &mut shutdown => {
                        warn!("⚠️  刷新被中断");
                        log_shutdown(result);
                        true
                    }
                }
            }
            result = &mut shutdown => {
                log_shutdown(result);
                true
            }
        };

        if stop {
            info!("👋 停止监控");
            break;
        }
    }
}

fn log_shutdown(result: std::io::Result<()>) {
    if let Err(e) = result {
        error!("❌ 监听退出信号失败: {}", e);
    }
}
