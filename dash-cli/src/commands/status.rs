use crate::app::CliApp;
use crate::commands::{state_icon, write_html};
use dashboard_core::error::Result;
use dashboard_core::records::BackupState;
use dashboard_core::views::StatusGridView;
use dashboard_core::views::status::{StatusGridModel, StatusRow, compose};
use std::path::PathBuf;
use tracing::{info, warn};

/// 状态网格的终端文本，第一行是表头
pub fn render_terminal(model: &StatusGridModel) -> Vec<String> {
    let label_width = model
        .rows
        .iter()
        .map(|row| row.label.chars().count())
        .max()
        .unwrap_or(0)
        .max("服务".chars().count());

    let mut lines = Vec::with_capacity(model.rows.len() + 1);

    let mut head = format!("{:<label_width$}", "服务");
    for column in &model.head {
        head.push_str(&format!(" {:>2}", column.age));
    }
    lines.push(head);

    for row in &model.rows {
        let mut line = format!("{:<label_width$}", row.label);
        for cell in &row.cells {
            line.push(' ');
            line.push_str(state_icon(cell.state));
        }
        lines.push(line);
    }

    lines
}

/// 最近一次备份失败或超时的服务，关闭健康检查的服务除外
fn unhealthy_services(model: &StatusGridModel) -> Vec<(&StatusRow, BackupState)> {
    model
        .rows
        .iter()
        .filter(|row| row.row_class.is_empty())
        .filter_map(|row| {
            let latest = row.cells.iter().rev().find_map(|cell| cell.state)?;
            matches!(latest, BackupState::Failed | BackupState::Timedout).then_some((row, latest))
        })
        .collect()
}

/// 显示备份状态网格
pub async fn run_status(app: &CliApp, html: Option<PathBuf>) -> Result<()> {
    let mut dashboard = app.new_dashboard();
    dashboard.register(StatusGridView);
    app.refresh(&mut dashboard).await?;

    let model = compose(dashboard.store(), &dashboard.context());

    info!(
        "📊 最近 {} 天备份状态（最右列为今天）",
        app.config.dashboard.window_days
    );
    for line in render_terminal(&model) {
        info!("{}", line);
    }
    info!("图例: ✅ 完成  📤 上传中  📥 接收中/等待  🔥 失败  ⏰ 超时  ➖ 无记录");

    for (row, state) in unhealthy_services(&model) {
        warn!("⚠️  服务 {} 最近一次备份状态: {}", row.service, state);
    }

    if let Some(path) = html {
        write_html(&path, dashboard.html("status").unwrap_or_default())?;
    }

    Ok(())
}

/// 显示当前API配置信息
pub async fn run_api_info(app: &CliApp) -> Result<()> {
    let api_config = app.api_client.get_config();
    info!("{}", api_config);
    Ok(())
}
