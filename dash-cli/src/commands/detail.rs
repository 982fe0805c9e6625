use crate::app::CliApp;
use crate::commands::{state_icon, write_html};
use dashboard_core::error::{DashError, Result};
use dashboard_core::views::detail::{DetailBackup, DetailModel};
use dashboard_core::views::DetailView;
use std::path::PathBuf;
use tracing::{error, info};

fn backup_lines(backup: &DetailBackup) -> Vec<String> {
    let mut lines = vec![
        format!("{} {} / {}", state_icon(Some(backup.state)), backup.service, backup.id),
        format!("   状态: {}", backup.state),
        format!("   存储位置: {}", backup.locations.join(", ")),
        format!(
            "   大小: {} (原始 {})",
            backup.html_size.replace('\u{a0}', " "),
            backup.html_original_size.replace('\u{a0}', " ")
        ),
        format!("   节点: {}", backup.node_name),
        format!("   来源: {}", backup.source_address),
        format!("   开始: {}", backup.started_date),
        format!("   完成: {}", backup.completed_date),
        format!("   备份日志: {}", backup.backup_log_link),
    ];

    if let Some(badge) = &backup.verification {
        let state = badge
            .state
            .map_or_else(|| "UNKNOWN".to_string(), |state| state.to_string());
        lines.push(format!("   校验: {state}"));
    }
    if let Some(link) = &backup.verification_log_link {
        lines.push(format!("   校验日志: {link}"));
    }

    if backup.files.is_empty() {
        lines.push("   📭 No files".to_string());
    }
    for file in &backup.files {
        lines.push(format!("   📄 {} ({} 个分块)", file.filename, file.chunks.len()));
        for chunk in &file.chunks {
            lines.push(format!(
                "      {}  {} -> {}  {}  {}",
                chunk.path,
                chunk.html_original_size.replace('\u{a0}', " "),
                chunk.html_size.replace('\u{a0}', " "),
                chunk.hash,
                chunk.stored_date
            ));
        }
    }

    lines
}

/// 显示单个备份的详情
pub async fn run_detail(app: &CliApp, service: &str, id: &str, html: Option<PathBuf>) -> Result<()> {
    let view = DetailView::new(service, id);
    let mut dashboard = app.new_dashboard();
    dashboard.register(view.clone());
    app.refresh(&mut dashboard).await?;

    if let Some(path) = &html {
        write_html(path, dashboard.html("detail").unwrap_or_default())?;
    }

    match view.compose(dashboard.store(), &dashboard.context()) {
        DetailModel::Found { backup } => {
            for line in backup_lines(&backup) {
                info!("{}", line);
            }
            Ok(())
        }
        DetailModel::NotFound { .. } | DetailModel::Loading { .. } => {
            error!("❌ 未找到备份: {}/{}", service, id);
            Err(DashError::custom(format!("未找到备份: {service}/{id}")))
        }
    }
}
