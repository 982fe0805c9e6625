use crate::app::CliApp;
use crate::commands::{state_icon, write_html};
use dashboard_core::error::Result;
use dashboard_core::views::HistoryView;
use dashboard_core::views::history::{HistoryPanel, compose};
use std::path::PathBuf;
use tracing::info;

/// 一个服务面板的终端文本
fn panel_lines(panel: &HistoryPanel) -> Vec<String> {
    let mut lines = vec![format!("📁 {} ({} 个备份)", panel.service, panel.rows.len())];
    lines.extend(panel.rows.iter().map(|row| {
        let duration = if row.nice_duration.is_empty() {
            "-"
        } else {
            row.nice_duration.as_str()
        };
        format!(
            "   {} {}  {}  {} (原始 {})  {}  {}  {}",
            state_icon(Some(row.state)),
            row.id,
            row.started_date,
            row.nice_size.replace('\u{a0}', " "),
            row.nice_original_size.replace('\u{a0}', " "),
            duration,
            row.source_address,
            row.node_name,
        )
    }));
    lines
}

/// 显示各服务的备份历史
pub async fn run_history(app: &CliApp, html: Option<PathBuf>) -> Result<()> {
    let mut dashboard = app.new_dashboard();
    dashboard.register(HistoryView);
    app.refresh(&mut dashboard).await?;

    let model = compose(dashboard.store(), &dashboard.context());
    if model.panels.is_empty() {
        info!("📭 暂无备份记录");
    }
    for panel in &model.panels {
        for line in panel_lines(panel) {
            info!("{}", line);
        }
    }

    if let Some(path) = html {
        write_html(&path, dashboard.html("history").unwrap_or_default())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset};
    use dashboard_core::records::BackupWire;
    use dashboard_core::store::{BackupCollection, DataStore};
    use dashboard_core::views::RenderContext;
    use serde_json::json;

    #[test]
    fn test_panel_lines() {
        let now = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        let wires: Vec<BackupWire> = serde_json::from_value(json!([
            {
                "id": "db-backup-01", "service": "db",
                "startedDate": 1_699_999_000_000i64, "completedDate": 1_699_999_090_000i64,
                "state": "FINISHED", "size": 1024, "originalSize": 2048,
                "sourceAddress": "10.0.0.5", "nodeName": "node-a"
            }
        ]))
        .unwrap();
        let store = DataStore {
            backups: Some(BackupCollection::from_wire(wires, now).unwrap()),
            ..Default::default()
        };
        let ctx = RenderContext {
            now,
            offset: FixedOffset::east_opt(0).unwrap(),
            window_days: 14,
        };

        let model = compose(&store, &ctx);
        let lines = panel_lines(&model.panels[0]);

        assert_eq!(lines[0], "📁 db (1 个备份)");
        assert_eq!(
            lines[1],
            "   ✅ db-backup-01  14th Nov, 21:56 (+00:00)  1.0 KB (原始 2.0 KB)  1m 30s  10.0.0.5  node-a"
        );
    }
}
