use super::template::fill;
use super::{DashboardView, RenderContext, VerificationBadge, badge_class_and_title, verification_badge};
use crate::api_config::detail_link;
use crate::constants::dashboard;
use crate::error::Result;
use crate::events::Notification;
use crate::format::{escape_html, format_date, glyph_for_state, niceify_date, niceify_duration, niceify_size, to_display};
use crate::records::{BackupRecord, BackupState};
use crate::store::DataStore;
use serde::Serialize;
use std::sync::Arc;

const PANEL_TEMPLATE: &str = include_str!("../../templates/history_panel.html");
const ROW_TEMPLATE: &str = include_str!("../../templates/history_row.html");

/// 历史表格中的一行
#[derive(Debug, Clone, Serialize)]
pub struct HistoryRow {
    pub id: String,
    pub service: String,
    pub state: BackupState,
    pub state_symbol: &'static str,
    pub title: String,
    /// 纯文本开始时间，终端输出使用
    pub started_date: String,
    pub nice_started_date: String,
    pub nice_completed_date: Option<String>,
    pub nice_size: String,
    pub nice_original_size: String,
    pub nice_duration: String,
    pub source_address: String,
    pub node_name: String,
    pub detail_link: String,
    pub verification: Option<VerificationBadge>,
}

/// 一个服务的历史面板
#[derive(Debug, Clone, Serialize)]
pub struct HistoryPanel {
    pub service: String,
    pub rows: Vec<HistoryRow>,
}

/// 历史视图模型
#[derive(Debug, Clone, Serialize)]
pub struct HistoryModel {
    pub panels: Vec<HistoryPanel>,
}

/// 最新的在前；开始时间相同的，后加载的在前
fn newest_first(backups: &[Arc<BackupRecord>]) -> Vec<&Arc<BackupRecord>> {
    let mut sorted: Vec<&Arc<BackupRecord>> = backups.iter().collect();
    sorted.sort_by_key(|backup| backup.started_at);
    sorted.reverse();
    sorted
}

fn compose_row(store: &DataStore, ctx: &RenderContext, service: &str, backup: &BackupRecord) -> HistoryRow {
    let title = format!("Backup status: {}", backup.state);

    HistoryRow {
        id: backup.id.clone(),
        service: service.to_string(),
        state: backup.state,
        state_symbol: glyph_for_state(Some(backup.state)),
        verification: verification_badge(store, &backup.id, &title, ctx.offset),
        title,
        started_date: format_date(&to_display(backup.started_at, ctx.offset)),
        nice_started_date: niceify_date(&to_display(backup.started_at, ctx.offset)),
        nice_completed_date: backup
            .completed_at
            .map(|date| niceify_date(&to_display(date, ctx.offset))),
        nice_size: niceify_size(backup.size),
        nice_original_size: niceify_size(backup.original_size),
        nice_duration: niceify_duration(backup.duration),
        source_address: backup.source_address.clone().unwrap_or_default(),
        node_name: backup.node_name.clone().unwrap_or_default(),
        detail_link: detail_link(service, &backup.id),
    }
}

/// 组装历史视图
pub fn compose(store: &DataStore, ctx: &RenderContext) -> HistoryModel {
    let Some(backups) = store.backups.as_ref() else {
        return HistoryModel { panels: Vec::new() };
    };

    let panels = backups
        .by_service()
        .iter()
        .map(|(service, records)| HistoryPanel {
            service: service.clone(),
            rows: newest_first(records)
                .into_iter()
                .map(|backup| compose_row(store, ctx, service, backup))
                .collect(),
        })
        .collect();

    HistoryModel { panels }
}

fn render_row(row: &HistoryRow) -> String {
    let (class, title) = badge_class_and_title(row.state_symbol, &row.title, row.verification.as_ref());

    // 日期中的时区标记和容量中的不换行空格本身就是 HTML
    fill(
        ROW_TEMPLATE,
        &[
            ("class", &class),
            ("title", &escape_html(&title)),
            ("id", &escape_html(&row.id)),
            ("detail_link", &escape_html(&row.detail_link)),
            ("started", &row.nice_started_date),
            ("original_size", &row.nice_original_size),
            ("size", &row.nice_size),
            ("duration", &escape_html(&row.nice_duration)),
            ("source", &escape_html(&row.source_address)),
            ("node", &escape_html(&row.node_name)),
        ],
    )
}

/// 渲染所有服务面板
pub fn render_model(model: &HistoryModel) -> String {
    model
        .panels
        .iter()
        .map(|panel| {
            let rows: String = panel.rows.iter().map(render_row).collect();
            fill(
                PANEL_TEMPLATE,
                &[("service", &escape_html(&panel.service)), ("rows", &rows)],
            )
        })
        .collect()
}

/// 历史视图
#[derive(Debug, Default, Clone)]
pub struct HistoryView;

impl DashboardView for HistoryView {
    fn name(&self) -> &str {
        "history"
    }

    fn file_name(&self) -> String {
        dashboard::HISTORY_FILE_NAME.to_string()
    }

    fn depends_on(&self) -> &'static [Notification] {
        &[Notification::BackupsRefreshed, Notification::VerificationsRefreshed]
    }

    fn render(&self, store: &DataStore, ctx: &RenderContext) -> String {
        render_model(&compose(store, ctx))
    }

    fn model(&self, store: &DataStore, ctx: &RenderContext) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(compose(store, ctx))?)
    }
}
