use super::template::fill;
use super::{DashboardView, RenderContext, VerificationBadge, badge_class_and_title, verification_badge};
use crate::api_config::detail_link;
use crate::constants::{dashboard, record::DAY_IN_MILLISECONDS};
use crate::error::Result;
use crate::events::Notification;
use crate::format::{escape_html, format_date, glyph_for_state, label_for_age, to_display};
use crate::records::BackupState;
use crate::select::pick_backup;
use crate::store::DataStore;
use chrono::TimeDelta;
use serde::Serialize;

const HEAD_TEMPLATE: &str = "<tr><th>Service / Age (days)</th>{columns}</tr>";
const HEAD_COLUMN_TEMPLATE: &str = "<th title='Backups from {start_date} to {end_date}'>{age}</th>";
const ROW_TEMPLATE: &str = "<tr class='{row_class}'><td>{label}</td>{cells}</tr>";
const CELL_TEMPLATE: &str = "<td class='{active}'>{link_open}<span class='{class} i-backup-status' title='{title}' data-backup-id='{id}'></span>{link_close}</td>";

/// 表头中的一列
#[derive(Debug, Clone, Serialize)]
pub struct AgeColumn {
    pub age: String,
    pub start_date: String,
    pub end_date: String,
}

/// 网格中的一格：某服务某天的代表备份
#[derive(Debug, Clone, Serialize)]
pub struct StatusCell {
    pub class: &'static str,
    pub state: Option<BackupState>,
    pub status: String,
    pub date: String,
    pub service: Option<String>,
    pub id: Option<String>,
    pub exists: bool,
    pub active: bool,
    pub title: String,
    pub verification: Option<VerificationBadge>,
}

/// 一个服务的一行
#[derive(Debug, Clone, Serialize)]
pub struct StatusRow {
    pub service: String,
    pub label: String,
    pub row_class: &'static str,
    pub cells: Vec<StatusCell>,
}

/// 状态网格视图模型
#[derive(Debug, Clone, Serialize)]
pub struct StatusGridModel {
    pub head: Vec<AgeColumn>,
    pub rows: Vec<StatusRow>,
}

/// 从最旧到最新的天数，最右边一列是今天
fn ages(window_days: u32) -> impl Iterator<Item = u32> {
    (0..window_days).rev()
}

fn compose_head(ctx: &RenderContext) -> Vec<AgeColumn> {
    ages(ctx.window_days)
        .map(|age| {
            let end = ctx.now - TimeDelta::milliseconds(DAY_IN_MILLISECONDS * i64::from(age));
            let start = end - TimeDelta::milliseconds(DAY_IN_MILLISECONDS);

            AgeColumn {
                age: label_for_age(age),
                start_date: format_date(&to_display(start, ctx.offset)),
                end_date: format_date(&to_display(end, ctx.offset)),
            }
        })
        .collect()
}

/// 组装状态网格
pub fn compose(store: &DataStore, ctx: &RenderContext) -> StatusGridModel {
    let head = compose_head(ctx);

    let Some(backups) = store.backups.as_ref() else {
        return StatusGridModel { head, rows: Vec::new() };
    };

    let rows = backups
        .by_service_and_day_bucket(ctx.now)
        .into_iter()
        .map(|(service, buckets)| {
            let mut cells: Vec<StatusCell> = ages(ctx.window_days)
                .map(|age| {
                    let day_backups = buckets
                        .get(&i64::from(age))
                        .map(Vec::as_slice)
                        .unwrap_or_default();
                    let best = pick_backup(day_backups);

                    let status = best.map_or_else(|| "Unknown".to_string(), |b| b.state.to_string());
                    let date = best.map_or_else(
                        || "Unknown".to_string(),
                        |b| format_date(&to_display(b.started_at, ctx.offset)),
                    );
                    let title = format!("Backup: {status} (started: {date})");
                    let verification = best
                        .and_then(|b| verification_badge(store, &b.id, &title, ctx.offset));

                    StatusCell {
                        class: glyph_for_state(best.map(|b| b.state)),
                        state: best.map(|b| b.state),
                        status,
                        date,
                        service: best.and_then(|b| b.service.clone()),
                        id: best.map(|b| b.id.clone()),
                        exists: best.is_some(),
                        active: false,
                        title,
                        verification,
                    }
                })
                .collect();

            if let Some(last) = cells.last_mut() {
                last.active = true;
            }

            let disabled = store
                .services
                .as_ref()
                .is_some_and(|services| services.is_healthcheck_disabled(&service));
            let label = if disabled {
                format!("{service} (disabled)")
            } else {
                service.clone()
            };

            StatusRow {
                service,
                label,
                row_class: if disabled { "warning" } else { "" },
                cells,
            }
        })
        .collect();

    StatusGridModel { head, rows }
}

fn render_cell(cell: &StatusCell) -> String {
    let id = cell.id.as_deref().unwrap_or_default();
    let (class, title) = badge_class_and_title(cell.class, &cell.title, cell.verification.as_ref());

    let (link_open, link_close) = match (&cell.service, &cell.id) {
        (Some(service), Some(id)) if cell.exists => (
            format!("<a href='{}'>", escape_html(&detail_link(service, id))),
            "</a>".to_string(),
        ),
        _ => (String::new(), String::new()),
    };

    fill(
        CELL_TEMPLATE,
        &[
            ("active", if cell.active { "active" } else { "" }),
            ("link_open", &link_open),
            ("class", &class),
            ("title", &escape_html(&title)),
            ("id", &escape_html(id)),
            ("link_close", &link_close),
        ],
    )
}

/// 把视图模型渲染成表格行
pub fn render_model(model: &StatusGridModel) -> String {
    let columns: String = model
        .head
        .iter()
        .map(|column| {
            fill(
                HEAD_COLUMN_TEMPLATE,
                &[
                    ("start_date", &escape_html(&column.start_date)),
                    ("end_date", &escape_html(&column.end_date)),
                    ("age", &escape_html(&column.age)),
                ],
            )
        })
        .collect();

    let mut html = fill(HEAD_TEMPLATE, &[("columns", &columns)]);

    for row in &model.rows {
        let cells: String = row.cells.iter().map(render_cell).collect();
        html.push_str(&fill(
            ROW_TEMPLATE,
            &[
                ("row_class", row.row_class),
                ("label", &escape_html(&row.label)),
                ("cells", &cells),
            ],
        ));
    }

    html
}

/// 状态网格视图
#[derive(Debug, Default, Clone)]
pub struct StatusGridView;

impl DashboardView for StatusGridView {
    fn name(&self) -> &str {
        "status"
    }

    fn file_name(&self) -> String {
        dashboard::STATUS_FILE_NAME.to_string()
    }

    fn depends_on(&self) -> &'static [Notification] {
        &Notification::ALL
    }

    fn render(&self, store: &DataStore, ctx: &RenderContext) -> String {
        render_model(&compose(store, ctx))
    }

    fn model(&self, store: &DataStore, ctx: &RenderContext) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(compose(store, ctx))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::fixtures;

    #[test]
    fn test_head_is_oldest_first() {
        let model = compose(&DataStore::default(), &fixtures::ctx());

        assert_eq!(model.head.len(), 14);
        assert_eq!(model.head[0].age, "13");
        assert_eq!(model.head[13].age, "0");
        assert_eq!(model.head[13].end_date, "14th Nov, 22:13 (+00:00)");
        assert_eq!(model.head[13].start_date, "13th Nov, 22:13 (+00:00)");
        assert!(model.rows.is_empty());
    }

    #[test]
    fn test_finished_outranks_failed_in_same_bucket() {
        let store = fixtures::full_store();
        let model = compose(&store, &fixtures::ctx());

        let db = model.rows.iter().find(|row| row.service == "db").unwrap();
        assert_eq!(db.cells.len(), 14);

        // 第2天在倒数第3列
        let cell = &db.cells[11];
        assert!(cell.exists);
        assert_eq!(cell.id.as_deref(), Some("db-finished-1"));
        assert_eq!(cell.state, Some(BackupState::Finished));
        assert_eq!(cell.class, "glyphicon glyphicon-ok-sign text-success");
        assert_eq!(
            cell.verification.as_ref().map(|badge| badge.class),
            Some("verification-finished")
        );

        let empty = &db.cells[0];
        assert!(!empty.exists);
        assert_eq!(empty.status, "Unknown");
        assert_eq!(empty.class, "glyphicon glyphicon-minus text-muted");
        assert!(empty.verification.is_none());
    }

    #[test]
    fn test_rightmost_cell_is_active_and_disabled_rows_flagged() {
        let model = compose(&fixtures::full_store(), &fixtures::ctx());

        for row in &model.rows {
            assert!(row.cells.last().unwrap().active);
            assert!(row.cells[..13].iter().all(|cell| !cell.active));
        }

        let web = model.rows.iter().find(|row| row.service == "web").unwrap();
        assert_eq!(web.label, "web (disabled)");
        assert_eq!(web.row_class, "warning");

        let db = model.rows.iter().find(|row| row.service == "db").unwrap();
        assert_eq!(db.label, "db");
        assert_eq!(db.row_class, "");
    }

    #[test]
    fn test_records_without_service_have_no_row() {
        let model = compose(&fixtures::full_store(), &fixtures::ctx());
        let services: Vec<&str> = model.rows.iter().map(|row| row.service.as_str()).collect();
        assert_eq!(services, ["db", "web"]);
    }

    #[test]
    fn test_window_days_from_context() {
        let mut ctx = fixtures::ctx();
        ctx.window_days = 3;
        let model = compose(&fixtures::full_store(), &ctx);

        assert_eq!(model.head.len(), 3);
        let db = model.rows.iter().find(|row| row.service == "db").unwrap();
        assert_eq!(db.cells[0].id.as_deref(), Some("db-finished-1"));
    }

    #[test]
    fn test_render_html() {
        let html = StatusGridView.render(&fixtures::full_store(), &fixtures::ctx());

        assert!(html.starts_with("<tr><th>Service / Age (days)</th>"));
        assert!(html.contains("<tr class='warning'><td>web (disabled)</td>"));
        assert!(html.contains("<a href='/detail/db/db-finished-1'>"));
        assert!(html.contains("glyphicon glyphicon-ok-sign text-success verification-finished i-backup-status"));
        assert!(html.contains("data-backup-id='db-finished-1'"));
        assert!(html.contains("<td class='active'>"));
    }
}
