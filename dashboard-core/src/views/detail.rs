use super::template::fill;
use super::{DashboardView, RenderContext, VerificationBadge, badge_class_and_title, verification_badge};
use crate::api_config::{backup_log_link, download_link, verification_log_link};
use crate::error::Result;
use crate::events::Notification;
use crate::format::{escape_html, format_timestamp, glyph_for_state, niceify_size, to_display};
use crate::records::{BackupRecord, BackupState, Chunk};
use crate::store::DataStore;
use serde::Serialize;
use tracing::warn;

const PAGE_TEMPLATE: &str = include_str!("../../templates/detail.html");
const FILES_TEMPLATE: &str = include_str!("../../templates/detail_files.html");
const FILE_TEMPLATE: &str = include_str!("../../templates/detail_file.html");
const CHUNK_TEMPLATE: &str = include_str!("../../templates/detail_chunk.html");

const LOCATION_TEMPLATE: &str = "<span class=\"label label-success\">{location}</span>";
const VERIFICATION_LINK_TEMPLATE: &str = "  <div class=\"col-lg-3 col-md-3 col-sm-6 col-xs-6 col-xxs-12 b-detail-param-box\"><span class=\"i-detail-param-link\"><a href=\"{link}\">View Verification Log <span class=\"chevron glyphicon glyphicon-chevron-right\"></span></a></span></div>\n";
const NO_FILES: &str = "<p class=\"b-info-text\">No files</p>\n";
const LOADING_TEMPLATE: &str = "<p class=\"b-info-text\">Loading backup {service}/{id}</p>\n";
const NOT_FOUND_TEMPLATE: &str = "<p class=\"b-info-text\">Backup not found: {service}/{id}</p>\n";

/// 分块的显示数据
#[derive(Debug, Clone, Serialize)]
pub struct DetailChunk {
    pub path: String,
    pub original_size: i64,
    pub size: i64,
    pub html_original_size: String,
    pub html_size: String,
    pub hash: String,
    pub stored_date: String,
}

/// 一个备份文件及其分块
#[derive(Debug, Clone, Serialize)]
pub struct DetailFile {
    pub filename: String,
    pub download_link: String,
    pub chunks: Vec<DetailChunk>,
}

/// 备份详情
#[derive(Debug, Clone, Serialize)]
pub struct DetailBackup {
    pub id: String,
    pub service: String,
    pub state: BackupState,
    pub status: &'static str,
    pub title: String,
    pub locations: Vec<String>,
    pub size: i64,
    pub original_size: i64,
    pub html_size: String,
    pub html_original_size: String,
    pub node_name: String,
    pub started_date: String,
    pub completed_date: String,
    pub source_address: String,
    pub backup_log_link: String,
    pub verification: Option<VerificationBadge>,
    pub verification_log_link: Option<String>,
    pub files: Vec<DetailFile>,
}

/// 详情视图模型
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum DetailModel {
    /// 备份数据尚未加载
    Loading { service: String, id: String },
    NotFound { service: String, id: String },
    Found { backup: Box<DetailBackup> },
}

fn compose_chunk(chunk: &Chunk, ctx: &RenderContext) -> DetailChunk {
    DetailChunk {
        path: chunk.path.clone(),
        original_size: chunk.original_size,
        size: chunk.size,
        html_original_size: niceify_size(chunk.original_size),
        html_size: niceify_size(chunk.size),
        hash: chunk.hash.clone(),
        stored_date: chunk
            .stored_at
            .map(|date| format_timestamp(&to_display(date, ctx.offset)))
            .unwrap_or_default(),
    }
}

fn compose_backup(store: &DataStore, ctx: &RenderContext, service: &str, backup: &BackupRecord) -> DetailBackup {
    let title = format!("Backup status: {}", backup.state);

    let best_verification = store
        .verifications
        .as_ref()
        .and_then(|verifications| verifications.by_backup_id(&backup.id));
    let verification_log_link = best_verification.map(|verification| {
        let verification_service = verification.service.as_deref().unwrap_or(service);
        verification_log_link(verification_service, &verification.id)
    });

    let files = backup
        .chunks
        .iter()
        .map(|(filename, chunks)| DetailFile {
            filename: filename.clone(),
            download_link: download_link(service, &backup.id, filename),
            chunks: chunks.iter().map(|chunk| compose_chunk(chunk, ctx)).collect(),
        })
        .collect();

    DetailBackup {
        id: backup.id.clone(),
        service: service.to_string(),
        state: backup.state,
        status: glyph_for_state(Some(backup.state)),
        verification: verification_badge(store, &backup.id, &title, ctx.offset),
        title,
        locations: backup.locations.iter().cloned().collect(),
        size: backup.size,
        original_size: backup.original_size,
        html_size: niceify_size(backup.size),
        html_original_size: niceify_size(backup.original_size),
        node_name: backup.node_name.clone().unwrap_or_default(),
        started_date: format_timestamp(&to_display(backup.started_at, ctx.offset)),
        completed_date: backup
            .completed_at
            .map(|date| format_timestamp(&to_display(date, ctx.offset)))
            .unwrap_or_default(),
        source_address: backup.source_address.clone().unwrap_or_default(),
        backup_log_link: backup_log_link(service, &backup.id),
        verification_log_link,
        files,
    }
}

/// 组装单个备份的详情
pub fn compose(store: &DataStore, ctx: &RenderContext, service: &str, id: &str) -> DetailModel {
    let Some(backups) = store.backups.as_ref() else {
        return DetailModel::Loading {
            service: service.to_string(),
            id: id.to_string(),
        };
    };

    match backups.by_service_and_id(service, id) {
        Some(backup) => DetailModel::Found {
            backup: Box::new(compose_backup(store, ctx, service, backup)),
        },
        None => {
            warn!("⚠️ 未找到备份: {}/{}", service, id);
            DetailModel::NotFound {
                service: service.to_string(),
                id: id.to_string(),
            }
        }
    }
}

fn render_file(file: &DetailFile) -> String {
    let chunks: String = file
        .chunks
        .iter()
        .map(|chunk| {
            fill(
                CHUNK_TEMPLATE,
                &[
                    ("path", &escape_html(&chunk.path)),
                    ("original_size", &chunk.original_size.to_string()),
                    ("html_original_size", &chunk.html_original_size),
                    ("size", &chunk.size.to_string()),
                    ("html_size", &chunk.html_size),
                    ("hash", &escape_html(&chunk.hash)),
                    ("stored_date", &escape_html(&chunk.stored_date)),
                ],
            )
        })
        .collect();

    fill(
        FILE_TEMPLATE,
        &[
            ("filename", &escape_html(&file.filename)),
            ("download_link", &escape_html(&file.download_link)),
            ("chunks", &chunks),
        ],
    )
}

fn render_backup(backup: &DetailBackup) -> String {
    let (status, title) = badge_class_and_title(backup.status, &backup.title, backup.verification.as_ref());

    let locations: String = backup
        .locations
        .iter()
        .map(|location| fill(LOCATION_TEMPLATE, &[("location", &escape_html(location))]))
        .collect();

    let verification_link = backup
        .verification_log_link
        .as_ref()
        .map(|link| fill(VERIFICATION_LINK_TEMPLATE, &[("link", &escape_html(link))]))
        .unwrap_or_default();

    // 折叠控件每组文件只出现一次
    let files = if backup.files.is_empty() {
        NO_FILES.to_string()
    } else {
        let panels: String = backup.files.iter().map(render_file).collect();
        fill(FILES_TEMPLATE, &[("panels", &panels)])
    };

    fill(
        PAGE_TEMPLATE,
        &[
            ("status", &status),
            ("title", &escape_html(&title)),
            ("id", &escape_html(&backup.id)),
            ("service", &escape_html(&backup.service)),
            ("locations", &locations),
            ("original_size", &backup.original_size.to_string()),
            ("html_original_size", &backup.html_original_size),
            ("size", &backup.size.to_string()),
            ("html_size", &backup.html_size),
            ("node_name", &escape_html(&backup.node_name)),
            ("started_date", &escape_html(&backup.started_date)),
            ("completed_date", &escape_html(&backup.completed_date)),
            ("source_address", &escape_html(&backup.source_address)),
            ("backup_log_link", &escape_html(&backup.backup_log_link)),
            ("verification_link", &verification_link),
            ("files", &files),
        ],
    )
}

/// 渲染详情页
pub fn render_model(model: &DetailModel) -> String {
    match model {
        DetailModel::Loading { service, id } => fill(
            LOADING_TEMPLATE,
            &[("service", &escape_html(service)), ("id", &escape_html(id))],
        ),
        DetailModel::NotFound { service, id } => fill(
            NOT_FOUND_TEMPLATE,
            &[("service", &escape_html(service)), ("id", &escape_html(id))],
        ),
        DetailModel::Found { backup } => render_backup(backup),
    }
}

/// 文件名中只保留字母、数字、`-` 和 `_`
fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// 单个备份的详情视图
#[derive(Debug, Clone)]
pub struct DetailView {
    service: String,
    id: String,
}

impl DetailView {
    pub fn new(service: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            id: id.into(),
        }
    }

    pub fn compose(&self, store: &DataStore, ctx: &RenderContext) -> DetailModel {
        compose(store, ctx, &self.service, &self.id)
    }
}

impl DashboardView for DetailView {
    fn name(&self) -> &str {
        "detail"
    }

    fn file_name(&self) -> String {
        format!("detail-{}-{}.html", sanitize(&self.service), sanitize(&self.id))
    }

    fn depends_on(&self) -> &'static [Notification] {
        &[Notification::BackupsRefreshed, Notification::VerificationsRefreshed]
    }

    fn render(&self, store: &DataStore, ctx: &RenderContext) -> String {
        render_model(&self.compose(store, ctx))
    }

    fn model(&self, store: &DataStore, ctx: &RenderContext) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self.compose(store, ctx))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::fixtures;

    fn found(model: DetailModel) -> DetailBackup {
        match model {
            DetailModel::Found { backup } => *backup,
            other => panic!("期望找到备份, 实际为 {other:?}"),
        }
    }

    #[test]
    fn test_detail_model() {
        let view = DetailView::new("db", "db-finished-1");
        let backup = found(view.compose(&fixtures::full_store(), &fixtures::ctx()));

        assert_eq!(backup.status, "glyphicon glyphicon-ok-sign text-success");
        assert_eq!(backup.locations, ["LOCAL", "OFFSITE"]);
        assert_eq!(backup.html_size, "1.5\u{a0}KB");
        assert_eq!(backup.backup_log_link, "/api/backup/logs/db/db-finished-1");
        assert_eq!(
            backup.verification_log_link.as_deref(),
            Some("/api/verification/logs/db/verify-0001")
        );

        assert_eq!(backup.files.len(), 1);
        let file = &backup.files[0];
        assert_eq!(file.filename, "dump.sql");
        assert_eq!(file.download_link, "/download/db/db-finished-1/dump.sql");
        assert_eq!(file.chunks[0].html_original_size, "4.0\u{a0}KB");
        assert_eq!(file.chunks[0].stored_date, "Sun Nov 12 2023 22:13:20 GMT+0000");
    }

    #[test]
    fn test_verification_added_only_after_load() {
        let mut store = fixtures::full_store();
        store.verifications = None;
        let view = DetailView::new("db", "db-finished-1");

        let html = view.render(&store, &fixtures::ctx());
        assert!(!html.contains("View Verification Log"));
        assert!(!html.contains("verification-"));

        store.verifications = Some(fixtures::verifications());
        let html = view.render(&store, &fixtures::ctx());
        assert!(html.contains("href=\"/api/verification/logs/db/verify-0001\""));
        assert!(html.contains("verification-finished i-backup-status"));
    }

    #[test]
    fn test_no_files_placeholder() {
        let view = DetailView::new("db", "db-failed-22");
        let html = view.render(&fixtures::full_store(), &fixtures::ctx());

        assert!(html.contains("No files"));
        assert!(!html.contains("b-files-group"));
    }

    #[test]
    fn test_files_render_one_collapse_control() {
        let view = DetailView::new("db", "db-finished-1");
        let html = view.render(&fixtures::full_store(), &fixtures::ctx());

        assert_eq!(html.matches("panel-collapse-control-expand").count(), 1);
        assert!(html.contains("href=\"/download/db/db-finished-1/dump.sql\""));
        assert!(html.contains("<span class=\"label label-success\">OFFSITE</span>"));
    }

    #[test]
    fn test_missing_and_loading_placeholders() {
        let view = DetailView::new("db", "missing-backup");
        assert!(matches!(
            view.compose(&fixtures::full_store(), &fixtures::ctx()),
            DetailModel::NotFound { .. }
        ));
        assert!(view
            .render(&fixtures::full_store(), &fixtures::ctx())
            .contains("Backup not found"));

        assert!(matches!(
            view.compose(&DataStore::default(), &fixtures::ctx()),
            DetailModel::Loading { .. }
        ));
    }

    #[test]
    fn test_file_name_is_sanitized() {
        let view = DetailView::new("db/main", "id with space");
        assert_eq!(view.file_name(), "detail-db_main-id_with_space.html");
    }
}
