//! 视图组装：把索引、选择和格式化的结果组成视图模型，再渲染成 HTML 片段

pub mod detail;
pub mod history;
pub mod status;
pub mod template;

use crate::error::Result;
use crate::events::Notification;
use crate::format::{verification_class, verification_title};
use crate::records::VerificationState;
use crate::store::DataStore;
use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

pub use detail::DetailView;
pub use history::HistoryView;
pub use status::StatusGridView;

/// 一次渲染使用的上下文
#[derive(Debug, Clone, Copy)]
pub struct RenderContext {
    /// 天数桶的参考时刻
    pub now: DateTime<Utc>,
    /// 日期显示使用的时区偏移
    pub offset: FixedOffset,
    /// 状态网格显示的天数
    pub window_days: u32,
}

/// 面板视图
pub trait DashboardView: Send {
    /// 视图名称，也用于 `dump` 命令
    fn name(&self) -> &str;

    /// 输出目录中的文件名
    fn file_name(&self) -> String;

    /// 触发重新渲染的通知
    fn depends_on(&self) -> &'static [Notification];

    /// 渲染 HTML 片段
    fn render(&self, store: &DataStore, ctx: &RenderContext) -> String;

    /// 视图模型的 JSON 形式
    fn model(&self, store: &DataStore, ctx: &RenderContext) -> Result<serde_json::Value>;
}

/// 备份图标上的校验标记
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationBadge {
    pub class: &'static str,
    pub state: Option<VerificationState>,
    pub title: String,
}

/// 校验数据加载后才有标记；没有对应校验记录时为 `verification-unknown`
pub fn verification_badge(
    store: &DataStore,
    backup_id: &str,
    title: &str,
    offset: FixedOffset,
) -> Option<VerificationBadge> {
    let verifications = store.verifications.as_ref()?;
    let best = verifications.by_backup_id(backup_id);

    Some(VerificationBadge {
        class: verification_class(best.map(|v| v.state)),
        state: best.map(|v| v.state),
        title: verification_title(title, best.map(|v| v.as_ref()), offset),
    })
}

/// 图标的样式与标题，按是否有校验标记合并
fn badge_class_and_title(
    base_class: &str,
    title: &str,
    badge: Option<&VerificationBadge>,
) -> (String, String) {
    match badge {
        Some(badge) => (format!("{base_class} {}", badge.class), badge.title.clone()),
        None => (base_class.to_string(), title.to_string()),
    }
}
