mod detail;
mod dump;
mod history;
mod status;
mod watch;

use dashboard_core::error::Result;
use dashboard_core::records::BackupState;
use std::fs;
use std::path::Path;
use tracing::info;

// Status commands
pub use status::{run_api_info, run_status};

// History / detail commands
pub use detail::run_detail;
pub use history::run_history;

// Watch / dump commands
pub use dump::run_dump;
pub use watch::run_watch;

/// 终端中表示备份状态的图标
pub(crate) fn state_icon(state: Option<BackupState>) -> &'static str {
    match state {
        Some(BackupState::Finished) => "✅",
        Some(BackupState::Failed) => "🔥",
        Some(BackupState::Timedout) => "⏰",
        Some(BackupState::Uploading) => "📤",
        Some(BackupState::Receiving | BackupState::Waiting) => "📥",
        _ => "➖",
    }
}

/// 写入渲染好的HTML片段，必要时创建上级目录
pub(crate) fn write_html(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, html)?;
    info!("   ✅ HTML 已写入: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_html_creates_parent_dirs() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nested/out/status.html");

        write_html(&path, "<tr></tr>").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<tr></tr>");
    }

    #[test]
    fn test_state_icons() {
        assert_eq!(state_icon(Some(BackupState::Finished)), "✅");
        assert_eq!(state_icon(Some(BackupState::Waiting)), state_icon(Some(BackupState::Receiving)));
        assert_eq!(state_icon(Some(BackupState::Queued)), "➖");
        assert_eq!(state_icon(None), "➖");
    }
}
