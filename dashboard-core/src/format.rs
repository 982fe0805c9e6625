use crate::records::{BackupState, VerificationRecord, VerificationState};
use chrono::{DateTime, Datelike, FixedOffset, Local, TimeZone, Utc};
use std::fmt;

/// 容量单位
const SIZE_UNITS: [&str; 9] = ["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// 字节数转换为易读的容量，数值与单位之间是不换行空格
///
/// 负数不做特殊处理，原样输出。
pub fn niceify_size(bytes: i64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;

    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{value:.1}\u{a0}{}", SIZE_UNITS[unit])
}

/// 秒数转换为 `1h 2m 3s` 形式，只输出非零部分，0秒得到空字符串
pub fn niceify_duration(seconds: f64) -> String {
    let hours = (seconds / 3600.0).floor();
    let minutes = ((seconds - hours * 3600.0) / 60.0).floor();
    let seconds = (seconds - (hours * 3600.0 + minutes * 60.0)).floor();

    let mut parts = Vec::with_capacity(3);
    if hours > 0.0 {
        parts.push(format!("{}h", hours as i64));
    }
    if minutes > 0.0 {
        parts.push(format!("{}m", minutes as i64));
    }
    if seconds > 0.0 {
        parts.push(format!("{}s", seconds as i64));
    }

    parts.join(" ")
}

/// 日期格式化，例如 `14th Nov, 23:13 (+01:00)`
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    format!(
        "{} {}",
        ordinal(date.day()),
        date.format("%b, %H:%M (%:z)")
    )
}

/// 与 [`format_date`] 相同，但时区偏移包裹在弱化样式中
pub fn niceify_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    format!(
        "{} {}",
        ordinal(date.day()),
        date.format("%b, %H:%M <span class=\"text-muted\">(%:z)</span>")
    )
}

/// 完整时间戳，用于详情页
pub fn format_timestamp<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    date.format("%a %b %d %Y %H:%M:%S GMT%z").to_string()
}

/// 备份状态对应的图标样式
pub fn glyph_for_state(state: Option<BackupState>) -> &'static str {
    match state {
        Some(BackupState::Failed) => "glyphicon glyphicon-fire text-danger",
        Some(BackupState::Finished) => "glyphicon glyphicon-ok-sign text-success",
        Some(BackupState::Timedout) => "glyphicon glyphicon-time text-warning",
        Some(BackupState::Uploading) => "glyphicon glyphicon-cloud-upload text-primary",
        Some(BackupState::Receiving | BackupState::Waiting) => {
            "glyphicon glyphicon-download-alt text-primary"
        }
        _ => "glyphicon glyphicon-minus text-muted",
    }
}

/// 校验状态对应的附加样式
pub fn verification_class(state: Option<VerificationState>) -> &'static str {
    match state {
        Some(VerificationState::Finished) => "verification-finished",
        Some(VerificationState::Failed) => "verification-failed",
        Some(VerificationState::Timedout) => "verification-timedout",
        Some(VerificationState::Started) => "verification-started",
        _ => "verification-unknown",
    }
}

/// 在单元格标题后追加校验信息，没有校验记录时保持原样
pub fn verification_title(
    title: &str,
    verification: Option<&VerificationRecord>,
    offset: FixedOffset,
) -> String {
    match verification {
        Some(verification) => format!(
            "{title} \nVerification: {} (started: {})",
            verification.state,
            format_date(&verification.started_at.with_timezone(&offset))
        ),
        None => title.to_string(),
    }
}

/// 表头中的天数标签
pub fn label_for_age(age: u32) -> String {
    age.to_string()
}

/// HTML 转义
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// 本机当前的时区偏移
pub fn local_offset() -> FixedOffset {
    *Local::now().offset()
}

/// 转换为显示用的时区
pub fn to_display(date: DateTime<Utc>, offset: FixedOffset) -> DateTime<FixedOffset> {
    date.with_timezone(&offset)
}

fn ordinal(day: u32) -> String {
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{day}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::VerificationWire;
    use serde_json::json;

    fn sample_date(offset_secs: i32) -> DateTime<FixedOffset> {
        // 2023-11-14T22:13:20Z
        let utc = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        utc.with_timezone(&FixedOffset::east_opt(offset_secs).unwrap())
    }

    #[test]
    fn test_niceify_size() {
        assert_eq!(niceify_size(0), "0.0\u{a0}B");
        assert_eq!(niceify_size(1023), "1023.0\u{a0}B");
        assert_eq!(niceify_size(1024), "1.0\u{a0}KB");
        assert_eq!(niceify_size(1536), "1.5\u{a0}KB");
        assert_eq!(niceify_size(5 * 1024 * 1024 * 1024), "5.0\u{a0}GB");
    }

    #[test]
    fn test_niceify_size_negative_passes_through() {
        assert_eq!(niceify_size(-2048), "-2048.0\u{a0}B");
    }

    #[test]
    fn test_niceify_duration() {
        assert_eq!(niceify_duration(0.0), "");
        assert_eq!(niceify_duration(60.0), "1m");
        assert_eq!(niceify_duration(90.0), "1m 30s");
        assert_eq!(niceify_duration(3600.0), "1h");
        assert_eq!(niceify_duration(3661.0), "1h 1m 1s");
        assert_eq!(niceify_duration(7205.9), "2h 5s");
        assert_eq!(niceify_duration(0.4), "");
        // 负值按向下取整分解，小时为负时省略
        assert_eq!(niceify_duration(-0.5), "59m 59s");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(&sample_date(3600)), "14th Nov, 23:13 (+01:00)");
        assert_eq!(format_date(&sample_date(0)), "14th Nov, 22:13 (+00:00)");
        assert_eq!(
            niceify_date(&sample_date(-5 * 3600)),
            "14th Nov, 17:13 <span class=\"text-muted\">(-05:00)</span>"
        );
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(
            format_timestamp(&sample_date(0)),
            "Tue Nov 14 2023 22:13:20 GMT+0000"
        );
    }

    #[test]
    fn test_ordinals() {
        let cases = [
            (1, "1st"),
            (2, "2nd"),
            (3, "3rd"),
            (4, "4th"),
            (11, "11th"),
            (12, "12th"),
            (13, "13th"),
            (21, "21st"),
            (22, "22nd"),
            (23, "23rd"),
            (31, "31st"),
        ];
        for (day, expected) in cases {
            assert_eq!(ordinal(day), expected);
        }
    }

    #[test]
    fn test_glyph_for_state() {
        assert_eq!(
            glyph_for_state(Some(BackupState::Failed)),
            "glyphicon glyphicon-fire text-danger"
        );
        assert_eq!(
            glyph_for_state(Some(BackupState::Finished)),
            "glyphicon glyphicon-ok-sign text-success"
        );
        assert_eq!(
            glyph_for_state(Some(BackupState::Receiving)),
            glyph_for_state(Some(BackupState::Waiting))
        );
        assert_eq!(
            glyph_for_state(Some(BackupState::Queued)),
            "glyphicon glyphicon-minus text-muted"
        );
        assert_eq!(glyph_for_state(None), "glyphicon glyphicon-minus text-muted");
    }

    #[test]
    fn test_verification_title() {
        let wire: VerificationWire = serde_json::from_value(json!({
            "id": "verify-0001",
            "backupId": "backup-0001",
            "startedDate": 1_700_000_000_000i64,
            "state": "FAILED"
        }))
        .unwrap();
        let now = DateTime::from_timestamp_millis(1_700_000_100_000).unwrap();
        let verification = VerificationRecord::from_wire(wire, now).unwrap();
        let offset = FixedOffset::east_opt(0).unwrap();

        assert_eq!(
            verification_title("Backup: FINISHED", Some(&verification), offset),
            "Backup: FINISHED \nVerification: FAILED (started: 14th Nov, 22:13 (+00:00))"
        );
        assert_eq!(verification_title("Backup", None, offset), "Backup");
        assert_eq!(verification_class(Some(verification.state)), "verification-failed");
        assert_eq!(verification_class(None), "verification-unknown");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<a href='x'>\"db\" & co</a>"),
            "&lt;a href=&#39;x&#39;&gt;&quot;db&quot; &amp; co&lt;/a&gt;"
        );
    }
}
