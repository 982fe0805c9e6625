use serde::Serialize;
use std::fmt;

/// 数据刷新通知，每个数据源一种
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Notification {
    BackupsRefreshed,
    VerificationsRefreshed,
    ServicesRefreshed,
}

impl Notification {
    pub const ALL: [Notification; 3] = [
        Notification::BackupsRefreshed,
        Notification::VerificationsRefreshed,
        Notification::ServicesRefreshed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Notification::BackupsRefreshed => "backups-refreshed",
            Notification::VerificationsRefreshed => "verifications-refreshed",
            Notification::ServicesRefreshed => "services-refreshed",
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
