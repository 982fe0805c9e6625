/// API服务相关常量
pub mod api {
    /// 默认API服务器地址
    pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";

    /// API端点路径
    pub mod endpoints {
        /// 备份记录列表端点
        pub const BACKUPS: &str = "/api/backup";

        /// 校验记录列表端点
        pub const VERIFICATIONS: &str = "/api/verification";

        /// 服务配置列表端点
        pub const SERVICES: &str = "/api/services";
    }

    /// 页面内嵌链接（本层不会请求，只渲染到输出中）
    pub mod links {
        /// 备份日志链接（包含占位符）
        pub const BACKUP_LOG: &str = "/api/backup/logs/{service}/{id}";

        /// 校验日志链接（包含占位符）
        pub const VERIFICATION_LOG: &str = "/api/verification/logs/{service}/{id}";

        /// 备份文件下载链接（包含占位符）
        pub const DOWNLOAD: &str = "/download/{service}/{id}/{filename}";

        /// 备份详情页链接（包含占位符）
        pub const DETAIL: &str = "/detail/{service}/{id}";
    }

    /// HTTP相关常量
    pub mod http {
        /// 默认请求超时时间（秒）
        pub const DEFAULT_TIMEOUT: u64 = 30;

        /// User-Agent头
        pub const USER_AGENT: &str = concat!("backups-dash/", env!("CARGO_PKG_VERSION"));
    }
}

/// 记录相关常量
pub mod record {
    /// 短ID长度
    pub const SHORT_ID_LEN: usize = 8;

    /// 一天的毫秒数
    pub const DAY_IN_MILLISECONDS: i64 = 1000 * 60 * 60 * 24;
}

/// 面板视图相关常量
pub mod dashboard {
    /// 状态网格默认显示的天数
    pub const DEFAULT_WINDOW_DAYS: u32 = 14;

    /// 默认刷新间隔（秒）
    pub const DEFAULT_REFRESH_INTERVAL: u64 = 60;

    /// 默认HTML输出目录
    pub const DEFAULT_OUTPUT_DIR: &str = "dashboard";

    /// 状态网格输出文件名
    pub const STATUS_FILE_NAME: &str = "status.html";

    /// 历史列表输出文件名
    pub const HISTORY_FILE_NAME: &str = "history.html";
}

/// 应用配置相关常量
pub mod config {
    /// 配置文件名
    pub const CONFIG_FILE_NAME: &str = "dashboard.toml";

    /// 按优先级查找的配置文件名
    pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
        ["dashboard.toml", "backups-dash.toml", ".backups-dash.toml"];
}

/// 日志和输出相关常量
pub mod logging {
    /// 默认日志级别
    pub const DEFAULT_LOG_LEVEL: &str = "info";

    /// 日志文件路径环境变量
    pub const LOG_FILE_ENV: &str = "DASH_LOG_FILE";
}

/// 技术版本信息常量
pub mod version {
    /// 核心库版本（自动同步）
    pub const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");
}
