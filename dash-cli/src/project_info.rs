/// Backups Dashboard 项目信息模块
///
/// dash-cli 是面向用户的主程序，项目元数据统一在这里定义
/// dashboard-core 作为内部库，只提供技术性常量

/// 项目元数据（自动从 dash-cli 的 Cargo.toml 同步）
pub mod metadata {
    /// 项目名称
    pub const PROJECT_NAME: &str = env!("CARGO_PKG_NAME");

    /// 项目描述
    pub const PROJECT_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

    /// 项目作者
    pub const PROJECT_AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

    /// 用户友好的显示名称（手动维护）
    pub mod display {
        /// 用户友好的项目名称
        pub const FRIENDLY_NAME: &str = "Backups Dashboard";

        /// 项目详细描述
        pub const DESCRIPTION_LONG: &str = "从备份服务拉取备份与校验任务记录，按服务和日期归类，在终端显示状态网格和历史，并生成状态、历史、详情 HTML 页面";
    }
}

/// 版本信息
pub mod version_info {
    /// CLI 版本
    pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

    /// 核心库版本（从 dashboard-core 获取）
    pub const CORE_VERSION: &str = dashboard_core::constants::version::CORE_VERSION;
}

/// 获取版本信息字符串
pub fn get_version_string() -> String {
    format!(
        "{} v{} (core v{})",
        metadata::display::FRIENDLY_NAME,
        version_info::CLI_VERSION,
        version_info::CORE_VERSION
    )
}
