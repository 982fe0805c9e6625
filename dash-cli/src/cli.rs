use crate::project_info::{metadata, version_info};
use clap::{Parser, Subcommand, ValueEnum};
use dashboard_core::constants::config::CONFIG_FILE_NAME;
use std::path::PathBuf;

/// 可导出的视图
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DumpView {
    /// 状态网格
    Status,
    /// 历史表格
    History,
    /// 单个备份详情（需要 --service 和 --id）
    Detail,
}

impl DumpView {
    pub fn as_str(&self) -> &'static str {
        match self {
            DumpView::Status => "status",
            DumpView::History => "history",
            DumpView::Detail => "detail",
        }
    }
}

/// Backups Dashboard CLI - 备份与校验任务监控面板
#[derive(Parser, Debug)]
#[command(name = "backups-dash")]
#[command(about = metadata::PROJECT_DESCRIPTION)]
#[command(version = version_info::CLI_VERSION)]
#[command(long_about = metadata::display::DESCRIPTION_LONG)]
#[command(author = metadata::PROJECT_AUTHORS)]
pub struct Cli {
    /// 配置文件路径
    #[arg(short, long, default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,

    /// 详细输出
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 创建默认配置文件
    Init {
        /// 如果配置文件已存在，强制覆盖
        #[arg(long)]
        force: bool,
    },
    /// 显示当前API配置信息
    ApiInfo,
    /// 显示最近几天各服务的备份状态
    Status {
        /// 同时把状态网格写入HTML文件
        #[arg(long)]
        html: Option<PathBuf>,
    },
    /// 显示各服务的备份历史
    History {
        /// 同时把历史表格写入HTML文件
        #[arg(long)]
        html: Option<PathBuf>,
    },
    /// 显示单个备份的详情
    Detail {
        /// 服务名称
        service: String,
        /// 备份 ID
        id: String,
        /// 同时把详情页写入HTML文件
        #[arg(long)]
        html: Option<PathBuf>,
    },
    /// 定时刷新数据并把所有视图写入输出目录，Ctrl-C 退出
    Watch {
        /// 刷新间隔（秒），默认使用配置文件中的值
        #[arg(long)]
        interval: Option<u64>,
        /// 输出目录，默认使用配置文件中的值
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// 以JSON输出视图模型
    Dump {
        /// 视图名称
        #[arg(value_enum)]
        view: DumpView,
        /// 服务名称（detail 视图使用）
        #[arg(long)]
        service: Option<String>,
        /// 备份 ID（detail 视图使用）
        #[arg(long)]
        id: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_with_html() {
        let cli = Cli::try_parse_from(["backups-dash", "status", "--html", "out/status.html"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("dashboard.toml"));
        match cli.command {
            Commands::Status { html } => assert_eq!(html, Some(PathBuf::from("out/status.html"))),
            other => panic!("解析结果错误: {other:?}"),
        }
    }

    #[test]
    fn test_parse_detail_and_global_flags() {
        let cli = Cli::try_parse_from(["backups-dash", "-v", "-c", "other.toml", "detail", "db", "backup-0001"])
            .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("other.toml"));
        assert!(matches!(
            cli.command,
            Commands::Detail { ref service, ref id, html: None } if service == "db" && id == "backup-0001"
        ));
    }

    #[test]
    fn test_parse_dump_and_watch() {
        let cli = Cli::try_parse_from(["backups-dash", "dump", "history"]).unwrap();
        assert!(matches!(cli.command, Commands::Dump { view: DumpView::History, .. }));

        let cli = Cli::try_parse_from(["backups-dash", "watch", "--interval", "5"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Watch { interval: Some(5), output_dir: None }
        ));

        assert!(Cli::try_parse_from(["backups-dash", "dump", "nope"]).is_err());
    }
}
