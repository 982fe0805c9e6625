use dashboard_core::constants::logging::{DEFAULT_LOG_LEVEL, LOG_FILE_ENV};

/// # Backups Dashboard 日志说明
///
/// - 库代码只使用 `tracing` 宏，`main.rs` 中调用 `setup_logging()` 配置输出
/// - `-v, --verbose`：启用 DEBUG 级别
/// - `RUST_LOG`：标准的日志级别控制，优先于 `-v`
/// - `DASH_LOG_FILE`：日志文件路径，设置后日志写入文件而非终端
///
/// ```bash
/// # 详细日志输出到终端
/// backups-dash -v status
///
/// # 日志输出到文件
/// DASH_LOG_FILE=dash.log backups-dash watch
///
/// # 只看索引相关的调试日志
/// RUST_LOG=dashboard_core::index=debug backups-dash history
/// ```
///
/// 终端输出使用简洁格式；文件输出包含模块路径、线程名和行号。
pub fn setup_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let default_level = if verbose { "debug" } else { DEFAULT_LOG_LEVEL };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let log_file = std::env::var(LOG_FILE_ENV).ok().and_then(|path| {
        match std::fs::OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => Some(file),
            Err(e) => {
                eprintln!("无法打开日志文件 {path}: {e}，改为输出到终端");
                None
            }
        }
    });

    match log_file {
        Some(file) => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(file)
                .with_ansi(false)
                .with_target(true)
                .with_thread_names(true)
                .with_line_number(true)
                .init();
        }
        None => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_thread_names(false)
                .with_line_number(false)
                .without_time()
                .compact()
                .init();
        }
    }
}
