use crate::app::CliApp;
use crate::cli::DumpView;
use dashboard_core::error::{DashError, Result};
use dashboard_core::views::{DetailView, HistoryView, StatusGridView};

/// 以JSON输出视图模型
pub async fn run_dump(
    app: &CliApp,
    view: DumpView,
    service: Option<String>,
    id: Option<String>,
) -> Result<()> {
    let mut dashboard = app.new_dashboard();

    match view {
        DumpView::Status => {
            dashboard.register(StatusGridView);
        }
        DumpView::History => {
            dashboard.register(HistoryView);
        }
        DumpView::Detail => {
            let (Some(service), Some(id)) = (service, id) else {
                return Err(DashError::custom("detail 视图需要 --service 和 --id 参数"));
            };
            dashboard.register(DetailView::new(service, id));
        }
    }

    app.refresh(&mut dashboard).await?;

    let model = dashboard.model(view.as_str())?;
    // JSON 直接写到标准输出，便于管道处理
    println!("{}", serde_json::to_string_pretty(&model)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_core::config::AppConfig;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_detail_dump_requires_service_and_id() {
        let app = CliApp::from_config(AppConfig::default(), PathBuf::from("dashboard.toml")).unwrap();
        let result = run_dump(&app, DumpView::Detail, Some("db".to_string()), None).await;
        assert!(matches!(result, Err(DashError::Custom(_))));
    }
}
