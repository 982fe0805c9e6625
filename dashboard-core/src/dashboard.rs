use crate::api::DataSource;
use crate::config::AppConfig;
use crate::constants::dashboard::DEFAULT_WINDOW_DAYS;
use crate::error::{DashError, Result};
use crate::events::Notification;
use crate::format::local_offset;
use crate::records::{BackupWire, ServiceConfig, VerificationWire};
use crate::store::{BackupCollection, DataStore, ServiceDirectory, VerificationCollection};
use crate::views::{DashboardView, RenderContext};
use chrono::{DateTime, FixedOffset, Utc};
use futures::future::LocalBoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// 渲染设置
#[derive(Debug, Clone, Copy)]
pub struct RenderSettings {
    pub window_days: u32,
    pub offset: FixedOffset,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            offset: local_offset(),
        }
    }
}

impl RenderSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            window_days: config.dashboard.window_days,
            offset: config.display_offset(),
        }
    }
}

struct ViewSlot {
    view: Box<dyn DashboardView>,
    html: Option<String>,
    renders: usize,
}

enum Fetched {
    Backups(Result<Vec<BackupWire>>),
    Verifications(Result<Vec<VerificationWire>>),
    Services(Result<Vec<ServiceConfig>>),
}

/// 面板：持有数据和已注册的视图，数据刷新后重新渲染依赖它的视图
pub struct Dashboard {
    store: DataStore,
    views: Vec<ViewSlot>,
    settings: RenderSettings,
    output_dir: Option<PathBuf>,
    fixed_now: Option<DateTime<Utc>>,
}

impl Dashboard {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            store: DataStore::default(),
            views: Vec::new(),
            settings,
            output_dir: None,
            fixed_now: None,
        }
    }

    /// 每次渲染后把 HTML 写入该目录
    pub fn with_output_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.output_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// 固定当前时刻，用于可重复的渲染
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.fixed_now = Some(now);
        self
    }

    /// 注册视图
    pub fn register<V: DashboardView + 'static>(&mut self, view: V) -> &mut Self {
        debug!("注册视图: {}", view.name());
        self.views.push(ViewSlot {
            view: Box::new(view),
            html: None,
            renders: 0,
        });
        self
    }

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    pub fn settings(&self) -> RenderSettings {
        self.settings
    }

    fn now(&self) -> DateTime<Utc> {
        self.fixed_now.unwrap_or_else(Utc::now)
    }

    /// 当前渲染上下文
    pub fn context(&self) -> RenderContext {
        RenderContext {
            now: self.now(),
            offset: self.settings.offset,
            window_days: self.settings.window_days,
        }
    }

    /// 替换备份数据；解析失败时保留原有数据
    pub fn apply_backups(&mut self, wires: Vec<BackupWire>) -> Result<()> {
        let backups = BackupCollection::from_wire(wires, self.now())?;
        info!("📦 备份数据已刷新: {} 条记录", backups.len());
        self.store.backups = Some(backups);
        self.notify(Notification::BackupsRefreshed)
    }

    /// 替换校验数据
    pub fn apply_verifications(&mut self, wires: Vec<VerificationWire>) -> Result<()> {
        let verifications = VerificationCollection::from_wire(wires, self.now())?;
        info!("🔍 校验数据已刷新: {} 条记录", verifications.len());
        self.store.verifications = Some(verifications);
        self.notify(Notification::VerificationsRefreshed)
    }

    /// 替换服务配置
    pub fn apply_services(&mut self, services: Vec<ServiceConfig>) -> Result<()> {
        let services = ServiceDirectory::new(services);
        info!("⚙️ 服务配置已刷新: {} 个服务", services.len());
        self.store.services = Some(services);
        self.notify(Notification::ServicesRefreshed)
    }

    /// 重新渲染依赖该通知的视图
    pub fn notify(&mut self, notification: Notification) -> Result<()> {
        debug!("收到通知: {}", notification);
        self.render_where(|view| view.depends_on().contains(&notification))
    }

    /// 重新渲染全部视图
    pub fn render_all(&mut self) -> Result<()> {
        self.render_where(|_| true)
    }

    /// 依次渲染符合条件的视图
    ///
    /// 写文件失败不会中断其余视图，返回第一个写入错误。
    fn render_where<F>(&mut self, filter: F) -> Result<()>
    where
        F: Fn(&dyn DashboardView) -> bool,
    {
        let ctx = self.context();
        let mut first_error = None;

        for slot in self.views.iter_mut() {
            if !filter(slot.view.as_ref()) {
                continue;
            }

            let html = slot.view.render(&self.store, &ctx);
            slot.renders += 1;

            if let Some(dir) = &self.output_dir {
                if let Err(e) = write_view(dir, slot.view.file_name(), &html) {
                    error!("❌ 视图 {} 写入失败: {}", slot.view.name(), e);
                    first_error.get_or_insert(e);
                } else {
                    debug!("视图 {} 已写入: {}", slot.view.name(), dir.display());
                }
            }

            slot.html = Some(html);
        }

        first_error.map_or(Ok(()), Err)
    }

    /// 视图最近一次渲染的 HTML
    pub fn html(&self, name: &str) -> Option<&str> {
        self.slot(name).and_then(|slot| slot.html.as_deref())
    }

    /// 视图被渲染的次数
    pub fn render_count(&self, name: &str) -> usize {
        self.slot(name).map_or(0, |slot| slot.renders)
    }

    /// 视图模型的 JSON 形式
    pub fn model(&self, name: &str) -> Result<serde_json::Value> {
        let slot = self
            .slot(name)
            .ok_or_else(|| DashError::custom(format!("未注册的视图: {name}")))?;
        slot.view.model(&self.store, &self.context())
    }

    pub fn view_names(&self) -> Vec<&str> {
        self.views.iter().map(|slot| slot.view.name()).collect()
    }

    fn slot(&self, name: &str) -> Option<&ViewSlot> {
        self.views.iter().find(|slot| slot.view.name() == name)
    }

    /// 并发获取三类数据，每完成一个就立即应用
    ///
    /// 某个请求失败不影响其他数据的应用，返回遇到的第一个错误。
    pub async fn refresh<S: DataSource>(&mut self, source: &S) -> Result<()> {
        let mut pending: FuturesUnordered<LocalBoxFuture<'_, Fetched>> = FuturesUnordered::new();
        pending.push(source.fetch_backups().map(Fetched::Backups).boxed_local());
        pending.push(
            source
                .fetch_verifications()
                .map(Fetched::Verifications)
                .boxed_local(),
        );
        pending.push(source.fetch_services().map(Fetched::Services).boxed_local());

        let mut first_error = None;

        while let Some(fetched) = pending.next().await {
            let (what, result) = match fetched {
                Fetched::Backups(result) => ("备份", result.and_then(|wires| self.apply_backups(wires))),
                Fetched::Verifications(result) => (
                    "校验",
                    result.and_then(|wires| self.apply_verifications(wires)),
                ),
                Fetched::Services(result) => (
                    "服务配置",
                    result.and_then(|services| self.apply_services(services)),
                ),
            };

            match result {
                // 数据已应用，写入错误在渲染时已记录
                Err(e @ DashError::Output { .. }) => {
                    first_error.get_or_insert(e);
                }
                Err(e) => {
                    error!("❌ 刷新{}数据失败: {}", what, e);
                    first_error.get_or_insert(e);
                }
                Ok(()) => {}
            }
        }

        match first_error {
            Some(e) => {
                warn!("⚠️ 刷新未完全成功: {}", e);
                Err(e)
            }
            None => Ok(()),
        }
    }
}

fn write_view(dir: &Path, file_name: String, html: &str) -> Result<()> {
    let path = dir.join(file_name);
    fs::create_dir_all(dir)
        .and_then(|_| fs::write(&path, html))
        .map_err(|source| DashError::Output { path, source })
}
