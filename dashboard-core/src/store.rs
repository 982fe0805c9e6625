use crate::error::Result;
use crate::index::{BackupIndex, DayBuckets, VerificationIndex};
use crate::records::{BackupRecord, BackupWire, ServiceConfig, VerificationRecord, VerificationWire};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

/// 备份集合：记录和索引一起替换
#[derive(Debug, Clone, Default)]
pub struct BackupCollection {
    records: Vec<Arc<BackupRecord>>,
    index: BackupIndex,
}

impl BackupCollection {
    /// 从服务端对象加载，任何一条记录无效则整体失败
    pub fn from_wire(wires: Vec<BackupWire>, now: DateTime<Utc>) -> Result<Self> {
        let records = wires
            .into_iter()
            .map(|wire| BackupRecord::from_wire(wire, now).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_records(records))
    }

    pub fn from_records(records: Vec<Arc<BackupRecord>>) -> Self {
        let index = BackupIndex::build(&records);
        Self { records, index }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn by_service(&self) -> &BTreeMap<String, Vec<Arc<BackupRecord>>> {
        self.index.by_service()
    }

    pub fn by_service_and_day_bucket(&self, now: DateTime<Utc>) -> DayBuckets {
        self.index.by_service_and_day_bucket(now)
    }

    pub fn by_service_and_id(&self, service: &str, id: &str) -> Option<&Arc<BackupRecord>> {
        self.index.find(service, id)
    }
}

/// 校验集合
#[derive(Debug, Clone, Default)]
pub struct VerificationCollection {
    records: Vec<Arc<VerificationRecord>>,
    index: VerificationIndex,
}

impl VerificationCollection {
    pub fn from_wire(wires: Vec<VerificationWire>, now: DateTime<Utc>) -> Result<Self> {
        let records = wires
            .into_iter()
            .map(|wire| VerificationRecord::from_wire(wire, now).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_records(records))
    }

    pub fn from_records(records: Vec<Arc<VerificationRecord>>) -> Self {
        let index = VerificationIndex::build(&records);
        Self { records, index }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 某个备份最有代表性的校验记录
    pub fn by_backup_id(&self, backup_id: &str) -> Option<&Arc<VerificationRecord>> {
        self.index.best_for_backup(backup_id)
    }
}

/// 服务配置目录
#[derive(Debug, Clone, Default)]
pub struct ServiceDirectory {
    services: BTreeMap<String, ServiceConfig>,
}

impl ServiceDirectory {
    pub fn new(services: Vec<ServiceConfig>) -> Self {
        let services = services
            .into_iter()
            .map(|service| (service.id.clone(), service))
            .collect();
        Self { services }
    }

    pub fn get(&self, service: &str) -> Option<&ServiceConfig> {
        self.services.get(service)
    }

    /// 服务是否关闭了健康检查
    pub fn is_healthcheck_disabled(&self, service: &str) -> bool {
        self.get(service)
            .is_some_and(|config| config.disable_healthcheck)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

/// 面板数据：每个集合在第一次刷新完成前为 `None`
#[derive(Debug, Clone, Default)]
pub struct DataStore {
    pub backups: Option<BackupCollection>,
    pub verifications: Option<VerificationCollection>,
    pub services: Option<ServiceDirectory>,
}
