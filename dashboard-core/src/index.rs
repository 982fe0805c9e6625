use crate::constants::record::DAY_IN_MILLISECONDS;
use crate::records::{BackupRecord, VerificationRecord};
use crate::select::pick_verification;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// 服务 -> 天数桶 -> 备份列表
pub type DayBuckets = BTreeMap<String, BTreeMap<i64, Vec<Arc<BackupRecord>>>>;

/// 按分组键归类，键缺失的记录直接跳过，组内保持输入顺序
pub fn group_by<T, K, F>(records: &[Arc<T>], key: F) -> BTreeMap<K, Vec<Arc<T>>>
where
    K: Ord,
    F: Fn(&T) -> Option<K>,
{
    let mut groups: BTreeMap<K, Vec<Arc<T>>> = BTreeMap::new();
    let mut skipped = 0usize;

    for record in records {
        match key(record) {
            Some(k) => groups.entry(k).or_default().push(Arc::clone(record)),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!("分组时跳过 {} 条缺少分组键的记录", skipped);
    }

    groups
}

/// 记录开始时间距 `now` 的整天数（向下取整，未来时间得到负数）
pub fn day_bucket(now: DateTime<Utc>, started_at: DateTime<Utc>) -> i64 {
    let elapsed = now.timestamp_millis() - started_at.timestamp_millis();
    elapsed.div_euclid(DAY_IN_MILLISECONDS)
}

/// 备份索引
#[derive(Debug, Clone, Default)]
pub struct BackupIndex {
    by_service: BTreeMap<String, Vec<Arc<BackupRecord>>>,
}

impl BackupIndex {
    /// 全量重建索引
    pub fn build(records: &[Arc<BackupRecord>]) -> Self {
        let by_service = group_by(records, |backup| backup.service.clone());
        debug!(
            "备份索引重建完成: {} 条记录, {} 个服务",
            records.len(),
            by_service.len()
        );
        Self { by_service }
    }

    /// 按服务分组的备份
    pub fn by_service(&self) -> &BTreeMap<String, Vec<Arc<BackupRecord>>> {
        &self.by_service
    }

    /// 按服务和天数桶分组的备份，桶号相对于 `now` 计算
    pub fn by_service_and_day_bucket(&self, now: DateTime<Utc>) -> DayBuckets {
        self.by_service
            .iter()
            .map(|(service, backups)| {
                let mut buckets: BTreeMap<i64, Vec<Arc<BackupRecord>>> = BTreeMap::new();
                for backup in backups {
                    buckets
                        .entry(day_bucket(now, backup.started_at))
                        .or_default()
                        .push(Arc::clone(backup));
                }
                (service.clone(), buckets)
            })
            .collect()
    }

    /// 按服务和ID查找备份
    pub fn find(&self, service: &str, id: &str) -> Option<&Arc<BackupRecord>> {
        self.by_service
            .get(service)?
            .iter()
            .rev()
            .find(|backup| backup.id == id)
    }
}

/// 校验索引
#[derive(Debug, Clone, Default)]
pub struct VerificationIndex {
    by_backup_id: BTreeMap<String, Vec<Arc<VerificationRecord>>>,
}

impl VerificationIndex {
    /// 全量重建索引
    pub fn build(records: &[Arc<VerificationRecord>]) -> Self {
        let by_backup_id = group_by(records, |verification| verification.backup_id.clone());
        debug!(
            "校验索引重建完成: {} 条记录, {} 个备份",
            records.len(),
            by_backup_id.len()
        );
        Self { by_backup_id }
    }

    /// 某个备份的全部校验记录
    pub fn for_backup(&self, backup_id: &str) -> &[Arc<VerificationRecord>] {
        self.by_backup_id
            .get(backup_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// 某个备份最有代表性的校验记录
    pub fn best_for_backup(&self, backup_id: &str) -> Option<&Arc<VerificationRecord>> {
        pick_verification(self.for_backup(backup_id))
    }

    pub fn len(&self) -> usize {
        self.by_backup_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_backup_id.is_empty()
    }
}
