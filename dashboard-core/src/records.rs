use crate::constants::record::SHORT_ID_LEN;
use crate::error::{DashError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// 备份任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BackupState {
    Waiting,
    Receiving,
    Queued,
    Uploading,
    Finished,
    Failed,
    Timedout,
    /// 服务端返回了无法识别的状态
    #[serde(other)]
    Unknown,
}

impl BackupState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackupState::Waiting => "WAITING",
            BackupState::Receiving => "RECEIVING",
            BackupState::Queued => "QUEUED",
            BackupState::Uploading => "UPLOADING",
            BackupState::Finished => "FINISHED",
            BackupState::Failed => "FAILED",
            BackupState::Timedout => "TIMEDOUT",
            BackupState::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for BackupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 校验任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationState {
    Started,
    Finished,
    Failed,
    Timedout,
    #[serde(other)]
    Unknown,
}

impl VerificationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationState::Started => "STARTED",
            VerificationState::Finished => "FINISHED",
            VerificationState::Failed => "FAILED",
            VerificationState::Timedout => "TIMEDOUT",
            VerificationState::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for VerificationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `GET /api/backup` 返回的原始备份对象
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupWire {
    pub id: String,
    #[serde(default)]
    pub service: Option<String>,
    /// 毫秒时间戳
    pub started_date: i64,
    #[serde(default)]
    pub completed_date: Option<i64>,
    pub state: BackupState,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub original_size: i64,
    #[serde(default)]
    pub source_address: Option<String>,
    #[serde(default)]
    pub node_name: Option<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub chunks: BTreeMap<String, Vec<ChunkWire>>,
    #[serde(default)]
    pub verification_id: Option<String>,
}

/// 原始分块描述
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkWire {
    pub path: String,
    #[serde(default)]
    pub original_size: i64,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub stored_date: Option<i64>,
    #[serde(default)]
    pub node_name: Option<String>,
    #[serde(default)]
    pub compression_codec: Option<String>,
}

/// `GET /api/verification` 返回的原始校验对象
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationWire {
    pub id: String,
    #[serde(default)]
    pub backup_id: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    pub started_date: i64,
    #[serde(default)]
    pub completed_date: Option<i64>,
    pub state: VerificationState,
    #[serde(default)]
    pub source_address: Option<String>,
    #[serde(default)]
    pub node_name: Option<String>,
}

/// `GET /api/services` 返回的服务配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    pub id: String,
    #[serde(default)]
    pub disable_healthcheck: bool,
}

/// 备份记录
#[derive(Debug, Clone, Serialize)]
pub struct BackupRecord {
    pub id: String,
    pub short_id: String,
    pub service: Option<String>,
    pub state: BackupState,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub size: i64,
    pub original_size: i64,
    /// 耗时（秒），未完成时以加载时刻代替完成时刻
    pub duration: f64,
    pub source_address: Option<String>,
    pub node_name: Option<String>,
    pub locations: BTreeSet<String>,
    pub chunks: BTreeMap<String, Vec<Chunk>>,
    pub verification_id: Option<String>,
}

/// 备份文件的分块
#[derive(Debug, Clone, Serialize)]
pub struct Chunk {
    pub path: String,
    pub original_size: i64,
    pub size: i64,
    pub hash: String,
    pub stored_at: Option<DateTime<Utc>>,
    pub node_name: Option<String>,
    pub compression_codec: Option<String>,
}

/// 校验记录
#[derive(Debug, Clone, Serialize)]
pub struct VerificationRecord {
    pub id: String,
    pub short_id: String,
    pub backup_id: Option<String>,
    pub service: Option<String>,
    pub state: VerificationState,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration: f64,
    pub source_address: Option<String>,
    pub node_name: Option<String>,
}

impl BackupRecord {
    /// 从服务端对象构建备份记录，`now` 用于计算进行中任务的耗时
    pub fn from_wire(wire: BackupWire, now: DateTime<Utc>) -> Result<Self> {
        let short_id = short_id(&wire.id)?;
        let started_at = timestamp(&wire.id, "startedDate", wire.started_date)?;
        let completed_at = wire
            .completed_date
            .map(|ms| timestamp(&wire.id, "completedDate", ms))
            .transpose()?;
        let duration = duration_seconds(started_at, completed_at, now);

        let chunks = wire
            .chunks
            .into_iter()
            .map(|(filename, chunks)| {
                let chunks = chunks
                    .into_iter()
                    .map(|chunk| Chunk::from_wire(&wire.id, chunk))
                    .collect::<Result<Vec<_>>>()?;
                Ok((filename, chunks))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        Ok(Self {
            short_id,
            service: wire.service,
            state: wire.state,
            started_at,
            completed_at,
            size: wire.size,
            original_size: wire.original_size,
            duration,
            source_address: wire.source_address,
            node_name: wire.node_name,
            locations: wire.locations.into_iter().collect(),
            chunks,
            verification_id: wire.verification_id,
            id: wire.id,
        })
    }
}

impl Chunk {
    fn from_wire(backup_id: &str, wire: ChunkWire) -> Result<Self> {
        let stored_at = wire
            .stored_date
            .map(|ms| timestamp(backup_id, "storedDate", ms))
            .transpose()?;

        Ok(Self {
            path: wire.path,
            original_size: wire.original_size,
            size: wire.size,
            hash: wire.hash,
            stored_at,
            node_name: wire.node_name,
            compression_codec: wire.compression_codec,
        })
    }
}

impl VerificationRecord {
    /// 从服务端对象构建校验记录
    pub fn from_wire(wire: VerificationWire, now: DateTime<Utc>) -> Result<Self> {
        let short_id = short_id(&wire.id)?;
        let started_at = timestamp(&wire.id, "startedDate", wire.started_date)?;
        let completed_at = wire
            .completed_date
            .map(|ms| timestamp(&wire.id, "completedDate", ms))
            .transpose()?;

        Ok(Self {
            short_id,
            backup_id: wire.backup_id,
            service: wire.service,
            state: wire.state,
            started_at,
            completed_at,
            duration: duration_seconds(started_at, completed_at, now),
            source_address: wire.source_address,
            node_name: wire.node_name,
            id: wire.id,
        })
    }
}

/// 取ID的前8个字符作为短ID
pub fn short_id(id: &str) -> Result<String> {
    if id.chars().count() < SHORT_ID_LEN {
        return Err(DashError::invalid_record(format!(
            "ID长度不足{SHORT_ID_LEN}个字符: {id:?}"
        )));
    }
    Ok(id.chars().take(SHORT_ID_LEN).collect())
}

/// 计算耗时（秒），未完成时以 `now` 代替完成时刻
pub fn duration_seconds(
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> f64 {
    let end = completed_at.unwrap_or(now);
    (end - started_at).num_milliseconds() as f64 / 1000.0
}

fn timestamp(id: &str, field: &str, millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        DashError::invalid_record(format!("记录 {id} 的 {field} 超出范围: {millis}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()
    }

    #[test]
    fn test_backup_from_wire_completed() {
        let wire: BackupWire = serde_json::from_value(json!({
            "id": "0123456789abcdef",
            "service": "db",
            "startedDate": 1_699_999_000_000i64,
            "completedDate": 1_699_999_090_500i64,
            "state": "FINISHED",
            "size": 2048,
            "originalSize": 4096,
            "sourceAddress": "10.0.0.1",
            "nodeName": "node-1",
            "locations": ["OFFSITE", "LOCAL", "LOCAL"],
            "chunks": {
                "dump.sql": [
                    {"path": "db/dump.sql.0", "size": 1024, "originalSize": 2048,
                     "hash": "abc", "storedDate": 1_699_999_050_000i64}
                ]
            },
            "transitions": []
        }))
        .unwrap();

        let backup = BackupRecord::from_wire(wire, now()).unwrap();
        assert_eq!(backup.short_id, "01234567");
        assert_eq!(backup.service.as_deref(), Some("db"));
        assert_eq!(backup.state, BackupState::Finished);
        assert_eq!(backup.duration, 90.5);
        assert_eq!(backup.locations.len(), 2);
        assert_eq!(backup.chunks["dump.sql"][0].original_size, 2048);
        assert!(backup.chunks["dump.sql"][0].stored_at.is_some());
    }

    #[test]
    fn test_in_progress_duration_uses_now() {
        let wire: BackupWire = serde_json::from_value(json!({
            "id": "abcdefgh-1234",
            "service": "db",
            "startedDate": 1_699_999_940_000i64,
            "state": "RECEIVING"
        }))
        .unwrap();

        let backup = BackupRecord::from_wire(wire, now()).unwrap();
        assert!(backup.completed_at.is_none());
        assert_eq!(backup.duration, 60.0);
    }

    #[test]
    fn test_short_id_rejects_short_ids() {
        assert_eq!(short_id("12345678").unwrap(), "12345678");
        assert!(matches!(short_id("1234567"), Err(DashError::InvalidRecord(_))));
    }

    #[test]
    fn test_unknown_states_are_tolerated() {
        let wire: VerificationWire = serde_json::from_value(json!({
            "id": "verify-0001",
            "backupId": "0123456789abcdef",
            "startedDate": 1_699_999_000_000i64,
            "state": "SOMETHING_NEW"
        }))
        .unwrap();
        assert_eq!(wire.state, VerificationState::Unknown);
        assert!(wire.service.is_none());

        let queued: BackupState = serde_json::from_value(json!("QUEUED")).unwrap();
        assert_eq!(queued, BackupState::Queued);
        assert_eq!(BackupState::Timedout.to_string(), "TIMEDOUT");
    }

    #[test]
    fn test_service_config_defaults() {
        let config: ServiceConfig = serde_json::from_value(json!({"id": "db"})).unwrap();
        assert!(!config.disable_healthcheck);

        let config: ServiceConfig =
            serde_json::from_value(json!({"id": "db", "disableHealthcheck": true})).unwrap();
        assert!(config.disable_healthcheck);
    }
}
