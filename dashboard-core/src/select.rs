//! 代表记录选择
//!
//! 同一分组（同一天、同一备份）内可能有多条记录，这里按状态优先级挑出
//! 最能说明情况的一条：优先级高的状态优先，同状态下开始时间最新的优先。

use crate::records::{BackupRecord, BackupState, VerificationRecord, VerificationState};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// 备份状态优先级（由高到低）
pub const BACKUP_STATE_PRIORITY: [BackupState; 6] = [
    BackupState::Finished,
    BackupState::Uploading,
    BackupState::Receiving,
    BackupState::Waiting,
    BackupState::Failed,
    BackupState::Timedout,
];

/// 校验状态优先级（由高到低）
pub const VERIFICATION_STATE_PRIORITY: [VerificationState; 4] = [
    VerificationState::Finished,
    VerificationState::Started,
    VerificationState::Failed,
    VerificationState::Timedout,
];

/// 带状态和开始时间的记录
pub trait Stateful {
    type State: Copy + PartialEq;

    fn state(&self) -> Self::State;

    fn started_at(&self) -> DateTime<Utc>;
}

impl Stateful for BackupRecord {
    type State = BackupState;

    fn state(&self) -> BackupState {
        self.state
    }

    fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

impl Stateful for VerificationRecord {
    type State = VerificationState;

    fn state(&self) -> VerificationState {
        self.state
    }

    fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

impl<T: Stateful> Stateful for Arc<T> {
    type State = T::State;

    fn state(&self) -> T::State {
        self.as_ref().state()
    }

    fn started_at(&self) -> DateTime<Utc> {
        self.as_ref().started_at()
    }
}

/// 选出代表记录
///
/// 先按开始时间倒序（稳定排序，同一时间保持输入顺序），再按优先级依次查找，
/// 返回第一个出现的状态中最新的记录。没有任何记录的状态在优先级列表中时返回 `None`。
pub fn pick_representative<'a, R: Stateful>(
    records: &'a [R],
    priority: &[R::State],
) -> Option<&'a R> {
    let mut newest_first: Vec<&R> = records.iter().collect();
    newest_first.sort_by(|a, b| b.started_at().cmp(&a.started_at()));

    priority.iter().find_map(|state| {
        newest_first
            .iter()
            .copied()
            .find(|record| record.state() == *state)
    })
}

/// 按备份优先级选出代表备份
pub fn pick_backup<R: Stateful<State = BackupState>>(records: &[R]) -> Option<&R> {
    pick_representative(records, &BACKUP_STATE_PRIORITY)
}

/// 按校验优先级选出代表校验
pub fn pick_verification<R: Stateful<State = VerificationState>>(records: &[R]) -> Option<&R> {
    pick_representative(records, &VERIFICATION_STATE_PRIORITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Sample {
        name: &'static str,
        state: BackupState,
        started_ms: i64,
    }

    impl Stateful for Sample {
        type State = BackupState;

        fn state(&self) -> BackupState {
            self.state
        }

        fn started_at(&self) -> DateTime<Utc> {
            DateTime::from_timestamp_millis(self.started_ms).unwrap()
        }
    }

    fn sample(name: &'static str, state: BackupState, started_ms: i64) -> Sample {
        Sample {
            name,
            state,
            started_ms,
        }
    }

    #[test]
    fn test_empty_input_yields_none() {
        let records: Vec<Sample> = Vec::new();
        assert!(pick_backup(&records).is_none());
    }

    #[test]
    fn test_finished_outranks_failed() {
        // 同一天内一次成功一次失败，应该选成功的那次
        let records = vec![
            sample("failed", BackupState::Failed, 2_000),
            sample("finished", BackupState::Finished, 1_000),
        ];
        assert_eq!(pick_backup(&records).unwrap().name, "finished");
    }

    #[test]
    fn test_most_recent_wins_within_state() {
        let records = vec![
            sample("old", BackupState::Finished, 1_000),
            sample("new", BackupState::Finished, 3_000),
            sample("mid", BackupState::Finished, 2_000),
        ];
        assert_eq!(pick_backup(&records).unwrap().name, "new");
    }

    #[test]
    fn test_ties_keep_input_order() {
        let records = vec![
            sample("first", BackupState::Waiting, 1_000),
            sample("second", BackupState::Waiting, 1_000),
        ];
        assert_eq!(pick_backup(&records).unwrap().name, "first");
    }

    #[test]
    fn test_states_outside_priority_yield_none() {
        let records = vec![
            sample("queued", BackupState::Queued, 1_000),
            sample("unknown", BackupState::Unknown, 2_000),
        ];
        assert!(pick_backup(&records).is_none());

        let records = vec![sample("failed", BackupState::Failed, 1_000)];
        assert!(pick_representative(&records, &[BackupState::Finished]).is_none());
    }

    #[test]
    fn test_in_progress_outranks_failures() {
        let records = vec![
            sample("timedout", BackupState::Timedout, 5_000),
            sample("failed", BackupState::Failed, 4_000),
            sample("waiting", BackupState::Waiting, 1_000),
            sample("uploading", BackupState::Uploading, 500),
        ];
        assert_eq!(pick_backup(&records).unwrap().name, "uploading");
    }

    #[test]
    fn test_verification_priority_order() {
        assert_eq!(VERIFICATION_STATE_PRIORITY[0], VerificationState::Finished);
        assert_eq!(VERIFICATION_STATE_PRIORITY[1], VerificationState::Started);
        assert_eq!(BACKUP_STATE_PRIORITY.len(), 6);
        assert!(!BACKUP_STATE_PRIORITY.contains(&BackupState::Queued));
    }
}
