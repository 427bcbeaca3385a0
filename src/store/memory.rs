//! In-process [`DocumentStore`] implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use uuid::Uuid;

use crate::config::PolicyConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{LeaveBalance, LeaveRequest, PunchEvent};

use super::{
    CommitOutcome, DocumentStore, LeaveFilter, PunchFilter, RecordKey, StagedWrite, Versioned,
    WriteBatch,
};

#[derive(Debug, Default)]
struct Records {
    balances: HashMap<String, Versioned<LeaveBalance>>,
    requests: HashMap<Uuid, Versioned<LeaveRequest>>,
    last_version: u64,
}

impl Records {
    fn version_of(&self, key: &RecordKey) -> Option<u64> {
        match key {
            RecordKey::Balance(user_id) => self.balances.get(user_id).map(|r| r.version),
            RecordKey::Request(id) => self.requests.get(id).map(|r| r.version),
        }
    }

    fn apply(&mut self, write: StagedWrite) {
        self.last_version += 1;
        let version = self.last_version;
        match write {
            StagedWrite::Balance(value) => {
                self.balances
                    .insert(value.user_id.clone(), Versioned { value, version });
            }
            StagedWrite::Request(value) => {
                self.requests.insert(value.id, Versioned { value, version });
            }
        }
    }
}

/// A thread-safe store held entirely in memory.
///
/// Balances and requests share one lock so that [`commit`] can check all
/// preconditions and apply all writes as a single step.
///
/// [`commit`]: DocumentStore::commit
#[derive(Debug, Default)]
pub struct InMemoryStore {
    punches: RwLock<Vec<PunchEvent>>,
    policy: RwLock<Option<Arc<PolicyConfig>>>,
    records: RwLock<Records>,
}

fn lock_poisoned(what: &str) -> EngineError {
    EngineError::StoreUnavailable {
        message: format!("{} lock poisoned", what),
    }
}

impl InMemoryStore {
    /// Creates an empty store with no policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store seeded with `policy`.
    pub fn with_policy(policy: PolicyConfig) -> Self {
        Self {
            policy: RwLock::new(Some(Arc::new(policy))),
            ..Self::default()
        }
    }
}

impl DocumentStore for InMemoryStore {
    fn append_punch(&self, event: PunchEvent) -> EngineResult<()> {
        self.punches
            .write()
            .map_err(|_| lock_poisoned("punch"))?
            .push(event);
        Ok(())
    }

    fn punches(&self, filter: &PunchFilter) -> EngineResult<Vec<PunchEvent>> {
        let punches = self.punches.read().map_err(|_| lock_poisoned("punch"))?;
        Ok(punches.iter().filter(|e| filter.matches(e)).cloned().collect())
    }

    fn policy(&self) -> EngineResult<Option<Arc<PolicyConfig>>> {
        let policy = self.policy.read().map_err(|_| lock_poisoned("policy"))?;
        Ok(policy.clone())
    }

    fn replace_policy(&self, policy: PolicyConfig) -> EngineResult<Arc<PolicyConfig>> {
        let snapshot = Arc::new(policy);
        *self.policy.write().map_err(|_| lock_poisoned("policy"))? = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    fn balance(&self, user_id: &str) -> EngineResult<Option<Versioned<LeaveBalance>>> {
        let records = self.records.read().map_err(|_| lock_poisoned("record"))?;
        Ok(records.balances.get(user_id).cloned())
    }

    fn request(&self, id: Uuid) -> EngineResult<Option<Versioned<LeaveRequest>>> {
        let records = self.records.read().map_err(|_| lock_poisoned("record"))?;
        Ok(records.requests.get(&id).cloned())
    }

    fn requests(&self, filter: &LeaveFilter) -> EngineResult<Vec<LeaveRequest>> {
        let records = self.records.read().map_err(|_| lock_poisoned("record"))?;
        let mut matching: Vec<LeaveRequest> = records
            .requests
            .values()
            .map(|r| &r.value)
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.applied_at.cmp(&a.applied_at).then_with(|| a.id.cmp(&b.id)));
        Ok(matching)
    }

    fn commit(&self, batch: WriteBatch) -> EngineResult<CommitOutcome> {
        let mut records = self.records.write().map_err(|_| lock_poisoned("record"))?;

        let stale = batch
            .expected
            .iter()
            .any(|(key, expected)| records.version_of(key) != *expected);
        if stale {
            return Ok(CommitOutcome::Conflict);
        }

        for write in batch.writes {
            records.apply(write);
        }
        Ok(CommitOutcome::Committed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LeaveApplication, LeaveStatus, LeaveType};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn balance(user: &str, annual: u32) -> LeaveBalance {
        LeaveBalance {
            user_id: user.to_string(),
            annual_remaining: annual,
            sick_remaining: 5,
        }
    }

    fn request(user: &str, hour: u32) -> LeaveRequest {
        LeaveRequest::pending(
            Uuid::new_v4(),
            LeaveApplication {
                user_id: user.to_string(),
                leave_type: LeaveType::Annual,
                start_date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
                days_count: 1,
                reason: String::new(),
            },
            Utc.with_ymd_and_hms(2026, 3, 2, hour, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_commit_applies_all_writes() {
        let store = InMemoryStore::new();
        let req = request("alice", 9);
        let batch = WriteBatch {
            expected: vec![(RecordKey::Balance("alice".to_string()), None)],
            writes: vec![
                StagedWrite::Balance(balance("alice", 12)),
                StagedWrite::Request(req.clone()),
            ],
        };

        assert_eq!(store.commit(batch).unwrap(), CommitOutcome::Committed);
        assert_eq!(store.balance("alice").unwrap().unwrap().value.annual_remaining, 12);
        assert_eq!(store.request(req.id).unwrap().unwrap().value, req);
    }

    #[test]
    fn test_commit_rejects_stale_version_and_applies_nothing() {
        let store = InMemoryStore::new();
        store
            .commit(WriteBatch {
                expected: vec![],
                writes: vec![StagedWrite::Balance(balance("alice", 12))],
            })
            .unwrap();
        let read = store.balance("alice").unwrap().unwrap();

        // Another writer bumps the version.
        store
            .commit(WriteBatch {
                expected: vec![(RecordKey::Balance("alice".to_string()), Some(read.version))],
                writes: vec![StagedWrite::Balance(balance("alice", 10))],
            })
            .unwrap();

        let req = request("alice", 9);
        let outcome = store
            .commit(WriteBatch {
                expected: vec![(RecordKey::Balance("alice".to_string()), Some(read.version))],
                writes: vec![
                    StagedWrite::Balance(balance("alice", 5)),
                    StagedWrite::Request(req.clone()),
                ],
            })
            .unwrap();

        assert_eq!(outcome, CommitOutcome::Conflict);
        assert_eq!(store.balance("alice").unwrap().unwrap().value.annual_remaining, 10);
        assert!(store.request(req.id).unwrap().is_none());
    }

    #[test]
    fn test_absent_precondition_conflicts_once_created() {
        let store = InMemoryStore::new();
        let create = || WriteBatch {
            expected: vec![(RecordKey::Balance("alice".to_string()), None)],
            writes: vec![StagedWrite::Balance(balance("alice", 12))],
        };

        assert_eq!(store.commit(create()).unwrap(), CommitOutcome::Committed);
        assert_eq!(store.commit(create()).unwrap(), CommitOutcome::Conflict);
    }

    #[test]
    fn test_versions_increase() {
        let store = InMemoryStore::new();
        store
            .commit(WriteBatch {
                expected: vec![],
                writes: vec![StagedWrite::Balance(balance("alice", 12))],
            })
            .unwrap();
        let first = store.balance("alice").unwrap().unwrap().version;
        store
            .commit(WriteBatch {
                expected: vec![],
                writes: vec![StagedWrite::Balance(balance("alice", 11))],
            })
            .unwrap();
        let second = store.balance("alice").unwrap().unwrap().version;
        assert!(second > first);
    }

    #[test]
    fn test_requests_newest_first_and_filtered() {
        let store = InMemoryStore::new();
        let older = request("alice", 8);
        let newer = request("alice", 10);
        let other = request("bob", 9);
        store
            .commit(WriteBatch {
                expected: vec![],
                writes: vec![
                    StagedWrite::Request(older.clone()),
                    StagedWrite::Request(newer.clone()),
                    StagedWrite::Request(other),
                ],
            })
            .unwrap();

        let alice = store
            .requests(&LeaveFilter {
                user_id: Some("alice".to_string()),
                ..LeaveFilter::default()
            })
            .unwrap();
        assert_eq!(alice.iter().map(|r| r.id).collect::<Vec<_>>(), vec![newer.id, older.id]);

        let pending = store
            .requests(&LeaveFilter {
                status: Some(LeaveStatus::Pending),
                ..LeaveFilter::default()
            })
            .unwrap();
        assert_eq!(pending.len(), 3);
    }

    #[test]
    fn test_policy_replace_returns_new_snapshot() {
        let store = InMemoryStore::new();
        assert!(store.policy().unwrap().is_none());

        let before = store.replace_policy(PolicyConfig::default()).unwrap();
        let mut changed = PolicyConfig::default();
        changed.geofence.radius_meters = 250.0;
        store.replace_policy(changed).unwrap();

        assert_eq!(before.geofence.radius_meters, 100.0);
        assert_eq!(store.policy().unwrap().unwrap().geofence.radius_meters, 250.0);
    }
}
