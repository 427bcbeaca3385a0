//! Store wrappers shared by unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use uuid::Uuid;

use crate::config::PolicyConfig;
use crate::error::EngineResult;
use crate::models::{LeaveBalance, LeaveRequest, PunchEvent};

use super::{
    CommitOutcome, DocumentStore, InMemoryStore, LeaveFilter, PunchFilter, Versioned, WriteBatch,
};

/// Delegates to an in-memory store but reports a conflict for the first
/// `conflicts` commits.
#[derive(Debug)]
pub(crate) struct FlakyStore {
    pub(crate) inner: InMemoryStore,
    conflicts: AtomicU32,
    commits: AtomicU32,
}

impl FlakyStore {
    pub(crate) fn new(conflicts: u32) -> Self {
        Self {
            inner: InMemoryStore::new(),
            conflicts: AtomicU32::new(conflicts),
            commits: AtomicU32::new(0),
        }
    }

    /// Commit attempts seen so far, conflicting or not.
    pub(crate) fn commits(&self) -> u32 {
        self.commits.load(Ordering::SeqCst)
    }
}

impl DocumentStore for FlakyStore {
    fn append_punch(&self, event: PunchEvent) -> EngineResult<()> {
        self.inner.append_punch(event)
    }
    fn punches(&self, filter: &PunchFilter) -> EngineResult<Vec<PunchEvent>> {
        self.inner.punches(filter)
    }
    fn policy(&self) -> EngineResult<Option<Arc<PolicyConfig>>> {
        self.inner.policy()
    }
    fn replace_policy(&self, policy: PolicyConfig) -> EngineResult<Arc<PolicyConfig>> {
        self.inner.replace_policy(policy)
    }
    fn balance(&self, user_id: &str) -> EngineResult<Option<Versioned<LeaveBalance>>> {
        self.inner.balance(user_id)
    }
    fn request(&self, id: Uuid) -> EngineResult<Option<Versioned<LeaveRequest>>> {
        self.inner.request(id)
    }
    fn requests(&self, filter: &LeaveFilter) -> EngineResult<Vec<LeaveRequest>> {
        self.inner.requests(filter)
    }
    fn commit(&self, batch: WriteBatch) -> EngineResult<CommitOutcome> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        let remaining = self.conflicts.load(Ordering::SeqCst);
        if remaining > 0 {
            self.conflicts.store(remaining - 1, Ordering::SeqCst);
            return Ok(CommitOutcome::Conflict);
        }
        self.inner.commit(batch)
    }
}
