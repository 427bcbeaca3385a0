//! Optimistic read-check-write transactions over a [`DocumentStore`].

use std::collections::HashMap;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{LeaveBalance, LeaveRequest};

use super::{CommitOutcome, DocumentStore, RecordKey, StagedWrite, WriteBatch};

/// Attempts made before a conflicting transaction gives up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// One attempt at a read-modify-write.
///
/// Every read records the version it saw (or that the record was absent).
/// Writes are staged and only reach the store when the attempt commits,
/// and the commit fails if anything read has changed since.
#[derive(Debug)]
pub struct Transaction<'s> {
    store: &'s dyn DocumentStore,
    reads: HashMap<RecordKey, Option<u64>>,
    writes: Vec<StagedWrite>,
}

impl<'s> Transaction<'s> {
    fn new(store: &'s dyn DocumentStore) -> Self {
        Self {
            store,
            reads: HashMap::new(),
            writes: Vec::new(),
        }
    }

    fn record_read(&mut self, key: RecordKey, version: Option<u64>) {
        // The first observation is the one the body acted on.
        self.reads.entry(key).or_insert(version);
    }

    /// Reads a user's stored balance, if any.
    pub fn get_balance(&mut self, user_id: &str) -> EngineResult<Option<LeaveBalance>> {
        let found = self.store.balance(user_id)?;
        self.record_read(
            RecordKey::Balance(user_id.to_string()),
            found.as_ref().map(|r| r.version),
        );
        Ok(found.map(|r| r.value))
    }

    /// Reads a leave request, if it exists.
    pub fn get_request(&mut self, id: Uuid) -> EngineResult<Option<LeaveRequest>> {
        let found = self.store.request(id)?;
        self.record_read(RecordKey::Request(id), found.as_ref().map(|r| r.version));
        Ok(found.map(|r| r.value))
    }

    /// Stages a balance write.
    pub fn set_balance(&mut self, balance: LeaveBalance) {
        self.writes.push(StagedWrite::Balance(balance));
    }

    /// Stages a write to an existing request.
    pub fn set_request(&mut self, request: LeaveRequest) {
        self.writes.push(StagedWrite::Request(request));
    }

    /// Stages the insert of a new request, which must not exist at commit.
    pub fn create_request(&mut self, request: LeaveRequest) {
        let write = StagedWrite::Request(request);
        self.record_read(write.key(), None);
        self.writes.push(write);
    }

    fn into_batch(self) -> WriteBatch {
        WriteBatch {
            expected: self.reads.into_iter().collect(),
            writes: self.writes,
        }
    }
}

/// Runs `body` inside a transaction, retrying on conflict.
///
/// The body is re-run from scratch on every attempt, so it must derive all
/// decisions from what it reads through the [`Transaction`]. An error from
/// the body aborts immediately without committing. After `max_attempts`
/// conflicts the call fails with [`EngineError::TransactionConflict`].
pub fn run_transaction<T, F>(
    store: &dyn DocumentStore,
    max_attempts: u32,
    mut body: F,
) -> EngineResult<T>
where
    F: FnMut(&mut Transaction<'_>) -> EngineResult<T>,
{
    let max_attempts = max_attempts.max(1);

    for attempt in 1..=max_attempts {
        let mut txn = Transaction::new(store);
        let value = body(&mut txn)?;

        match store.commit(txn.into_batch())? {
            CommitOutcome::Committed => return Ok(value),
            CommitOutcome::Conflict => {
                debug!(attempt, max_attempts, "Transaction conflict, retrying");
            }
        }
    }

    warn!(attempts = max_attempts, "Transaction conflict retries exhausted");
    Err(EngineError::TransactionConflict {
        attempts: max_attempts,
    })
}
