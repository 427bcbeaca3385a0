//! Document store abstraction.
//!
//! The engine talks to its persistence layer through [`DocumentStore`]:
//! an append-only punch log, the policy singleton, and versioned balance
//! and leave-request records that change only through an atomic
//! conditional [`commit`](DocumentStore::commit).
//!
//! Read-modify-write sequences go through [`Transaction`] and
//! [`run_transaction`], which record the version of everything read and
//! retry the whole body when another writer got there first.

mod memory;
#[cfg(test)]
pub(crate) mod test_support;
mod transaction;

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::config::PolicyConfig;
use crate::error::EngineResult;
use crate::models::{LeaveBalance, LeaveRequest, LeaveStatus, LeaveType, PunchEvent};

pub use memory::InMemoryStore;
pub use transaction::{DEFAULT_MAX_ATTEMPTS, Transaction, run_transaction};

/// A stored value together with the version it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<T> {
    /// The stored value.
    pub value: T,
    /// Monotonically increasing write version.
    pub version: u64,
}

/// Identifies a mutable record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKey {
    /// The balance record of a user.
    Balance(String),
    /// A leave request.
    Request(Uuid),
}

/// A record write staged inside a transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum StagedWrite {
    /// Upsert a balance.
    Balance(LeaveBalance),
    /// Upsert a leave request.
    Request(LeaveRequest),
}

impl StagedWrite {
    /// The key this write targets.
    pub fn key(&self) -> RecordKey {
        match self {
            StagedWrite::Balance(balance) => RecordKey::Balance(balance.user_id.clone()),
            StagedWrite::Request(request) => RecordKey::Request(request.id),
        }
    }
}

/// Preconditions plus writes, applied together or not at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    /// Version each key must still have; `None` means it must still be absent.
    pub expected: Vec<(RecordKey, Option<u64>)>,
    /// Writes to apply if every precondition holds.
    pub writes: Vec<StagedWrite>,
}

/// Result of a conditional commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Every write was applied.
    Committed,
    /// A precondition failed; nothing was applied.
    Conflict,
}

/// Punch query. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PunchFilter {
    /// Only punches of this user.
    pub user_id: Option<String>,
    /// Only punches on or after this calendar date.
    pub from: Option<NaiveDate>,
    /// Only punches on or before this calendar date.
    pub to: Option<NaiveDate>,
}

impl PunchFilter {
    /// Returns true if the punch satisfies every set field.
    pub fn matches(&self, event: &PunchEvent) -> bool {
        self.user_id.as_deref().is_none_or(|u| u == event.user_id)
            && self.from.is_none_or(|from| event.calendar_date >= from)
            && self.to.is_none_or(|to| event.calendar_date <= to)
    }
}

/// Leave request query. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaveFilter {
    /// Only requests of this user.
    pub user_id: Option<String>,
    /// Only requests in this state.
    pub status: Option<LeaveStatus>,
    /// Only requests of this type.
    pub leave_type: Option<LeaveType>,
}

impl LeaveFilter {
    /// Returns true if the request satisfies every set field.
    pub fn matches(&self, request: &LeaveRequest) -> bool {
        self.user_id.as_deref().is_none_or(|u| u == request.user_id)
            && self.status.is_none_or(|s| s == request.status)
            && self.leave_type.is_none_or(|t| t == request.leave_type)
    }
}

/// The persistence collaborator.
///
/// Implementations must be shareable across threads; every method takes
/// `&self`.
pub trait DocumentStore: Send + Sync + fmt::Debug {
    /// Appends an immutable punch.
    fn append_punch(&self, event: PunchEvent) -> EngineResult<()>;

    /// Punches matching `filter`, in insertion order.
    fn punches(&self, filter: &PunchFilter) -> EngineResult<Vec<PunchEvent>>;

    /// The current policy snapshot, if one has been set.
    fn policy(&self) -> EngineResult<Option<Arc<PolicyConfig>>>;

    /// Replaces the policy snapshot wholesale.
    fn replace_policy(&self, policy: PolicyConfig) -> EngineResult<Arc<PolicyConfig>>;

    /// The stored balance of a user, if any.
    fn balance(&self, user_id: &str) -> EngineResult<Option<Versioned<LeaveBalance>>>;

    /// A leave request by id, if any.
    fn request(&self, id: Uuid) -> EngineResult<Option<Versioned<LeaveRequest>>>;

    /// Requests matching `filter`, newest `applied_at` first.
    fn requests(&self, filter: &LeaveFilter) -> EngineResult<Vec<LeaveRequest>>;

    /// Applies `batch` atomically if every precondition still holds.
    fn commit(&self, batch: WriteBatch) -> EngineResult<CommitOutcome>;
}
