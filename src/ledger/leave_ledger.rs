//! The leave balance ledger.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::LeaveRules;
use crate::error::{EngineError, EngineResult};
use crate::models::{Decision, LeaveApplication, LeaveBalance, LeaveRequest, LeaveStatus};
use crate::store::{DEFAULT_MAX_ATTEMPTS, DocumentStore, LeaveFilter, run_transaction};

use super::rules::{check_days_cap, validate_application};

/// Applies for, decides and reports on leave.
///
/// Balances are only ever decremented inside an approval transaction that
/// re-reads the balance, so concurrent approvals can never overspend it.
/// A user without a stored balance holds the policy quota.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use attendance_engine::clock::FixedClock;
/// use attendance_engine::config::PolicyConfig;
/// use attendance_engine::ledger::LeaveLedger;
/// use attendance_engine::models::{Decision, LeaveApplication, LeaveType};
/// use attendance_engine::store::InMemoryStore;
/// use chrono::{NaiveDate, TimeZone, Utc};
///
/// let store = Arc::new(InMemoryStore::with_policy(PolicyConfig::default()));
/// let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()));
/// let ledger = LeaveLedger::new(store, clock);
///
/// let request = ledger.apply(LeaveApplication {
///     user_id: "staff_001".to_string(),
///     leave_type: LeaveType::Annual,
///     start_date: NaiveDate::from_ymd_opt(2026, 3, 9).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2026, 3, 13).unwrap(),
///     days_count: 5,
///     reason: "holiday".to_string(),
/// })?;
/// assert_eq!(ledger.balance("staff_001")?.annual_remaining, 12);
///
/// ledger.decide(request.id, Decision::Approved, "admin_001")?;
/// assert_eq!(ledger.balance("staff_001")?.annual_remaining, 7);
/// # Ok::<(), attendance_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct LeaveLedger {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    max_attempts: u32,
}

impl LeaveLedger {
    /// Creates a ledger over `store` retrying conflicts up to
    /// [`DEFAULT_MAX_ATTEMPTS`] times.
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Overrides the number of attempts made on conflict.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// The current instant, the office-local day and the leave rules in force.
    fn context(&self) -> EngineResult<(DateTime<Utc>, NaiveDate, LeaveRules)> {
        let now = self.clock.now();
        let policy = self.store.policy()?;
        Ok(match policy.as_deref() {
            Some(policy) => (now, policy.local_date(now), policy.leave),
            None => (now, now.date_naive(), LeaveRules::default()),
        })
    }

    /// Submits a leave application.
    ///
    /// The application is checked against the leave rules, then a single
    /// transaction reads the balance, rejects annual or sick leave that
    /// exceeds it, applies the per-application maximum, and inserts a
    /// pending request. A request over both the balance and the maximum
    /// reports `InsufficientBalance`. The balance itself is not touched
    /// until approval.
    pub fn apply(&self, application: LeaveApplication) -> EngineResult<LeaveRequest> {
        let (now, today, rules) = self.context()?;

        validate_application(&application, &rules, today).inspect_err(|e| {
            info!(user_id = %application.user_id, error = %e, "Leave application invalid");
        })?;

        let id = Uuid::new_v4();
        let result = run_transaction(self.store.as_ref(), self.max_attempts, |txn| {
            let balance = txn
                .get_balance(&application.user_id)?
                .unwrap_or_else(|| LeaveBalance::from_quota(&application.user_id, &rules.quota));
            balance.ensure_available(application.leave_type, application.days_count)?;
            check_days_cap(&application, &rules)?;

            let request = LeaveRequest::pending(id, application.clone(), now);
            txn.create_request(request.clone());
            Ok(request)
        });

        match &result {
            Ok(request) => info!(
                request_id = %request.id,
                user_id = %request.user_id,
                leave_type = %request.leave_type,
                days_count = request.days_count,
                "Leave application submitted"
            ),
            Err(e) => info!(
                user_id = %application.user_id,
                leave_type = %application.leave_type,
                error = %e,
                "Leave application rejected"
            ),
        }
        result
    }

    /// Approves or rejects a pending request on behalf of `actor_id`.
    ///
    /// Approval of annual or sick leave re-validates and decrements the
    /// balance in the same transaction that marks the request approved;
    /// either both are written or neither is. Rejection only updates the
    /// request.
    pub fn decide(
        &self,
        id: Uuid,
        decision: Decision,
        actor_id: &str,
    ) -> EngineResult<LeaveRequest> {
        let (now, _, rules) = self.context()?;
        let status = LeaveStatus::from(decision);

        let result = run_transaction(self.store.as_ref(), self.max_attempts, |txn| {
            let mut request = txn
                .get_request(id)?
                .ok_or(EngineError::LeaveRequestNotFound { id })?;
            if request.status.is_terminal() {
                return Err(EngineError::AlreadyProcessed {
                    id,
                    status: request.status,
                });
            }

            if decision == Decision::Approved && request.leave_type.is_quota_bound() {
                let mut balance = txn
                    .get_balance(&request.user_id)?
                    .unwrap_or_else(|| LeaveBalance::from_quota(&request.user_id, &rules.quota));
                balance.deduct(request.leave_type, request.days_count)?;
                txn.set_balance(balance);
            }

            request.status = status;
            request.processed_by = Some(actor_id.to_string());
            request.processed_at = Some(now);
            txn.set_request(request.clone());
            Ok(request)
        });

        match &result {
            Ok(request) => info!(
                request_id = %id,
                user_id = %request.user_id,
                leave_type = %request.leave_type,
                status = %request.status,
                processed_by = %actor_id,
                "Leave request decided"
            ),
            Err(e) => warn!(
                request_id = %id,
                decision = ?decision,
                error = %e,
                "Leave decision failed"
            ),
        }
        result
    }

    /// The user's balance, or the policy quota if none is stored.
    pub fn balance(&self, user_id: &str) -> EngineResult<LeaveBalance> {
        if let Some(stored) = self.store.balance(user_id)? {
            return Ok(stored.value);
        }
        let (_, _, rules) = self.context()?;
        Ok(LeaveBalance::from_quota(user_id, &rules.quota))
    }

    /// Looks up a request by id.
    pub fn request(&self, id: Uuid) -> EngineResult<LeaveRequest> {
        self.store
            .request(id)?
            .map(|r| r.value)
            .ok_or(EngineError::LeaveRequestNotFound { id })
    }

    /// Requests matching `filter`, newest first.
    pub fn requests(&self, filter: &LeaveFilter) -> EngineResult<Vec<LeaveRequest>> {
        self.store.requests(filter)
    }

    /// All requests of one user, newest first.
    pub fn requests_for_user(&self, user_id: &str) -> EngineResult<Vec<LeaveRequest>> {
        self.requests(&LeaveFilter {
            user_id: Some(user_id.to_string()),
            ..LeaveFilter::default()
        })
    }

    /// All requests in `status` (or every request), newest first.
    pub fn requests_by_status(
        &self,
        status: Option<LeaveStatus>,
    ) -> EngineResult<Vec<LeaveRequest>> {
        self.requests(&LeaveFilter {
            status,
            ..LeaveFilter::default()
        })
    }
}
