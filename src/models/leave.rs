//! Leave balance and leave request models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::LeaveQuota;
use crate::error::{EngineError, EngineResult};

/// The kind of leave being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    /// Paid annual leave, drawn from the annual counter.
    Annual,
    /// Sick leave, drawn from the sick counter.
    Sick,
    /// Emergency leave; unquantified and approved at admin discretion.
    Emergency,
}

impl LeaveType {
    /// Returns true if approval of this type consumes balance.
    pub fn is_quota_bound(self) -> bool {
        matches!(self, LeaveType::Annual | LeaveType::Sick)
    }
}

impl fmt::Display for LeaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeaveType::Annual => write!(f, "annual"),
            LeaveType::Sick => write!(f, "sick"),
            LeaveType::Emergency => write!(f, "emergency"),
        }
    }
}

impl FromStr for LeaveType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "annual" => Ok(LeaveType::Annual),
            "sick" => Ok(LeaveType::Sick),
            "emergency" => Ok(LeaveType::Emergency),
            _ => Err(format!("Invalid leave type: {}", s)),
        }
    }
}

/// Lifecycle state of a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    /// Awaiting an administrative decision.
    Pending,
    /// Approved; balance has been deducted for quota-bound types.
    Approved,
    /// Rejected; balance untouched.
    Rejected,
}

impl LeaveStatus {
    /// Returns true once the request can no longer change.
    pub fn is_terminal(self) -> bool {
        !matches!(self, LeaveStatus::Pending)
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeaveStatus::Pending => write!(f, "pending"),
            LeaveStatus::Approved => write!(f, "approved"),
            LeaveStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl FromStr for LeaveStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(LeaveStatus::Pending),
            "approved" => Ok(LeaveStatus::Approved),
            "rejected" => Ok(LeaveStatus::Rejected),
            _ => Err(format!("Invalid leave status: {}", s)),
        }
    }
}

/// An administrative decision on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Approve and deduct balance.
    Approved,
    /// Reject without touching balance.
    Rejected,
}

impl From<Decision> for LeaveStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approved => LeaveStatus::Approved,
            Decision::Rejected => LeaveStatus::Rejected,
        }
    }
}

/// Remaining leave days for one user.
///
/// Counters are unsigned, so a balance can never go negative; [`deduct`]
/// refuses rather than saturating.
///
/// [`deduct`]: LeaveBalance::deduct
///
/// # Example
///
/// ```
/// use attendance_engine::config::LeaveQuota;
/// use attendance_engine::models::{LeaveBalance, LeaveType};
///
/// let mut balance = LeaveBalance::from_quota("staff_001", &LeaveQuota::default());
/// balance.deduct(LeaveType::Annual, 5).unwrap();
/// assert_eq!(balance.annual_remaining, 7);
/// assert!(balance.deduct(LeaveType::Annual, 8).is_err());
/// assert_eq!(balance.annual_remaining, 7);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveBalance {
    /// The staff member.
    pub user_id: String,
    /// Annual leave days remaining.
    pub annual_remaining: u32,
    /// Sick leave days remaining.
    pub sick_remaining: u32,
}

impl LeaveBalance {
    /// The implied balance of a user with no stored record.
    pub fn from_quota(user_id: impl Into<String>, quota: &LeaveQuota) -> Self {
        Self {
            user_id: user_id.into(),
            annual_remaining: quota.annual,
            sick_remaining: quota.sick,
        }
    }

    /// Remaining days for a quota-bound type; `None` for emergency leave.
    pub fn remaining(&self, leave_type: LeaveType) -> Option<u32> {
        match leave_type {
            LeaveType::Annual => Some(self.annual_remaining),
            LeaveType::Sick => Some(self.sick_remaining),
            LeaveType::Emergency => None,
        }
    }

    /// Fails with `InsufficientBalance` if `days` exceed the counter.
    pub fn ensure_available(&self, leave_type: LeaveType, days: u32) -> EngineResult<()> {
        match self.remaining(leave_type) {
            Some(available) if days > available => Err(EngineError::InsufficientBalance {
                leave_type,
                available,
                requested: days,
            }),
            _ => Ok(()),
        }
    }

    /// Deducts `days` from the counter for `leave_type`.
    ///
    /// Emergency leave is a no-op. The balance is left unchanged on error.
    pub fn deduct(&mut self, leave_type: LeaveType, days: u32) -> EngineResult<()> {
        self.ensure_available(leave_type, days)?;
        match leave_type {
            LeaveType::Annual => self.annual_remaining -= days,
            LeaveType::Sick => self.sick_remaining -= days,
            LeaveType::Emergency => {}
        }
        Ok(())
    }
}

/// A leave application as submitted by a staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveApplication {
    /// The applicant.
    pub user_id: String,
    /// The kind of leave.
    pub leave_type: LeaveType,
    /// First day of leave (inclusive).
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Number of leave days requested.
    pub days_count: u32,
    /// Free-text reason.
    #[serde(default)]
    pub reason: String,
}

/// A persisted leave request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// Unique identifier for the request.
    pub id: Uuid,
    /// The applicant.
    pub user_id: String,
    /// The kind of leave.
    pub leave_type: LeaveType,
    /// First day of leave (inclusive).
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Number of leave days requested.
    pub days_count: u32,
    /// Free-text reason.
    pub reason: String,
    /// Current lifecycle state.
    pub status: LeaveStatus,
    /// When the application was submitted.
    pub applied_at: DateTime<Utc>,
    /// The admin who decided the request.
    pub processed_by: Option<String>,
    /// When the request was decided.
    pub processed_at: Option<DateTime<Utc>>,
}

impl LeaveRequest {
    /// Creates a pending request from an application.
    pub fn pending(id: Uuid, application: LeaveApplication, applied_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: application.user_id,
            leave_type: application.leave_type,
            start_date: application.start_date,
            end_date: application.end_date,
            days_count: application.days_count,
            reason: application.reason,
            status: LeaveStatus::Pending,
            applied_at,
            processed_by: None,
            processed_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balance() -> LeaveBalance {
        LeaveBalance::from_quota("staff_001", &LeaveQuota::default())
    }

    #[test]
    fn test_default_quota_balance() {
        let balance = balance();
        assert_eq!(balance.annual_remaining, 12);
        assert_eq!(balance.sick_remaining, 5);
    }

    #[test]
    fn test_deduct_sick_leave() {
        let mut balance = balance();
        balance.deduct(LeaveType::Sick, 5).unwrap();
        assert_eq!(balance.sick_remaining, 0);
        assert_eq!(balance.annual_remaining, 12);
    }

    #[test]
    fn test_deduct_more_than_remaining_fails_without_change() {
        let mut balance = balance();
        let err = balance.deduct(LeaveType::Sick, 6).unwrap_err();
        match err {
            EngineError::InsufficientBalance {
                leave_type,
                available,
                requested,
            } => {
                assert_eq!(leave_type, LeaveType::Sick);
                assert_eq!(available, 5);
                assert_eq!(requested, 6);
            }
            other => panic!("Expected InsufficientBalance, got {:?}", other),
        }
        assert_eq!(balance.sick_remaining, 5);
    }

    #[test]
    fn test_emergency_leave_is_unbounded() {
        let mut balance = balance();
        assert!(balance.ensure_available(LeaveType::Emergency, 365).is_ok());
        balance.deduct(LeaveType::Emergency, 30).unwrap();
        assert_eq!(balance, self::balance());
    }

    #[test]
    fn test_leave_type_round_trips_through_str() {
        for leave_type in [LeaveType::Annual, LeaveType::Sick, LeaveType::Emergency] {
            let parsed: LeaveType = leave_type.to_string().parse().unwrap();
            assert_eq!(parsed, leave_type);
        }
        assert!("unpaid".parse::<LeaveType>().is_err());
    }

    #[test]
    fn test_leave_status_terminal() {
        assert!(!LeaveStatus::Pending.is_terminal());
        assert!(LeaveStatus::Approved.is_terminal());
        assert!(LeaveStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_decision_maps_to_status() {
        assert_eq!(LeaveStatus::from(Decision::Approved), LeaveStatus::Approved);
        assert_eq!(LeaveStatus::from(Decision::Rejected), LeaveStatus::Rejected);
    }

    #[test]
    fn test_pending_request_from_application() {
        let application = LeaveApplication {
            user_id: "staff_001".to_string(),
            leave_type: LeaveType::Annual,
            start_date: NaiveDate::from_ymd_opt(2026, 3, 9).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 3, 13).unwrap(),
            days_count: 5,
            reason: "Family trip".to_string(),
        };
        let request = LeaveRequest::pending(Uuid::nil(), application, Utc::now());
        assert_eq!(request.status, LeaveStatus::Pending);
        assert!(request.processed_by.is_none());
        assert!(request.processed_at.is_none());
        assert_eq!(request.days_count, 5);
    }
}
