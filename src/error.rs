//! Error types for the attendance engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the ledger, punch recorder and configuration layer
//! can report. The classifier never fails and has no variants here.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{LeaveStatus, LeaveType};

/// The main error type for the attendance engine.
///
/// All fallible operations return this error type, so callers can match on
/// the rejection reason and surface it appropriately.
///
/// # Example
///
/// ```
/// use attendance_engine::error::EngineError;
/// use attendance_engine::models::LeaveType;
///
/// let error = EngineError::InsufficientBalance {
///     leave_type: LeaveType::Annual,
///     available: 3,
///     requested: 5,
/// };
/// assert_eq!(
///     error.to_string(),
///     "Insufficient annual leave balance. Available: 3, Requested: 5"
/// );
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A policy value is out of range or inconsistent.
    #[error("Invalid policy field '{field}': {message}")]
    InvalidPolicy {
        /// The offending field.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// The requested days exceed the user's remaining balance.
    #[error("Insufficient {leave_type} leave balance. Available: {available}, Requested: {requested}")]
    InsufficientBalance {
        /// The leave type whose counter is short.
        leave_type: LeaveType,
        /// Days remaining on the counter.
        available: u32,
        /// Days requested.
        requested: u32,
    },

    /// No leave request exists with the given id.
    #[error("Leave request not found: {id}")]
    LeaveRequestNotFound {
        /// The id that was looked up.
        id: Uuid,
    },

    /// The leave request has already been approved or rejected.
    #[error("Leave request {id} is already processed ({status})")]
    AlreadyProcessed {
        /// The request id.
        id: Uuid,
        /// The terminal status it already holds.
        status: LeaveStatus,
    },

    /// Optimistic-concurrency retries were exhausted.
    #[error("Transaction conflict persisted after {attempts} attempts")]
    TransactionConflict {
        /// Number of attempts made before giving up.
        attempts: u32,
    },

    /// A leave application failed a shape or notice rule.
    #[error("Invalid leave request field '{field}': {message}")]
    InvalidLeaveRequest {
        /// The field that failed validation.
        field: String,
        /// A description of the violated rule.
        message: String,
    },

    /// A punch was made outside the office geofence while it is enforced.
    #[error("Punch location is {distance_meters:.0}m from the office; allowed radius is {radius_meters:.0}m")]
    OutsideGeofence {
        /// Distance from the office centre in meters.
        distance_meters: f64,
        /// The configured radius in meters.
        radius_meters: f64,
    },

    /// The reported GPS accuracy is worse than the policy allows.
    #[error("GPS accuracy {accuracy_meters:.0}m exceeds the allowed {max_accuracy_meters:.0}m")]
    InaccurateLocation {
        /// Accuracy reported by the device.
        accuracy_meters: f64,
        /// Maximum accuracy radius accepted.
        max_accuracy_meters: f64,
    },

    /// The caller's role does not permit the operation.
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Why access was refused.
        message: String,
    },

    /// The backing store could not serve the request.
    #[error("Store unavailable: {message}")]
    StoreUnavailable {
        /// A description of the store failure.
        message: String,
    },
}

impl EngineError {
    /// Builds an [`EngineError::InvalidLeaveRequest`] for a field.
    pub fn invalid_leave(field: &str, message: impl Into<String>) -> Self {
        EngineError::InvalidLeaveRequest {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Builds an [`EngineError::InvalidPolicy`] for a field.
    pub fn invalid_policy(field: &str, message: impl Into<String>) -> Self {
        EngineError::InvalidPolicy {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Builds an [`EngineError::InvalidLeaveRequest`] for a start date that
    /// falls before the annual-leave notice threshold.
    pub fn short_notice(start_date: NaiveDate, threshold: NaiveDate) -> Self {
        Self::invalid_leave(
            "start_date",
            format!(
                "annual leave starting {} must start on or after {}",
                start_date, threshold
            ),
        )
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/policy.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/policy.yaml"
        );
    }

    #[test]
    fn test_insufficient_balance_displays_counts() {
        let error = EngineError::InsufficientBalance {
            leave_type: LeaveType::Sick,
            available: 1,
            requested: 2,
        };
        assert_eq!(
            error.to_string(),
            "Insufficient sick leave balance. Available: 1, Requested: 2"
        );
    }

    #[test]
    fn test_already_processed_displays_status() {
        let id = Uuid::nil();
        let error = EngineError::AlreadyProcessed {
            id,
            status: LeaveStatus::Approved,
        };
        assert_eq!(
            error.to_string(),
            format!("Leave request {} is already processed (approved)", id)
        );
    }

    #[test]
    fn test_transaction_conflict_displays_attempts() {
        let error = EngineError::TransactionConflict { attempts: 5 };
        assert_eq!(
            error.to_string(),
            "Transaction conflict persisted after 5 attempts"
        );
    }

    #[test]
    fn test_outside_geofence_rounds_distances() {
        let error = EngineError::OutsideGeofence {
            distance_meters: 250.4,
            radius_meters: 100.0,
        };
        assert_eq!(
            error.to_string(),
            "Punch location is 250m from the office; allowed radius is 100m"
        );
    }

    #[test]
    fn test_short_notice_mentions_threshold() {
        let start = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let threshold = NaiveDate::from_ymd_opt(2026, 3, 3).unwrap();
        let error = EngineError::short_notice(start, threshold);
        assert!(error.to_string().contains("2026-03-03"));
        assert!(matches!(
            error,
            EngineError::InvalidLeaveRequest { ref field, .. } if field == "start_date"
        ));
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_not_found() -> EngineResult<()> {
            Err(EngineError::LeaveRequestNotFound { id: Uuid::nil() })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_not_found()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
