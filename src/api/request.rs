//! Request types for the attendance API.
//!
//! This module defines the JSON bodies and query strings accepted by the
//! endpoints, and their conversion into domain types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::ledger::inclusive_day_count;
use crate::models::{Decision, LeaveApplication, LeaveStatus, LeaveType, PunchKind, PunchLocation};
use crate::store::{LeaveFilter, PunchFilter};

use super::response::ApiError;

/// Request body for `POST /punches`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PunchRequest {
    /// Clock-in or clock-out.
    pub kind: PunchKind,
    /// Device latitude in decimal degrees.
    pub lat: f64,
    /// Device longitude in decimal degrees.
    pub lng: f64,
    /// Reported GPS accuracy radius in meters.
    pub accuracy_meters: f64,
}

impl PunchRequest {
    /// Checks coordinate ranges and returns the punch location.
    pub fn location(&self) -> Result<PunchLocation, ApiError> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(ApiError::validation_error(format!(
                "lat {} is outside [-90, 90]",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(ApiError::validation_error(format!(
                "lng {} is outside [-180, 180]",
                self.lng
            )));
        }
        if !self.accuracy_meters.is_finite() || self.accuracy_meters < 0.0 {
            return Err(ApiError::validation_error("accuracy_meters must be a non-negative number"));
        }
        Ok(PunchLocation {
            lat: self.lat,
            lng: self.lng,
            accuracy_meters: self.accuracy_meters,
        })
    }
}

/// Request body for `POST /leaves`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveApplicationRequest {
    /// The kind of leave.
    pub leave_type: LeaveType,
    /// First day of leave (inclusive).
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Days requested; derived from the date range when omitted, and must
    /// match it when given.
    #[serde(default)]
    pub days_count: Option<u32>,
    /// Free-text reason.
    #[serde(default)]
    pub reason: String,
}

impl LeaveApplicationRequest {
    /// Converts the body into an application on behalf of `user_id`.
    pub fn into_application(self, user_id: &str) -> EngineResult<LeaveApplication> {
        let days_count = match self.days_count {
            Some(days) => days,
            None => inclusive_day_count(self.start_date, self.end_date)?,
        };
        Ok(LeaveApplication {
            user_id: user_id.to_string(),
            leave_type: self.leave_type,
            start_date: self.start_date,
            end_date: self.end_date,
            days_count,
            reason: self.reason,
        })
    }
}

/// Request body for `POST /leaves/:id/decision`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DecisionRequest {
    /// Approve or reject.
    pub decision: Decision,
}

/// Query string for `GET /attendance/daily`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyReportQuery {
    /// First calendar date (inclusive).
    pub from: Option<NaiveDate>,
    /// Last calendar date (inclusive).
    pub to: Option<NaiveDate>,
    /// Restrict to one user.
    pub user_id: Option<String>,
}

impl DailyReportQuery {
    /// Builds the punch filter, rejecting a reversed date range.
    pub fn into_filter(self) -> Result<PunchFilter, ApiError> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if to < from {
                return Err(ApiError::validation_error(format!(
                    "to {} is before from {}",
                    to, from
                )));
            }
        }
        Ok(PunchFilter {
            user_id: self.user_id,
            from: self.from,
            to: self.to,
        })
    }
}

/// Query string for `GET /leaves`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeaveListQuery {
    /// Restrict to one user.
    pub user_id: Option<String>,
    /// Restrict to one lifecycle state.
    pub status: Option<LeaveStatus>,
    /// Restrict to one leave type.
    pub leave_type: Option<LeaveType>,
}

impl From<LeaveListQuery> for LeaveFilter {
    fn from(query: LeaveListQuery) -> Self {
        LeaveFilter {
            user_id: query.user_id,
            status: query.status,
            leave_type: query.leave_type,
        }
    }
}
