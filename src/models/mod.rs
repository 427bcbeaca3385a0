//! Core data models for the attendance engine.
//!
//! This module contains all the domain models used throughout the engine:
//! punch events and the daily records built from them, classification
//! results, leave balances and requests, and the caller identity.

mod classification;
mod identity;
mod leave;
mod punch;

pub use classification::{AttendanceStatus, ClassificationResult, ColorTag};
pub use identity::{Identity, Role};
pub use leave::{Decision, LeaveApplication, LeaveBalance, LeaveRequest, LeaveStatus, LeaveType};
pub use punch::{DailyRecord, PunchEvent, PunchKind, PunchLocation};
