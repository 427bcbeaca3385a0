//! HTTP API module for the attendance engine.
//!
//! This module provides the REST endpoints for recording punches, reading
//! daily attendance, applying for and deciding leave, and administering the
//! policy.

mod handlers;
mod identity;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use identity::{USER_ID_HEADER, USER_ROLE_HEADER};
pub use request::{
    DailyReportQuery, DecisionRequest, LeaveApplicationRequest, LeaveListQuery, PunchRequest,
};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
