//! Attendance: geofencing, punch recording, classification and the daily
//! report.
//!
//! The classifier is a pure function of one user's punches for one day and
//! the policy; it never fails and never touches the leave ledger.

mod aggregator;
mod classifier;
mod geofence;
mod punch_recorder;
pub mod rules;

pub use aggregator::{
    DailyReportRow, build_daily_report, build_row, group_daily_records, overtime_minutes,
};
pub use classifier::{classify, classify_on, classify_record};
pub use geofence::{EARTH_RADIUS_METERS, distance_meters, within_fence};
pub use punch_recorder::{PunchRecorder, build_punch_event};
pub use rules::{EARLY_LEAVE_TAG, LATE_IN_TAG, MISSING_CHECK_IN_WARNING, MISSING_CHECK_OUT_WARNING};
