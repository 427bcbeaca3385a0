//! Shape and notice rules checked before a leave application is stored.

use chrono::{Days, NaiveDate};

use crate::config::LeaveRules;
use crate::error::{EngineError, EngineResult};
use crate::models::{LeaveApplication, LeaveType};

/// Number of calendar days from `start` to `end`, both inclusive.
///
/// # Example
///
/// ```
/// use attendance_engine::ledger::inclusive_day_count;
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2026, 4, 6).unwrap();
/// let end = NaiveDate::from_ymd_opt(2026, 4, 8).unwrap();
/// assert_eq!(inclusive_day_count(start, end).unwrap(), 3);
/// assert!(inclusive_day_count(end, start).is_err());
/// ```
pub fn inclusive_day_count(start: NaiveDate, end: NaiveDate) -> EngineResult<u32> {
    if end < start {
        return Err(EngineError::invalid_leave(
            "end_date",
            format!("{} is before start_date {}", end, start),
        ));
    }
    let days = (end - start).num_days() + 1;
    u32::try_from(days)
        .map_err(|_| EngineError::invalid_leave("end_date", "date range is too long"))
}

/// The earliest start date accepted for annual leave applied for `today`.
pub fn annual_notice_threshold(today: NaiveDate, rules: &LeaveRules) -> NaiveDate {
    today
        .checked_add_days(Days::new(u64::from(rules.annual_notice_days)))
        .unwrap_or(NaiveDate::MAX)
}

/// Checks an application against the leave rules.
///
/// Fails with `InvalidLeaveRequest` when the user id is blank, the dates are
/// reversed, the day count differs from the number of calendar days in the
/// range, or annual leave starts before the notice threshold. The
/// per-application maximum is checked separately by [`check_days_cap`], after
/// the balance.
pub fn validate_application(
    application: &LeaveApplication,
    rules: &LeaveRules,
    today: NaiveDate,
) -> EngineResult<()> {
    if application.user_id.trim().is_empty() {
        return Err(EngineError::invalid_leave("user_id", "must not be empty"));
    }

    let range_days = inclusive_day_count(application.start_date, application.end_date)?;
    if application.days_count != range_days {
        return Err(EngineError::invalid_leave(
            "days_count",
            format!(
                "{} does not match the {} calendar days from {} to {}",
                application.days_count, range_days, application.start_date, application.end_date
            ),
        ));
    }

    if application.leave_type == LeaveType::Annual {
        let threshold = annual_notice_threshold(today, rules);
        if application.start_date < threshold {
            return Err(EngineError::short_notice(application.start_date, threshold));
        }
    }

    Ok(())
}

/// Fails with `InvalidLeaveRequest` when the application asks for more days
/// than a single application may cover.
pub fn check_days_cap(application: &LeaveApplication, rules: &LeaveRules) -> EngineResult<()> {
    if application.days_count > rules.max_days_per_application {
        return Err(EngineError::invalid_leave(
            "days_count",
            format!(
                "{} exceeds the maximum of {} days per application",
                application.days_count, rules.max_days_per_application
            ),
        ));
    }
    Ok(())
}
