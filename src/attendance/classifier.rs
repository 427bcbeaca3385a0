//! The attendance classifier.
//!
//! Turns one user's punches for one calendar day into a status, a tag set
//! and a warning set. Classification never fails: missing policy fields
//! skip the checks that need them.

use chrono::NaiveDate;

use crate::clock::Clock;
use crate::config::PolicyConfig;
use crate::models::{AttendanceStatus, ClassificationResult, DailyRecord, PunchEvent};

use super::rules::{DayContext, RULES_BY_PRECEDENCE};

/// Classifies a user-day relative to the clock's current office-local day.
///
/// See [`classify_on`] for the rules.
pub fn classify(
    events: &[PunchEvent],
    policy: Option<&PolicyConfig>,
    clock: &dyn Clock,
) -> ClassificationResult {
    let now = clock.now();
    let today = match policy {
        Some(policy) => policy.local_date(now),
        None => now.date_naive(),
    };
    classify_on(events, policy, today)
}

/// Classifies a user-day, with `today` supplied by the caller.
///
/// - No events: `Absent`.
/// - No policy, or a policy without work rules: `Present` with no tags.
/// - Otherwise every rule in [`RULES_BY_PRECEDENCE`] is evaluated; tags and
///   warnings accumulate and the first rule that assigns a status wins.
///
/// Events may arrive unordered and may contain duplicates.
///
/// # Example
///
/// ```
/// use attendance_engine::attendance::classify_on;
/// use attendance_engine::config::PolicyConfig;
/// use attendance_engine::models::{AttendanceStatus, PunchEvent, PunchKind, PunchLocation};
/// use chrono::{NaiveDate, TimeZone, Utc};
/// use uuid::Uuid;
///
/// let policy = PolicyConfig::default(); // 09:00 start, 5 minute grace, UTC
/// let day = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
/// let check_in = PunchEvent {
///     id: Uuid::new_v4(),
///     user_id: "staff_001".to_string(),
///     kind: PunchKind::In,
///     timestamp: Utc.with_ymd_and_hms(2026, 3, 2, 9, 7, 0).unwrap(),
///     location: PunchLocation { lat: 3.139, lng: 101.6869, accuracy_meters: 10.0 },
///     calendar_date: day,
///     within_fence: true,
/// };
/// let check_out = PunchEvent {
///     kind: PunchKind::Out,
///     timestamp: Utc.with_ymd_and_hms(2026, 3, 2, 17, 30, 0).unwrap(),
///     ..check_in.clone()
/// };
///
/// let result = classify_on(&[check_out, check_in], Some(&policy), day);
/// assert_eq!(result.status, AttendanceStatus::Late);
/// assert_eq!(result.tags, vec!["Late In".to_string()]);
/// ```
pub fn classify_on(
    events: &[PunchEvent],
    policy: Option<&PolicyConfig>,
    today: NaiveDate,
) -> ClassificationResult {
    if events.is_empty() {
        return ClassificationResult::with_status(AttendanceStatus::Absent);
    }

    let mut result = ClassificationResult::with_status(AttendanceStatus::Present);

    let Some(policy) = policy else {
        return result;
    };
    let Some(rules) = policy.work_rules.as_ref() else {
        return result;
    };
    let Some(ctx) = DayContext::new(events, rules, policy, today) else {
        return result;
    };

    let mut decided: Option<AttendanceStatus> = None;
    for rule in RULES_BY_PRECEDENCE {
        let Some(outcome) = (rule.evaluate)(&ctx) else {
            continue;
        };
        for tag in outcome.tags {
            result.add_tag(tag);
        }
        for warning in outcome.warnings {
            result.add_warning(warning);
        }
        if decided.is_none() {
            decided = outcome.status;
        }
    }

    if let Some(status) = decided {
        result.set_status(status);
    }
    result
}

/// Classifies a [`DailyRecord`].
pub fn classify_record(
    record: &DailyRecord,
    policy: Option<&PolicyConfig>,
    today: NaiveDate,
) -> ClassificationResult {
    classify_on(record.events(), policy, today)
}
