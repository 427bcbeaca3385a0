//! Daily aggregation of raw punches into report rows.
//!
//! Punches are grouped by `(user_id, calendar_date)`, each group is
//! classified, and the first clock-in and last clock-out are surfaced
//! alongside the classification.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::PolicyConfig;
use crate::models::{AttendanceStatus, ColorTag, DailyRecord, PunchEvent, PunchLocation};

use super::classifier::classify_record;

/// One row of the daily attendance report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReportRow {
    /// The staff member.
    pub user_id: String,
    /// The office-local day.
    pub calendar_date: NaiveDate,
    /// Classified status.
    pub status: AttendanceStatus,
    /// Presentation hint for `status`.
    pub color_tag: ColorTag,
    /// Policy tags raised for the day.
    pub tags: Vec<String>,
    /// Structural warnings raised for the day.
    pub warnings: Vec<String>,
    /// Earliest clock-in.
    pub first_in: Option<DateTime<Utc>>,
    /// Latest clock-out.
    pub last_out: Option<DateTime<Utc>>,
    /// Where the earliest clock-in was made.
    pub first_in_location: Option<PunchLocation>,
    /// Whether the earliest clock-in was inside the geofence.
    pub first_in_within_fence: Option<bool>,
    /// Hours between first clock-in and last clock-out, to two decimals.
    pub worked_hours: Option<Decimal>,
    /// Minutes past the end time, when at least the overtime minimum.
    pub overtime_minutes: u32,
}

/// Groups punches into per-user, per-day records.
///
/// Records come back keyed and ordered by `(user_id, calendar_date)`; the
/// events inside each record are sorted by timestamp.
pub fn group_daily_records<I>(events: I) -> Vec<DailyRecord>
where
    I: IntoIterator<Item = PunchEvent>,
{
    let mut groups: BTreeMap<(String, NaiveDate), Vec<PunchEvent>> = BTreeMap::new();
    for event in events {
        groups
            .entry((event.user_id.clone(), event.calendar_date))
            .or_default()
            .push(event);
    }

    groups
        .into_iter()
        .map(|((user_id, date), events)| DailyRecord::new(user_id, date, events))
        .collect()
}

/// Builds one report row per `(user, day)` that has at least one punch.
///
/// Rows are ordered by calendar date descending, then user id ascending.
pub fn build_daily_report<I>(
    events: I,
    policy: Option<&PolicyConfig>,
    today: NaiveDate,
) -> Vec<DailyReportRow>
where
    I: IntoIterator<Item = PunchEvent>,
{
    let mut rows: Vec<DailyReportRow> = group_daily_records(events)
        .iter()
        .map(|record| build_row(record, policy, today))
        .collect();

    rows.sort_by(|a, b| {
        b.calendar_date
            .cmp(&a.calendar_date)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    rows
}

/// Classifies a single record and assembles its report row.
pub fn build_row(
    record: &DailyRecord,
    policy: Option<&PolicyConfig>,
    today: NaiveDate,
) -> DailyReportRow {
    let classification = classify_record(record, policy, today);
    let first_in = record.first_in();
    let last_out = record.last_out();

    let worked_hours = match (first_in, last_out) {
        (Some(check_in), Some(check_out)) if check_out.timestamp > check_in.timestamp => {
            let minutes = (check_out.timestamp - check_in.timestamp).num_minutes();
            Some((Decimal::from(minutes) / Decimal::from(60)).round_dp(2))
        }
        _ => None,
    };

    let overtime_minutes = match (policy, last_out) {
        (Some(policy), Some(check_out)) => overtime_minutes(policy, check_out.timestamp),
        _ => 0,
    };

    DailyReportRow {
        user_id: record.user_id.clone(),
        calendar_date: record.calendar_date,
        status: classification.status,
        color_tag: classification.color_tag,
        tags: classification.tags,
        warnings: classification.warnings,
        first_in: first_in.map(|e| e.timestamp),
        last_out: last_out.map(|e| e.timestamp),
        first_in_location: first_in.map(|e| e.location),
        first_in_within_fence: first_in.map(|e| e.within_fence),
        worked_hours,
        overtime_minutes,
    }
}

/// Minutes the clock-out lies past the end time, or 0 below the minimum.
pub fn overtime_minutes(policy: &PolicyConfig, check_out: DateTime<Utc>) -> u32 {
    let Some(rules) = policy.work_rules.as_ref() else {
        return 0;
    };
    let Some(end) = rules.work_end_time else {
        return 0;
    };

    let local = policy.local_datetime(check_out);
    let excess = (local - local.date().and_time(end)).num_minutes();
    if excess <= 0 || excess < i64::from(rules.min_overtime_minutes) {
        return 0;
    }
    u32::try_from(excess).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PunchKind;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn punch(user: &str, kind: PunchKind, day: u32, hour: u32, minute: u32) -> PunchEvent {
        PunchEvent {
            id: Uuid::new_v4(),
            user_id: user.to_string(),
            kind,
            timestamp: Utc.with_ymd_and_hms(2026, 3, day, hour, minute, 0).unwrap(),
            location: PunchLocation {
                lat: 3.139,
                lng: 101.6869,
                accuracy_meters: 10.0,
            },
            calendar_date: NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
            within_fence: kind == PunchKind::In,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 3).unwrap()
    }

    #[test]
    fn test_groups_by_user_and_day() {
        let records = group_daily_records(vec![
            punch("bob", PunchKind::In, 1, 9, 0),
            punch("alice", PunchKind::In, 1, 9, 0),
            punch("alice", PunchKind::Out, 1, 17, 0),
            punch("alice", PunchKind::In, 2, 9, 0),
        ]);

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].user_id, "alice");
        assert_eq!(records[0].events().len(), 2);
        assert_eq!(records[2].user_id, "bob");
    }

    #[test]
    fn test_report_order_is_date_desc_then_user_asc() {
        let rows = build_daily_report(
            vec![
                punch("bob", PunchKind::In, 1, 9, 0),
                punch("alice", PunchKind::In, 1, 9, 0),
                punch("carol", PunchKind::In, 2, 9, 0),
            ],
            Some(&PolicyConfig::default()),
            today(),
        );

        let keys: Vec<(u32, &str)> = rows
            .iter()
            .map(|r| (chrono::Datelike::day(&r.calendar_date), r.user_id.as_str()))
            .collect();
        assert_eq!(keys, vec![(2, "carol"), (1, "alice"), (1, "bob")]);
    }

    #[test]
    fn test_row_carries_first_in_last_out_and_hours() {
        let rows = build_daily_report(
            vec![
                punch("alice", PunchKind::Out, 1, 17, 30),
                punch("alice", PunchKind::In, 1, 8, 45),
                punch("alice", PunchKind::Out, 1, 12, 0),
                punch("alice", PunchKind::In, 1, 13, 0),
            ],
            Some(&PolicyConfig::default()),
            today(),
        );

        let row = &rows[0];
        assert_eq!(row.status, AttendanceStatus::Present);
        assert_eq!(row.first_in, Some(Utc.with_ymd_and_hms(2026, 3, 1, 8, 45, 0).unwrap()));
        assert_eq!(row.last_out, Some(Utc.with_ymd_and_hms(2026, 3, 1, 17, 30, 0).unwrap()));
        assert_eq!(row.first_in_within_fence, Some(true));
        assert_eq!(row.worked_hours, Some(Decimal::new(875, 2)));
        assert_eq!(row.overtime_minutes, 0);
    }

    #[test]
    fn test_open_shift_row_has_no_worked_hours() {
        let rows = build_daily_report(
            vec![punch("alice", PunchKind::In, 1, 9, 0)],
            Some(&PolicyConfig::default()),
            today(),
        );

        assert_eq!(rows[0].status, AttendanceStatus::Incomplete);
        assert_eq!(rows[0].last_out, None);
        assert_eq!(rows[0].worked_hours, None);
    }

    #[test]
    fn test_overtime_counts_only_past_minimum() {
        let policy = PolicyConfig::default();
        let short = Utc.with_ymd_and_hms(2026, 3, 1, 17, 59, 0).unwrap();
        let long = Utc.with_ymd_and_hms(2026, 3, 1, 18, 30, 0).unwrap();

        assert_eq!(overtime_minutes(&policy, short), 0);
        assert_eq!(overtime_minutes(&policy, long), 90);
    }

    #[test]
    fn test_overtime_without_end_time_is_zero() {
        let policy = PolicyConfig {
            work_rules: None,
            ..PolicyConfig::default()
        };
        let late = Utc.with_ymd_and_hms(2026, 3, 1, 22, 0, 0).unwrap();
        assert_eq!(overtime_minutes(&policy, late), 0);
    }

    #[test]
    fn test_empty_input_gives_no_rows() {
        let rows = build_daily_report(Vec::new(), Some(&PolicyConfig::default()), today());
        assert!(rows.is_empty());
    }
}
