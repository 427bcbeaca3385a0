//! Policy configuration types.
//!
//! This module contains the strongly-typed policy structures that are
//! deserialized from YAML configuration files and replaced wholesale by the
//! policy update operation.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::attendance::{distance_meters, within_fence};
use crate::error::{EngineError, EngineResult};
use crate::models::PunchLocation;

/// Working-time rules used by the attendance classifier.
///
/// Each field is optional in the sense that a missing start or end time
/// simply skips the corresponding check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkRules {
    /// Official start of the working day (local time).
    #[serde(default, with = "time_of_day")]
    pub work_start_time: Option<NaiveTime>,
    /// Official end of the working day (local time).
    #[serde(default, with = "time_of_day")]
    pub work_end_time: Option<NaiveTime>,
    /// Minutes after the start time before a clock-in counts as late.
    #[serde(default)]
    pub grace_period_minutes: u32,
    /// Minimum minutes past the end time before overtime is reported.
    #[serde(default)]
    pub min_overtime_minutes: u32,
}

impl Default for WorkRules {
    fn default() -> Self {
        Self {
            work_start_time: NaiveTime::from_hms_opt(9, 0, 0),
            work_end_time: NaiveTime::from_hms_opt(17, 0, 0),
            grace_period_minutes: 5,
            min_overtime_minutes: 60,
        }
    }
}

/// Circular boundary around the office.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geofence {
    /// Office latitude in decimal degrees.
    pub office_lat: f64,
    /// Office longitude in decimal degrees.
    pub office_lng: f64,
    /// Allowed radius in meters.
    pub radius_meters: f64,
}

impl Default for Geofence {
    fn default() -> Self {
        Self {
            office_lat: 3.1390,
            office_lng: 101.6869,
            radius_meters: 100.0,
        }
    }
}

impl Geofence {
    /// Distance in meters from the office centre to `location`.
    pub fn distance_to(&self, location: &PunchLocation) -> f64 {
        distance_meters(location.lat, location.lng, self.office_lat, self.office_lng)
    }

    /// Returns true if `location` lies within the fence.
    pub fn contains(&self, location: &PunchLocation) -> bool {
        within_fence(
            location.lat,
            location.lng,
            self.office_lat,
            self.office_lng,
            self.radius_meters,
        )
    }
}

/// Rules applied when a punch is recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PunchRules {
    /// Reject punches made outside the geofence.
    #[serde(default)]
    pub enforce_geofence: bool,
    /// Reject punches whose GPS accuracy radius exceeds this many meters.
    #[serde(default)]
    pub max_accuracy_meters: Option<f64>,
}

/// Default leave allotment per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveQuota {
    /// Annual leave days.
    pub annual: u32,
    /// Sick leave days.
    pub sick: u32,
}

impl Default for LeaveQuota {
    fn default() -> Self {
        Self { annual: 12, sick: 5 }
    }
}

/// Rules governing leave applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRules {
    /// The implied balance of a user with no stored record.
    #[serde(default)]
    pub quota: LeaveQuota,
    /// Maximum days in a single application.
    #[serde(default = "default_max_days_per_application")]
    pub max_days_per_application: u32,
    /// Annual leave must start on or after `today + annual_notice_days`.
    #[serde(default = "default_annual_notice_days")]
    pub annual_notice_days: u32,
}

fn default_max_days_per_application() -> u32 {
    5
}

fn default_annual_notice_days() -> u32 {
    2
}

impl Default for LeaveRules {
    fn default() -> Self {
        Self {
            quota: LeaveQuota::default(),
            max_days_per_application: default_max_days_per_application(),
            annual_notice_days: default_annual_notice_days(),
        }
    }
}

/// The policy singleton.
///
/// Operations fetch a fresh snapshot of this from the store every time they
/// run; an administrative update replaces it wholesale.
///
/// # Example
///
/// ```
/// use attendance_engine::config::PolicyConfig;
/// use chrono::{NaiveDate, TimeZone, Utc};
///
/// let policy = PolicyConfig {
///     utc_offset_minutes: 8 * 60,
///     ..PolicyConfig::default()
/// };
/// // 20:00 UTC is already the next morning at UTC+8.
/// let ts = Utc.with_ymd_and_hms(2026, 3, 2, 20, 0, 0).unwrap();
/// assert_eq!(policy.local_date(ts), NaiveDate::from_ymd_opt(2026, 3, 3).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Working-time rules; `None` degrades classification to presence only.
    #[serde(default)]
    pub work_rules: Option<WorkRules>,
    /// The office geofence.
    #[serde(default)]
    pub geofence: Geofence,
    /// Fixed offset of office-local time from UTC, in minutes.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    /// Punch recording rules.
    #[serde(default)]
    pub punch: PunchRules,
    /// Leave application rules and quota.
    #[serde(default)]
    pub leave: LeaveRules,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            work_rules: Some(WorkRules::default()),
            geofence: Geofence::default(),
            utc_offset_minutes: 0,
            punch: PunchRules::default(),
            leave: LeaveRules::default(),
        }
    }
}

/// Largest offset in use anywhere (UTC+14:00).
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

impl PolicyConfig {
    /// The office-local offset. Falls back to UTC for out-of-range values.
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    /// Converts an instant to office-local wall-clock time.
    pub fn local_datetime(&self, ts: DateTime<Utc>) -> NaiveDateTime {
        ts.with_timezone(&self.offset()).naive_local()
    }

    /// The office-local calendar day of an instant.
    pub fn local_date(&self, ts: DateTime<Utc>) -> NaiveDate {
        self.local_datetime(ts).date()
    }

    /// Checks the invariants an administrator cannot be allowed to break.
    pub fn validate(&self) -> EngineResult<()> {
        let fence = &self.geofence;
        if !(-90.0..=90.0).contains(&fence.office_lat) {
            return Err(EngineError::invalid_policy(
                "geofence.office_lat",
                format!("{} is outside [-90, 90]", fence.office_lat),
            ));
        }
        if !(-180.0..=180.0).contains(&fence.office_lng) {
            return Err(EngineError::invalid_policy(
                "geofence.office_lng",
                format!("{} is outside [-180, 180]", fence.office_lng),
            ));
        }
        if !fence.radius_meters.is_finite() || fence.radius_meters < 0.0 {
            return Err(EngineError::invalid_policy(
                "geofence.radius_meters",
                "must be a non-negative number",
            ));
        }
        if self.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(EngineError::invalid_policy(
                "utc_offset_minutes",
                format!("{} is outside +/-{}", self.utc_offset_minutes, MAX_UTC_OFFSET_MINUTES),
            ));
        }
        if let Some(max) = self.punch.max_accuracy_meters {
            if !max.is_finite() || max <= 0.0 {
                return Err(EngineError::invalid_policy(
                    "punch.max_accuracy_meters",
                    "must be a positive number",
                ));
            }
        }
        if let Some(rules) = &self.work_rules {
            if let (Some(start), Some(end)) = (rules.work_start_time, rules.work_end_time) {
                if end <= start {
                    return Err(EngineError::invalid_policy(
                        "work_rules.work_end_time",
                        format!("{} is not after work_start_time {}", end, start),
                    ));
                }
            }
        }
        if self.leave.max_days_per_application == 0 {
            return Err(EngineError::invalid_policy(
                "leave.max_days_per_application",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// `"HH:MM"` (or `"HH:MM:SS"`) serde support for optional time-of-day fields.
mod time_of_day {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(time) => serializer.serialize_some(&time.format("%H:%M").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| {
            NaiveTime::parse_from_str(&s, "%H:%M")
                .or_else(|_| NaiveTime::parse_from_str(&s, "%H:%M:%S"))
                .map_err(|_| {
                    serde::de::Error::custom(format!(
                        "invalid time of day '{}', expected HH:MM",
                        s
                    ))
                })
        })
        .transpose()
    }
}
