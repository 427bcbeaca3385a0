//! Punch event model and the per-day record built from it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a punch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PunchKind {
    /// Clock-in.
    In,
    /// Clock-out.
    Out,
}

/// Device location attached to a punch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PunchLocation {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
    /// Reported accuracy radius in meters.
    pub accuracy_meters: f64,
}

/// A single clock-in or clock-out record.
///
/// Punch events are immutable once recorded; the store only ever appends
/// them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PunchEvent {
    /// Unique identifier for the punch.
    pub id: Uuid,
    /// The staff member who punched.
    pub user_id: String,
    /// Whether this is a clock-in or clock-out.
    pub kind: PunchKind,
    /// The instant the punch was recorded.
    pub timestamp: DateTime<Utc>,
    /// Where the device was when punching.
    pub location: PunchLocation,
    /// The office-local calendar day the punch belongs to.
    pub calendar_date: NaiveDate,
    /// Whether the location was inside the office geofence at record time.
    #[serde(default)]
    pub within_fence: bool,
}

/// All punches of one user for one calendar day, ordered by timestamp.
///
/// Built on demand by the daily aggregator and discarded after reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRecord {
    /// The staff member.
    pub user_id: String,
    /// The office-local day.
    pub calendar_date: NaiveDate,
    events: Vec<PunchEvent>,
}

impl DailyRecord {
    /// Creates a record, sorting the events by timestamp ascending.
    ///
    /// The sort is stable, so duplicate timestamps keep their input order.
    pub fn new(
        user_id: impl Into<String>,
        calendar_date: NaiveDate,
        mut events: Vec<PunchEvent>,
    ) -> Self {
        events.sort_by_key(|e| e.timestamp);
        Self {
            user_id: user_id.into(),
            calendar_date,
            events,
        }
    }

    /// Returns the ordered events.
    pub fn events(&self) -> &[PunchEvent] {
        &self.events
    }

    /// Returns true when the record holds no punches.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The earliest clock-in of the day, if any.
    pub fn first_in(&self) -> Option<&PunchEvent> {
        self.events.iter().find(|e| e.kind == PunchKind::In)
    }

    /// The latest clock-out of the day, if any.
    pub fn last_out(&self) -> Option<&PunchEvent> {
        self.events.iter().rev().find(|e| e.kind == PunchKind::Out)
    }
}
