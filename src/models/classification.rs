//! Classification result models.
//!
//! A [`ClassificationResult`] is a pure function output: it is recomputed
//! on every query and never persisted.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The attendance status of one user-day.
///
/// # Example
///
/// ```
/// use attendance_engine::models::{AttendanceStatus, ColorTag};
///
/// assert_eq!(AttendanceStatus::EarlyLeave.to_string(), "Early Leave");
/// assert_eq!(AttendanceStatus::Working.color_tag(), ColorTag::Blue);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// No punches on the day.
    Absent,
    /// Punched in and out within policy.
    Present,
    /// First clock-in after the start time plus grace period.
    Late,
    /// Last clock-out before the end time.
    EarlyLeave,
    /// Clocked in today with no clock-out yet.
    Working,
    /// A clock-in or clock-out is missing.
    Incomplete,
}

impl AttendanceStatus {
    /// The presentation hint for this status.
    pub fn color_tag(self) -> ColorTag {
        match self {
            AttendanceStatus::Absent | AttendanceStatus::Incomplete => ColorTag::Red,
            AttendanceStatus::Present => ColorTag::Green,
            AttendanceStatus::Late | AttendanceStatus::EarlyLeave => ColorTag::Orange,
            AttendanceStatus::Working => ColorTag::Blue,
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AttendanceStatus::Absent => "Absent",
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Late => "Late",
            AttendanceStatus::EarlyLeave => "Early Leave",
            AttendanceStatus::Working => "Working",
            AttendanceStatus::Incomplete => "Incomplete",
        };
        f.write_str(label)
    }
}

/// Presentation hint derived from the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorTag {
    /// Absent or incomplete.
    Red,
    /// Present.
    Green,
    /// Late or left early.
    Orange,
    /// Currently working.
    Blue,
}

/// The outcome of classifying one user-day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// The single terminal status.
    pub status: AttendanceStatus,
    /// Presentation hint for `status`.
    pub color_tag: ColorTag,
    /// Policy tags such as "Late In", in the order they were raised.
    pub tags: Vec<String>,
    /// Structural warnings such as "Missing Check-out".
    pub warnings: Vec<String>,
}

impl ClassificationResult {
    /// Creates an empty result with the given status.
    pub fn with_status(status: AttendanceStatus) -> Self {
        Self {
            status,
            color_tag: status.color_tag(),
            tags: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Sets the status and keeps the color tag in sync.
    pub fn set_status(&mut self, status: AttendanceStatus) {
        self.status = status;
        self.color_tag = status.color_tag();
    }

    /// Adds a tag unless it is already present.
    pub fn add_tag(&mut self, tag: &str) {
        if !self.has_tag(tag) {
            self.tags.push(tag.to_string());
        }
    }

    /// Adds a warning unless it is already present.
    pub fn add_warning(&mut self, warning: &str) {
        if !self.has_warning(warning) {
            self.warnings.push(warning.to_string());
        }
    }

    /// Returns true if the tag was raised.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Returns true if the warning was raised.
    pub fn has_warning(&self, warning: &str) -> bool {
        self.warnings.iter().any(|w| w == warning)
    }
}
