//! Classification rules in precedence order.
//!
//! Each rule inspects one user-day and either does not apply or returns a
//! [`RuleOutcome`]. Every applicable rule contributes its tags and warnings;
//! the status comes from the first applicable rule in
//! [`RULES_BY_PRECEDENCE`] that sets one. A day no rule assigns a status to
//! is `Present`.

use chrono::{Duration, NaiveDate};

use crate::config::{PolicyConfig, WorkRules};
use crate::models::{AttendanceStatus, PunchEvent, PunchKind};

/// Tag raised when the first clock-in is after start time plus grace.
pub const LATE_IN_TAG: &str = "Late In";

/// Tag raised when the last clock-out is before end time.
pub const EARLY_LEAVE_TAG: &str = "Early Leave";

/// Warning raised for a past day with a clock-in but no clock-out.
pub const MISSING_CHECK_OUT_WARNING: &str = "Missing Check-out";

/// Warning raised for a day with a clock-out but no clock-in.
pub const MISSING_CHECK_IN_WARNING: &str = "Missing Check-in";

/// Everything a rule may look at for one user-day.
#[derive(Debug, Clone, Copy)]
pub struct DayContext<'a> {
    /// Earliest punch of the day.
    pub first: &'a PunchEvent,
    /// Latest punch of the day.
    pub last: &'a PunchEvent,
    /// Whether any punch is a clock-in.
    pub has_in: bool,
    /// Whether any punch is a clock-out.
    pub has_out: bool,
    /// The working-time rules in force.
    pub rules: &'a WorkRules,
    /// The policy snapshot, for local-time conversion.
    pub policy: &'a PolicyConfig,
    /// The current office-local calendar day.
    pub today: NaiveDate,
}

impl<'a> DayContext<'a> {
    /// Builds the context for a non-empty set of punches.
    ///
    /// Returns `None` when `events` is empty. The events need not be sorted.
    pub fn new(
        events: &'a [PunchEvent],
        rules: &'a WorkRules,
        policy: &'a PolicyConfig,
        today: NaiveDate,
    ) -> Option<Self> {
        let first = events.iter().min_by_key(|e| e.timestamp)?;
        let last = events.iter().max_by_key(|e| e.timestamp)?;

        Some(Self {
            first,
            last,
            has_in: events.iter().any(|e| e.kind == PunchKind::In),
            has_out: events.iter().any(|e| e.kind == PunchKind::Out),
            rules,
            policy,
            today,
        })
    }

    /// The office-local day being classified.
    pub fn day(&self) -> NaiveDate {
        self.policy.local_date(self.first.timestamp)
    }
}

/// What an applicable rule contributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleOutcome {
    /// The status this rule assigns, if it is a terminal rule.
    pub status: Option<AttendanceStatus>,
    /// Tags to accumulate.
    pub tags: Vec<&'static str>,
    /// Warnings to accumulate.
    pub warnings: Vec<&'static str>,
}

impl RuleOutcome {
    fn status(status: AttendanceStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    fn with_tag(mut self, tag: &'static str) -> Self {
        self.tags.push(tag);
        self
    }

    fn with_warning(mut self, warning: &'static str) -> Self {
        self.warnings.push(warning);
        self
    }
}

/// A named classification rule.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationRule {
    /// Stable identifier, used in logs and tests.
    pub id: &'static str,
    /// Evaluates the rule; `None` means it does not apply.
    pub evaluate: fn(&DayContext<'_>) -> Option<RuleOutcome>,
}

/// All rules, highest precedence first.
pub const RULES_BY_PRECEDENCE: &[ClassificationRule] = &[
    ClassificationRule {
        id: "missing_check_in",
        evaluate: missing_check_in,
    },
    ClassificationRule {
        id: "open_shift",
        evaluate: open_shift,
    },
    ClassificationRule {
        id: "lateness",
        evaluate: lateness,
    },
    ClassificationRule {
        id: "early_departure",
        evaluate: early_departure,
    },
];

/// A clock-out with no clock-in is structurally invalid.
pub fn missing_check_in(ctx: &DayContext<'_>) -> Option<RuleOutcome> {
    (!ctx.has_in && ctx.has_out).then(|| {
        RuleOutcome::status(AttendanceStatus::Incomplete).with_warning(MISSING_CHECK_IN_WARNING)
    })
}

/// A clock-in with no clock-out: still working today, incomplete on any
/// other day.
pub fn open_shift(ctx: &DayContext<'_>) -> Option<RuleOutcome> {
    if !ctx.has_in || ctx.has_out {
        return None;
    }

    if ctx.day() == ctx.today {
        Some(RuleOutcome::status(AttendanceStatus::Working))
    } else {
        Some(
            RuleOutcome::status(AttendanceStatus::Incomplete)
                .with_warning(MISSING_CHECK_OUT_WARNING),
        )
    }
}

/// The first clock-in is strictly after start time plus grace period.
pub fn lateness(ctx: &DayContext<'_>) -> Option<RuleOutcome> {
    if ctx.first.kind != PunchKind::In {
        return None;
    }
    let start = ctx.rules.work_start_time?;

    let checked_in = ctx.policy.local_datetime(ctx.first.timestamp);
    let grace = Duration::minutes(i64::from(ctx.rules.grace_period_minutes));
    let deadline = checked_in.date().and_time(start) + grace;

    (checked_in > deadline)
        .then(|| RuleOutcome::status(AttendanceStatus::Late).with_tag(LATE_IN_TAG))
}

/// The last clock-out is strictly before end time. No grace on exit.
pub fn early_departure(ctx: &DayContext<'_>) -> Option<RuleOutcome> {
    if ctx.last.kind != PunchKind::Out {
        return None;
    }
    let end = ctx.rules.work_end_time?;

    let checked_out = ctx.policy.local_datetime(ctx.last.timestamp);
    let official_end = checked_out.date().and_time(end);

    (checked_out < official_end)
        .then(|| RuleOutcome::status(AttendanceStatus::EarlyLeave).with_tag(EARLY_LEAVE_TAG))
}
