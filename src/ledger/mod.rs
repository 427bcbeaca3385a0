//! Leave balance ledger.
//!
//! Leave applications are checked against the application rules and the
//! balance, then stored pending; approval decrements the balance inside the same
//! transaction that marks the request approved.

mod leave_ledger;
mod rules;

pub use leave_ledger::LeaveLedger;
pub use rules::{
    annual_notice_threshold, check_days_cap, inclusive_day_count, validate_application,
};
