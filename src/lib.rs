//! Attendance engine for office staff.
//!
//! This crate classifies each staff member's working day from geofenced
//! clock-in/clock-out punches, and keeps a leave-balance ledger whose
//! approvals are applied atomically under optimistic concurrency.

#![warn(missing_docs)]

pub mod api;
pub mod attendance;
pub mod clock;
pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod store;
