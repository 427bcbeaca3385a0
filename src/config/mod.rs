//! Policy configuration loading and management.
//!
//! This module provides functionality to load the attendance and leave
//! policy from YAML files: working hours, grace period, geofence, punch
//! rules and leave quota, and to replace it at runtime.
//!
//! # Example
//!
//! ```no_run
//! use attendance_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Annual quota: {}", config.policy().leave.quota.annual);
//! ```

mod admin;
mod loader;
mod types;

pub use admin::update_policy;
pub use loader::ConfigLoader;
pub use types::{Geofence, LeaveQuota, LeaveRules, PolicyConfig, PunchRules, WorkRules};
