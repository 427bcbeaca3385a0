//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the attendance
//! and leave policy from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{LeaveRules, PolicyConfig};

/// Loads and provides access to the policy configuration.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/default/
/// ├── policy.yaml   # Work rules, geofence, UTC offset, punch rules
/// └── leave.yaml    # Leave quota and application rules
/// ```
///
/// # Example
///
/// ```no_run
/// use attendance_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default")?;
/// println!("Office radius: {}m", loader.policy().geofence.radius_meters);
/// # Ok::<(), attendance_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    policy: PolicyConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` on success, or an error if:
    /// - Either file is missing (`ConfigNotFound`)
    /// - Either file contains invalid YAML or bad field values (`ConfigParseError`)
    /// - The combined policy breaks an invariant (`InvalidPolicy`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let mut policy = Self::load_yaml::<PolicyConfig>(&path.join("policy.yaml"))?;
        policy.leave = Self::load_yaml::<LeaveRules>(&path.join("leave.yaml"))?;
        policy.validate()?;

        Ok(Self { policy })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the loaded policy.
    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    /// Consumes the loader and returns the policy.
    pub fn into_policy(self) -> PolicyConfig {
        self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn config_path() -> &'static str {
        "./config/default"
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
    }

    #[test]
    fn test_work_rules_loaded_correctly() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let rules = loader.policy().work_rules.as_ref().unwrap();

        assert_eq!(rules.work_start_time, NaiveTime::from_hms_opt(9, 0, 0));
        assert_eq!(rules.work_end_time, NaiveTime::from_hms_opt(17, 0, 0));
        assert_eq!(rules.grace_period_minutes, 5);
        assert_eq!(rules.min_overtime_minutes, 60);
    }

    #[test]
    fn test_geofence_loaded_correctly() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let fence = &loader.policy().geofence;

        assert_eq!(fence.office_lat, 3.139);
        assert_eq!(fence.office_lng, 101.6869);
        assert_eq!(fence.radius_meters, 100.0);
        assert_eq!(loader.policy().utc_offset_minutes, 480);
    }

    #[test]
    fn test_leave_rules_loaded_correctly() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let leave = &loader.policy().leave;

        assert_eq!(leave.quota.annual, 12);
        assert_eq!(leave.quota.sick, 5);
        assert_eq!(leave.max_days_per_application, 5);
        assert_eq!(leave.annual_notice_days, 2);
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("policy.yaml"));
            }
            _ => panic!("Expected ConfigNotFound error"),
        }
    }

    #[test]
    fn test_load_invalid_yaml_returns_parse_error() {
        let dir = std::env::temp_dir().join(format!("attendance-config-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("policy.yaml"), "work_rules: [not, a, map").unwrap();
        fs::write(dir.join("leave.yaml"), "max_days_per_application: 5").unwrap();

        let result = ConfigLoader::load(&dir);
        fs::remove_dir_all(&dir).ok();

        match result {
            Err(EngineError::ConfigParseError { path, .. }) => {
                assert!(path.contains("policy.yaml"));
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_load_inconsistent_policy_returns_invalid_policy() {
        let dir = std::env::temp_dir().join(format!("attendance-config-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("policy.yaml"),
            "geofence:\n  office_lat: 3.0\n  office_lng: 101.0\n  radius_meters: -10\n",
        )
        .unwrap();
        fs::write(dir.join("leave.yaml"), "annual_notice_days: 2").unwrap();

        let result = ConfigLoader::load(&dir);
        fs::remove_dir_all(&dir).ok();

        assert!(matches!(result, Err(EngineError::InvalidPolicy { .. })));
    }
}
