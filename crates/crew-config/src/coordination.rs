//! Coordination policy: stale threshold, stale statuses, polling interval.

use std::time::Duration;

use crew_core::enums::TaskStatus;
use crew_core::lifecycle::StalePolicy;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Claims older than this are released by the sweep (2 hours).
const fn default_stale_after_secs() -> u64 {
    2 * 60 * 60
}

fn default_stale_statuses() -> Vec<TaskStatus> {
    vec![TaskStatus::InProgress, TaskStatus::Review]
}

/// `crew watch` sweep interval.
const fn default_poll_interval_secs() -> u64 {
    15
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CoordinationConfig {
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,

    /// Statuses whose claims the sweep may release.
    #[serde(default = "default_stale_statuses")]
    pub stale_statuses: Vec<TaskStatus>,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for CoordinationConfig {
    fn default() -> Self {
        Self {
            stale_after_secs: default_stale_after_secs(),
            stale_statuses: default_stale_statuses(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

impl CoordinationConfig {
    /// Build the stale policy.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for a zero threshold, an empty
    /// status list, or a status that never holds a claim.
    pub fn stale_policy(&self) -> Result<StalePolicy, ConfigError> {
        StalePolicy::from_secs(self.stale_after_secs, self.stale_statuses.clone()).map_err(|e| {
            ConfigError::InvalidValue {
                field: "coordination".into(),
                reason: e.to_string(),
            }
        })
    }

    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the interval is zero.
    pub fn poll_interval(&self) -> Result<Duration, ConfigError> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "coordination.poll_interval_secs".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        Ok(Duration::from_secs(self.poll_interval_secs))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    #[test]
    fn defaults_are_two_hours_and_fifteen_seconds() {
        let config = CoordinationConfig::default();
        let policy = config.stale_policy().unwrap();
        assert_eq!(policy.threshold(), TimeDelta::hours(2));
        assert_eq!(
            policy.statuses(),
            &[TaskStatus::InProgress, TaskStatus::Review]
        );
        assert_eq!(config.poll_interval().unwrap(), Duration::from_secs(15));
    }

    #[test]
    fn zero_values_rejected() {
        let config = CoordinationConfig {
            stale_after_secs: 0,
            poll_interval_secs: 0,
            ..Default::default()
        };
        assert!(config.stale_policy().is_err());
        assert!(config.poll_interval().is_err());
    }

    #[test]
    fn pending_is_not_a_stale_status() {
        let config = CoordinationConfig {
            stale_statuses: vec![TaskStatus::Pending],
            ..Default::default()
        };
        assert!(matches!(
            config.stale_policy(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
