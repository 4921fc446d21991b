//! # Coordinator Configuration
//!
//! Runtime tunables for the submission and kitchen coordinators. Every field
//! has a production default; config files override only what they name, and
//! duration fields accept human-readable values ("3s", "10m").

use std::time::Duration;

use serde::Deserialize;

// =============================================================================
// Orders Config
// =============================================================================

/// Tunables for both coordinators.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrdersConfig {
    /// Submission attempts before giving up on counter conflicts.
    pub max_submit_attempts: u32,

    /// How long a READY order waits before it auto-completes to DELIVERED.
    #[serde(with = "humantime_serde")]
    pub ready_autocomplete_delay: Duration,

    /// How often the kitchen display refreshes elapsed-time badges.
    #[serde(with = "humantime_serde")]
    pub elapsed_poll_interval: Duration,

    /// How often the reconciliation sweep runs. The sweep backs up the
    /// per-order timers, so overdue READY orders complete even if a timer
    /// task was lost.
    #[serde(with = "humantime_serde")]
    pub reconcile_interval: Duration,

    /// Age at which a card is flagged late on the display.
    #[serde(with = "humantime_serde")]
    pub alert_threshold: Duration,

    /// How long a DELIVERED order lingers in the store before archival.
    #[serde(with = "humantime_serde")]
    pub archive_grace: Duration,
}

impl Default for OrdersConfig {
    fn default() -> Self {
        OrdersConfig {
            max_submit_attempts: 5,
            ready_autocomplete_delay: Duration::from_secs(60),
            elapsed_poll_interval: Duration::from_secs(1),
            reconcile_interval: Duration::from_secs(5),
            alert_threshold: Duration::from_secs(10 * 60),
            archive_grace: Duration::from_secs(30),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OrdersConfig::default();
        assert_eq!(config.max_submit_attempts, 5);
        assert_eq!(config.ready_autocomplete_delay, Duration::from_secs(60));
        assert_eq!(config.alert_threshold, Duration::from_secs(600));
    }

    #[test]
    fn test_partial_override_with_human_durations() {
        let config: OrdersConfig = serde_json::from_str(
            r#"{ "ready_autocomplete_delay": "3s", "alert_threshold": "10m" }"#,
        )
        .unwrap();
        assert_eq!(config.ready_autocomplete_delay, Duration::from_secs(3));
        assert_eq!(config.alert_threshold, Duration::from_secs(600));
        // Untouched fields keep their defaults.
        assert_eq!(config.max_submit_attempts, 5);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result: Result<OrdersConfig, _> =
            serde_json::from_str(r#"{ "ready_autocmplete_delay": "3s" }"#);
        assert!(result.is_err());
    }
}
