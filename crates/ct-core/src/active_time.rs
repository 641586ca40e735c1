//! Active-time estimation from activity timestamps.
//!
//! Converts a session's raw activity timestamps into an "active minutes"
//! figure by capping idle gaps. This is a heuristic, not a measured
//! duration: a gap longer than the idle cap is assumed to be a break and
//! contributes only the cap, and a fixed base allowance covers engagement
//! around the first and last recorded activity.

use chrono::{DateTime, Utc};

/// Tunable constants for the active-time heuristic.
///
/// The defaults are load-bearing: historical reports were produced with a
/// 30-minute idle cap and a 5-minute base allowance, so changing them
/// changes what past date ranges report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatorConfig {
    /// Maximum minutes attributed to a single inter-activity gap before it
    /// is treated as a break rather than work.
    pub idle_cap_minutes: f64,

    /// Fixed allowance for engagement at the first and last activity.
    pub base_minutes: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            idle_cap_minutes: 30.0,
            base_minutes: 5.0,
        }
    }
}

/// Estimates active minutes for a single session.
///
/// With fewer than two timestamps there is no gap signal, so the session is
/// credited its wall-clock duration capped at one idle cap. With two or
/// more, each consecutive gap contributes up to the idle cap, plus the base
/// allowance.
///
/// Timestamps may arrive in any order; they are sorted before gaps are
/// measured. Duplicate timestamps contribute zero, and a missing or
/// negative duration counts as zero, so the result is never negative.
#[allow(clippy::cast_precision_loss)]
pub fn estimate_active_minutes(
    config: &EstimatorConfig,
    duration_minutes: Option<f64>,
    timestamps: &[DateTime<Utc>],
) -> f64 {
    if timestamps.len() < 2 {
        return duration_minutes
            .unwrap_or(0.0)
            .clamp(0.0, config.idle_cap_minutes);
    }

    let mut sorted = timestamps.to_vec();
    sorted.sort_unstable();

    let mut active = 0.0;
    for pair in sorted.windows(2) {
        let gap_minutes = (pair[1] - pair[0]).num_milliseconds() as f64 / 60_000.0;
        active += gap_minutes.clamp(0.0, config.idle_cap_minutes);
    }
    active + config.base_minutes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .expect("valid timestamp")
            .with_timezone(&Utc)
    }

    #[test]
    fn no_timestamps_caps_duration_at_idle_cap() {
        let config = EstimatorConfig::default();
        assert_eq!(estimate_active_minutes(&config, Some(12.5), &[]), 12.5);
        assert_eq!(estimate_active_minutes(&config, Some(90.0), &[]), 30.0);
        assert_eq!(estimate_active_minutes(&config, None, &[]), 0.0);
    }

    #[test]
    fn single_timestamp_caps_duration_at_idle_cap() {
        let config = EstimatorConfig::default();
        let only = [ts("2025-01-01T09:00:00Z")];
        assert_eq!(estimate_active_minutes(&config, Some(45.0), &only), 30.0);
        assert_eq!(estimate_active_minutes(&config, Some(10.0), &only), 10.0);
        assert_eq!(estimate_active_minutes(&config, None, &only), 0.0);
    }

    #[test]
    fn negative_duration_counts_as_zero() {
        let config = EstimatorConfig::default();
        assert_eq!(estimate_active_minutes(&config, Some(-15.0), &[]), 0.0);
    }

    #[test]
    fn gaps_sum_with_idle_cap_and_base() {
        // Gaps of 5 and 40 minutes: min(5, 30) + min(40, 30) + 5 = 40.
        let config = EstimatorConfig::default();
        let timestamps = [
            ts("2025-01-01T09:05:00Z"),
            ts("2025-01-01T09:10:00Z"),
            ts("2025-01-01T09:50:00Z"),
        ];
        let active = estimate_active_minutes(&config, Some(60.0), &timestamps);
        assert_eq!(active, 40.0);
    }

    #[test]
    fn unsorted_input_is_sorted_before_measuring() {
        let config = EstimatorConfig::default();
        let sorted = [
            ts("2025-01-01T09:05:00Z"),
            ts("2025-01-01T09:10:00Z"),
            ts("2025-01-01T09:50:00Z"),
        ];
        let shuffled = [sorted[2], sorted[0], sorted[1]];
        assert_eq!(
            estimate_active_minutes(&config, None, &shuffled),
            estimate_active_minutes(&config, None, &sorted),
        );
    }

    #[test]
    fn duplicate_timestamps_contribute_nothing() {
        let config = EstimatorConfig::default();
        let same = ts("2025-01-01T09:00:00Z");
        let active = estimate_active_minutes(&config, Some(60.0), &[same, same, same]);
        assert_eq!(active, config.base_minutes);
    }

    #[test]
    fn fractional_gaps_are_preserved() {
        let config = EstimatorConfig::default();
        let timestamps = [ts("2025-01-01T09:00:00Z"), ts("2025-01-01T09:00:30Z")];
        let active = estimate_active_minutes(&config, None, &timestamps);
        assert_eq!(active, 0.5 + config.base_minutes);
    }

    #[test]
    fn custom_constants_are_honored() {
        let config = EstimatorConfig {
            idle_cap_minutes: 10.0,
            base_minutes: 2.0,
        };
        let timestamps = [
            ts("2025-01-01T09:00:00Z"),
            ts("2025-01-01T09:05:00Z"),
            ts("2025-01-01T09:45:00Z"),
        ];
        // min(5, 10) + min(40, 10) + 2
        assert_eq!(
            estimate_active_minutes(&config, None, &timestamps),
            5.0 + 10.0 + 2.0
        );
    }
}
