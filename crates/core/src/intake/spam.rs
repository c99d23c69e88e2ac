//! Anti-spam heuristics: honeypot field and minimum time-to-submit.

use std::time::Duration;

use crate::types::ContactRequest;

/// Default minimum time between form mount and submit.
pub const DEFAULT_MIN_FILL_TIME: Duration = Duration::from_millis(1500);

/// Result of running the anti-spam checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpamVerdict {
    /// Passed both checks. `elapsed_ms` is `None` when no mount time was sent.
    Clean { elapsed_ms: Option<i64> },
    /// The honeypot field was filled.
    Honeypot,
    /// Submitted faster than the policy allows.
    TooFast { elapsed_ms: i64 },
}

/// Anti-spam thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpamPolicy {
    pub min_fill_time: Duration,
}

impl Default for SpamPolicy {
    fn default() -> Self {
        Self {
            min_fill_time: DEFAULT_MIN_FILL_TIME,
        }
    }
}

impl SpamPolicy {
    /// Create a policy with a custom minimum fill time.
    #[must_use]
    pub const fn new(min_fill_time: Duration) -> Self {
        Self { min_fill_time }
    }

    /// Run the honeypot check, then the timing check.
    ///
    /// `now_ms` is the server clock in milliseconds since the Unix epoch.
    /// A request without `mountedAt` skips the timing check. A mount time in
    /// the future gives a negative elapsed time and counts as too fast.
    #[must_use]
    pub fn check(&self, request: &ContactRequest, now_ms: i64) -> SpamVerdict {
        if request.honey.as_deref().is_some_and(|h| !h.is_empty()) {
            return SpamVerdict::Honeypot;
        }

        let Some(mounted_at) = request.mounted_at_ms() else {
            return SpamVerdict::Clean { elapsed_ms: None };
        };

        let elapsed_ms = now_ms.saturating_sub(mounted_at);
        if elapsed_ms < self.min_fill_ms() {
            return SpamVerdict::TooFast { elapsed_ms };
        }

        SpamVerdict::Clean {
            elapsed_ms: Some(elapsed_ms),
        }
    }

    fn min_fill_ms(&self) -> i64 {
        i64::try_from(self.min_fill_time.as_millis()).unwrap_or(i64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;

    #[allow(clippy::cast_precision_loss)] // Test timestamps fit in f64 exactly
    fn mounted(ms_ago: i64) -> ContactRequest {
        ContactRequest {
            mounted_at: Some((NOW - ms_ago) as f64),
            ..ContactRequest::default()
        }
    }

    #[test]
    fn test_honeypot_wins_over_timing() {
        let request = ContactRequest {
            honey: Some("filled".to_string()),
            ..mounted(0)
        };
        assert_eq!(
            SpamPolicy::default().check(&request, NOW),
            SpamVerdict::Honeypot
        );
    }

    #[test]
    fn test_whitespace_honeypot_counts() {
        let request = ContactRequest {
            honey: Some(" ".to_string()),
            ..mounted(5_000)
        };
        assert_eq!(
            SpamPolicy::default().check(&request, NOW),
            SpamVerdict::Honeypot
        );
    }

    #[test]
    fn test_empty_honeypot_is_ignored() {
        let request = ContactRequest {
            honey: Some(String::new()),
            ..mounted(5_000)
        };
        assert_eq!(
            SpamPolicy::default().check(&request, NOW),
            SpamVerdict::Clean {
                elapsed_ms: Some(5_000)
            }
        );
    }

    #[test]
    fn test_too_fast() {
        let policy = SpamPolicy::default();
        assert_eq!(
            policy.check(&mounted(0), NOW),
            SpamVerdict::TooFast { elapsed_ms: 0 }
        );
        assert_eq!(
            policy.check(&mounted(1_499), NOW),
            SpamVerdict::TooFast { elapsed_ms: 1_499 }
        );
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert_eq!(
            SpamPolicy::default().check(&mounted(1_500), NOW),
            SpamVerdict::Clean {
                elapsed_ms: Some(1_500)
            }
        );
    }

    #[test]
    fn test_future_mount_is_too_fast() {
        assert_eq!(
            SpamPolicy::default().check(&mounted(-10_000), NOW),
            SpamVerdict::TooFast {
                elapsed_ms: -10_000
            }
        );
    }

    #[test]
    fn test_missing_mount_time_skips_timing() {
        assert_eq!(
            SpamPolicy::default().check(&ContactRequest::default(), NOW),
            SpamVerdict::Clean { elapsed_ms: None }
        );
    }

    #[test]
    fn test_custom_policy() {
        let policy = SpamPolicy::new(Duration::from_secs(5));
        assert!(matches!(
            policy.check(&mounted(2_000), NOW),
            SpamVerdict::TooFast { .. }
        ));
    }
}
