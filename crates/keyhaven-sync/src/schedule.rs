//! Refresh scheduling — determines when the next catalog refresh is due.

use chrono::DateTime;

/// Returns true if `next_run_at` is in the past relative to `now`.
#[must_use]
pub fn is_refresh_due(next_run_at: &str, now: &str) -> bool {
    let next = DateTime::parse_from_rfc3339(next_run_at).ok();
    let current = DateTime::parse_from_rfc3339(now).ok();
    match (next, current) {
        (Some(n), Some(c)) => n <= c,
        _ => false,
    }
}

/// Return the ISO-8601 timestamp for `now + interval_days`.
#[must_use]
pub fn next_refresh_timestamp(interval_days: u32) -> String {
    use chrono::Utc;
    let next = Utc::now() + chrono::Duration::days(i64::from(interval_days));
    next.to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_due_past_next_run() {
        let now = "2026-08-06T12:00:00Z".to_string();
        let next_run = "2026-08-06T11:00:00Z".to_string();
        assert!(is_refresh_due(&next_run, &now));
    }

    #[test]
    fn test_refresh_not_due_future_next_run() {
        let now = "2026-08-06T12:00:00Z".to_string();
        let next_run = "2026-08-06T13:00:00Z".to_string();
        assert!(!is_refresh_due(&next_run, &now));
    }

    #[test]
    fn test_unparseable_timestamps_never_due() {
        assert!(!is_refresh_due("not-a-timestamp", "2026-08-06T12:00:00Z"));
        assert!(!is_refresh_due("2026-08-06T12:00:00Z", "garbage"));
    }

    #[test]
    fn test_next_refresh_is_in_the_future() {
        let next = next_refresh_timestamp(7);
        let now = chrono::Utc::now().to_rfc3339();
        assert!(!is_refresh_due(&next, &now));
    }
}
