pub mod announcements;

use chrono::DateTime;

pub use announcements::AnnouncementRenderer;

/// Formats a timestamp for display: time of day for today, otherwise a short
/// date and time.
pub fn display_time(time: i64, now: i64) -> String {
    let Some(at) = DateTime::from_timestamp(time, 0) else {
        return time.to_string();
    };

    let midnight = DateTime::from_timestamp(now, 0)
        .and_then(|n| n.date_naive().and_hms_opt(0, 0, 0))
        .map(|m| m.and_utc().timestamp())
        .unwrap_or(i64::MIN);

    if time < midnight {
        at.format("%d/%m/%y, %H:%M").to_string()
    } else {
        at.format("%H:%M").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-03-15 14:30:00 UTC
    const NOW: i64 = 1_710_513_000;

    #[test]
    fn test_display_time_today_shows_clock_only() {
        assert_eq!(display_time(NOW - 3600, NOW), "13:30");
    }

    #[test]
    fn test_display_time_before_midnight_shows_date() {
        assert_eq!(display_time(NOW - 86_400, NOW), "14/03/24, 14:30");
    }
}
