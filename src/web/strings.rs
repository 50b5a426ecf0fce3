//! User-facing display strings.

pub const POPUP_HEADER: &str = "Quiz announcements";
pub const NO_ANNOUNCEMENTS_YET: &str = "No announcements have been made yet.";
pub const STATUS_NO_ANNOUNCEMENTS: &str = "No announcements have been posted yet.";
pub const MONITOR_POLLING_FAILED: &str =
    "Polling for student status failed. Reload the page to try again.";
pub const NOT_CONFIGURED: &str = "Announcements are not configured for this quiz";
pub const NOT_ENABLED: &str = "Announcements are not enabled for this quiz";
pub const ANNOUNCEMENT_NOT_FOUND: &str = "Announcement not found";
pub const QUIZ_MISMATCH: &str = "Announcement does not belong to this quiz";
pub const NONE_TO_DELETE: &str = "There are no announcements to delete";
pub const NO_DATA: &str = "-";

pub fn status_last_announcement(time: &str, ago: i64) -> String {
    format!("Last announcement posted at {} ({} seconds ago).", time, ago)
}

pub fn check_interval_too_small(min: i64) -> String {
    format!("Check interval must be at least {} seconds", min)
}

pub fn check_interval_too_big(max: i64) -> String {
    format!("Check interval must be at most {} seconds", max)
}
