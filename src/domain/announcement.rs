use serde::{Deserialize, Serialize};
use validator::Validate;

/// Placeholder authors put in announcement content to reference the
/// announcement's own attachments, e.g. `<img src="@@ATTACHMENTS@@/map.png">`.
pub const ATTACHMENT_PLACEHOLDER: &str = "@@ATTACHMENTS@@";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Announcement {
    pub id: i64,
    pub quiz_id: i64,
    pub content: String,
    pub time_posted: i64,
    pub created_by: Option<i64>,
}

/// An announcement after attachment URLs are rewritten and the display
/// fragment is rendered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenderedAnnouncement {
    pub id: i64,
    pub time_posted: i64,
    pub html: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PostAnnouncementRequest {
    #[validate(length(min = 1, max = 65535, message = "Announcement content is required"))]
    pub content: String,
    #[serde(default)]
    #[validate(nested)]
    pub attachments: Vec<AttachmentUpload>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AttachmentUpload {
    #[validate(length(min = 1, max = 255))]
    pub filename: String,
    /// Base64 (standard alphabet) file body.
    pub data: String,
}

/// Response body of the incremental announcement poll.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnnouncementsDelta {
    /// Concatenated HTML of every announcement posted at or after the
    /// requested time; empty when there are none.
    pub content: String,
    /// Server time of this fetch; the client sends it back as `lasttime`.
    pub lasttime: i64,
}

/// Everything a student's attempt page needs to render the announcement
/// region and bootstrap its poller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttemptPage {
    pub quiz_id: i64,
    /// Header plus the full announcement list, ready to prepend to the page.
    pub header_html: String,
    /// Announcements to show in the popup on load.
    pub new_announcements_html: String,
    /// Seconds between polls; `None` disables polling (review pages).
    pub poll_interval: Option<i64>,
    /// Initial `lasttime` for the poller.
    pub now: i64,
}
