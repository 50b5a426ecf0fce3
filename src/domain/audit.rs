use serde::{Deserialize, Serialize};

/// Entries written to the audit trail.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditEvent {
    AnnouncementCreated,
    AnnouncementDeleted,
    AnnouncementsDeleted,
    AnnouncementsViewed,
    StudentStatusViewed,
}

impl AuditEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEvent::AnnouncementCreated => "announcement_created",
            AuditEvent::AnnouncementDeleted => "announcement_deleted",
            AuditEvent::AnnouncementsDeleted => "announcements_deleted",
            AuditEvent::AnnouncementsViewed => "announcements_viewed",
            AuditEvent::StudentStatusViewed => "student_status_viewed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditEntry {
    pub id: i64,
    pub quiz_id: i64,
    pub user_id: Option<i64>,
    pub event: String,
    pub object_id: Option<i64>,
    pub created_at: i64,
}
