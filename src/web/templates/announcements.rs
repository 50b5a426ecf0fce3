use askama::Template;

use crate::{
    domain::{Announcement, RenderedAnnouncement, ATTACHMENT_PLACEHOLDER},
    error::{AppError, Result},
    web::strings,
};
use super::display_time;

// Announcement and header content come from staff with the make-announcement
// capability and is trusted; it is emitted unescaped.
#[derive(Template)]
#[template(
    source = r#"<div class="quizcast-announcement" data-announcement-id="{{ id }}"><div class="quizcast-announcement-time">{{ time_posted }}</div><div class="quizcast-announcement-content">{{ content|safe }}</div></div>"#,
    ext = "html"
)]
struct AnnouncementFragment<'a> {
    id: i64,
    time_posted: &'a str,
    content: &'a str,
}

#[derive(Template)]
#[template(
    source = r#"<div id="quizcast-announcements" class="quizcast-announcements"><div class="quizcast-header">{{ header|safe }}</div><div class="quizcast-list" data-region="announcements">{% if announcements.is_empty() %}<p data-noannouncements>{{ no_announcements }}</p>{% else %}{{ announcements|safe }}{% endif %}</div></div>"#,
    ext = "html"
)]
struct AttemptHeader<'a> {
    header: &'a str,
    announcements: &'a str,
    no_announcements: &'a str,
}

/// Turns stored announcements into display HTML.
#[derive(Debug, Clone)]
pub struct AnnouncementRenderer {
    attachments_url: String,
}

impl AnnouncementRenderer {
    /// `attachments_url` is the URL prefix attachments are served under.
    pub fn new(attachments_url: impl Into<String>) -> Self {
        Self {
            attachments_url: attachments_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn attachment_base(&self, quiz_id: i64, announcement_id: i64) -> String {
        format!("{}/{}/{}", self.attachments_url, quiz_id, announcement_id)
    }

    pub fn rewrite_attachment_urls(&self, announcement: &Announcement) -> String {
        announcement.content.replace(
            ATTACHMENT_PLACEHOLDER,
            &self.attachment_base(announcement.quiz_id, announcement.id),
        )
    }

    pub fn render(&self, announcement: &Announcement, now: i64) -> Result<RenderedAnnouncement> {
        let content = self.rewrite_attachment_urls(announcement);
        let time_posted = display_time(announcement.time_posted, now);

        let html = AnnouncementFragment {
            id: announcement.id,
            time_posted: &time_posted,
            content: &content,
        }
        .render()
        .map_err(|e| AppError::Internal(format!("Failed to render announcement: {}", e)))?;

        Ok(RenderedAnnouncement {
            id: announcement.id,
            time_posted: announcement.time_posted,
            html,
        })
    }

    pub fn render_all(&self, announcements: &[Announcement], now: i64) -> Result<Vec<RenderedAnnouncement>> {
        announcements.iter().map(|a| self.render(a, now)).collect()
    }

    /// Concatenated HTML of `announcements`; empty when there are none.
    pub fn render_html(&self, announcements: &[Announcement], now: i64) -> Result<String> {
        Ok(self
            .render_all(announcements, now)?
            .into_iter()
            .map(|r| r.html)
            .collect())
    }

    /// The block prepended to the attempt page: header text plus the full
    /// announcement list (or a "none yet" marker the client removes later).
    pub fn render_attempt_header(&self, header: &str, announcements_html: &str) -> Result<String> {
        AttemptHeader {
            header,
            announcements: announcements_html,
            no_announcements: strings::NO_ANNOUNCEMENTS_YET,
        }
        .render()
        .map_err(|e| AppError::Internal(format!("Failed to render announcement header: {}", e)))
    }
}
