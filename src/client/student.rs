use std::{
    ops::ControlFlow,
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::{domain::AttemptPage, web::strings};
use super::{
    schedule::{PollLoop, Tick},
    transport::QuizTransport,
};

/// The popup that shows newly arrived announcements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modal {
    pub title: String,
    pub body: String,
    pub visible: bool,
}

impl Default for Modal {
    fn default() -> Self {
        Self {
            title: strings::POPUP_HEADER.to_string(),
            body: String::new(),
            visible: false,
        }
    }
}

/// The announcement region of an attempt page: the running list under the
/// header plus the popup.
#[derive(Debug, Clone)]
pub struct AnnouncementBoard {
    header_html: String,
    announcements: Vec<String>,
    modal: Modal,
}

impl AnnouncementBoard {
    pub fn new(header_html: impl Into<String>) -> Self {
        Self {
            header_html: header_html.into(),
            announcements: Vec::new(),
            modal: Modal::default(),
        }
    }

    pub fn header_html(&self) -> &str {
        &self.header_html
    }

    /// Announcements that arrived while the page was open, oldest first.
    pub fn announcements(&self) -> &[String] {
        &self.announcements
    }

    pub fn modal(&self) -> &Modal {
        &self.modal
    }

    /// Adds freshly polled announcement HTML to the list and the popup.
    pub fn add(&mut self, html: &str) {
        if html.is_empty() {
            return;
        }
        self.announcements.push(html.to_string());
        self.show(html);
    }

    /// Appends to an open popup so nothing being read is lost; otherwise
    /// replaces its content and opens it.
    pub fn show(&mut self, html: &str) {
        if self.modal.visible {
            self.modal.body.push_str(html);
        } else {
            self.modal.body = html.to_string();
            self.modal.visible = true;
        }
    }

    pub fn dismiss(&mut self) {
        self.modal.visible = false;
    }
}

struct StudentTick {
    quiz_id: i64,
    last_fetch: Arc<AtomicI64>,
    board: Arc<Mutex<AnnouncementBoard>>,
    transport: Arc<dyn QuizTransport>,
}

#[async_trait]
impl Tick for StudentTick {
    async fn tick(&mut self) -> ControlFlow<()> {
        let lasttime = self.last_fetch.load(Ordering::SeqCst);

        match self.transport.get_announcements(self.quiz_id, lasttime).await {
            Ok(delta) => {
                self.board.lock().await.add(&delta.content);
                self.last_fetch.store(delta.lasttime, Ordering::SeqCst);
            }
            Err(e) => {
                // Delivery is best effort; the attempt carries on regardless.
                tracing::warn!(quiz_id = self.quiz_id, "Announcement poll failed: {}", e);
            }
        }

        ControlFlow::Continue(())
    }
}

/// Announcement polling for one open attempt page.
pub struct StudentSession {
    quiz_id: i64,
    poll_interval: Option<Duration>,
    last_fetch: Arc<AtomicI64>,
    board: Arc<Mutex<AnnouncementBoard>>,
    transport: Arc<dyn QuizTransport>,
    poll: Option<PollLoop>,
}

impl StudentSession {
    /// Builds the session from the attempt page bootstrap, opening the popup
    /// when the page load brought new announcements.
    pub fn from_attempt(page: &AttemptPage, transport: Arc<dyn QuizTransport>) -> Self {
        let mut board = AnnouncementBoard::new(page.header_html.clone());
        if !page.new_announcements_html.is_empty() {
            board.show(&page.new_announcements_html);
        }

        Self {
            quiz_id: page.quiz_id,
            poll_interval: page
                .poll_interval
                .filter(|&secs| secs > 0)
                .map(|secs| Duration::from_secs(secs as u64)),
            last_fetch: Arc::new(AtomicI64::new(page.now)),
            board: Arc::new(Mutex::new(board)),
            transport,
            poll: None,
        }
    }

    pub fn quiz_id(&self) -> i64 {
        self.quiz_id
    }

    pub fn board(&self) -> Arc<Mutex<AnnouncementBoard>> {
        self.board.clone()
    }

    pub fn last_fetch(&self) -> i64 {
        self.last_fetch.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.poll.as_ref().is_some_and(|p| !p.is_finished())
    }

    /// Starts polling. Returns false when the page does not poll (review
    /// pages) or polling is already running.
    pub fn start(&mut self) -> bool {
        let Some(delay) = self.poll_interval else {
            return false;
        };
        if self.is_running() {
            return false;
        }

        let tick = StudentTick {
            quiz_id: self.quiz_id,
            last_fetch: self.last_fetch.clone(),
            board: self.board.clone(),
            transport: self.transport.clone(),
        };
        self.poll = Some(PollLoop::spawn(delay, CancellationToken::new(), tick));
        tracing::debug!(quiz_id = self.quiz_id, ?delay, "Student poller started");
        true
    }

    /// Stops polling; no tick starts after this returns.
    pub fn stop(&mut self) {
        if let Some(poll) = self.poll.take() {
            poll.stop();
        }
    }

    /// Stops polling and waits for an in-flight tick to settle.
    pub async fn shutdown(&mut self) {
        if let Some(poll) = self.poll.take() {
            poll.stop();
            poll.stopped().await;
        }
    }
}
