use std::{ops::ControlFlow, sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::{
    domain::{classify, Classification, LastFetch, MonitorPage, StatusInput, StudentStatusReport},
    web::strings,
};
use super::{
    schedule::{PollLoop, Tick},
    transport::QuizTransport,
};

/// Consecutive failed refreshes after which the monitor gives up.
pub const MAX_CONSECUTIVE_FAILURES: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRow {
    pub userid: i64,
    pub full_name: String,
    pub time: String,
    pub ago: String,
    pub classification: Classification,
}

impl StatusRow {
    fn clear(&mut self) {
        self.time = strings::NO_DATA.to_string();
        self.ago = strings::NO_DATA.to_string();
        self.classification = Classification::NoData;
    }
}

/// The monitor's table of students plus the line above it.
#[derive(Debug, Clone)]
pub struct StatusTable {
    poll_interval: i64,
    header: String,
    rows: Vec<StatusRow>,
}

impl StatusTable {
    pub fn from_page(page: &MonitorPage) -> Self {
        Self {
            poll_interval: page.check_interval,
            header: page.last.str.clone(),
            rows: page
                .rows
                .iter()
                .map(|r| StatusRow {
                    userid: r.userid,
                    full_name: r.full_name.clone(),
                    time: r.time.clone(),
                    ago: r.ago.clone(),
                    classification: r.classification,
                })
                .collect(),
        }
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn rows(&self) -> &[StatusRow] {
        &self.rows
    }

    pub fn row(&self, userid: i64) -> Option<&StatusRow> {
        self.rows.iter().find(|r| r.userid == userid)
    }

    /// Rebuilds the table from a status report.
    ///
    /// Reported students come first, in report order; every other row is
    /// reset to no data and follows in its previous order. Rows keep their
    /// identity by user id.
    pub fn apply(&mut self, report: &StudentStatusReport) {
        let mut remaining = std::mem::take(&mut self.rows);
        let mut rebuilt = Vec::with_capacity(remaining.len());

        for student in &report.status {
            let Some(pos) = remaining.iter().position(|r| r.userid == student.userid) else {
                tracing::debug!(userid = student.userid, "No monitor row for student");
                continue;
            };

            let mut row = remaining.remove(pos);
            row.time = student.str.clone();
            row.ago = student.ago.to_string();
            row.classification = classify(&StatusInput {
                fetch: Some(LastFetch { time: student.time, ago: student.ago }),
                poll_interval: self.poll_interval,
                last_announcement: report.last.time,
            });
            rebuilt.push(row);
        }

        for mut row in remaining {
            row.clear();
            rebuilt.push(row);
        }

        self.rows = rebuilt;
        self.header = report.last.str.clone();
    }

    pub fn show_failure(&mut self) {
        self.header = strings::MONITOR_POLLING_FAILED.to_string();
    }
}

struct MonitorTick {
    quiz_id: i64,
    failures: u32,
    table: Arc<Mutex<StatusTable>>,
    transport: Arc<dyn QuizTransport>,
}

#[async_trait]
impl Tick for MonitorTick {
    async fn tick(&mut self) -> ControlFlow<()> {
        match self.transport.get_student_status(self.quiz_id).await {
            Ok(report) => {
                self.failures = 0;
                self.table.lock().await.apply(&report);
                ControlFlow::Continue(())
            }
            Err(e) => {
                self.failures += 1;
                tracing::warn!(quiz_id = self.quiz_id, failures = self.failures, "Status poll failed: {}", e);

                if self.failures >= MAX_CONSECUTIVE_FAILURES {
                    self.table.lock().await.show_failure();
                    tracing::error!(quiz_id = self.quiz_id, "Giving up on student status polling");
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            }
        }
    }
}

/// Live student status table for an instructor's monitor page.
pub struct MonitorSession {
    quiz_id: i64,
    refresh_interval: Duration,
    table: Arc<Mutex<StatusTable>>,
    transport: Arc<dyn QuizTransport>,
    poll: Option<PollLoop>,
}

impl MonitorSession {
    pub fn from_page(page: &MonitorPage, transport: Arc<dyn QuizTransport>) -> Self {
        Self {
            quiz_id: page.quiz_id,
            refresh_interval: Duration::from_secs(page.refresh_interval.max(1) as u64),
            table: Arc::new(Mutex::new(StatusTable::from_page(page))),
            transport,
            poll: None,
        }
    }

    pub fn table(&self) -> Arc<Mutex<StatusTable>> {
        self.table.clone()
    }

    pub fn is_running(&self) -> bool {
        self.poll.as_ref().is_some_and(|p| !p.is_finished())
    }

    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }

        let tick = MonitorTick {
            quiz_id: self.quiz_id,
            failures: 0,
            table: self.table.clone(),
            transport: self.transport.clone(),
        };
        self.poll = Some(PollLoop::spawn(self.refresh_interval, CancellationToken::new(), tick));
        tracing::debug!(quiz_id = self.quiz_id, refresh = ?self.refresh_interval, "Monitor started");
        true
    }

    pub fn stop(&mut self) {
        if let Some(poll) = self.poll.take() {
            poll.stop();
        }
    }

    /// Waits until polling ends, either by `stop` or by giving up.
    pub async fn finished(&mut self) {
        if let Some(poll) = self.poll.take() {
            poll.stopped().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LastAnnouncement, MonitorRow, StudentStatus};

    fn page() -> MonitorPage {
        let row = |userid: i64, name: &str| MonitorRow {
            userid,
            full_name: name.to_string(),
            username: name.to_lowercase(),
            time: "-".to_string(),
            ago: "-".to_string(),
            classification: Classification::NoData,
        };
        MonitorPage {
            quiz_id: 1,
            check_interval: 30,
            refresh_interval: 15,
            last: LastAnnouncement { time: None, str: "none".to_string() },
            rows: vec![row(1, "Alice"), row(2, "Bob"), row(3, "Carol")],
        }
    }

    fn status(userid: i64, time: i64, ago: i64) -> StudentStatus {
        StudentStatus { userid, time, str: format!("t{}", time), ago }
    }

    #[test]
    fn test_apply_orders_reported_rows_first() {
        let mut table = StatusTable::from_page(&page());
        table.apply(&StudentStatusReport {
            last: LastAnnouncement { time: Some(950), str: "posted".to_string() },
            status: vec![status(3, 900, 100), status(1, 990, 10)],
        });

        let ids: Vec<i64> = table.rows().iter().map(|r| r.userid).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(table.header(), "posted");
        assert_eq!(table.row(3).unwrap().classification, Classification::Danger);
        assert_eq!(table.row(1).unwrap().classification, Classification::Success);
        assert_eq!(table.row(1).unwrap().ago, "10");
        assert_eq!(table.row(2).unwrap().classification, Classification::NoData);
    }

    #[test]
    fn test_unreported_rows_reset_to_placeholder() {
        let mut table = StatusTable::from_page(&page());
        table.apply(&StudentStatusReport {
            last: LastAnnouncement { time: None, str: String::new() },
            status: vec![status(2, 990, 10)],
        });
        table.apply(&StudentStatusReport {
            last: LastAnnouncement { time: None, str: String::new() },
            status: vec![],
        });

        let bob = table.row(2).unwrap();
        assert_eq!(bob.time, "-");
        assert_eq!(bob.ago, "-");
        assert_eq!(bob.classification, Classification::NoData);
    }

    #[test]
    fn test_unknown_students_are_skipped() {
        let mut table = StatusTable::from_page(&page());
        table.apply(&StudentStatusReport {
            last: LastAnnouncement { time: None, str: String::new() },
            status: vec![status(42, 990, 10)],
        });
        assert_eq!(table.rows().len(), 3);
        assert!(table.row(42).is_none());
    }
}
