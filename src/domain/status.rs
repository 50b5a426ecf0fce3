use serde::{Deserialize, Serialize};

/// How current a student's announcement feed is, as shown on the monitor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    NoData,
    Danger,
    Warning,
    Success,
}

impl Classification {
    /// Row class used by the monitor table.
    pub fn css_class(&self) -> Option<&'static str> {
        match self {
            Classification::NoData => None,
            Classification::Danger => Some("table-danger"),
            Classification::Warning => Some("table-warning"),
            Classification::Success => Some("table-success"),
        }
    }
}

/// A student's last fetch as reported by the status RPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastFetch {
    pub time: i64,
    pub ago: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusInput {
    pub fetch: Option<LastFetch>,
    pub poll_interval: i64,
    pub last_announcement: Option<i64>,
}

pub struct StatusRule {
    pub name: &'static str,
    pub matches: fn(&StatusInput) -> bool,
    pub outcome: Classification,
}

/// Evaluated top to bottom; the first match wins. Staleness outranks an
/// unseen announcement. The last rule always matches.
pub const STATUS_RULES: &[StatusRule] = &[
    StatusRule {
        name: "no fetch recorded",
        matches: |input| input.fetch.is_none(),
        outcome: Classification::NoData,
    },
    StatusRule {
        name: "missed two polls",
        matches: |input| matches!(input.fetch, Some(f) if f.ago > 2 * input.poll_interval),
        outcome: Classification::Danger,
    },
    StatusRule {
        name: "missed a poll",
        matches: |input| matches!(input.fetch, Some(f) if f.ago > input.poll_interval),
        outcome: Classification::Warning,
    },
    StatusRule {
        name: "latest announcement unseen",
        matches: |input| match (input.fetch, input.last_announcement) {
            (Some(f), Some(last)) => last > f.time,
            _ => false,
        },
        outcome: Classification::Warning,
    },
    StatusRule {
        name: "up to date",
        matches: |_| true,
        outcome: Classification::Success,
    },
];

pub fn classify(input: &StatusInput) -> Classification {
    STATUS_RULES
        .iter()
        .find(|rule| (rule.matches)(input))
        .map(|rule| rule.outcome)
        .unwrap_or(Classification::Success)
}

/// Summary of the newest announcement shown above the monitor table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LastAnnouncement {
    pub time: Option<i64>,
    pub str: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudentStatus {
    pub userid: i64,
    pub time: i64,
    pub str: String,
    pub ago: i64,
}

/// Response body of the student status RPC.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudentStatusReport {
    pub last: LastAnnouncement,
    pub status: Vec<StudentStatus>,
}

/// One row of the monitor table, including students who have not fetched yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonitorRow {
    pub userid: i64,
    pub full_name: String,
    pub username: String,
    /// Display time of the last fetch, or `-`.
    pub time: String,
    /// Seconds since the last fetch, or `-`.
    pub ago: String,
    pub classification: Classification,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonitorPage {
    pub quiz_id: i64,
    pub check_interval: i64,
    pub refresh_interval: i64,
    pub last: LastAnnouncement,
    pub rows: Vec<MonitorRow>,
}
