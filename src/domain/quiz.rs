use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Quiz {
    pub id: i64,
    pub name: String,
}

/// Per-quiz announcement configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizSettings {
    pub quiz_id: i64,
    pub use_announcements: bool,
    /// Seconds between a student's announcement polls.
    pub check_interval: i64,
    pub header: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SaveQuizSettingsRequest {
    pub use_announcements: bool,
    #[validate(range(min = 1))]
    pub check_interval: Option<i64>,
    #[validate(length(max = 65535))]
    pub header: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum QuizRole {
    Student,
    Teacher,
    EditingTeacher,
    Manager,
}

impl QuizRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizRole::Student => "Student",
            QuizRole::Teacher => "Teacher",
            QuizRole::EditingTeacher => "EditingTeacher",
            QuizRole::Manager => "Manager",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Student" => Some(QuizRole::Student),
            "Teacher" => Some(QuizRole::Teacher),
            "EditingTeacher" => Some(QuizRole::EditingTeacher),
            "Manager" => Some(QuizRole::Manager),
            _ => None,
        }
    }

    /// Staff opening the attempt page are previewing; they are not tracked.
    pub fn is_preview(&self) -> bool {
        !matches!(self, QuizRole::Student)
    }
}
