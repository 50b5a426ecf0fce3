//! Client side of the two polling RPCs: the student's announcement poller
//! and the instructor's status monitor.

pub mod monitor;
pub mod schedule;
pub mod student;
pub mod transport;

use thiserror::Error;

pub use monitor::{MonitorSession, StatusTable, MAX_CONSECUTIVE_FAILURES};
pub use schedule::{PollLoop, Tick};
pub use student::{AnnouncementBoard, StudentSession};
pub use transport::{HttpTransport, QuizTransport};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Not logged in")]
    NotLoggedIn,
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
