pub mod announcement;
pub mod audit;
pub mod fetch_status;
pub mod quiz;
pub mod status;
pub mod user;

pub use announcement::*;
pub use audit::*;
pub use fetch_status::*;
pub use quiz::*;
pub use status::*;
pub use user::*;
