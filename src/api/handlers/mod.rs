pub mod announcements;
pub mod attempts;
pub mod auth;
pub mod root;
pub mod settings;
pub mod status;
