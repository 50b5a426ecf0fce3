use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub uploads: UploadsConfig,
    pub announcements: AnnouncementConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub session_duration_hours: i64,
    #[serde(default)]
    pub secure_cookies: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadsConfig {
    pub dir: String,
}

/// Site-wide announcement settings. Quizzes override `default_check_interval`
/// unless `check_interval_locked` is set.
#[derive(Debug, Deserialize, Clone)]
pub struct AnnouncementConfig {
    pub default_check_interval: i64,
    pub min_check_interval: i64,
    pub max_check_interval: i64,
    /// Seconds within which a reload reuses the previous "new since" boundary.
    pub reannounce_window: i64,
    /// Upper bound on the monitor refresh interval; 0 means "use the quiz interval".
    pub refresh_interval: i64,
    pub default_header: String,
    #[serde(default)]
    pub check_interval_locked: bool,
}

impl AnnouncementConfig {
    /// How often the monitor table refreshes for a quiz polled every `check_interval` seconds.
    pub fn monitor_refresh_interval(&self, check_interval: i64) -> i64 {
        if self.refresh_interval <= 0 {
            check_interval
        } else {
            self.refresh_interval.min(check_interval)
        }
    }
}

impl Default for AnnouncementConfig {
    fn default() -> Self {
        Self {
            default_check_interval: 30,
            min_check_interval: 30,
            max_check_interval: 300,
            reannounce_window: 5,
            refresh_interval: 15,
            default_header: "<h4>Announcements</h4>".to_string(),
            check_interval_locked: false,
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.base_url", "http://localhost:8080")?
            .set_default("database.url", "sqlite://quizcast.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("auth.session_duration_hours", 24)?
            .set_default("uploads.dir", "uploads")?
            .set_default("announcements.default_check_interval", 30)?
            .set_default("announcements.min_check_interval", 30)?
            .set_default("announcements.max_check_interval", 300)?
            .set_default("announcements.reannounce_window", 5)?
            .set_default("announcements.refresh_interval", 15)?
            .set_default("announcements.default_header", "<h4>Announcements</h4>")?
            .set_default("announcements.check_interval_locked", false)?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Add environment variables (with QUIZCAST__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("QUIZCAST").separator("__"))

            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                base_url: "http://localhost:8080".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://quizcast.db?mode=rwc".to_string(),
                max_connections: 10,
            },
            auth: AuthConfig {
                session_duration_hours: 24,
                secure_cookies: false,
            },
            uploads: UploadsConfig {
                dir: "uploads".to_string(),
            },
            announcements: AnnouncementConfig::default(),
        }
    }
}
