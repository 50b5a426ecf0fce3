use async_trait::async_trait;
use reqwest::{header, Response};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use crate::{
    auth::SESSION_COOKIE,
    domain::{AnnouncementsDelta, AttemptPage, MonitorPage, StudentStatusReport},
};
use super::{ClientError, ClientResult};

/// The two polling RPCs as seen by the pollers.
#[async_trait]
pub trait QuizTransport: Send + Sync {
    async fn get_announcements(&self, quiz_id: i64, lasttime: i64) -> ClientResult<AnnouncementsDelta>;
    async fn get_student_status(&self, quiz_id: i64) -> ClientResult<StudentStatusReport>;
}

/// Talks to a quizcast server over HTTP with a session cookie.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    session: RwLock<Option<String>>,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session: RwLock::new(None),
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> ClientResult<()> {
        let response = self
            .client
            .post(format!("{}/auth/login", self.base_url))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await?;
        let response = check_status(response).await?;

        let token = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| cookie::Cookie::parse(value.to_string()).ok())
            .find(|c| c.name() == SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .ok_or_else(|| ClientError::Decode("Login response carried no session cookie".to_string()))?;

        *self.session.write().await = Some(token);
        tracing::debug!(%username, "Logged in");
        Ok(())
    }

    pub async fn start_attempt(&self, quiz_id: i64, review: bool) -> ClientResult<AttemptPage> {
        let url = format!("{}/api/quizzes/{}/attempt/start", self.base_url, quiz_id);
        let request = self.client.post(url).json(&serde_json::json!({ "review": review }));
        self.send_json(request).await
    }

    pub async fn finish_attempt(&self, quiz_id: i64) -> ClientResult<()> {
        let url = format!("{}/api/quizzes/{}/attempt/finish", self.base_url, quiz_id);
        let request = self.authorized(self.client.post(url)).await?;
        check_status(request.send().await?).await?;
        Ok(())
    }

    pub async fn monitor_page(&self, quiz_id: i64) -> ClientResult<MonitorPage> {
        let url = format!("{}/api/quizzes/{}/monitor", self.base_url, quiz_id);
        self.send_json(self.client.get(url)).await
    }

    async fn authorized(&self, request: reqwest::RequestBuilder) -> ClientResult<reqwest::RequestBuilder> {
        let session = self.session.read().await;
        let token = session.as_deref().ok_or(ClientError::NotLoggedIn)?;
        Ok(request.header(header::COOKIE, format!("{}={}", SESSION_COOKIE, token)))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> ClientResult<T> {
        let response = self.authorized(request).await?.send().await?;
        let response = check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

async fn check_status(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|body| body.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| status.to_string());

    Err(ClientError::Status { status: status.as_u16(), message })
}

#[async_trait]
impl QuizTransport for HttpTransport {
    async fn get_announcements(&self, quiz_id: i64, lasttime: i64) -> ClientResult<AnnouncementsDelta> {
        let query = serde_urlencoded::to_string([("lasttime", lasttime)])
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        let url = format!("{}/api/quizzes/{}/announcements/poll?{}", self.base_url, quiz_id, query);
        self.send_json(self.client.get(url)).await
    }

    async fn get_student_status(&self, quiz_id: i64) -> ClientResult<StudentStatusReport> {
        let url = format!("{}/api/quizzes/{}/status", self.base_url, quiz_id);
        self.send_json(self.client.get(url)).await
    }
}
