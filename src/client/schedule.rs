use std::{ops::ControlFlow, time::Duration};

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// One unit of polling work.
#[async_trait]
pub trait Tick: Send + 'static {
    async fn tick(&mut self) -> ControlFlow<()>;
}

/// A self-rescheduling loop: wait `delay`, run one tick to completion, repeat.
///
/// The next wait starts only after the previous tick settles, so at most one
/// tick is ever in flight. Cancelling the token aborts a pending wait and
/// prevents any further tick; a tick already running is allowed to finish.
pub struct PollLoop {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl PollLoop {
    pub fn spawn<T: Tick>(delay: Duration, token: CancellationToken, mut task: T) -> Self {
        let cancelled = token.clone();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = tokio::time::sleep(delay) => {}
                }

                if task.tick().await.is_break() {
                    tracing::debug!("Poll loop finished");
                    break;
                }

                if cancelled.is_cancelled() {
                    break;
                }
            }
        });

        Self { token, handle: Some(handle) }
    }

    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Waits for the loop task to exit.
    pub async fn stopped(mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::error!("Poll loop task failed: {}", e);
            }
        }
    }
}

impl Drop for PollLoop {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
