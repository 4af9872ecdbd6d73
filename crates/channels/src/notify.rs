//! Team chat notification sent once a batch finishes.

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::info;

#[async_trait]
pub trait ChatNotifier: Send + Sync {
    async fn notify(&self, text: &str) -> Result<()>;
}

/// Posts notifications to the service log.
pub struct LogNotifier {
    channel: String,
}

impl LogNotifier {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
        }
    }
}

impl Default for LogNotifier {
    fn default() -> Self {
        Self::new("#marketing-campaigns")
    }
}

#[async_trait]
impl ChatNotifier for LogNotifier {
    async fn notify(&self, text: &str) -> Result<()> {
        info!(channel = %self.channel, text = %text, "Chat notification posted");
        Ok(())
    }
}

/// Captures notifications for assertions.
#[derive(Default)]
pub struct CaptureNotifier {
    messages: Mutex<Vec<String>>,
}

impl CaptureNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

#[async_trait]
impl ChatNotifier for CaptureNotifier {
    async fn notify(&self, text: &str) -> Result<()> {
        self.messages.lock().push(text.to_string());
        Ok(())
    }
}
