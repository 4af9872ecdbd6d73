//! Email delivery with dry-run support.
//!
//! Dry runs never reach a transport; they return a message id derived from
//! the recipient address so repeated runs produce identical results.

use anyhow::Result;
use async_trait::async_trait;
use campaign_core::types::CampaignContent;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, info};

#[async_trait]
pub trait EmailConnector: Send + Sync {
    /// Deliver `content` to `to`, or simulate it when `actually_send` is false.
    /// Returns the provider message id.
    async fn send(&self, to: &str, content: &CampaignContent, actually_send: bool)
        -> Result<String>;
}

/// A fully rendered message ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub body: String,
    pub template_id: String,
}

#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn deliver(&self, message: &OutboundEmail) -> Result<String>;
}

/// Transport that records the hand-off in the log and assigns an id.
pub struct LoggingTransport;

#[async_trait]
impl EmailTransport for LoggingTransport {
    async fn deliver(&self, message: &OutboundEmail) -> Result<String> {
        let message_id = format!("msg-{}", uuid::Uuid::new_v4());
        info!(
            to = %message.to,
            subject = %message.subject,
            template = %message.template_id,
            message_id = %message_id,
            "Email handed to transport"
        );
        Ok(message_id)
    }
}

pub struct EmailDelivery {
    from_address: String,
    transport: Arc<dyn EmailTransport>,
}

impl EmailDelivery {
    pub fn new(from_address: impl Into<String>, transport: Arc<dyn EmailTransport>) -> Self {
        Self {
            from_address: from_address.into(),
            transport,
        }
    }

    fn render(&self, to: &str, content: &CampaignContent) -> OutboundEmail {
        OutboundEmail {
            to: to.to_string(),
            from: self.from_address.clone(),
            subject: content.variant_a.subject.clone(),
            body: content.variant_a.body.clone(),
            template_id: content.template_id.clone(),
        }
    }
}

impl Default for EmailDelivery {
    fn default() -> Self {
        Self::new("campaigns@campaignexpress.io", Arc::new(LoggingTransport))
    }
}

#[async_trait]
impl EmailConnector for EmailDelivery {
    async fn send(
        &self,
        to: &str,
        content: &CampaignContent,
        actually_send: bool,
    ) -> Result<String> {
        if !actually_send {
            debug!(to = %to, "[DRY RUN] Email delivery skipped");
            metrics::counter!("email.dry_run").increment(1);
            return Ok(dry_run_message_id(to));
        }

        let message = self.render(to, content);
        let message_id = self.transport.deliver(&message).await?;
        metrics::counter!("email.sent").increment(1);
        Ok(message_id)
    }
}

/// `dry-run-` followed by the first 12 hex digits of SHA-256(recipient).
pub fn dry_run_message_id(recipient: &str) -> String {
    let digest = Sha256::digest(recipient.as_bytes());
    let hex = hex::encode(digest);
    format!("dry-run-{}", &hex[..12])
}
