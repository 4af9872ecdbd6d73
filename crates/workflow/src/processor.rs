//! Per-customer campaign processing: content generation, email delivery and
//! CRM logging for one segmented customer.

use campaign_channels::{ContentGenerator, CrmLogger, EmailConnector};
use campaign_core::error::{CampaignError, CampaignResult};
use campaign_core::types::{
    CampaignContent, CampaignOutcome, CampaignPath, CustomerMetrics, SegmentAssignment,
};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Delivery toggles copied from the batch request.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeliveryFlags {
    pub send_email: bool,
    pub log_crm: bool,
}

/// A customer ready for delivery: metrics plus the decisions made about it.
#[derive(Debug, Clone)]
pub struct CustomerJob {
    pub metrics: CustomerMetrics,
    pub assignment: SegmentAssignment,
    pub path: CampaignPath,
}

/// What one customer produced. `content` is `None` when generation failed.
#[derive(Debug, Clone)]
pub struct ProcessedCustomer {
    pub outcome: CampaignOutcome,
    pub content: Option<CampaignContent>,
}

pub struct CustomerProcessor {
    content: Arc<dyn ContentGenerator>,
    email: Arc<dyn EmailConnector>,
    crm: Arc<dyn CrmLogger>,
    call_timeout: Duration,
}

impl CustomerProcessor {
    pub fn new(
        content: Arc<dyn ContentGenerator>,
        email: Arc<dyn EmailConnector>,
        crm: Arc<dyn CrmLogger>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            content,
            email,
            crm,
            call_timeout,
        }
    }

    /// Never fails: any error becomes a non-delivered outcome for this
    /// customer alone.
    pub async fn process(&self, job: &CustomerJob, flags: DeliveryFlags) -> ProcessedCustomer {
        let start = Instant::now();

        let content = match self
            .call(
                self.content.name(),
                self.content.generate(&job.metrics, &job.assignment),
            )
            .await
        {
            Ok(content) => content,
            Err(e) => {
                self.record_failure(job, &e);
                return ProcessedCustomer {
                    outcome: CampaignOutcome::failed(&job.metrics, job.assignment.segment),
                    content: None,
                };
            }
        };

        let message_id = match self
            .call(
                "email",
                self.email.send(&job.metrics.email, &content, flags.send_email),
            )
            .await
        {
            Ok(id) => id,
            Err(e) => {
                self.record_failure(job, &e);
                return ProcessedCustomer {
                    outcome: CampaignOutcome::failed(&job.metrics, job.assignment.segment),
                    content: Some(content),
                };
            }
        };

        let mut outcome = CampaignOutcome {
            customer_id: job.metrics.customer_id.clone(),
            email: job.metrics.email.clone(),
            segment: job.assignment.segment,
            delivered: true,
            message_id: Some(message_id),
            crm_logged: false,
        };

        if flags.log_crm {
            match self.call("crm", self.crm.log(&outcome)).await {
                Ok(()) => outcome.crm_logged = true,
                Err(e) => {
                    metrics::counter!("campaign.crm_failures").increment(1);
                    warn!(
                        customer_id = %outcome.customer_id,
                        error = %e,
                        "CRM log failed, delivery kept"
                    );
                }
            }
        }

        metrics::histogram!("campaign.delivery_latency_ms")
            .record(start.elapsed().as_secs_f64() * 1000.0);
        info!(
            customer_id = %outcome.customer_id,
            segment = %outcome.segment,
            path = %job.path,
            generator = self.content.name(),
            dry_run = !flags.send_email,
            crm_logged = outcome.crm_logged,
            "Campaign delivered"
        );

        ProcessedCustomer {
            outcome,
            content: Some(content),
        }
    }

    async fn call<T, F>(&self, service: &'static str, fut: F) -> CampaignResult<T>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        match tokio::time::timeout(self.call_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(CampaignError::external(service, e.to_string())),
            Err(_) => Err(CampaignError::Timeout(
                service.to_string(),
                self.call_timeout.as_millis() as u64,
            )),
        }
    }

    fn record_failure(&self, job: &CustomerJob, error: &CampaignError) {
        metrics::counter!("campaign.delivery_failures").increment(1);
        warn!(
            customer_id = %job.metrics.customer_id,
            segment = %job.assignment.segment,
            recoverable = error.is_recoverable(),
            error = %error,
            "Customer campaign failed"
        );
    }
}
