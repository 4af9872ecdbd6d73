//! Campaign batch runner — validates a run request, pulls orders from the
//! source, runs the decision pipeline and fans delivery out to a bounded
//! set of tasks.

use crate::processor::{CustomerJob, CustomerProcessor, DeliveryFlags, ProcessedCustomer};
use campaign_analytics::calculator::delivery_success_rate;
use campaign_analytics::{AnalyticsCalculator, AnalyticsSink, CampaignMemory, MemorySink, TracingSink};
use campaign_cdp::OrderSource;
use campaign_channels::{
    ChatNotifier, ContentGenerator, CrmLogger, EmailConnector, EmailDelivery, InMemoryCrmLog,
    LogNotifier, TemplateContentGenerator,
};
use campaign_core::config::{AppConfig, PipelineConfig};
use campaign_core::error::{CampaignError, CampaignResult};
use campaign_core::types::{
    AnalyticsReport, CampaignOutcome, CampaignRunRequest, CampaignRunResponse, CustomerMetrics,
    SamplePreview, WorkflowMetrics,
};
use campaign_segmentation::{CustomerMetricsCalculator, RoutingEngine, SegmentationEngine};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

pub const NO_HIGH_VALUE_SUMMARY: &str = "No high-value customers found (>$10K annual spend)";

/// External collaborators the runner drives. `Default` wires the offline
/// implementations: template content, dry-run capable email, in-process
/// CRM log and log-based chat.
#[derive(Clone)]
pub struct Connectors {
    pub content: Arc<dyn ContentGenerator>,
    pub email: Arc<dyn EmailConnector>,
    pub crm: Arc<dyn CrmLogger>,
    pub chat: Arc<dyn ChatNotifier>,
}

impl Default for Connectors {
    fn default() -> Self {
        Self {
            content: Arc::new(TemplateContentGenerator::default()),
            email: Arc::new(EmailDelivery::default()),
            crm: Arc::new(InMemoryCrmLog::new()),
            chat: Arc::new(LogNotifier::default()),
        }
    }
}

pub struct CampaignRunner {
    pipeline: PipelineConfig,
    max_in_flight: usize,
    call_timeout: Duration,
    source: Arc<dyn OrderSource>,
    calculator: CustomerMetricsCalculator,
    segmentation: SegmentationEngine,
    routing: RoutingEngine,
    processor: Arc<CustomerProcessor>,
    analytics: AnalyticsCalculator,
    sinks: Vec<Arc<dyn AnalyticsSink>>,
    memory: Arc<CampaignMemory>,
    chat: Arc<dyn ChatNotifier>,
}

impl CampaignRunner {
    pub fn new(
        config: &AppConfig,
        source: Arc<dyn OrderSource>,
        connectors: Connectors,
        memory: Arc<CampaignMemory>,
    ) -> Self {
        let call_timeout = Duration::from_millis(config.delivery.call_timeout_ms);
        let processor = Arc::new(CustomerProcessor::new(
            connectors.content,
            connectors.email,
            connectors.crm,
            call_timeout,
        ));
        let sinks: Vec<Arc<dyn AnalyticsSink>> = vec![
            Arc::new(TracingSink),
            Arc::new(MemorySink::new(memory.clone())),
        ];

        Self {
            pipeline: config.pipeline.clone(),
            max_in_flight: config.delivery.max_in_flight.max(1),
            call_timeout,
            source,
            calculator: CustomerMetricsCalculator::new(config.pipeline.high_value_threshold),
            segmentation: SegmentationEngine::new(),
            routing: RoutingEngine::new(),
            processor,
            analytics: AnalyticsCalculator::from_config(&config.analytics),
            sinks,
            memory,
            chat: connectors.chat,
        }
    }

    pub fn memory(&self) -> Arc<CampaignMemory> {
        self.memory.clone()
    }

    pub async fn run(&self, request: &CampaignRunRequest) -> CampaignResult<CampaignRunResponse> {
        self.run_at(request, Utc::now()).await
    }

    /// Run one batch with recency measured against `evaluated_at`.
    pub async fn run_at(
        &self,
        request: &CampaignRunRequest,
        evaluated_at: DateTime<Utc>,
    ) -> CampaignResult<CampaignRunResponse> {
        request.validate(
            self.pipeline.min_customer_count,
            self.pipeline.max_customer_count,
        )?;

        let start = Instant::now();
        let customer_count = request.effective_customer_count(self.pipeline.sample_size);
        metrics::counter!("campaign.runs").increment(1);
        info!(
            mode = ?request.mode,
            customer_count,
            source = self.source.name(),
            "Starting campaign run"
        );

        let batch = self.source.fetch(customer_count, evaluated_at).await.map_err(|e| {
            CampaignError::DataSource(format!("{}: {:#}", self.source.name(), e))
        })?;

        let customers =
            self.calculator
                .compute_from_orders(&batch.orders, &batch.directory, evaluated_at);

        if customers.is_empty() {
            info!(customer_count, "No high-value customers in batch");
            return Ok(empty_response(customer_count));
        }

        let jobs = self.plan(&customers);
        let flags = DeliveryFlags {
            send_email: request.enable_email,
            log_crm: request.enable_crm,
        };
        let processed = self.deliver(&jobs, flags).await;
        metrics::counter!("campaign.customers_processed").increment(jobs.len() as u64);

        let outcomes: Vec<CampaignOutcome> = processed.iter().map(|p| p.outcome.clone()).collect();
        let report = self.analytics.calculate(&outcomes, &customers);
        for sink in &self.sinks {
            sink.record(&report, evaluated_at);
        }

        let summary = execution_summary(customers.len(), &outcomes, &report);
        if request.enable_slack {
            self.notify(&summary).await;
        }

        let sample_preview = jobs.first().zip(processed.first()).map(|(job, done)| SamplePreview {
            customer: job.metrics.clone(),
            segment: job.assignment.clone(),
            campaign: done.content.clone(),
            routing_path: job.path,
        });

        let workflow_metrics = WorkflowMetrics {
            total_orders_analyzed: Some(batch.orders.len() as u32),
            high_value_customers_found: Some(customers.len() as u32),
            campaigns_generated: Some(outcomes.len() as u32),
            delivery_success_rate: Some(delivery_success_rate(&outcomes)),
            memory_entries: Some(self.memory.len() as u32),
            ..WorkflowMetrics::default()
        };

        metrics::histogram!("campaign.run_duration_ms")
            .record(start.elapsed().as_secs_f64() * 1000.0);
        info!(
            processed = outcomes.len(),
            emails_sent = report.emails_sent,
            roi = %report.estimated_roi,
            "Campaign run complete"
        );

        Ok(CampaignRunResponse {
            execution_summary: summary,
            workflow_metrics,
            campaign_results: outcomes,
            analytics: report,
            campaign_memory: self.memory.recent(self.memory.capacity()),
            sample_preview,
        })
    }

    /// Segment and route the first `campaign_limit` customers.
    fn plan(&self, customers: &[CustomerMetrics]) -> Vec<CustomerJob> {
        customers
            .iter()
            .take(self.pipeline.campaign_limit)
            .map(|metrics| {
                let assignment = self.segmentation.evaluate(metrics);
                let path = self.routing.route(assignment.segment, metrics);
                info!(
                    customer_id = %metrics.customer_id,
                    segment = %assignment.segment,
                    path = %path,
                    "Customer routed"
                );
                CustomerJob {
                    metrics: metrics.clone(),
                    assignment,
                    path,
                }
            })
            .collect()
    }

    /// Process every job with at most `max_in_flight` running at once.
    /// Results come back in job order; a task that dies yields a failed
    /// outcome for its customer.
    async fn deliver(&self, jobs: &[CustomerJob], flags: DeliveryFlags) -> Vec<ProcessedCustomer> {
        let permits = Arc::new(Semaphore::new(self.max_in_flight));
        let mut tasks = JoinSet::new();

        for (idx, job) in jobs.iter().cloned().enumerate() {
            let permits = permits.clone();
            let processor = self.processor.clone();
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                (idx, processor.process(&job, flags).await)
            });
        }

        let mut slots: Vec<Option<ProcessedCustomer>> = vec![None; jobs.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, processed)) => slots[idx] = Some(processed),
                Err(e) => {
                    metrics::counter!("campaign.delivery_failures").increment(1);
                    error!(error = %e, "Customer task aborted");
                }
            }
        }

        slots
            .into_iter()
            .zip(jobs)
            .map(|(slot, job)| {
                slot.unwrap_or_else(|| ProcessedCustomer {
                    outcome: CampaignOutcome::failed(&job.metrics, job.assignment.segment),
                    content: None,
                })
            })
            .collect()
    }

    async fn notify(&self, summary: &str) {
        match tokio::time::timeout(self.call_timeout, self.chat.notify(summary)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "Chat notification failed"),
            Err(_) => warn!(
                timeout_ms = self.call_timeout.as_millis() as u64,
                "Chat notification timed out"
            ),
        }
    }
}

fn execution_summary(
    high_value: usize,
    outcomes: &[CampaignOutcome],
    report: &AnalyticsReport,
) -> String {
    let segments: BTreeSet<_> = outcomes.iter().map(|o| o.segment).collect();
    format!(
        "Processed {} high-value customers across {} segments. Estimated ROI: {}",
        high_value,
        segments.len(),
        report.estimated_roi
    )
}

fn empty_response(customers_analyzed: u32) -> CampaignRunResponse {
    CampaignRunResponse {
        execution_summary: NO_HIGH_VALUE_SUMMARY.to_string(),
        workflow_metrics: WorkflowMetrics {
            customers_analyzed: Some(customers_analyzed),
            high_value_found: Some(0),
            ..WorkflowMetrics::default()
        },
        campaign_results: Vec::new(),
        analytics: AnalyticsReport::empty(),
        campaign_memory: Vec::new(),
        sample_preview: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_core::types::Segment;

    #[test]
    fn test_execution_summary_counts_distinct_segments() {
        let outcome = |id: &str, segment| CampaignOutcome {
            customer_id: id.into(),
            email: format!("{}@example.com", id),
            segment,
            delivered: true,
            message_id: None,
            crm_logged: false,
        };
        let outcomes = vec![
            outcome("a", Segment::Vip),
            outcome("b", Segment::Vip),
            outcome("c", Segment::Churned),
        ];
        let report = AnalyticsReport {
            estimated_roi: "512.0%".into(),
            ..AnalyticsReport::empty()
        };

        assert_eq!(
            execution_summary(12, &outcomes, &report),
            "Processed 12 high-value customers across 2 segments. Estimated ROI: 512.0%"
        );
    }

    #[test]
    fn test_empty_response_shape() {
        let response = empty_response(5);
        assert_eq!(response.execution_summary, NO_HIGH_VALUE_SUMMARY);
        assert_eq!(response.analytics.estimated_roi, "0%");
        assert!(response.campaign_results.is_empty());

        let json = serde_json::to_value(&response.workflow_metrics).unwrap();
        assert_eq!(json, serde_json::json!({"customers_analyzed": 5, "high_value_found": 0}));
    }
}
