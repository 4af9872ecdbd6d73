//! OpenAPI document and Swagger UI configuration.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Campaign Express API",
        version = "0.1.0",
        description = "ERP order intelligence to targeted campaigns.\n\nAggregates customer orders, segments high-value customers, routes them to campaign paths and reports ROI.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Campaigns", description = "Campaign batch runs"),
        (name = "Operations", description = "Health, readiness, and liveness probes"),
    ),
    paths(
        crate::rest::handle_run_campaign,
        crate::rest::health_check,
        crate::rest::readiness,
        crate::rest::liveness,
    ),
    components(schemas(
        campaign_core::types::RunMode,
        campaign_core::types::CampaignRunRequest,
        campaign_core::types::CampaignRunResponse,
        campaign_core::types::WorkflowMetrics,
        campaign_core::types::CampaignOutcome,
        campaign_core::types::AnalyticsReport,
        campaign_core::types::MemoryEntry,
        campaign_core::types::SamplePreview,
        campaign_core::types::CustomerMetrics,
        campaign_core::types::Segment,
        campaign_core::types::SegmentAssignment,
        campaign_core::types::CampaignPath,
        campaign_core::types::CampaignContent,
        campaign_core::types::EmailVariant,
        crate::rest::ErrorResponse,
        crate::rest::HealthResponse,
    ))
)]
pub struct ApiDoc;
