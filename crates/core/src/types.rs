use crate::error::{CampaignError, CampaignResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use utoipa::ToSchema;

// ─── ERP input ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum OrderStatus {
    Completed,
    Pending,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct LineItem {
    pub sku: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl LineItem {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// ERP sales order as exported by the order source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Order {
    pub order_id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub order_date: DateTime<Utc>,
    pub total_amount: Decimal,
    #[serde(default)]
    pub items: Vec<LineItem>,
    pub status: OrderStatus,
}

impl Order {
    pub fn is_completed(&self) -> bool {
        self.status == OrderStatus::Completed
    }
}

/// Customer master data entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct CustomerRecord {
    pub customer_id: String,
    pub email: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub company_size: Option<String>,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

/// Placeholder email used when a customer has no directory entry.
pub const PLACEHOLDER_EMAIL: &str = "customer@example.com";
pub const DEFAULT_LANGUAGE: &str = "en";

/// Customer id → directory entry lookup.
#[derive(Debug, Clone, Default)]
pub struct CustomerDirectory {
    records: HashMap<String, CustomerRecord>,
}

impl CustomerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: CustomerRecord) {
        self.records.insert(record.customer_id.clone(), record);
    }

    pub fn get(&self, customer_id: &str) -> Option<&CustomerRecord> {
        self.records.get(customer_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<CustomerRecord> for CustomerDirectory {
    fn from_iter<I: IntoIterator<Item = CustomerRecord>>(iter: I) -> Self {
        let mut directory = Self::new();
        for record in iter {
            directory.insert(record);
        }
        directory
    }
}

// ─── Derived metrics and decisions ──────────────────────────────────────────

/// Behavioral metrics for a single high-value customer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct CustomerMetrics {
    pub customer_id: String,
    pub customer_name: String,
    pub email: String,
    pub language: String,
    pub total_spend: Decimal,
    pub order_count: u32,
    pub avg_order_value: Decimal,
    pub last_purchase_date: DateTime<Utc>,
    pub days_since_purchase: i64,
    /// Completed orders per 30-day window, two decimal places.
    pub purchase_frequency: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, ToSchema)]
pub enum Segment {
    #[serde(rename = "VIP")]
    Vip,
    Growth,
    #[serde(rename = "At-Risk")]
    AtRisk,
    Churned,
    New,
    Default,
}

impl Segment {
    pub const ALL: [Segment; 6] = [
        Segment::Vip,
        Segment::Growth,
        Segment::AtRisk,
        Segment::Churned,
        Segment::New,
        Segment::Default,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Vip => "VIP",
            Segment::Growth => "Growth",
            Segment::AtRisk => "At-Risk",
            Segment::Churned => "Churned",
            Segment::New => "New",
            Segment::Default => "Default",
        }
    }

    pub fn is_high_value(&self) -> bool {
        matches!(self, Segment::Vip | Segment::Growth)
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Segment chosen for a customer together with the matching rule's rationale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct SegmentAssignment {
    pub segment: Segment,
    pub confidence: f64,
    pub reasoning: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CampaignPath {
    PremiumCampaign,
    ReengagementCampaign,
    OnboardingCampaign,
    WinbackCampaign,
    SpecialOfferCampaign,
    StandardCampaign,
}

impl CampaignPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignPath::PremiumCampaign => "premium_campaign",
            CampaignPath::ReengagementCampaign => "reengagement_campaign",
            CampaignPath::OnboardingCampaign => "onboarding_campaign",
            CampaignPath::WinbackCampaign => "winback_campaign",
            CampaignPath::SpecialOfferCampaign => "special_offer_campaign",
            CampaignPath::StandardCampaign => "standard_campaign",
        }
    }
}

impl std::fmt::Display for CampaignPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Campaign content and delivery ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct EmailVariant {
    pub subject: String,
    pub body: String,
}

/// Rendered campaign produced by the content generator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct CampaignContent {
    pub subject_lines: Vec<String>,
    pub body_text: String,
    pub cta: String,
    pub template_id: String,
    pub variant_a: EmailVariant,
    pub variant_b: EmailVariant,
    pub recommended_products: Vec<String>,
}

/// Per-customer delivery result reported back by the delivery connectors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct CampaignOutcome {
    pub customer_id: String,
    pub email: String,
    pub segment: Segment,
    #[serde(rename = "sent")]
    pub delivered: bool,
    #[serde(rename = "gmail_id")]
    pub message_id: Option<String>,
    pub crm_logged: bool,
}

impl CampaignOutcome {
    /// Outcome recorded when content generation or delivery failed.
    pub fn failed(metrics: &CustomerMetrics, segment: Segment) -> Self {
        Self {
            customer_id: metrics.customer_id.clone(),
            email: metrics.email.clone(),
            segment,
            delivered: false,
            message_id: None,
            crm_logged: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct AnalyticsReport {
    pub total_processed: u32,
    pub segments: BTreeMap<String, u32>,
    pub emails_sent: u32,
    pub high_value_count: u32,
    pub estimated_roi: String,
}

impl AnalyticsReport {
    pub fn empty() -> Self {
        Self {
            total_processed: 0,
            segments: BTreeMap::new(),
            emails_sent: 0,
            high_value_count: 0,
            estimated_roi: "0%".to_string(),
        }
    }
}

/// Entry in the bounded campaign memory log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct MemoryEntry {
    pub recorded_at: DateTime<Utc>,
    pub summary: String,
}

// ─── Batch trigger contract ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    #[default]
    TestSample,
    FullRun,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CampaignRunRequest {
    #[serde(default)]
    pub mode: RunMode,
    #[serde(default = "default_customer_count")]
    pub customer_count: u32,
    #[serde(default)]
    pub enable_email: bool,
    #[serde(default)]
    pub enable_crm: bool,
    #[serde(default)]
    pub enable_slack: bool,
}

fn default_customer_count() -> u32 {
    100
}

impl Default for CampaignRunRequest {
    fn default() -> Self {
        Self {
            mode: RunMode::default(),
            customer_count: default_customer_count(),
            enable_email: false,
            enable_crm: false,
            enable_slack: false,
        }
    }
}

impl CampaignRunRequest {
    /// Reject out-of-range parameters before any processing starts.
    pub fn validate(&self, min_count: u32, max_count: u32) -> CampaignResult<()> {
        if !(min_count..=max_count).contains(&self.customer_count) {
            return Err(CampaignError::InvalidInput(format!(
                "customer_count must be between {} and {}, got {}",
                min_count, max_count, self.customer_count
            )));
        }
        Ok(())
    }

    /// Number of customers to pull from the order source.
    pub fn effective_customer_count(&self, sample_size: u32) -> u32 {
        match self.mode {
            RunMode::TestSample => sample_size,
            RunMode::FullRun => self.customer_count,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct WorkflowMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_orders_analyzed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customers_analyzed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_value_customers_found: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_value_found: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaigns_generated: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_success_rate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_entries: Option<u32>,
}

/// Full pipeline trace of the first processed customer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct SamplePreview {
    pub customer: CustomerMetrics,
    pub segment: SegmentAssignment,
    pub campaign: Option<CampaignContent>,
    pub routing_path: CampaignPath,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CampaignRunResponse {
    pub execution_summary: String,
    pub workflow_metrics: WorkflowMetrics,
    pub campaign_results: Vec<CampaignOutcome>,
    pub analytics: AnalyticsReport,
    pub campaign_memory: Vec<MemoryEntry>,
    pub sample_preview: Option<SamplePreview>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_wire_names() {
        let names: Vec<String> = Segment::ALL
            .iter()
            .map(|s| serde_json::to_string(s).unwrap())
            .collect();
        assert_eq!(
            names,
            vec![
                "\"VIP\"",
                "\"Growth\"",
                "\"At-Risk\"",
                "\"Churned\"",
                "\"New\"",
                "\"Default\""
            ]
        );
        for segment in Segment::ALL {
            assert_eq!(format!("\"{}\"", segment), serde_json::to_string(&segment).unwrap());
        }
    }

    #[test]
    fn test_high_value_segments() {
        let high: Vec<Segment> = Segment::ALL
            .iter()
            .copied()
            .filter(Segment::is_high_value)
            .collect();
        assert_eq!(high, vec![Segment::Vip, Segment::Growth]);
    }

    #[test]
    fn test_campaign_path_wire_names_match_display() {
        let path = CampaignPath::SpecialOfferCampaign;
        assert_eq!(serde_json::to_string(&path).unwrap(), "\"special_offer_campaign\"");
        assert_eq!(path.to_string(), "special_offer_campaign");
    }

    #[test]
    fn test_outcome_wire_field_names() {
        let outcome = CampaignOutcome {
            customer_id: "CUST-00001".into(),
            email: "customer2@techcorp.com".into(),
            segment: Segment::AtRisk,
            delivered: true,
            message_id: Some("dry-run-abc".into()),
            crm_logged: false,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["sent"], true);
        assert_eq!(json["gmail_id"], "dry-run-abc");
        assert_eq!(json["segment"], "At-Risk");
    }

    #[test]
    fn test_request_defaults_and_validation() {
        let request: CampaignRunRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.mode, RunMode::TestSample);
        assert_eq!(request.customer_count, 100);
        assert!(!request.enable_email);
        assert!(request.validate(10, 1000).is_ok());
        assert_eq!(request.effective_customer_count(5), 5);

        let too_small = CampaignRunRequest {
            customer_count: 9,
            ..Default::default()
        };
        assert!(matches!(
            too_small.validate(10, 1000),
            Err(CampaignError::InvalidInput(_))
        ));

        let too_large = CampaignRunRequest {
            mode: RunMode::FullRun,
            customer_count: 1001,
            ..Default::default()
        };
        assert!(too_large.validate(10, 1000).is_err());
    }

    #[test]
    fn test_full_run_uses_requested_count() {
        let request: CampaignRunRequest =
            serde_json::from_str(r#"{"mode":"full_run","customer_count":250}"#).unwrap();
        assert_eq!(request.effective_customer_count(5), 250);
    }

    #[test]
    fn test_directory_lookup() {
        let directory: CustomerDirectory = vec![CustomerRecord {
            customer_id: "CUST-00000".into(),
            email: "customer1@global.jp".into(),
            language: "ja".into(),
            industry: None,
            company_size: None,
        }]
        .into_iter()
        .collect();
        assert_eq!(directory.len(), 1);
        assert_eq!(directory.get("CUST-00000").unwrap().language, "ja");
        assert!(directory.get("CUST-99999").is_none());
    }

    #[test]
    fn test_empty_workflow_metrics_skip_unset_fields() {
        let metrics = WorkflowMetrics {
            customers_analyzed: Some(5),
            high_value_found: Some(0),
            ..Default::default()
        };
        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json, serde_json::json!({"customers_analyzed": 5, "high_value_found": 0}));
    }
}
