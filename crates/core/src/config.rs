use rust_decimal::Decimal;
use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `CAMPAIGN_EXPRESS__` and an optional TOML config file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Minimum total spend for a customer to enter segmentation.
    #[serde(default = "default_high_value_threshold")]
    pub high_value_threshold: Decimal,
    /// Maximum number of customers sent through content + delivery per run.
    #[serde(default = "default_campaign_limit")]
    pub campaign_limit: usize,
    /// Customer count used by `test_sample` mode.
    #[serde(default = "default_sample_size")]
    pub sample_size: u32,
    #[serde(default = "default_min_customer_count")]
    pub min_customer_count: u32,
    #[serde(default = "default_max_customer_count")]
    pub max_customer_count: u32,
    /// Seed for the synthetic order source. `None` seeds from entropy.
    #[serde(default)]
    pub synthetic_seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_conversion_rate")]
    pub conversion_rate: Decimal,
    #[serde(default = "default_cost_per_send")]
    pub cost_per_send: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryConfig {
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_memory_capacity")]
    pub capacity: usize,
}

// Default functions
fn default_node_id() -> String {
    "node-01".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_metrics_port() -> u16 {
    9091
}
fn default_high_value_threshold() -> Decimal {
    Decimal::new(10_000, 0)
}
fn default_campaign_limit() -> usize {
    10
}
fn default_sample_size() -> u32 {
    5
}
fn default_min_customer_count() -> u32 {
    10
}
fn default_max_customer_count() -> u32 {
    1000
}
fn default_conversion_rate() -> Decimal {
    Decimal::new(15, 2)
}
fn default_cost_per_send() -> Decimal {
    Decimal::new(50, 2)
}
fn default_max_in_flight() -> usize {
    8
}
fn default_call_timeout_ms() -> u64 {
    5000
}
fn default_memory_capacity() -> usize {
    50
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            port: default_metrics_port(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            high_value_threshold: default_high_value_threshold(),
            campaign_limit: default_campaign_limit(),
            sample_size: default_sample_size(),
            min_customer_count: default_min_customer_count(),
            max_customer_count: default_max_customer_count(),
            synthetic_seed: None,
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            conversion_rate: default_conversion_rate(),
            cost_per_send: default_cost_per_send(),
        }
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            max_in_flight: default_max_in_flight(),
            call_timeout_ms: default_call_timeout_ms(),
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_memory_capacity(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            api: ApiConfig::default(),
            metrics: MetricsConfig::default(),
            pipeline: PipelineConfig::default(),
            analytics: AnalyticsConfig::default(),
            delivery: DeliveryConfig::default(),
            memory: MemoryConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and an optional config file.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        let builder = builder.add_source(
            config::Environment::with_prefix("CAMPAIGN_EXPRESS")
                .separator("__")
                .try_parsing(true)
                .list_separator(","),
        );

        let config = builder.build()?;
        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        let p = &self.pipeline;
        if p.min_customer_count > p.max_customer_count {
            return Err(config::ConfigError::Message(format!(
                "pipeline.min_customer_count ({}) exceeds max_customer_count ({})",
                p.min_customer_count, p.max_customer_count
            )));
        }
        if self.delivery.max_in_flight == 0 {
            return Err(config::ConfigError::Message(
                "delivery.max_in_flight must be at least 1".to_string(),
            ));
        }
        if self.memory.capacity == 0 {
            return Err(config::ConfigError::Message(
                "memory.capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
