//! Campaign Express — ERP order intelligence to targeted campaigns.
//!
//! Serves the campaign API, or runs a single batch and prints the result.

use anyhow::Context;
use campaign_analytics::CampaignMemory;
use campaign_api::ApiServer;
use campaign_cdp::{OrderSource, StaticOrderSource, SyntheticOrderSource};
use campaign_core::config::AppConfig;
use campaign_core::types::{CampaignRunRequest, RunMode};
use campaign_workflow::{CampaignRunner, Connectors};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "campaign-express")]
#[command(about = "ERP order intelligence to targeted campaigns")]
#[command(version)]
struct Cli {
    /// Config file (TOML/YAML/JSON, extension optional)
    #[arg(long, env = "CAMPAIGN_EXPRESS_CONFIG")]
    config: Option<String>,

    /// Node identifier (overrides config)
    #[arg(long, env = "CAMPAIGN_EXPRESS__NODE_ID")]
    node_id: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "CAMPAIGN_EXPRESS__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Seed for synthetic orders (overrides config)
    #[arg(long, env = "CAMPAIGN_EXPRESS__PIPELINE__SYNTHETIC_SEED")]
    seed: Option<u64>,

    /// Read orders and customers from a JSON export instead of generating them
    #[arg(long)]
    orders: Option<String>,

    /// Run one full batch, print the response as JSON and exit
    #[arg(long, default_value_t = false)]
    once: bool,

    /// Customer count for `--once`
    #[arg(long, default_value_t = 100)]
    customer_count: u32,

    /// Actually hand emails to the transport during `--once`
    #[arg(long, default_value_t = false)]
    send: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "campaign_express=info,campaign_workflow=info,tower_http=info".into()
            }),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("Campaign Express starting up");

    let mut config = AppConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    if let Some(node_id) = cli.node_id {
        config.node_id = node_id;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if let Some(seed) = cli.seed {
        config.pipeline.synthetic_seed = Some(seed);
    }

    info!(
        node_id = %config.node_id,
        http_port = config.api.http_port,
        threshold = %config.pipeline.high_value_threshold,
        campaign_limit = config.pipeline.campaign_limit,
        seed = ?config.pipeline.synthetic_seed,
        "Configuration loaded"
    );

    let source: Arc<dyn OrderSource> = match &cli.orders {
        Some(path) => {
            let json = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read order export {}", path))?;
            Arc::new(StaticOrderSource::from_json(&json)?)
        }
        None => Arc::new(SyntheticOrderSource::new(config.pipeline.synthetic_seed)),
    };

    let memory = Arc::new(CampaignMemory::new(config.memory.capacity));
    let runner = Arc::new(CampaignRunner::new(
        &config,
        source,
        Connectors::default(),
        memory,
    ));

    if cli.once {
        let request = CampaignRunRequest {
            mode: RunMode::FullRun,
            customer_count: cli.customer_count,
            enable_email: cli.send,
            ..CampaignRunRequest::default()
        };
        let response = runner.run(&request).await?;
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    let api_server = ApiServer::new(config.clone(), runner);

    if let Err(e) = api_server.start_metrics().await {
        error!(error = %e, "Failed to start metrics exporter");
    }

    info!("Campaign Express is ready to serve traffic");

    api_server.start_http().await?;

    Ok(())
}
