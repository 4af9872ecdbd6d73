use thiserror::Error;

pub type CampaignResult<T> = Result<T, CampaignError>;

#[derive(Error, Debug)]
pub enum CampaignError {
    #[error("Invalid campaign request: {0}")]
    InvalidInput(String),

    #[error("No directory entry for customer {0}")]
    DataGap(String),

    #[error("Order source error: {0}")]
    DataSource(String),

    #[error("External service error ({service}): {message}")]
    ExternalService { service: String, message: String },

    #[error("External call to {0} timed out after {1} ms")]
    Timeout(String, u64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl CampaignError {
    pub fn external(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Per-customer failures that must not abort the batch.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CampaignError::DataGap(_)
                | CampaignError::ExternalService { .. }
                | CampaignError::Timeout(..)
        )
    }
}
