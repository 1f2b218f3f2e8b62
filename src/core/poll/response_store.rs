use super::poll_models::PollResponse;
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Spreadsheet not found: {0}")]
    NotFound(String),
    #[error("Sheet schema mismatch: {0}")]
    Schema(String),
    #[error("Backing service error: {0}")]
    Backend(String),
}

/// Storage boundary for poll responses. The production implementation sits
/// on top of a Google Sheets worksheet; tests use an in-memory fake.
#[async_trait]
pub trait ResponseStore: Send + Sync {
    /// Every recorded response, in append (submission) order.
    async fn read_all(&self) -> Result<Vec<PollResponse>, StoreError>;

    /// Appends one response after all existing rows.
    async fn append(&self, response: &PollResponse) -> Result<(), StoreError>;
}
