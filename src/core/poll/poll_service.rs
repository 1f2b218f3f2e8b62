use std::time::Duration;

use chrono::Local;

use super::poll_models::{PollResponse, TIMESTAMP_FORMAT};
use super::read_cache::TtlCell;
use super::response_store::{ResponseStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("Please fill in your name and select an option.")]
    MissingField,
    #[error("A response from \"{0}\" has already been recorded.")]
    DuplicateName(String),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Domain service for the poll. Owns validation, the duplicate-name guard,
/// submission timestamps and the process-wide read cache over the backing
/// sheet.
pub struct PollService<S: ResponseStore> {
    store: S,
    cache: TtlCell<Vec<PollResponse>>,
}

impl<S: ResponseStore> PollService<S> {
    pub fn new(store: S, cache_ttl: Duration) -> Self {
        Self {
            store,
            cache: TtlCell::new(cache_ttl),
        }
    }

    /// Returns every recorded response in submission order. Reads go through
    /// a single shared cache entry, so one user's write refreshes the view
    /// for everyone.
    pub async fn fetch_all_responses(&self) -> Result<Vec<PollResponse>, PollError> {
        if let Some(cached) = self.cache.get().await {
            return Ok(cached);
        }

        let responses = self.store.read_all().await?;
        self.cache.put(responses.clone()).await;
        Ok(responses)
    }

    /// Records one submission. Rejected submissions never reach the sheet.
    pub async fn submit_response(
        &self,
        name: &str,
        selected_option: &str,
        comments: &str,
    ) -> Result<PollResponse, PollError> {
        let name = name.trim();
        let selected_option = selected_option.trim();
        if name.is_empty() || selected_option.is_empty() {
            return Err(PollError::MissingField);
        }

        let lowered = name.to_lowercase();
        let existing = self.fetch_all_responses().await?;
        if existing
            .iter()
            .any(|r| r.name.trim().to_lowercase() == lowered)
        {
            return Err(PollError::DuplicateName(name.to_string()));
        }

        // The duplicate check and the append are two separate calls and the
        // Sheets API has no conditional append, so two near-simultaneous
        // submissions under the same name can both land.
        let response = PollResponse {
            name: name.to_string(),
            selected_option: selected_option.to_string(),
            comments: comments.to_string(),
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        };
        self.store.append(&response).await?;
        self.cache.clear().await;

        Ok(response)
    }
}
