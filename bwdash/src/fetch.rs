//! HTTP retrieval of the two published documents.

use crate::types::{HistoryDoc, StatusDoc};

/// Poll-level failure taxonomy. Both variants count toward the poller's
/// consecutive-failure counter; entity-level validation gaps do not reach
/// this type (they degrade the affected row instead).
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("parse failure: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Where documents come from. Trait seam so the poller can be driven by a
/// scripted source in tests, without timers or a network.
pub trait DocumentSource {
    fn fetch_status(&self) -> impl std::future::Future<Output = Result<StatusDoc, FetchError>> + Send;
    fn fetch_history(&self) -> impl std::future::Future<Output = Result<HistoryDoc, FetchError>> + Send;
}

pub struct HttpSource {
    client: reqwest::Client,
    status_url: String,
    history_url: String,
}

impl HttpSource {
    pub fn new(status_url: String, history_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            status_url,
            history_url,
        }
    }

    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let resp = self.client.get(url).send().await?.error_for_status()?;
        Ok(resp.text().await?)
    }
}

impl DocumentSource for HttpSource {
    async fn fetch_status(&self) -> Result<StatusDoc, FetchError> {
        let body = self.fetch_text(&self.status_url).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn fetch_history(&self) -> Result<HistoryDoc, FetchError> {
        let body = self.fetch_text(&self.history_url).await?;
        Ok(serde_json::from_str(&body)?)
    }
}
