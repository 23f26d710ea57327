//! Remote query execution against a SearXNG instance.

pub mod searxng;

pub use searxng::{ClientOptions, EngineInfo, HttpMethod, SearxngClient};

use crate::query::QueryContext;
use crate::results::ResultPage;

/// Search backend abstraction. The session issues every network call
/// through this seam; request construction is the implementor's concern,
/// but every `QueryContext` field must be honored when present.
#[async_trait::async_trait]
pub trait SearchClient: Send + Sync {
    async fn execute(&self, context: &QueryContext) -> Result<ResultPage, SearchError>;
}

/// Failures the session must distinguish. None of these are retried
/// internally; the operator re-issues the command.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("rate limited by the instance (try again later): {0}")]
    RateLimited(String),

    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("response is not valid JSON; the instance may not have the json format enabled: {0}")]
    Decode(String),

    #[error("server returned HTTP {status}: {body}")]
    Server { status: u16, body: String },
}
