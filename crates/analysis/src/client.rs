use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::warn;

use medquote_core::config::AnalysisConfig;
use medquote_core::domain::quote::{AnalysisResult, HistoricalContext, QuoteData};

/// Remote quote-analysis seam. Infallible by contract: implementations
/// degrade to `AnalysisResult::unknown()` instead of surfacing failures.
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    async fn analyze(&self, quote: &QuoteData, context: &HistoricalContext) -> AnalysisResult;
}

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    quote: &'a QuoteData,
    historical_context: &'a HistoricalContext,
}

/// reqwest-backed client for the external analysis service. One POST per
/// call, bounded by the configured timeout, no retries.
pub struct HttpAnalysisClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAnalysisClient {
    pub fn new(config: &AnalysisConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        let endpoint = format!("{}/analyze-quote", config.base_url.trim_end_matches('/'));

        Ok(Self { client, endpoint })
    }

    async fn request(&self, body: &AnalyzeRequest<'_>) -> Result<AnalysisResult, reqwest::Error> {
        let response = self.client.post(&self.endpoint).json(body).send().await?;
        response.error_for_status()?.json::<AnalysisResult>().await
    }
}

#[async_trait]
impl AnalysisClient for HttpAnalysisClient {
    async fn analyze(&self, quote: &QuoteData, context: &HistoricalContext) -> AnalysisResult {
        let body = AnalyzeRequest { quote, historical_context: context };

        match self.request(&body).await {
            Ok(result) => result,
            Err(error) => {
                // Covers connect errors, timeouts, non-2xx statuses, and
                // unparseable bodies alike: the caller always gets a result.
                warn!(
                    event_name = "analysis.remote.failed",
                    endpoint = %self.endpoint,
                    error = %error,
                    "analysis service call failed, returning fallback result"
                );
                AnalysisResult::unknown()
            }
        }
    }
}
