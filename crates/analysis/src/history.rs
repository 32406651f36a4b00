use anyhow::Result;
use async_trait::async_trait;

use medquote_core::domain::quote::HistoricalContext;

/// Source of the aggregate win/loss statistics sent with every analysis
/// request. Injected so the handler does not care where the numbers come
/// from.
#[async_trait]
pub trait HistoricalContextProvider: Send + Sync {
    async fn historical_context(&self) -> Result<HistoricalContext>;
}

/// Placeholder aggregates. The real figures should eventually be computed
/// from stored quote history; until then these match what the sales team has
/// been operating with.
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticHistoricalContextProvider;

#[async_trait]
impl HistoricalContextProvider for StaticHistoricalContextProvider {
    async fn historical_context(&self) -> Result<HistoricalContext> {
        Ok(HistoricalContext {
            avg_winning_price: 100_000.0,
            similar_quotes_won: 12,
            similar_quotes_lost: 3,
        })
    }
}
