use async_trait::async_trait;
use thiserror::Error;

use medquote_core::domain::quote::{AnalysisResult, QuoteId, QuotePayload, StoredQuote};

pub mod memory;
pub mod sql;

pub use memory::InMemoryQuoteStore;
pub use sql::SqlQuoteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("quote `{0}` not found")]
    NotFound(QuoteId),
}

/// Persistence contract for quote records.
///
/// `save_quote` and `update_quote_with_ai` are deliberately separate calls
/// with no transaction spanning them: a quote that was saved but never
/// updated stays in `pending_analysis` and can be re-analyzed later.
#[async_trait]
pub trait QuoteStore: Send + Sync {
    /// Persists the raw payload and assigns a fresh identifier.
    async fn save_quote(&self, payload: &QuotePayload) -> Result<QuoteId, StoreError>;

    /// Merges the analysis result into an existing record and marks it
    /// `analyzed`. Unknown ids are an error, not a silent no-op.
    async fn update_quote_with_ai(
        &self,
        id: &QuoteId,
        result: &AnalysisResult,
    ) -> Result<(), StoreError>;

    async fn find_quote(&self, id: &QuoteId) -> Result<Option<StoredQuote>, StoreError>;
}
