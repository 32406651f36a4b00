use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use uuid::Uuid;

use medquote_core::domain::quote::{
    AnalysisResult, QuoteId, QuotePayload, QuoteStatus, StoredQuote,
};

use super::{QuoteStore, StoreError};

/// Map-backed store for handler tests, matching the SQL implementation's
/// observable behavior (fresh ids, pending/analyzed transitions, NotFound on
/// updates to unknown ids).
#[derive(Default)]
pub struct InMemoryQuoteStore {
    records: Mutex<HashMap<String, StoredQuote>>,
}

impl InMemoryQuoteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl QuoteStore for InMemoryQuoteStore {
    async fn save_quote(&self, payload: &QuotePayload) -> Result<QuoteId, StoreError> {
        let id = QuoteId(Uuid::new_v4().to_string());
        let now = Utc::now();

        let mut records = self.records.lock().expect("store lock poisoned");
        records.insert(
            id.0.clone(),
            StoredQuote {
                quote_id: id.clone(),
                status: QuoteStatus::PendingAnalysis,
                payload: payload.clone(),
                ai_analysis: None,
                created_at: now,
                updated_at: now,
            },
        );

        Ok(id)
    }

    async fn update_quote_with_ai(
        &self,
        id: &QuoteId,
        result: &AnalysisResult,
    ) -> Result<(), StoreError> {
        let mut records = self.records.lock().expect("store lock poisoned");
        let record = records.get_mut(&id.0).ok_or_else(|| StoreError::NotFound(id.clone()))?;

        record.ai_analysis = Some(result.clone());
        record.status = QuoteStatus::Analyzed;
        record.updated_at = Utc::now();

        Ok(())
    }

    async fn find_quote(&self, id: &QuoteId) -> Result<Option<StoredQuote>, StoreError> {
        let records = self.records.lock().expect("store lock poisoned");
        Ok(records.get(&id.0).cloned())
    }
}
