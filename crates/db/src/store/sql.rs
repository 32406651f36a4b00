use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use medquote_core::domain::quote::{
    AnalysisResult, QuoteId, QuotePayload, QuoteStatus, StoredQuote,
};

use super::{QuoteStore, StoreError};
use crate::DbPool;

pub struct SqlQuoteStore {
    pool: DbPool,
}

impl SqlQuoteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl QuoteStore for SqlQuoteStore {
    async fn save_quote(&self, payload: &QuotePayload) -> Result<QuoteId, StoreError> {
        let id = Uuid::new_v4().to_string();
        let payload_json = serde_json::to_string(payload)
            .map_err(|err| StoreError::Decode(format!("payload encoding failed: {err}")))?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO quote (id, status, payload, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(QuoteStatus::PendingAnalysis.as_str())
        .bind(&payload_json)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(QuoteId(id))
    }

    async fn update_quote_with_ai(
        &self,
        id: &QuoteId,
        result: &AnalysisResult,
    ) -> Result<(), StoreError> {
        let analysis_json = serde_json::to_string(result)
            .map_err(|err| StoreError::Decode(format!("analysis encoding failed: {err}")))?;

        let outcome = sqlx::query(
            "UPDATE quote SET ai_analysis = ?, status = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&analysis_json)
        .bind(QuoteStatus::Analyzed.as_str())
        .bind(Utc::now().to_rfc3339())
        .bind(&id.0)
        .execute(&self.pool)
        .await?;

        if outcome.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.clone()));
        }

        Ok(())
    }

    async fn find_quote(&self, id: &QuoteId) -> Result<Option<StoredQuote>, StoreError> {
        let row = sqlx::query(
            "SELECT status, payload, ai_analysis, created_at, updated_at FROM quote WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let status: String = row.get("status");
        let payload: String = row.get("payload");
        let ai_analysis: Option<String> = row.get("ai_analysis");
        let created_at: String = row.get("created_at");
        let updated_at: String = row.get("updated_at");

        Ok(Some(StoredQuote {
            quote_id: id.clone(),
            status: status
                .parse()
                .map_err(|err| StoreError::Decode(format!("bad status column: {err}")))?,
            payload: serde_json::from_str(&payload)
                .map_err(|err| StoreError::Decode(format!("bad payload column: {err}")))?,
            ai_analysis: ai_analysis
                .map(|raw| serde_json::from_str(&raw))
                .transpose()
                .map_err(|err| StoreError::Decode(format!("bad ai_analysis column: {err}")))?,
            created_at: decode_timestamp("created_at", &created_at)?,
            updated_at: decode_timestamp("updated_at", &updated_at)?,
        }))
    }
}

fn decode_timestamp(column: &str, raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|err| StoreError::Decode(format!("bad {column} column: {err}")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use medquote_core::domain::quote::{
        AnalysisResult, QuoteId, QuotePayload, QuoteStatus,
    };

    use super::SqlQuoteStore;
    use crate::store::{QuoteStore, StoreError};
    use crate::{connect_with_settings, migrations};

    async fn store() -> SqlQuoteStore {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        SqlQuoteStore::new(pool)
    }

    fn payload() -> QuotePayload {
        serde_json::from_value(json!({
            "deal_value": 50000,
            "hospital": "St. Mary",
            "instrument_category": "Imaging",
            "configuration_complexity": "high",
            "items": [{"item_id": "HP-001", "quantity": 2}]
        }))
        .expect("payload fixture")
    }

    #[tokio::test]
    async fn save_creates_pending_record_with_payload_intact() {
        let store = store().await;

        let id = store.save_quote(&payload()).await.expect("save");
        let stored = store.find_quote(&id).await.expect("find").expect("record exists");

        assert_eq!(stored.quote_id, id);
        assert_eq!(stored.status, QuoteStatus::PendingAnalysis);
        assert_eq!(stored.payload, payload());
        assert!(stored.ai_analysis.is_none());
    }

    #[tokio::test]
    async fn save_assigns_distinct_identifiers() {
        let store = store().await;

        let first = store.save_quote(&payload()).await.expect("first save");
        let second = store.save_quote(&payload()).await.expect("second save");

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn update_merges_analysis_and_marks_analyzed() {
        let store = store().await;
        let id = store.save_quote(&payload()).await.expect("save");

        let result = AnalysisResult {
            win_probability: Some(0.72),
            pricing_risk: "Medium".to_string(),
            key_risks: vec!["deep discount".to_string()],
            recommended_focus: "bundle support contract".to_string(),
        };
        store.update_quote_with_ai(&id, &result).await.expect("update");

        let stored = store.find_quote(&id).await.expect("find").expect("record exists");
        assert_eq!(stored.status, QuoteStatus::Analyzed);
        assert_eq!(stored.ai_analysis, Some(result));
        assert!(stored.updated_at >= stored.created_at);
    }

    #[tokio::test]
    async fn update_of_unknown_quote_is_not_found() {
        let store = store().await;

        let missing = QuoteId("no-such-quote".to_string());
        let error = store
            .update_quote_with_ai(&missing, &AnalysisResult::unknown())
            .await
            .expect_err("update of missing quote should fail");

        assert!(matches!(error, StoreError::NotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn find_returns_none_for_unknown_quote() {
        let store = store().await;

        let found =
            store.find_quote(&QuoteId("absent".to_string())).await.expect("find should succeed");
        assert!(found.is_none());
    }
}
