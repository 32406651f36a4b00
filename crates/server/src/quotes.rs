//! Quote API routes.
//!
//! - `POST /create-quote`        — persist a quote, run AI analysis, merge the
//!   result back, return `{quote_id, ai_analysis}`
//! - `GET  /quotes/{quote_id}`   — fetch a stored quote with its analysis

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use medquote_analysis::{AnalysisClient, HistoricalContextProvider};
use medquote_core::domain::quote::{
    AnalysisResult, QuoteData, QuoteId, QuotePayload, StoredQuote,
};
use medquote_db::store::{QuoteStore, StoreError};

#[derive(Clone)]
pub struct QuotesState {
    pub store: Arc<dyn QuoteStore>,
    pub analysis: Arc<dyn AnalysisClient>,
    pub history: Arc<dyn HistoricalContextProvider>,
}

#[derive(Debug, Serialize)]
pub struct CreateQuoteResponse {
    pub quote_id: QuoteId,
    pub ai_analysis: AnalysisResult,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("quote `{0}` not found")]
    NotFound(QuoteId),
    #[error("persistence failure: {0}")]
    Store(#[from] StoreError),
    #[error("historical context unavailable: {0}")]
    History(#[source] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound(id) => {
                (StatusCode::NOT_FOUND, format!("quote `{id}` not found"))
            }
            ApiError::Store(_) | ApiError::History(_) => {
                // Detail goes to the log, not the client.
                error!(
                    event_name = "quotes.request.failed",
                    error = %self,
                    "quote request failed"
                );
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

pub fn router(state: QuotesState) -> Router {
    Router::new()
        .route("/create-quote", post(create_quote))
        .route("/quotes/{quote_id}", get(get_quote))
        .with_state(state)
}

/// Persist, analyze, merge, respond. Strictly sequential: the quote is saved
/// before the analysis call, so a degraded or dead analysis service never
/// costs the caller their quote_id.
pub async fn create_quote(
    State(state): State<QuotesState>,
    Json(payload): Json<QuotePayload>,
) -> Result<Json<CreateQuoteResponse>, ApiError> {
    let quote_id = state.store.save_quote(&payload).await?;

    let quote_data = QuoteData::from_payload(&payload);
    let context = state.history.historical_context().await.map_err(ApiError::History)?;
    let ai_analysis = state.analysis.analyze(&quote_data, &context).await;

    state.store.update_quote_with_ai(&quote_id, &ai_analysis).await?;

    info!(
        event_name = "quotes.created",
        quote_id = %quote_id,
        hospital = %payload.hospital,
        analyzed = ai_analysis.win_probability.is_some(),
        "quote created and analysis merged"
    );

    Ok(Json(CreateQuoteResponse { quote_id, ai_analysis }))
}

pub async fn get_quote(
    State(state): State<QuotesState>,
    Path(quote_id): Path<String>,
) -> Result<Json<StoredQuote>, ApiError> {
    let id = QuoteId(quote_id);

    match state.store.find_quote(&id).await? {
        Some(stored) => Ok(Json(stored)),
        None => Err(ApiError::NotFound(id)),
    }
}
