pub mod config;
pub mod domain;

pub use domain::quote::{
    AnalysisResult, HistoricalContext, QuoteData, QuoteId, QuotePayload, QuoteStatus, StoredQuote,
};
