pub mod client;
pub mod history;

pub use client::{AnalysisClient, HttpAnalysisClient};
pub use history::{HistoricalContextProvider, StaticHistoricalContextProvider};
