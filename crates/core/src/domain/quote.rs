use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteId(pub String);

impl std::fmt::Display for QuoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle of a stored quote. A row is created as `pending_analysis` and
/// flipped to `analyzed` once the AI result is merged in, so a request that
/// dies between the two persistence calls leaves a recoverable state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    PendingAnalysis,
    Analyzed,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingAnalysis => "pending_analysis",
            Self::Analyzed => "analyzed",
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown quote status `{0}`")]
pub struct UnknownQuoteStatus(pub String);

impl std::str::FromStr for QuoteStatus {
    type Err = UnknownQuoteStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending_analysis" => Ok(Self::PendingAnalysis),
            "analyzed" => Ok(Self::Analyzed),
            other => Err(UnknownQuoteStatus(other.to_string())),
        }
    }
}

/// Inbound quote body. The four named fields are required; anything else the
/// caller sends is captured in `extra` so the stored record keeps the full
/// submission, but only the named fields are ever forwarded for analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuotePayload {
    pub deal_value: f64,
    pub hospital: String,
    pub instrument_category: String,
    /// Free-form: callers send either a label ("high") or a numeric score.
    pub configuration_complexity: Value,
    #[serde(default)]
    pub items: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The derived fields sent to the analysis service. Exactly these five keys
/// go over the wire; `QuotePayload::extra` never leaks here.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QuoteData {
    pub deal_value: f64,
    pub hospital: String,
    pub instrument_category: String,
    pub configuration_complexity: Value,
    pub items: Vec<Value>,
}

impl QuoteData {
    pub fn from_payload(payload: &QuotePayload) -> Self {
        Self {
            deal_value: payload.deal_value,
            hospital: payload.hospital.clone(),
            instrument_category: payload.instrument_category.clone(),
            configuration_complexity: payload.configuration_complexity.clone(),
            items: payload.items.clone(),
        }
    }
}

/// Aggregate win/loss statistics accompanying an analysis request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoricalContext {
    pub avg_winning_price: f64,
    pub similar_quotes_won: i64,
    pub similar_quotes_lost: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub win_probability: Option<f64>,
    pub pricing_risk: String,
    pub key_risks: Vec<String>,
    pub recommended_focus: String,
}

impl AnalysisResult {
    /// Fixed fallback returned whenever the analysis service is unreachable
    /// or answers with something unusable.
    pub fn unknown() -> Self {
        Self {
            win_probability: None,
            pricing_risk: "Unknown".to_string(),
            key_risks: Vec::new(),
            recommended_focus: String::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredQuote {
    pub quote_id: QuoteId,
    pub status: QuoteStatus,
    pub payload: QuotePayload,
    pub ai_analysis: Option<AnalysisResult>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{AnalysisResult, QuoteData, QuotePayload, QuoteStatus};

    fn payload_json() -> serde_json::Value {
        json!({
            "deal_value": 50000,
            "hospital": "St. Mary",
            "instrument_category": "Imaging",
            "configuration_complexity": "high"
        })
    }

    #[test]
    fn items_default_to_empty_when_absent() {
        let payload: QuotePayload =
            serde_json::from_value(payload_json()).expect("payload should deserialize");
        assert!(payload.items.is_empty());
        assert!(payload.extra.is_empty());
    }

    #[test]
    fn missing_required_key_is_rejected() {
        let mut body = payload_json();
        body.as_object_mut().expect("object").remove("hospital");
        assert!(serde_json::from_value::<QuotePayload>(body).is_err());
    }

    #[test]
    fn unrelated_fields_are_retained_but_not_derived() {
        let mut body = payload_json();
        body.as_object_mut()
            .expect("object")
            .insert("internal_margin_pct".to_string(), json!(42));

        let payload: QuotePayload =
            serde_json::from_value(body).expect("payload should deserialize");
        assert_eq!(payload.extra.get("internal_margin_pct"), Some(&json!(42)));

        let derived = serde_json::to_value(QuoteData::from_payload(&payload)).expect("serialize");
        let mut keys: Vec<&str> =
            derived.as_object().expect("object").keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            ["configuration_complexity", "deal_value", "hospital", "instrument_category", "items"]
        );
    }

    #[test]
    fn extra_fields_survive_serialization_round_trip() {
        let mut body = payload_json();
        body.as_object_mut().expect("object").insert("notes".to_string(), json!("rush order"));

        let payload: QuotePayload =
            serde_json::from_value(body.clone()).expect("payload should deserialize");
        let round_tripped = serde_json::to_value(&payload).expect("serialize");
        assert_eq!(round_tripped.get("notes"), Some(&json!("rush order")));
    }

    #[test]
    fn unknown_fallback_matches_degraded_contract() {
        let fallback = serde_json::to_value(AnalysisResult::unknown()).expect("serialize");
        assert_eq!(
            fallback,
            json!({
                "win_probability": null,
                "pricing_risk": "Unknown",
                "key_risks": [],
                "recommended_focus": ""
            })
        );
    }

    #[test]
    fn status_round_trips_through_storage_form() {
        for status in [QuoteStatus::PendingAnalysis, QuoteStatus::Analyzed] {
            let parsed: QuoteStatus = status.as_str().parse().expect("parse");
            assert_eq!(parsed, status);
        }
        assert!("finalized".parse::<QuoteStatus>().is_err());
    }
}
