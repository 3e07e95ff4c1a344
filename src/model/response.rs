use std::collections::HashMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub const STATUS_OK: &str = "ok";

#[derive(Debug, Clone, Deserialize)]
pub struct TimeseriesResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub returns: Vec<ReturnRecord>,
    /// Return columns the backend actually produced.
    #[serde(default)]
    pub tickers: Option<Vec<String>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl TimeseriesResponse {
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// One row of returns: a date plus one field per ticker.
///
/// Daily series key the date as `Date`, intraday ones as `Datetime`. A row
/// with neither gets a null date.
#[derive(Debug, Clone, Deserialize)]
pub struct ReturnRecord {
    #[serde(rename = "Date", alias = "Datetime", default)]
    pub date: Value,
    #[serde(flatten)]
    pub values: HashMap<String, Value>,
}

impl ReturnRecord {
    pub fn value(&self, ticker: &str) -> Option<f64> {
        self.values.get(ticker).and_then(Value::as_f64)
    }

    /// The date as display text; strings are used verbatim.
    pub fn date_label(&self) -> String {
        match &self.date {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EstimationResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub results: EstimateResults,
    #[serde(default)]
    pub error: Option<String>,
}

impl EstimationResponse {
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResultRecord {
    pub classical_mean: f64,
    pub classical_positive_prob: f64,
    pub quantum_positive_prob: f64,
    pub method_used: String,
    pub n_samples: u64,
}

impl ResultRecord {
    pub fn method(&self) -> EstimationMethod {
        EstimationMethod::from_label(&self.method_used)
    }
}

/// Per-ticker entry of the results mapping. The backend reports
/// `{"error": "no data"}` for tickers without a usable series.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TickerEstimate {
    Estimated(ResultRecord),
    Unavailable { error: String },
}

impl TickerEstimate {
    pub fn record(&self) -> Option<&ResultRecord> {
        match self {
            Self::Estimated(record) => Some(record),
            Self::Unavailable { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EstimationMethod {
    Quantum,
    ClassicalFallback,
    Classical,
    Other(String),
}

impl EstimationMethod {
    pub fn from_label(label: &str) -> Self {
        match label {
            "quantum" => Self::Quantum,
            "classical_fallback" => Self::ClassicalFallback,
            "classical" => Self::Classical,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Quantum => "quantum",
            Self::ClassicalFallback => "classical_fallback",
            Self::Classical => "classical",
            Self::Other(label) => label,
        }
    }
}

impl fmt::Display for EstimationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ticker → estimate mapping in the order the backend wrote it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EstimateResults {
    entries: Vec<(String, TickerEstimate)>,
}

impl EstimateResults {
    pub fn new(entries: Vec<(String, TickerEstimate)>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TickerEstimate)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn get(&self, ticker: &str) -> Option<&TickerEstimate> {
        self.entries
            .iter()
            .find(|(k, _)| k == ticker)
            .map(|(_, v)| v)
    }
}

impl<'de> Deserialize<'de> for EstimateResults {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = EstimateResults;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping from ticker to estimate")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((ticker, estimate)) = map.next_entry::<String, TickerEstimate>()? {
                    entries.push((ticker, estimate));
                }
                Ok(EstimateResults { entries })
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_keep_wire_order() {
        let body = r#"{"status":"ok","results":{
            "MSFT":{"classical_mean":0.001,"classical_positive_prob":0.52,"quantum_positive_prob":0.51,"method_used":"quantum","n_samples":250},
            "AAPL":{"classical_mean":0.002,"classical_positive_prob":0.55,"quantum_positive_prob":0.54,"method_used":"classical","n_samples":250}
        }}"#;
        let resp: EstimationResponse = serde_json::from_str(body).unwrap();
        assert!(resp.is_ok());
        assert_eq!(resp.results.tickers().collect::<Vec<_>>(), vec!["MSFT", "AAPL"]);
    }

    #[test]
    fn unavailable_ticker_is_kept() {
        let body = r#"{"status":"ok","results":{"ZZZZ":{"error":"no data"}}}"#;
        let resp: EstimationResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            resp.results.get("ZZZZ"),
            Some(&TickerEstimate::Unavailable {
                error: "no data".to_string()
            })
        );
    }

    #[test]
    fn non_numeric_field_fails_to_parse() {
        let body = r#"{"status":"ok","results":{"AAPL":{"classical_mean":"n/a","classical_positive_prob":0.5,"quantum_positive_prob":0.5,"method_used":"quantum","n_samples":3}}}"#;
        assert!(serde_json::from_str::<EstimationResponse>(body).is_err());
    }

    #[test]
    fn intraday_rows_use_datetime_key() {
        let body = r#"{"status":"ok","tickers":["AAPL"],"returns":[{"Datetime":"2024-01-02T10:30:00","AAPL":0.001}]}"#;
        let resp: TimeseriesResponse = serde_json::from_str(body).unwrap();
        let row = &resp.returns[0];
        assert_eq!(row.date_label(), "2024-01-02T10:30:00");
        assert_eq!(row.value("AAPL"), Some(0.001));
        assert!(!row.values.contains_key("Datetime"));
    }

    #[test]
    fn row_without_date_still_decodes() {
        let body = r#"{"status":"ok","returns":[{"Date":"2024-01-02","AAPL":0.01},{"AAPL":0.02}]}"#;
        let resp: TimeseriesResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.returns.len(), 2);
        assert!(resp.returns[1].date.is_null());
        assert_eq!(resp.returns[1].value("AAPL"), Some(0.02));
    }

    #[test]
    fn missing_status_is_not_ok() {
        let resp: TimeseriesResponse = serde_json::from_str(r#"{"error":"boom"}"#).unwrap();
        assert!(!resp.is_ok());
        assert!(resp.returns.is_empty());
        assert_eq!(resp.error.as_deref(), Some("boom"));
    }

    #[test]
    fn method_labels_round_trip_through_display() {
        assert_eq!(EstimationMethod::from_label("quantum"), EstimationMethod::Quantum);
        assert_eq!(
            EstimationMethod::from_label("classical_fallback").to_string(),
            "classical_fallback"
        );
        assert_eq!(EstimationMethod::from_label("sim").as_str(), "sim");
    }
}
