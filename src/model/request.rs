use serde::Serialize;

/// Body of `POST /api/fetch_timeseries`.
#[derive(Debug, Clone, Serialize)]
pub struct TimeseriesRequest<'a> {
    pub tickers: &'a [String],
    pub period: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<&'a str>,
}

/// Normalized run parameters; also the body of `POST /api/estimate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EstimationRequest {
    pub tickers: Vec<String>,
    pub period: String,
    pub use_quantum: bool,
    pub shots: u32,
}

impl EstimationRequest {
    pub fn timeseries_request<'a>(&'a self, interval: Option<&'a str>) -> TimeseriesRequest<'a> {
        TimeseriesRequest {
            tickers: &self.tickers,
            period: &self.period,
            interval,
        }
    }
}
