pub mod http;

use std::future::Future;

use crate::error::ApiError;
use crate::model::{EstimationRequest, EstimationResponse, TimeseriesResponse};

pub use http::HttpApiClient;

pub const FETCH_TIMESERIES_PATH: &str = "api/fetch_timeseries";
pub const ESTIMATE_PATH: &str = "api/estimate";

/// The two backend calls a run makes.
///
/// Implementations return the decoded body whatever the HTTP status was;
/// only transport and decoding failures are errors.
pub trait EstimatorApi: Send + Sync {
    fn fetch_timeseries(
        &self,
        tickers: &[String],
        period: &str,
    ) -> impl Future<Output = Result<TimeseriesResponse, ApiError>> + Send;

    fn run_estimation(
        &self,
        request: &EstimationRequest,
    ) -> impl Future<Output = Result<EstimationResponse, ApiError>> + Send;
}

impl<T: EstimatorApi> EstimatorApi for std::sync::Arc<T> {
    fn fetch_timeseries(
        &self,
        tickers: &[String],
        period: &str,
    ) -> impl Future<Output = Result<TimeseriesResponse, ApiError>> + Send {
        (**self).fetch_timeseries(tickers, period)
    }

    fn run_estimation(
        &self,
        request: &EstimationRequest,
    ) -> impl Future<Output = Result<EstimationResponse, ApiError>> + Send {
        (**self).run_estimation(request)
    }
}
