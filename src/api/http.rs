use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::model::{EstimationRequest, EstimationResponse, TimeseriesResponse};

use super::{EstimatorApi, ESTIMATE_PATH, FETCH_TIMESERIES_PATH};

pub struct HttpApiClient {
    http: reqwest::Client,
    timeseries_url: Url,
    estimate_url: Url,
    interval: Option<String>,
}

impl HttpApiClient {
    pub fn new(
        base_url: &str,
        interval: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ApiError> {
        let base = parse_base_url(base_url)?;
        let join = |path: &str| {
            base.join(path).map_err(|source| ApiError::BaseUrl {
                url: base_url.to_string(),
                source,
            })
        };
        let timeseries_url = join(FETCH_TIMESERIES_PATH)?;
        let estimate_url = join(ESTIMATE_PATH)?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ApiError::Client)?;

        Ok(Self {
            http,
            timeseries_url,
            estimate_url,
            interval,
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        Self::new(&config.base_url, config.interval.clone(), config.timeout())
    }

    pub fn timeseries_url(&self) -> &Url {
        &self.timeseries_url
    }

    pub fn estimate_url(&self) -> &Url {
        &self.estimate_url
    }

    async fn post_json<B, T>(&self, endpoint: &'static str, url: &Url, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!(endpoint, url = %url, "POST");
        let resp = self
            .http
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|source| ApiError::Http { endpoint, source })?;

        let status = resp.status();
        if !status.is_success() {
            // The body still carries the backend's own status field.
            tracing::warn!(endpoint, status = %status, "backend returned non-success HTTP status");
        } else {
            tracing::debug!(endpoint, status = %status, "response received");
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|source| ApiError::Http { endpoint, source })?;
        serde_json::from_slice(&bytes).map_err(|source| ApiError::Json { endpoint, source })
    }
}

fn parse_base_url(base_url: &str) -> Result<Url, ApiError> {
    let trimmed = base_url.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };
    Url::parse(&with_slash).map_err(|source| ApiError::BaseUrl {
        url: base_url.to_string(),
        source,
    })
}

impl EstimatorApi for HttpApiClient {
    async fn fetch_timeseries(
        &self,
        tickers: &[String],
        period: &str,
    ) -> Result<TimeseriesResponse, ApiError> {
        let body = crate::model::TimeseriesRequest {
            tickers,
            period,
            interval: self.interval.as_deref(),
        };
        self.post_json("fetch_timeseries", &self.timeseries_url, &body)
            .await
    }

    async fn run_estimation(
        &self,
        request: &EstimationRequest,
    ) -> Result<EstimationResponse, ApiError> {
        self.post_json("estimate", &self.estimate_url, request).await
    }
}
