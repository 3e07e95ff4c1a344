use std::sync::{Arc, Mutex};

use qae_dashboard::api::EstimatorApi;
use qae_dashboard::controller::{
    FailedStage, RunController, RunOutcome, RunPhase, STATUS_DONE, STATUS_ESTIMATING,
    STATUS_ESTIMATION_FAILED, STATUS_FETCHING, STATUS_TIMESERIES_FAILED,
};
use qae_dashboard::error::{ApiError, AppError};
use qae_dashboard::input::RunInput;
use qae_dashboard::model::{EstimationRequest, EstimationResponse, TimeseriesResponse};
use qae_dashboard::sink::{ChartTarget, RecordingSink, SinkOp};
use serde_json::{json, Value};
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Timeseries { tickers: Vec<String>, period: String },
    Estimate(EstimationRequest),
}

/// Serves canned response bodies. Bodies are kept as JSON text so map keys
/// reach the decoder in the order they were written.
struct ScriptedApi {
    timeseries: String,
    estimate: String,
    calls: Mutex<Vec<Call>>,
    entered: Notify,
    hold_timeseries: Option<Notify>,
}

impl ScriptedApi {
    fn new(timeseries: impl ToString, estimate: impl ToString) -> Self {
        Self {
            timeseries: timeseries.to_string(),
            estimate: estimate.to_string(),
            calls: Mutex::new(Vec::new()),
            entered: Notify::new(),
            hold_timeseries: None,
        }
    }

    fn holding_timeseries(mut self) -> Self {
        self.hold_timeseries = Some(Notify::new());
        self
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl EstimatorApi for ScriptedApi {
    async fn fetch_timeseries(
        &self,
        tickers: &[String],
        period: &str,
    ) -> Result<TimeseriesResponse, ApiError> {
        self.calls.lock().unwrap().push(Call::Timeseries {
            tickers: tickers.to_vec(),
            period: period.to_string(),
        });
        self.entered.notify_one();
        if let Some(hold) = &self.hold_timeseries {
            hold.notified().await;
        }
        serde_json::from_str(&self.timeseries).map_err(|source| ApiError::Json {
            endpoint: "fetch_timeseries",
            source,
        })
    }

    async fn run_estimation(
        &self,
        request: &EstimationRequest,
    ) -> Result<EstimationResponse, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Estimate(request.clone()));
        serde_json::from_str(&self.estimate).map_err(|source| ApiError::Json {
            endpoint: "estimate",
            source,
        })
    }
}

fn input() -> RunInput {
    RunInput {
        tickers: " aapl , msft,  ".to_string(),
        period: "1y".to_string(),
        use_quantum: true,
        shots: "0".to_string(),
    }
}

fn ok_timeseries() -> Value {
    json!({
        "status": "ok",
        "tickers": ["AAPL", "MSFT"],
        "returns": [
            {"Date": "2024-01-01", "AAPL": 0.01, "MSFT": 0.02},
            {"Date": "2024-01-02", "AAPL": -0.02, "MSFT": 0.0}
        ]
    })
}

fn ok_estimate() -> Value {
    json!({
        "status": "ok",
        "results": {
            "AAPL": {"classical_mean": 0.0012345, "classical_positive_prob": 0.5321, "quantum_positive_prob": 0.5102, "method_used": "quantum", "n_samples": 250},
            "MSFT": {"classical_mean": 0.0009, "classical_positive_prob": 0.51, "quantum_positive_prob": 0.49, "method_used": "classical_fallback", "n_samples": 250}
        }
    })
}

#[tokio::test]
async fn successful_run_renders_in_fixed_order() {
    let api = ScriptedApi::new(ok_timeseries(), ok_estimate());
    let controller = RunController::new(api);
    let mut sink = RecordingSink::new();

    let outcome = controller.run(&input(), &mut sink).await.unwrap();

    assert_eq!(outcome, RunOutcome::Done);
    let kinds: Vec<&str> = sink
        .ops
        .iter()
        .map(|op| match op {
            SinkOp::Status(_) => "status",
            SinkOp::Chart(ChartTarget::Returns, _) => "returns",
            SinkOp::Chart(ChartTarget::Estimates, _) => "estimates",
            SinkOp::Table(_) => "table",
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["status", "returns", "status", "estimates", "table", "status"]
    );
    assert_eq!(
        sink.statuses(),
        vec![STATUS_FETCHING, STATUS_ESTIMATING, STATUS_DONE]
    );
    assert_eq!(sink.table().unwrap().rows.len(), 2);
}

#[tokio::test]
async fn requests_carry_normalized_input() {
    let api = Arc::new(ScriptedApi::new(ok_timeseries(), ok_estimate()));
    let controller = RunController::new(api.clone());
    let mut sink = RecordingSink::new();

    controller.run(&input(), &mut sink).await.unwrap();

    let tickers = vec!["AAPL".to_string(), "MSFT".to_string()];
    assert_eq!(
        api.calls(),
        vec![
            Call::Timeseries {
                tickers: tickers.clone(),
                period: "1y".to_string()
            },
            Call::Estimate(EstimationRequest {
                tickers,
                period: "1y".to_string(),
                use_quantum: true,
                shots: 1024,
            }),
        ]
    );
}

#[tokio::test]
async fn failed_timeseries_never_requests_estimation() {
    let api = Arc::new(ScriptedApi::new(
        json!({"status": "error", "returns": []}),
        ok_estimate(),
    ));
    let controller = RunController::new(api.clone());
    let mut sink = RecordingSink::new();

    let outcome = controller.run(&input(), &mut sink).await.unwrap();

    assert_eq!(outcome, RunOutcome::Failed(FailedStage::Timeseries));
    assert_eq!(sink.status(), Some(STATUS_TIMESERIES_FAILED));
    assert!(sink.chart(ChartTarget::Returns).is_none());
    assert!(sink.chart(ChartTarget::Estimates).is_none());
    assert!(sink.table().is_none());
    assert_eq!(api.calls().len(), 1);
}

#[tokio::test]
async fn failed_estimation_keeps_returns_chart_only() {
    let api = ScriptedApi::new(ok_timeseries(), json!({"status": "error"}));
    let controller = RunController::new(api);
    let mut sink = RecordingSink::new();

    let outcome = controller.run(&input(), &mut sink).await.unwrap();

    assert_eq!(outcome, RunOutcome::Failed(FailedStage::Estimation));
    assert_eq!(outcome.phase(), RunPhase::Failed);
    assert_eq!(sink.status(), Some(STATUS_ESTIMATION_FAILED));
    let returns = sink.chart(ChartTarget::Returns).unwrap();
    assert_eq!(returns.data.len(), 2);
    assert!(sink.chart(ChartTarget::Estimates).is_none());
    assert!(sink.table().is_none());
}

#[tokio::test]
async fn malformed_estimate_aborts_after_returns_chart() {
    let api = ScriptedApi::new(
        ok_timeseries(),
        json!({"status": "ok", "results": {"AAPL": {"classical_mean": "oops"}}}),
    );
    let controller = RunController::new(api);
    let mut sink = RecordingSink::new();

    let err = controller.run(&input(), &mut sink).await.unwrap_err();

    assert!(matches!(err, AppError::Api(ApiError::Json { .. })));
    assert!(sink.chart(ChartTarget::Returns).is_some());
    assert!(sink.table().is_none());
    assert_eq!(sink.status(), Some(STATUS_ESTIMATING));
}

#[tokio::test]
async fn newer_run_cancels_in_flight_run() {
    let api = Arc::new(ScriptedApi::new(ok_timeseries(), ok_estimate()).holding_timeseries());
    let controller = Arc::new(RunController::new(api.clone()));

    let token = controller.begin_run();
    let first = {
        let controller = controller.clone();
        tokio::spawn(async move {
            let mut sink = RecordingSink::new();
            let outcome = controller.run_with_token(&input(), &mut sink, token).await;
            (outcome, sink)
        })
    };

    api.entered.notified().await;
    let _second = controller.begin_run();

    let (outcome, sink) = first.await.unwrap();
    assert_eq!(
        outcome.unwrap(),
        RunOutcome::Cancelled {
            during: RunPhase::FetchingTimeseries
        }
    );
    assert_eq!(sink.statuses(), vec![STATUS_FETCHING]);
    assert!(sink.chart(ChartTarget::Returns).is_none());
    assert_eq!(api.calls().len(), 1);
}

#[tokio::test]
async fn results_render_in_backend_order() {
    let estimate = r#"{"status": "ok", "results": {
        "MSFT": {"classical_mean": 0.0009, "classical_positive_prob": 0.51, "quantum_positive_prob": 0.49, "method_used": "classical_fallback", "n_samples": 250},
        "AAPL": {"classical_mean": 0.0012, "classical_positive_prob": 0.53, "quantum_positive_prob": 0.51, "method_used": "quantum", "n_samples": 250}
    }}"#;
    let controller = RunController::new(ScriptedApi::new(ok_timeseries(), estimate));
    let mut sink = RecordingSink::new();

    controller.run(&input(), &mut sink).await.unwrap();

    let chart = sink.chart(ChartTarget::Estimates).unwrap();
    assert_eq!(chart.data[0].x, vec![json!("MSFT"), json!("AAPL")]);
    let rows: Vec<&str> = sink
        .table()
        .unwrap()
        .rows
        .iter()
        .map(|r| r.ticker.as_str())
        .collect();
    assert_eq!(rows, vec!["MSFT", "AAPL"]);
}

#[tokio::test]
async fn intraday_timeseries_still_draws_returns_chart() {
    let timeseries = json!({
        "status": "ok",
        "tickers": ["AAPL"],
        "returns": [
            {"Datetime": "2024-01-02T10:30:00", "AAPL": 0.001},
            {"AAPL": -0.002}
        ]
    });
    let controller = RunController::new(ScriptedApi::new(timeseries, ok_estimate()));
    let mut sink = RecordingSink::new();

    let outcome = controller.run(&input(), &mut sink).await.unwrap();

    assert_eq!(outcome, RunOutcome::Done);
    let returns = sink.chart(ChartTarget::Returns).unwrap();
    assert_eq!(
        returns.data[0].x,
        vec![json!("2024-01-02T10:30:00"), Value::Null]
    );
    assert_eq!(returns.data[0].y, vec![Some(0.001), Some(-0.002)]);
}

#[tokio::test]
async fn stale_token_renders_nothing() {
    let api = Arc::new(ScriptedApi::new(ok_timeseries(), ok_estimate()));
    let controller = RunController::new(api.clone());
    let stale = controller.begin_run();
    let _current = controller.begin_run();
    let mut sink = RecordingSink::new();

    let outcome = controller
        .run_with_token(&input(), &mut sink, stale)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Cancelled {
            during: RunPhase::FetchingTimeseries
        }
    );
    assert!(sink.ops.is_empty());
    assert!(api.calls().is_empty());
}
