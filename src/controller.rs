use tokio::sync::watch;
use uuid::Uuid;

use crate::api::EstimatorApi;
use crate::error::AppError;
use crate::input::RunInput;
use crate::render::{render_estimates_chart, render_returns_chart, ResultsTable};
use crate::sink::{ChartTarget, DisplaySink};

pub const STATUS_FETCHING: &str = "Fetching timeseries...";
pub const STATUS_ESTIMATING: &str = "Running estimation...";
pub const STATUS_TIMESERIES_FAILED: &str = "Failed to fetch timeseries";
pub const STATUS_ESTIMATION_FAILED: &str = "Estimation failed";
pub const STATUS_DONE: &str = "Done";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    FetchingTimeseries,
    RunningEstimation,
    Done,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailedStage {
    Timeseries,
    Estimation,
}

impl FailedStage {
    pub fn status_text(self) -> &'static str {
        match self {
            Self::Timeseries => STATUS_TIMESERIES_FAILED,
            Self::Estimation => STATUS_ESTIMATION_FAILED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Done,
    Failed(FailedStage),
    /// A newer run started while this one was waiting on `during`.
    Cancelled { during: RunPhase },
}

impl RunOutcome {
    pub fn phase(self) -> RunPhase {
        match self {
            Self::Done => RunPhase::Done,
            Self::Failed(_) => RunPhase::Failed,
            Self::Cancelled { .. } => RunPhase::Cancelled,
        }
    }
}

/// Handle for one run. It stays valid until the controller starts another
/// run or cancels explicitly.
#[derive(Debug)]
pub struct RunToken {
    run_id: Uuid,
    generation: u64,
    rx: watch::Receiver<u64>,
}

impl RunToken {
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() != self.generation
    }

    /// Resolves once the token is invalidated.
    pub async fn cancelled(&mut self) {
        loop {
            if self.is_cancelled() {
                return;
            }
            if self.rx.changed().await.is_err() {
                // Controller gone: nothing can cancel this run anymore.
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Drives a run: timeseries fetch, returns chart, estimation, estimates
/// chart, results table. Each step only starts once the previous one
/// succeeded.
pub struct RunController<A> {
    api: A,
    generation: watch::Sender<u64>,
}

impl<A: EstimatorApi> RunController<A> {
    pub fn new(api: A) -> Self {
        let (generation, _) = watch::channel(0);
        Self { api, generation }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Start a new run generation, invalidating every earlier token.
    pub fn begin_run(&self) -> RunToken {
        self.generation.send_modify(|g| *g += 1);
        let rx = self.generation.subscribe();
        let generation = *rx.borrow();
        RunToken {
            run_id: Uuid::new_v4(),
            generation,
            rx,
        }
    }

    pub fn cancel_all(&self) {
        self.generation.send_modify(|g| *g += 1);
    }

    pub async fn run<S: DisplaySink>(
        &self,
        input: &RunInput,
        sink: &mut S,
    ) -> Result<RunOutcome, AppError> {
        let token = self.begin_run();
        self.run_with_token(input, sink, token).await
    }

    pub async fn run_with_token<S: DisplaySink>(
        &self,
        input: &RunInput,
        sink: &mut S,
        mut token: RunToken,
    ) -> Result<RunOutcome, AppError> {
        let run_id = token.run_id();
        let request = input.normalize();
        tracing::info!(
            %run_id,
            tickers = ?request.tickers,
            period = %request.period,
            use_quantum = request.use_quantum,
            shots = request.shots,
            "Run started"
        );

        if token.is_cancelled() {
            return Ok(cancelled(run_id, RunPhase::FetchingTimeseries));
        }
        sink.set_status(STATUS_FETCHING)?;
        let timeseries = tokio::select! {
            biased;
            _ = token.cancelled() => {
                return Ok(cancelled(run_id, RunPhase::FetchingTimeseries));
            }
            resp = self.api.fetch_timeseries(&request.tickers, &request.period) => resp?,
        };
        if !timeseries.is_ok() {
            tracing::warn!(
                %run_id,
                status = %timeseries.status,
                error = ?timeseries.error,
                "Timeseries fetch rejected"
            );
            return failed(sink, FailedStage::Timeseries);
        }
        tracing::info!(%run_id, records = timeseries.returns.len(), "Timeseries received");

        let returns_chart = render_returns_chart(&timeseries.returns, &request.tickers);
        sink.draw_chart(ChartTarget::Returns, &returns_chart)?;

        sink.set_status(STATUS_ESTIMATING)?;
        let estimation = tokio::select! {
            biased;
            _ = token.cancelled() => {
                return Ok(cancelled(run_id, RunPhase::RunningEstimation));
            }
            resp = self.api.run_estimation(&request) => resp?,
        };
        if !estimation.is_ok() {
            tracing::warn!(
                %run_id,
                status = %estimation.status,
                error = ?estimation.error,
                "Estimation rejected"
            );
            return failed(sink, FailedStage::Estimation);
        }

        let estimates_chart = render_estimates_chart(&estimation.results);
        sink.draw_chart(ChartTarget::Estimates, &estimates_chart)?;
        sink.replace_table(&ResultsTable::from_results(&estimation.results))?;
        sink.set_status(STATUS_DONE)?;

        tracing::info!(%run_id, tickers = estimation.results.len(), "Run finished");
        Ok(RunOutcome::Done)
    }
}

fn failed<S: DisplaySink>(sink: &mut S, stage: FailedStage) -> Result<RunOutcome, AppError> {
    sink.set_status(stage.status_text())?;
    Ok(RunOutcome::Failed(stage))
}

fn cancelled(run_id: Uuid, during: RunPhase) -> RunOutcome {
    tracing::info!(%run_id, phase = ?during, "Run cancelled by a newer run");
    RunOutcome::Cancelled { during }
}
