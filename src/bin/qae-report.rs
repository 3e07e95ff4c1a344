use anyhow::{bail, Context, Result};

use qae_dashboard::api::HttpApiClient;
use qae_dashboard::config::Config;
use qae_dashboard::controller::{RunController, RunOutcome};
use qae_dashboard::input::RunInput;
use qae_dashboard::sink::ReportSink;

/// Usage: `qae-report [TICKERS] [PERIOD]`. Anything not given comes from
/// `config/default.toml`.
#[tokio::main]
async fn main() -> Result<()> {
    let _ = rustls::crypto::ring::default_provider().install_default();

    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(&config.logging.level)
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let input = RunInput {
        tickers: args.next().unwrap_or_else(|| config.run.tickers.clone()),
        period: args.next().unwrap_or_else(|| config.run.period.clone()),
        use_quantum: config.run.use_quantum,
        shots: config.run.shots.to_string(),
    };

    let api = HttpApiClient::from_config(&config.api).context("failed to build API client")?;
    let controller = RunController::new(api);
    let mut sink = ReportSink::create(&config.report.output_dir).with_context(|| {
        format!(
            "failed to prepare report directory {}",
            config.report.output_dir.display()
        )
    })?;

    let outcome = controller
        .run(&input, &mut sink)
        .await
        .context("estimation run aborted")?;

    println!("{}", sink.page().status);
    println!("report: {}", sink.report_path().display());

    match outcome {
        RunOutcome::Done => Ok(()),
        RunOutcome::Failed(stage) => bail!("{}", stage.status_text()),
        RunOutcome::Cancelled { during } => bail!("run cancelled during {:?}", during),
    }
}
