use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{Event, KeyEventKind};
use ratatui::DefaultTerminal;
use tokio::sync::mpsc;

use qae_dashboard::api::HttpApiClient;
use qae_dashboard::config::Config;
use qae_dashboard::controller::RunController;
use qae_dashboard::event::AppEvent;
use qae_dashboard::input::parse_form_command;
use qae_dashboard::sink::ChannelSink;
use qae_dashboard::ui::{self, AppState, FormAction};

const LOG_FILE: &str = "qae-dashboard.log";

type Controller = Arc<RunController<HttpApiClient>>;

fn start_run(
    controller: &Controller,
    app_state: &mut AppState,
    app_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    // Taking the token here invalidates any run still in flight.
    let token = controller.begin_run();
    let run_id = token.run_id();
    app_state.start_run(run_id);

    let input = app_state.run_input();
    let controller = controller.clone();
    let tx = app_tx.clone();
    tokio::spawn(async move {
        let mut sink = ChannelSink::new(run_id, tx.clone());
        match controller.run_with_token(&input, &mut sink, token).await {
            Ok(outcome) => {
                let _ = tx.send(AppEvent::RunFinished { run_id, outcome });
            }
            Err(e) => {
                tracing::error!(%run_id, error = %e, "Run aborted");
                let _ = tx.send(AppEvent::RunErrored {
                    run_id,
                    message: e.to_string(),
                });
            }
        }
    });
}

async fn run_loop(
    terminal: &mut DefaultTerminal,
    config: &Config,
    controller: &Controller,
) -> Result<()> {
    let (app_tx, mut app_rx) = mpsc::unbounded_channel::<AppEvent>();
    let mut app_state = AppState::new(&config.api.base_url, &config.run)
        .with_max_log_lines(config.ui.max_log_lines);
    app_state.push_log(format!(
        "qae-dashboard started | backend {}",
        config.api.base_url
    ));

    loop {
        while let Ok(event) = app_rx.try_recv() {
            app_state.apply(event);
        }

        terminal.draw(|frame| ui::render(frame, &app_state))?;

        if crossterm::event::poll(Duration::from_millis(config.ui.refresh_rate_ms))? {
            if let Event::Key(key) = crossterm::event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let Some(cmd) = parse_form_command(app_state.focus, &key.code, key.modifiers)
                else {
                    continue;
                };
                match app_state.apply_form_command(cmd) {
                    FormAction::Quit => {
                        tracing::info!("User quit");
                        break;
                    }
                    FormAction::Run => start_run(controller, &mut app_state, &app_tx),
                    FormAction::None => {}
                }
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // A provider may already be installed by a dependency.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            eprintln!("Make sure config/default.toml exists (QAE_API_BASE_URL may override the backend URL)");
            std::process::exit(1);
        }
    };

    // Log to a file so output does not interfere with the TUI.
    let log_file =
        std::fs::File::create(LOG_FILE).with_context(|| format!("failed to create {}", LOG_FILE))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(&config.logging.level)
            }),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .json()
        .init();

    tracing::info!(
        base_url = %config.api.base_url,
        period = %config.run.period,
        "Starting qae-dashboard"
    );

    let api = HttpApiClient::from_config(&config.api).context("failed to build API client")?;
    let controller: Controller = Arc::new(RunController::new(api));

    let mut terminal = ratatui::init();
    let result = run_loop(&mut terminal, &config, &controller).await;
    controller.cancel_all();
    ratatui::restore();
    result
}
