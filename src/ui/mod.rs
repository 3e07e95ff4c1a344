pub mod chart;
pub mod dashboard;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Frame;
use uuid::Uuid;

use crate::config::RunConfig;
use crate::controller::{RunPhase, STATUS_ESTIMATING};
use crate::event::AppEvent;
use crate::input::{FormCommand, FormField, RunInput};
use crate::render::chart::{ESTIMATES_CHART_TITLE, RETURNS_CHART_TITLE};
use crate::render::{ChartSpec, ResultsTable};
use crate::sink::ChartTarget;

use chart::{EstimatesChart, ReturnsChart};
use dashboard::{FormPanel, KeybindBar, LogPanel, ResultsTablePanel, StatusBar};

const DEFAULT_MAX_LOG_LINES: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    None,
    Run,
    Quit,
}

pub struct AppState {
    pub base_url: String,
    pub tickers_input: String,
    pub periods: Vec<String>,
    pub period_index: usize,
    pub use_quantum: bool,
    pub shots_input: String,
    pub focus: FormField,
    pub status: String,
    pub phase: RunPhase,
    pub active_run: Option<Uuid>,
    pub returns_chart: Option<ChartSpec>,
    pub estimates_chart: Option<ChartSpec>,
    pub results_table: Option<ResultsTable>,
    pub log_messages: Vec<String>,
    pub max_log_lines: usize,
}

impl AppState {
    pub fn new(base_url: &str, run: &RunConfig) -> Self {
        Self {
            base_url: base_url.to_string(),
            tickers_input: run.tickers.clone(),
            periods: run.periods.clone(),
            period_index: run.period_index(),
            use_quantum: run.use_quantum,
            shots_input: run.shots.to_string(),
            focus: FormField::Tickers,
            status: "Ready".to_string(),
            phase: RunPhase::Idle,
            active_run: None,
            returns_chart: None,
            estimates_chart: None,
            results_table: None,
            log_messages: Vec::new(),
            max_log_lines: DEFAULT_MAX_LOG_LINES,
        }
    }

    pub fn with_max_log_lines(mut self, max_log_lines: usize) -> Self {
        self.max_log_lines = max_log_lines.max(1);
        self
    }

    pub fn period(&self) -> &str {
        self.periods
            .get(self.period_index)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn run_input(&self) -> RunInput {
        RunInput {
            tickers: self.tickers_input.clone(),
            period: self.period().to_string(),
            use_quantum: self.use_quantum,
            shots: self.shots_input.clone(),
        }
    }

    pub fn push_log(&mut self, msg: String) {
        self.log_messages.push(msg);
        if self.log_messages.len() > self.max_log_lines {
            let excess = self.log_messages.len() - self.max_log_lines;
            self.log_messages.drain(..excess);
        }
    }

    /// Mark `run_id` as the run whose output the display follows.
    pub fn start_run(&mut self, run_id: Uuid) {
        self.active_run = Some(run_id);
        self.phase = RunPhase::FetchingTimeseries;
        let input = self.run_input().normalize();
        self.push_log(format!(
            "run {} | {} | {} | quantum={} | shots={}",
            short_id(run_id),
            input.tickers.join(","),
            input.period,
            input.use_quantum,
            input.shots
        ));
    }

    pub fn apply_form_command(&mut self, cmd: FormCommand) -> FormAction {
        match cmd {
            FormCommand::Quit => return FormAction::Quit,
            FormCommand::Run => return FormAction::Run,
            FormCommand::NextField => self.focus = self.focus.next(),
            FormCommand::PrevField => self.focus = self.focus.prev(),
            FormCommand::Insert(c) => {
                if let Some(field) = self.focused_text_mut() {
                    field.push(c);
                }
            }
            FormCommand::Backspace => {
                if let Some(field) = self.focused_text_mut() {
                    field.pop();
                }
            }
            FormCommand::ClearField => {
                if let Some(field) = self.focused_text_mut() {
                    field.clear();
                }
            }
            FormCommand::PeriodPrev => {
                if !self.periods.is_empty() {
                    self.period_index =
                        (self.period_index + self.periods.len() - 1) % self.periods.len();
                }
            }
            FormCommand::PeriodNext => {
                if !self.periods.is_empty() {
                    self.period_index = (self.period_index + 1) % self.periods.len();
                }
            }
            FormCommand::ToggleQuantum => self.use_quantum = !self.use_quantum,
        }
        FormAction::None
    }

    fn focused_text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Tickers => Some(&mut self.tickers_input),
            FormField::Shots => Some(&mut self.shots_input),
            FormField::Period | FormField::Quantum => None,
        }
    }

    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::Status { run_id, text } => {
                if self.active_run == Some(run_id) && text == STATUS_ESTIMATING {
                    self.phase = RunPhase::RunningEstimation;
                }
                self.status = text;
            }
            AppEvent::ChartDrawn { target, chart, .. } => match target {
                ChartTarget::Returns => self.returns_chart = Some(chart),
                ChartTarget::Estimates => self.estimates_chart = Some(chart),
            },
            AppEvent::TableReplaced { table, .. } => self.results_table = Some(table),
            AppEvent::RunFinished { run_id, outcome } => {
                if self.active_run == Some(run_id) {
                    self.phase = outcome.phase();
                }
                self.push_log(format!("run {} | {:?}", short_id(run_id), outcome));
            }
            AppEvent::RunErrored { run_id, message } => {
                if self.active_run == Some(run_id) {
                    self.phase = RunPhase::Failed;
                    self.status = format!("Error: {}", message);
                }
                self.push_log(format!("run {} | error: {}", short_id(run_id), message));
            }
            AppEvent::LogMessage(msg) => self.push_log(msg),
        }
    }
}

fn short_id(run_id: Uuid) -> String {
    run_id.simple().to_string()[..8].to_string()
}

pub fn render(frame: &mut Frame, state: &AppState) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(10),   // form + returns chart
            Constraint::Min(10),   // estimates chart + table
            Constraint::Length(6), // log
            Constraint::Length(1), // keybinds
        ])
        .split(frame.area());

    frame.render_widget(
        StatusBar {
            phase: state.phase,
            status: &state.status,
            base_url: &state.base_url,
        },
        outer[0],
    );

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(44), Constraint::Min(30)])
        .split(outer[1]);
    frame.render_widget(
        FormPanel {
            tickers: &state.tickers_input,
            period: state.period(),
            use_quantum: state.use_quantum,
            shots: &state.shots_input,
            focus: state.focus,
        },
        top[0],
    );
    frame.render_widget(
        ReturnsChart::new(RETURNS_CHART_TITLE, state.returns_chart.as_ref()),
        top[1],
    );

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(outer[2]);
    frame.render_widget(
        EstimatesChart::new(ESTIMATES_CHART_TITLE, state.estimates_chart.as_ref()),
        bottom[0],
    );
    frame.render_widget(
        ResultsTablePanel::new(state.results_table.as_ref()),
        bottom[1],
    );

    frame.render_widget(LogPanel::new(&state.log_messages), outer[3]);
    frame.render_widget(KeybindBar, outer[4]);
}
