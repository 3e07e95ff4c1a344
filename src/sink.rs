use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::SinkError;
use crate::event::AppEvent;
use crate::render::{ChartSpec, ReportPage, ResultsTable};

/// Named chart regions of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartTarget {
    Returns,
    Estimates,
}

impl ChartTarget {
    pub fn name(self) -> &'static str {
        match self {
            Self::Returns => "returns_chart",
            Self::Estimates => "estimates_chart",
        }
    }
}

/// Display regions a run writes into. Every call replaces the region's
/// previous content.
pub trait DisplaySink: Send {
    fn set_status(&mut self, text: &str) -> Result<(), SinkError>;
    fn draw_chart(&mut self, target: ChartTarget, chart: &ChartSpec) -> Result<(), SinkError>;
    fn replace_table(&mut self, table: &ResultsTable) -> Result<(), SinkError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum SinkOp {
    Status(String),
    Chart(ChartTarget, ChartSpec),
    Table(ResultsTable),
}

/// Keeps every write in order; used headless and in tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub ops: Vec<SinkOp>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> Option<&str> {
        self.ops.iter().rev().find_map(|op| match op {
            SinkOp::Status(s) => Some(s.as_str()),
            _ => None,
        })
    }

    pub fn chart(&self, target: ChartTarget) -> Option<&ChartSpec> {
        self.ops.iter().rev().find_map(|op| match op {
            SinkOp::Chart(t, c) if *t == target => Some(c),
            _ => None,
        })
    }

    pub fn table(&self) -> Option<&ResultsTable> {
        self.ops.iter().rev().find_map(|op| match op {
            SinkOp::Table(t) => Some(t),
            _ => None,
        })
    }

    pub fn statuses(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                SinkOp::Status(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl DisplaySink for RecordingSink {
    fn set_status(&mut self, text: &str) -> Result<(), SinkError> {
        self.ops.push(SinkOp::Status(text.to_string()));
        Ok(())
    }

    fn draw_chart(&mut self, target: ChartTarget, chart: &ChartSpec) -> Result<(), SinkError> {
        self.ops.push(SinkOp::Chart(target, chart.clone()));
        Ok(())
    }

    fn replace_table(&mut self, table: &ResultsTable) -> Result<(), SinkError> {
        self.ops.push(SinkOp::Table(table.clone()));
        Ok(())
    }
}

/// Forwards writes to the terminal UI loop.
pub struct ChannelSink {
    run_id: Uuid,
    tx: mpsc::UnboundedSender<AppEvent>,
}

impl ChannelSink {
    pub fn new(run_id: Uuid, tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { run_id, tx }
    }

    fn send(&self, event: AppEvent) -> Result<(), SinkError> {
        self.tx.send(event).map_err(|_| SinkError::Closed)
    }
}

impl DisplaySink for ChannelSink {
    fn set_status(&mut self, text: &str) -> Result<(), SinkError> {
        self.send(AppEvent::Status {
            run_id: self.run_id,
            text: text.to_string(),
        })
    }

    fn draw_chart(&mut self, target: ChartTarget, chart: &ChartSpec) -> Result<(), SinkError> {
        self.send(AppEvent::ChartDrawn {
            run_id: self.run_id,
            target,
            chart: chart.clone(),
        })
    }

    fn replace_table(&mut self, table: &ResultsTable) -> Result<(), SinkError> {
        self.send(AppEvent::TableReplaced {
            run_id: self.run_id,
            table: table.clone(),
        })
    }
}

pub const REPORT_FILE: &str = "report.html";
pub const TABLE_FILE: &str = "results_table.html";

/// Writes each region to a file under `dir` and keeps `report.html` in sync
/// with whatever has been drawn so far.
pub struct ReportSink {
    dir: PathBuf,
    page: ReportPage,
}

impl ReportSink {
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| SinkError::Write {
            path: dir.display().to_string(),
            source,
        })?;
        Ok(Self {
            dir,
            page: ReportPage::default(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn page(&self) -> &ReportPage {
        &self.page
    }

    pub fn report_path(&self) -> PathBuf {
        self.dir.join(REPORT_FILE)
    }

    fn write(&self, file: &str, contents: &str) -> Result<(), SinkError> {
        let path = self.dir.join(file);
        std::fs::write(&path, contents).map_err(|source| SinkError::Write {
            path: path.display().to_string(),
            source,
        })
    }

    fn write_page(&mut self) -> Result<(), SinkError> {
        self.page.generated_at = Some(chrono::Utc::now());
        self.write(REPORT_FILE, &self.page.to_html())
    }
}

impl DisplaySink for ReportSink {
    fn set_status(&mut self, text: &str) -> Result<(), SinkError> {
        self.page.status = text.to_string();
        self.write_page()
    }

    fn draw_chart(&mut self, target: ChartTarget, chart: &ChartSpec) -> Result<(), SinkError> {
        let json = serde_json::to_string_pretty(chart).map_err(|source| SinkError::Encode {
            target: target.name(),
            source,
        })?;
        self.write(&format!("{}.json", target.name()), &json)?;
        match target {
            ChartTarget::Returns => self.page.returns_chart = Some(chart.clone()),
            ChartTarget::Estimates => self.page.estimates_chart = Some(chart.clone()),
        }
        self.write_page()
    }

    fn replace_table(&mut self, table: &ResultsTable) -> Result<(), SinkError> {
        let html = table.to_html();
        self.write(TABLE_FILE, &html)?;
        self.page.table_html = Some(html);
        self.write_page()
    }
}
