pub mod chart;
pub mod report;
pub mod table;

pub use chart::{render_estimates_chart, render_returns_chart, ChartSpec, Trace, TraceKind};
pub use report::ReportPage;
pub use table::{render_results_table, ResultsRow, ResultsTable, RowCells};
