use std::fmt::Write as _;

use crate::model::{EstimateResults, TickerEstimate};

pub const RESULTS_TABLE_HEADERS: [&str; 6] = [
    "Ticker",
    "Classical Mean",
    "Classical P(>0)",
    "Quantum P(>0)",
    "Method",
    "Samples",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowCells {
    Estimate {
        classical_mean: String,
        classical_positive_prob: String,
        quantum_positive_prob: String,
        method: String,
        n_samples: String,
    },
    Unavailable {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsRow {
    pub ticker: String,
    pub cells: RowCells,
}

impl ResultsRow {
    /// The five cells after the ticker; unavailable rows repeat the error in
    /// the first cell and leave the rest blank.
    pub fn columns(&self) -> [&str; 5] {
        match &self.cells {
            RowCells::Estimate {
                classical_mean,
                classical_positive_prob,
                quantum_positive_prob,
                method,
                n_samples,
            } => [
                classical_mean.as_str(),
                classical_positive_prob.as_str(),
                quantum_positive_prob.as_str(),
                method.as_str(),
                n_samples.as_str(),
            ],
            RowCells::Unavailable { error } => [error.as_str(), "", "", "", ""],
        }
    }
}

/// Formatted results, one row per ticker in results order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultsTable {
    pub rows: Vec<ResultsRow>,
}

impl ResultsTable {
    pub fn from_results(results: &EstimateResults) -> Self {
        let rows = results
            .iter()
            .map(|(ticker, estimate)| ResultsRow {
                ticker: ticker.to_string(),
                cells: match estimate {
                    TickerEstimate::Estimated(r) => RowCells::Estimate {
                        classical_mean: format!("{:.6}", r.classical_mean),
                        classical_positive_prob: format!("{:.4}", r.classical_positive_prob),
                        quantum_positive_prob: format!("{:.4}", r.quantum_positive_prob),
                        method: r.method_used.clone(),
                        n_samples: r.n_samples.to_string(),
                    },
                    TickerEstimate::Unavailable { error } => RowCells::Unavailable {
                        error: error.clone(),
                    },
                },
            })
            .collect();
        Self { rows }
    }

    /// HTML fragment for the results region. Cell text is inserted as-is.
    pub fn to_html(&self) -> String {
        let mut html = String::from("<table class=\"results\">\n<thead><tr>");
        for header in RESULTS_TABLE_HEADERS {
            let _ = write!(html, "<th>{}</th>", header);
        }
        html.push_str("</tr></thead>\n<tbody>\n");
        for row in &self.rows {
            let _ = write!(html, "<tr><td>{}</td>", row.ticker);
            match &row.cells {
                RowCells::Estimate { .. } => {
                    for cell in row.columns() {
                        let _ = write!(html, "<td>{}</td>", cell);
                    }
                }
                RowCells::Unavailable { error } => {
                    let _ = write!(
                        html,
                        "<td class=\"error\" colspan=\"{}\">{}</td>",
                        RESULTS_TABLE_HEADERS.len() - 1,
                        error
                    );
                }
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</tbody>\n</table>");
        html
    }
}

pub fn render_results_table(results: &EstimateResults) -> String {
    ResultsTable::from_results(results).to_html()
}
