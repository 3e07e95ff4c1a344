use serde::Serialize;
use serde_json::Value;

use crate::model::{EstimateResults, ReturnRecord};

pub const RETURNS_CHART_TITLE: &str = "Daily Returns";
pub const ESTIMATES_CHART_TITLE: &str = "Positive-Return Probability";
pub const CLASSICAL_SERIES: &str = "Classical P(return>0)";
pub const QUANTUM_SERIES: &str = "Quantum P(return>0)";

/// Plotly-style figure: `{data: [...], layout: {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    Scatter,
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TraceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<&'static str>,
    pub x: Vec<Value>,
    /// `None` serializes as `null`, which the plotting library draws as a gap.
    pub y: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barmode: Option<&'static str>,
    pub xaxis: Axis,
    pub yaxis: Axis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
}

impl Axis {
    fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
            range: None,
        }
    }
}

impl ChartSpec {
    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|t| t.x.is_empty())
    }

    /// Finite y bounds across all traces.
    pub fn y_bounds(&self) -> Option<(f64, f64)> {
        self.data
            .iter()
            .flat_map(|t| t.y.iter().flatten().copied())
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// One line series per ticker over the records' dates, in response order.
///
/// Records are taken as the backend sent them: no sorting, no dedup, no
/// gap filling. A ticker missing from a record yields a null point.
pub fn render_returns_chart(returns: &[ReturnRecord], tickers: &[String]) -> ChartSpec {
    let dates: Vec<Value> = returns.iter().map(|r| r.date.clone()).collect();
    let data = tickers
        .iter()
        .map(|ticker| Trace {
            name: ticker.clone(),
            kind: TraceKind::Scatter,
            mode: Some("lines"),
            x: dates.clone(),
            y: returns.iter().map(|r| r.value(ticker)).collect(),
        })
        .collect();

    ChartSpec {
        data,
        layout: Layout {
            title: RETURNS_CHART_TITLE.to_string(),
            barmode: None,
            xaxis: Axis::titled("Date"),
            yaxis: Axis::titled("Return"),
        },
    }
}

/// Classical and quantum positive-return probabilities as two grouped bar
/// series over the results' tickers.
pub fn render_estimates_chart(results: &EstimateResults) -> ChartSpec {
    let tickers: Vec<Value> = results
        .tickers()
        .map(|t| Value::String(t.to_string()))
        .collect();
    let classical: Vec<Option<f64>> = results
        .iter()
        .map(|(_, est)| est.record().map(|r| r.classical_positive_prob))
        .collect();
    let quantum: Vec<Option<f64>> = results
        .iter()
        .map(|(_, est)| est.record().map(|r| r.quantum_positive_prob))
        .collect();

    let bar = |name: &str, y: Vec<Option<f64>>| Trace {
        name: name.to_string(),
        kind: TraceKind::Bar,
        mode: None,
        x: tickers.clone(),
        y,
    };

    ChartSpec {
        data: vec![bar(CLASSICAL_SERIES, classical), bar(QUANTUM_SERIES, quantum)],
        layout: Layout {
            title: ESTIMATES_CHART_TITLE.to_string(),
            barmode: Some("group"),
            xaxis: Axis::titled("Ticker"),
            yaxis: Axis {
                title: "P(return>0)".to_string(),
                range: Some([0.0, 1.0]),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn returns_chart_serializes_plotly_shape() {
        let returns: Vec<ReturnRecord> = serde_json::from_value(json!([
            {"Date": "2024-01-01", "AAPL": 0.5},
        ]))
        .unwrap();
        let spec = render_returns_chart(&returns, &["AAPL".to_string()]);
        let v = serde_json::to_value(&spec).unwrap();
        assert_eq!(v["data"][0]["type"], "scatter");
        assert_eq!(v["data"][0]["mode"], "lines");
        assert_eq!(v["layout"]["title"], RETURNS_CHART_TITLE);
        assert!(v["layout"].get("barmode").is_none());
    }

    #[test]
    fn y_bounds_ignores_gaps() {
        let returns: Vec<ReturnRecord> = serde_json::from_value(json!([
            {"Date": "d1", "A": -0.2},
            {"Date": "d2", "A": null},
            {"Date": "d3", "A": 0.3},
        ]))
        .unwrap();
        let spec = render_returns_chart(&returns, &["A".to_string()]);
        assert_eq!(spec.y_bounds(), Some((-0.2, 0.3)));
        assert!(!spec.is_empty());
    }
}
