use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use super::chart::ChartSpec;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Everything currently shown in the display regions.
#[derive(Debug, Clone, Default)]
pub struct ReportPage {
    pub status: String,
    pub returns_chart: Option<ChartSpec>,
    pub estimates_chart: Option<ChartSpec>,
    pub table_html: Option<String>,
    pub generated_at: Option<DateTime<Utc>>,
}

impl ReportPage {
    /// Standalone HTML page drawing both charts with Plotly.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str("<title>Positive-Return Estimation</title>\n");
        let _ = writeln!(html, "<script src=\"{}\"></script>", PLOTLY_CDN);
        html.push_str(
            "<style>body{font-family:sans-serif;margin:2em}\
             table.results{border-collapse:collapse}\
             table.results td,table.results th{border:1px solid #ccc;padding:4px 8px;text-align:right}\
             td.error{color:#b00;text-align:left}</style>\n",
        );
        html.push_str("</head>\n<body>\n");
        let _ = writeln!(html, "<p id=\"status\">{}</p>", escape_text(&self.status));
        if let Some(at) = self.generated_at {
            let _ = writeln!(
                html,
                "<p class=\"generated\">Generated {}</p>",
                at.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
        html.push_str("<div id=\"returns_chart\"></div>\n");
        html.push_str("<div id=\"estimates_chart\"></div>\n");
        let _ = writeln!(
            html,
            "<div id=\"results_table\">{}</div>",
            self.table_html.as_deref().unwrap_or("")
        );

        html.push_str("<script>\n");
        for (target, chart) in [
            ("returns_chart", &self.returns_chart),
            ("estimates_chart", &self.estimates_chart),
        ] {
            if let Some(chart) = chart {
                if let Ok(json) = serde_json::to_string(chart) {
                    let _ = writeln!(
                        html,
                        "(function(){{var fig={};Plotly.newPlot('{}',fig.data,fig.layout);}})();",
                        script_safe(&json),
                        target
                    );
                }
            }
        }
        html.push_str("</script>\n</body>\n</html>\n");
        html
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

// JSON embedded in a <script> block must not close the element early.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}
