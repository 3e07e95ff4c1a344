use std::path::PathBuf;

use serde_json::json;

use qae_dashboard::model::EstimationResponse;
use qae_dashboard::render::{render_estimates_chart, ResultsTable};
use qae_dashboard::sink::{ChartTarget, DisplaySink, ReportSink, REPORT_FILE, TABLE_FILE};

fn scratch_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("qae-dashboard-{}-{}", name, uuid::Uuid::new_v4()))
}

#[test]
fn report_tracks_each_region_write() {
    let dir = scratch_dir("report");
    let mut sink = ReportSink::create(&dir).unwrap();

    sink.set_status("Fetching timeseries...").unwrap();
    let page = std::fs::read_to_string(dir.join(REPORT_FILE)).unwrap();
    assert!(page.contains("Fetching timeseries..."));
    assert!(!page.contains("Plotly.newPlot"));

    let estimation: EstimationResponse = serde_json::from_value(json!({
        "status": "ok",
        "results": {
            "AAPL": {"classical_mean": 0.001, "classical_positive_prob": 0.6, "quantum_positive_prob": 0.58, "method_used": "quantum", "n_samples": 200}
        }
    }))
    .unwrap();
    let chart = render_estimates_chart(&estimation.results);
    sink.draw_chart(ChartTarget::Estimates, &chart).unwrap();
    sink.replace_table(&ResultsTable::from_results(&estimation.results))
        .unwrap();
    sink.set_status("Done").unwrap();

    let chart_json: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.join("estimates_chart.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(chart_json["data"][0]["y"][0], 0.6);
    assert!(!dir.join("returns_chart.json").exists());

    let table = std::fs::read_to_string(dir.join(TABLE_FILE)).unwrap();
    assert!(table.contains("<td>0.6000</td>"));

    let page = std::fs::read_to_string(sink.report_path()).unwrap();
    assert!(page.contains("<p id=\"status\">Done</p>"));
    assert!(page.contains("Plotly.newPlot('estimates_chart'"));
    assert!(!page.contains("Plotly.newPlot('returns_chart'"));
    assert!(page.contains("<td>0.5800</td>"));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn unwritable_dir_is_reported() {
    let file = scratch_dir("not-a-dir");
    std::fs::write(&file, b"x").unwrap();
    assert!(ReportSink::create(&file).is_err());
    std::fs::remove_file(&file).ok();
}
