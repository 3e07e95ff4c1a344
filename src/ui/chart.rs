use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    symbols,
    text::Line,
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget},
};

use crate::render::chart::{ChartSpec, CLASSICAL_SERIES, QUANTUM_SERIES};

const SERIES_COLORS: [Color; 6] = [
    Color::Cyan,
    Color::Yellow,
    Color::Magenta,
    Color::Green,
    Color::LightRed,
    Color::LightBlue,
];

fn panel_block(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
}

fn placeholder(title: &str, area: Rect, buf: &mut Buffer) {
    Paragraph::new(Line::styled("no data", Style::default().fg(Color::DarkGray)))
        .block(panel_block(title))
        .render(area, buf);
}

/// Line chart of the returns figure. Points are plotted by record index;
/// the first and last dates label the x axis.
pub struct ReturnsChart<'a> {
    title: &'a str,
    spec: Option<&'a ChartSpec>,
}

impl<'a> ReturnsChart<'a> {
    pub fn new(title: &'a str, spec: Option<&'a ChartSpec>) -> Self {
        Self { title, spec }
    }
}

impl Widget for ReturnsChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let spec = match self.spec {
            Some(spec) if !spec.is_empty() => spec,
            _ => return placeholder(self.title, area, buf),
        };
        let (lo, hi) = spec.y_bounds().unwrap_or((-0.01, 0.01));
        let (lo, hi) = if (hi - lo).abs() < f64::EPSILON {
            (lo - 0.01, hi + 0.01)
        } else {
            (lo, hi)
        };

        let points: Vec<Vec<(f64, f64)>> = spec
            .data
            .iter()
            .map(|trace| {
                trace
                    .y
                    .iter()
                    .enumerate()
                    .filter_map(|(i, y)| y.map(|y| (i as f64, y)))
                    .collect()
            })
            .collect();
        let datasets: Vec<Dataset> = spec
            .data
            .iter()
            .zip(points.iter())
            .enumerate()
            .map(|(i, (trace, pts))| {
                Dataset::default()
                    .name(trace.name.clone())
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(SERIES_COLORS[i % SERIES_COLORS.len()]))
                    .data(pts)
            })
            .collect();

        let n = spec.data.iter().map(|t| t.x.len()).max().unwrap_or(0);
        let label = |v: Option<&serde_json::Value>| match v {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };
        let first_x = spec.data.first().and_then(|t| t.x.first());
        let last_x = spec.data.first().and_then(|t| t.x.last());

        Chart::new(datasets)
            .block(panel_block(&spec.layout.title))
            .x_axis(
                Axis::default()
                    .style(Style::default().fg(Color::DarkGray))
                    .bounds([0.0, n.saturating_sub(1).max(1) as f64])
                    .labels([label(first_x), label(last_x)]),
            )
            .y_axis(
                Axis::default()
                    .style(Style::default().fg(Color::DarkGray))
                    .bounds([lo, hi])
                    .labels([format!("{:.3}", lo), format!("{:.3}", hi)]),
            )
            .render(area, buf);
    }
}

/// Grouped bars of the estimates figure, one group per ticker.
pub struct EstimatesChart<'a> {
    title: &'a str,
    spec: Option<&'a ChartSpec>,
}

impl<'a> EstimatesChart<'a> {
    pub fn new(title: &'a str, spec: Option<&'a ChartSpec>) -> Self {
        Self { title, spec }
    }
}

fn series_color(name: &str) -> Color {
    match name {
        CLASSICAL_SERIES => Color::Cyan,
        QUANTUM_SERIES => Color::Magenta,
        _ => Color::White,
    }
}

impl Widget for EstimatesChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let spec = match self.spec {
            Some(spec) if !spec.is_empty() => spec,
            _ => return placeholder(self.title, area, buf),
        };

        let ticker_count = spec.data.iter().map(|t| t.x.len()).max().unwrap_or(0);
        let mut chart = BarChart::default()
            .block(panel_block(&spec.layout.title))
            .bar_width(4)
            .bar_gap(1)
            .group_gap(3)
            .max(100);

        for i in 0..ticker_count {
            let ticker = spec
                .data
                .first()
                .and_then(|t| t.x.get(i))
                .and_then(|v| v.as_str())
                .unwrap_or("?")
                .to_string();
            let bars: Vec<Bar> = spec
                .data
                .iter()
                .map(|trace| {
                    let p = trace.y.get(i).copied().flatten();
                    let style = Style::default().fg(series_color(&trace.name));
                    match p {
                        Some(p) => Bar::default()
                            .value((p.clamp(0.0, 1.0) * 100.0).round() as u64)
                            .text_value(format!("{:.2}", p))
                            .style(style),
                        None => Bar::default().value(0).text_value("-".to_string()).style(style),
                    }
                })
                .collect();
            chart = chart.data(BarGroup::default().label(Line::from(ticker)).bars(&bars));
        }

        chart.render(area, buf);
    }
}
