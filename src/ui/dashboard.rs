use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget, Wrap},
};

use crate::controller::RunPhase;
use crate::input::FormField;
use crate::model::EstimationMethod;
use crate::render::table::{ResultsTable, RowCells, RESULTS_TABLE_HEADERS};

fn panel_block(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
}

pub struct FormPanel<'a> {
    pub tickers: &'a str,
    pub period: &'a str,
    pub use_quantum: bool,
    pub shots: &'a str,
    pub focus: FormField,
}

impl Widget for FormPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let field_line = |field: FormField, value: String| {
            let focused = field == self.focus;
            let marker = if focused { "> " } else { "  " };
            let value_style = if focused {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(vec![
                Span::styled(marker, Style::default().fg(Color::Yellow)),
                Span::styled(
                    format!("{:<8}", field.label()),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(value, value_style),
            ])
        };

        let cursor = |field: FormField| if field == self.focus { "_" } else { "" };
        let lines = vec![
            field_line(
                FormField::Tickers,
                format!("{}{}", self.tickers, cursor(FormField::Tickers)),
            ),
            field_line(FormField::Period, format!("< {} >", self.period)),
            field_line(
                FormField::Quantum,
                if self.use_quantum { "[x]" } else { "[ ]" }.to_string(),
            ),
            field_line(
                FormField::Shots,
                format!("{}{}", self.shots, cursor(FormField::Shots)),
            ),
        ];

        Paragraph::new(lines)
            .block(panel_block(" Run "))
            .render(area, buf);
    }
}

pub struct StatusBar<'a> {
    pub phase: RunPhase,
    pub status: &'a str,
    pub base_url: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (phase_label, phase_color) = match self.phase {
            RunPhase::Idle => ("IDLE", Color::DarkGray),
            RunPhase::FetchingTimeseries => ("FETCHING", Color::Yellow),
            RunPhase::RunningEstimation => ("ESTIMATING", Color::Yellow),
            RunPhase::Done => ("DONE", Color::Green),
            RunPhase::Failed => ("FAILED", Color::Red),
            RunPhase::Cancelled => ("CANCELLED", Color::DarkGray),
        };

        let line = Line::from(vec![
            Span::styled(
                " qae-dashboard ",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("| ", Style::default().fg(Color::DarkGray)),
            Span::styled(self.base_url, Style::default().fg(Color::Cyan)),
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                phase_label,
                Style::default()
                    .fg(phase_color)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            Span::styled(self.status, Style::default().fg(Color::White)),
        ]);

        buf.set_line(area.x, area.y, &line, area.width);
    }
}

pub struct ResultsTablePanel<'a> {
    table: Option<&'a ResultsTable>,
}

impl<'a> ResultsTablePanel<'a> {
    pub fn new(table: Option<&'a ResultsTable>) -> Self {
        Self { table }
    }
}

impl Widget for ResultsTablePanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = panel_block(" Results ");
        let Some(table) = self.table else {
            Paragraph::new(Line::styled("no results", Style::default().fg(Color::DarkGray)))
                .block(block)
                .render(area, buf);
            return;
        };

        let header = Row::new(RESULTS_TABLE_HEADERS.iter().map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
        }));

        let rows = table.rows.iter().map(|row| {
            let mut cells = vec![Cell::from(row.ticker.clone()).style(Style::default().fg(Color::Cyan))];
            match &row.cells {
                RowCells::Estimate { method, .. } => {
                    let method_color = match EstimationMethod::from_label(method) {
                        EstimationMethod::Quantum => Color::Magenta,
                        EstimationMethod::ClassicalFallback => Color::Yellow,
                        EstimationMethod::Classical => Color::White,
                        EstimationMethod::Other(_) => Color::Gray,
                    };
                    let columns = row.columns();
                    cells.extend(columns[..3].iter().map(|c| Cell::from(c.to_string())));
                    cells.push(Cell::from(columns[3].to_string()).style(Style::default().fg(method_color)));
                    cells.push(Cell::from(columns[4].to_string()));
                }
                RowCells::Unavailable { error } => {
                    cells.push(Cell::from(error.clone()).style(Style::default().fg(Color::Red)));
                }
            }
            Row::new(cells)
        });

        let widths = [
            Constraint::Length(8),
            Constraint::Length(15),
            Constraint::Length(15),
            Constraint::Length(14),
            Constraint::Length(19),
            Constraint::Length(8),
        ];
        Widget::render(
            Table::new(rows, widths).header(header).block(block),
            area,
            buf,
        );
    }
}

pub struct LogPanel<'a> {
    messages: &'a [String],
}

impl<'a> LogPanel<'a> {
    pub fn new(messages: &'a [String]) -> Self {
        Self { messages }
    }
}

impl Widget for LogPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let visible = area.height.saturating_sub(2) as usize;
        let start = self.messages.len().saturating_sub(visible);
        let lines: Vec<Line> = self.messages[start..]
            .iter()
            .map(|m| Line::styled(m.as_str(), Style::default().fg(Color::Gray)))
            .collect();
        Paragraph::new(lines)
            .block(panel_block(" Log "))
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}

pub struct KeybindBar;

impl Widget for KeybindBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));
        let text = |t: &'static str| Span::styled(t, Style::default().fg(Color::DarkGray));
        let line = Line::from(vec![
            key(" [Enter]"),
            text(" run  "),
            key("[Tab]"),
            text(" next field  "),
            key("[Space]"),
            text(" toggle/cycle  "),
            key("[Ctrl+U]"),
            text(" clear  "),
            key("[Esc]"),
            text(" quit"),
        ]);

        buf.set_line(area.x, area.y, &line, area.width);
    }
}
