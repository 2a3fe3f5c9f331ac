//! Monitoring page: metric trends and drift alerts.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Sparkline},
    Frame,
};

use crate::application::{MetricStatus, MonitoringReport};
use crate::domain::ModelMetric;
use crate::tui::styles::ChurnTheme;

use super::{render_error_panel, render_key_hints, render_page_header};

/// Monitoring state
#[derive(Debug, Clone, Default)]
pub struct MonitoringState {
    pub report: Option<MonitoringReport>,
    pub selected_metric: usize,
    pub error: Option<String>,
}

impl MonitoringState {
    #[must_use]
    pub fn selected(&self) -> ModelMetric {
        ModelMetric::ALL[self.selected_metric % ModelMetric::ALL.len()]
    }

    pub fn next_metric(&mut self) {
        self.selected_metric = (self.selected_metric + 1) % ModelMetric::ALL.len();
    }

    pub fn prev_metric(&mut self) {
        self.selected_metric = (self.selected_metric + ModelMetric::ALL.len() - 1) % ModelMetric::ALL.len();
    }
}

/// Render the monitoring page
pub fn render_monitoring(f: &mut Frame, area: Rect, state: &MonitoringState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Length(1), // Source banner
            Constraint::Length(7), // Metric cards
            Constraint::Min(0),    // Trends
            Constraint::Length(2), // Footer
        ])
        .split(area);

    render_page_header(f, chunks[0], "Monitoreo", "Rendimiento del modelo en el tiempo");

    if let Some(err) = &state.error {
        let body = Rect {
            height: chunks[1].height + chunks[2].height + chunks[3].height,
            ..chunks[1]
        };
        render_error_panel(f, body, "Métricas no disponibles", err);
    } else if let Some(report) = &state.report {
        render_banner(f, chunks[1], report);
        render_cards(f, chunks[2], report, state.selected());
        render_trends(f, chunks[3], report, state.selected());
    }

    render_key_hints(
        f,
        chunks[4],
        &[
            ("←→", "Métrica"),
            ("↑↓", "Umbral ±0.01"),
            ("+/-", "Ventana"),
            ("R", "Recargar"),
        ],
    );
}

fn render_banner(f: &mut Frame, area: Rect, report: &MonitoringReport) {
    let line = if report.simulated() {
        Line::from(vec![
            Span::styled(" DEMO ", ChurnTheme::header()),
            Span::styled(
                format!(" {} · no son métricas reales del modelo", report.history.origin),
                ChurnTheme::warning(),
            ),
        ])
    } else {
        Line::from(vec![
            Span::styled(" Fuente: ", ChurnTheme::text_secondary()),
            Span::styled(report.history.origin.clone(), ChurnTheme::text()),
        ])
    };
    f.render_widget(Paragraph::new(line), area);
}

fn render_cards(f: &mut Frame, area: Rect, report: &MonitoringReport, selected: ModelMetric) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    for (i, status) in report.statuses.iter().enumerate().take(columns.len()) {
        render_card(f, columns[i], status, report.window, status.metric == selected);
    }
}

fn render_card(f: &mut Frame, area: Rect, status: &MetricStatus, window: usize, focused: bool) {
    let delta_style = if status.delta >= 0.0 {
        ChurnTheme::success()
    } else {
        ChurnTheme::danger()
    };
    let (flag, flag_style) = if status.drifting {
        ("DRIFT", ChurnTheme::danger().add_modifier(Modifier::BOLD))
    } else {
        ("estable", ChurnTheme::success())
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(format!("{:.3}", status.latest), ChurnTheme::title()),
            Span::styled(format!("  {:+.3}", status.delta), delta_style),
        ]),
        Line::from(vec![
            Span::styled(format!("media {window}d: "), ChurnTheme::text_secondary()),
            Span::styled(
                format!("{:.3}", status.window_mean),
                ChurnTheme::metric(status.window_mean, status.threshold),
            ),
        ]),
        Line::from(vec![
            Span::styled("umbral: ", ChurnTheme::text_secondary()),
            Span::styled(format!("{:.2}", status.threshold), ChurnTheme::text()),
        ]),
        Line::from(Span::styled(flag, flag_style)),
    ];

    let block = Block::default()
        .title(Span::styled(format!(" {} ", status.metric.name()), ChurnTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(if focused {
            ChurnTheme::border_focused()
        } else {
            ChurnTheme::border()
        });

    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).block(block),
        area,
    );
}

fn render_trends(f: &mut Frame, area: Rect, report: &MonitoringReport, selected: ModelMetric) {
    let series = report.history.series(selected);
    let threshold = report.status(selected).map_or(0.0, |s| s.threshold);

    // Sparkline needs integers; plot in thousandths above the series floor.
    let floor = series
        .iter()
        .copied()
        .fold(threshold, f64::min)
        .max(0.0);
    let data: Vec<u64> = series
        .iter()
        .map(|v| (((v - floor) * 1000.0).round().max(0.0) as u64) + 1)
        .collect();

    let (first, last) = match (report.history.samples.first(), report.history.samples.last()) {
        (Some(a), Some(b)) => (a.date.to_string(), b.date.to_string()),
        _ => (String::new(), String::new()),
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let sparkline = Sparkline::default()
        .block(
            Block::default()
                .title(Span::styled(
                    format!(" {} · {} días ", selected.name(), series.len()),
                    ChurnTheme::subtitle(),
                ))
                .borders(Borders::ALL)
                .border_style(ChurnTheme::border()),
        )
        .data(&data)
        .style(ChurnTheme::info());
    f.render_widget(sparkline, chunks[0]);

    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(format!(" {first}"), ChurnTheme::text_muted()),
            Span::styled(" → ", ChurnTheme::text_muted()),
            Span::styled(last, ChurnTheme::text_muted()),
        ])),
        chunks[1],
    );
}
