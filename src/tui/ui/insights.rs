//! Insights page: feature importance, offline metrics and segments.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table},
    Frame,
};

use crate::application::{FeatureImportance, Impact, ImportanceSummary, SegmentRate};
use crate::domain::{ClassCounts, LabelCatalog, ReportedMetrics};
use crate::tui::styles::ChurnTheme;

use super::{render_key_hints, render_page_header};

/// Insights state
#[derive(Debug, Clone, Default)]
pub struct InsightsState {
    pub importance: Vec<FeatureImportance>,
    pub summary: Option<ImportanceSummary>,
    pub metrics: Option<ReportedMetrics>,
    pub class_counts: Option<ClassCounts>,

    /// Fields that can be segmented on, and the one shown.
    pub segment_fields: Vec<String>,
    pub segment_index: usize,
    pub segments: Vec<SegmentRate>,

    /// Where the segment data came from.
    pub segment_source: String,
}

impl InsightsState {
    #[must_use]
    pub fn segment_field(&self) -> Option<&str> {
        self.segment_fields.get(self.segment_index).map(String::as_str)
    }

    pub fn cycle_segment(&mut self, delta: i32) {
        let len = self.segment_fields.len() as i64;
        if len > 0 {
            self.segment_index = (self.segment_index as i64 + i64::from(delta)).rem_euclid(len) as usize;
        }
    }
}

/// Render the insights page
pub fn render_insights(f: &mut Frame, area: Rect, state: &InsightsState, labels: &LabelCatalog) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0), Constraint::Length(2)])
        .split(area);

    render_page_header(f, chunks[0], "Insights del Modelo", "Qué variables mueven la probabilidad de churn");

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);

    render_importance(f, columns[0], state);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(0)])
        .split(columns[1]);
    render_metrics(f, right[0], state);
    render_segments(f, right[1], state, labels);

    render_key_hints(f, chunks[2], &[("←→", "Segmento"), ("R", "Recalcular")]);
}

fn render_importance(f: &mut Frame, area: Rect, state: &InsightsState) {
    let max = state
        .importance
        .first()
        .map_or(1.0, |top| top.coefficient.abs())
        .max(f64::EPSILON);

    let rows: Vec<Row> = state
        .importance
        .iter()
        .map(|feature| {
            let style = match feature.impact {
                Impact::IncreasesChurn => ChurnTheme::danger(),
                Impact::ReducesChurn => ChurnTheme::success(),
            };
            let bar = "█".repeat(((feature.coefficient.abs() / max) * 12.0).round() as usize);
            Row::new(vec![
                Cell::from(feature.display_name.clone()),
                Cell::from(format!("{:+.3}", feature.coefficient)),
                Cell::from(bar).style(style),
                Cell::from(feature.impact.label()).style(style),
            ])
            .style(ChurnTheme::text())
        })
        .collect();

    let widths = [
        Constraint::Min(24),
        Constraint::Length(8),
        Constraint::Length(13),
        Constraint::Length(14),
    ];

    let title = match &state.summary {
        Some(s) => format!(" Importancia de Variables ({} ↑ / {} ↓) ", s.increasing, s.reducing),
        None => " Importancia de Variables ".to_string(),
    };

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["Variable", "Coef.", "", "Impacto"]).style(ChurnTheme::subtitle()),
        )
        .block(
            Block::default()
                .title(Span::styled(title, ChurnTheme::subtitle()))
                .borders(Borders::ALL)
                .border_style(ChurnTheme::border()),
        );
    f.render_widget(table, area);
}

fn render_metrics(f: &mut Frame, area: Rect, state: &InsightsState) {
    let metric = |name: &str, value: Option<f64>| {
        Line::from(vec![
            Span::styled(format!(" {name:<14}"), ChurnTheme::text_secondary()),
            Span::styled(
                value.map_or_else(|| "n/d".to_string(), |v| format!("{v:.3}")),
                ChurnTheme::text(),
            ),
        ])
    };

    let m = state.metrics;
    let mut lines = vec![
        metric("F1", m.map(|m| m.f1)),
        metric("ROC AUC", m.map(|m| m.roc_auc)),
        metric("Precisión", m.map(|m| m.precision)),
        metric("Recall", m.map(|m| m.recall)),
        metric("Especificidad", m.map(|m| m.specificity)),
    ];

    if let Some(counts) = state.class_counts {
        lines.push(Line::from(vec![
            Span::styled(" Clases        ", ChurnTheme::text_secondary()),
            Span::styled(format!("{} permanecen", counts.retained), ChurnTheme::success()),
            Span::styled(" / ", ChurnTheme::text_muted()),
            Span::styled(format!("{} abandonan", counts.churned), ChurnTheme::danger()),
        ]));
    }

    if let Some(strongest) = state.summary.as_ref().and_then(|s| s.strongest_increasing.as_ref()) {
        lines.push(Line::from(vec![
            Span::styled(" Mayor riesgo  ", ChurnTheme::text_secondary()),
            Span::styled(strongest.display_name.clone(), ChurnTheme::danger()),
        ]));
    }

    let block = Block::default()
        .title(Span::styled(" Métricas del Modelo ", ChurnTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(ChurnTheme::border());
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_segments(f: &mut Frame, area: Rect, state: &InsightsState, labels: &LabelCatalog) {
    let field = state.segment_field().unwrap_or_default();
    let block = Block::default()
        .title(Span::styled(
            format!(" Churn por {} ", labels.column_label(field)),
            ChurnTheme::subtitle(),
        ))
        .borders(Borders::ALL)
        .border_style(ChurnTheme::border());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut constraints = vec![Constraint::Length(1)];
    constraints.extend(state.segments.iter().map(|_| Constraint::Length(1)));
    constraints.push(Constraint::Min(0));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    f.render_widget(
        Paragraph::new(Span::styled(format!(" {}", state.segment_source), ChurnTheme::text_muted())),
        rows[0],
    );

    for (i, segment) in state.segments.iter().enumerate() {
        let rate = segment.rate();
        let gauge = Gauge::default()
            .gauge_style(ChurnTheme::churn_gauge(rate))
            .ratio(rate.clamp(0.0, 1.0))
            .label(format!(
                "{}: {:.0}% ({}/{})",
                labels.value_label(&segment.category),
                rate * 100.0,
                segment.churned,
                segment.total
            ));
        f.render_widget(gauge, rows[i + 1]);
    }
}
