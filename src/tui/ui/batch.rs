//! Batch scoring page: load a CSV, review scores, export.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table},
    Frame,
};

use crate::application::batch::{DEFAULT_OUTPUT_FILE, EXAMPLE_FILE};
use crate::application::{BatchSummary, ScoredBatch};
use crate::domain::{Categorical, LabelCatalog, RiskTier};
use crate::tui::styles::ChurnTheme;

use super::{render_error_panel, render_key_hints, render_page_header};

/// Which path the user is typing into, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathEdit {
    Input,
    Output,
}

/// Batch page state
pub struct BatchState {
    pub input_path: String,
    pub output_path: String,
    pub editing: Option<PathEdit>,
    pub scored: Option<ScoredBatch>,
    pub summary: Option<BatchSummary>,
    pub scroll: usize,

    /// `Ok` for confirmations, `Err` for failures.
    pub status: Option<Result<String, String>>,
}

impl Default for BatchState {
    fn default() -> Self {
        Self {
            input_path: EXAMPLE_FILE.to_string(),
            output_path: DEFAULT_OUTPUT_FILE.to_string(),
            editing: None,
            scored: None,
            summary: None,
            scroll: 0,
            status: None,
        }
    }
}

impl BatchState {
    pub fn path_mut(&mut self) -> Option<&mut String> {
        match self.editing? {
            PathEdit::Input => Some(&mut self.input_path),
            PathEdit::Output => Some(&mut self.output_path),
        }
    }

    pub fn scroll_down(&mut self) {
        let rows = self.scored.as_ref().map_or(0, |s| s.predictions.len());
        if self.scroll + 1 < rows {
            self.scroll += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }
}

/// Render the batch page
pub fn render_batch(f: &mut Frame, area: Rect, state: &BatchState, labels: &LabelCatalog) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Length(4), // Paths
            Constraint::Min(0),    // Results
            Constraint::Length(2), // Footer
        ])
        .split(area);

    render_page_header(f, chunks[0], "Predicción por Lotes", "Archivo CSV con las 21 columnas del cliente");
    render_paths(f, chunks[1], state);

    match (&state.scored, &state.summary, &state.status) {
        (Some(scored), Some(summary), _) => {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
                .split(chunks[2]);
            render_summary(f, columns[0], summary);
            render_rows(f, columns[1], scored, state.scroll, labels);
        }
        (_, _, Some(Err(message))) => render_error_panel(f, chunks[2], "No se pudo procesar el archivo", message),
        _ => {
            let hint = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("Pulse [G] para generar {EXAMPLE_FILE} y [Enter] para procesarlo."),
                    ChurnTheme::text_secondary(),
                )),
            ])
            .block(Block::default().borders(Borders::ALL).border_style(ChurnTheme::border()));
            f.render_widget(hint, chunks[2]);
        }
    }

    render_key_hints(
        f,
        chunks[3],
        &[
            ("E", "Editar entrada"),
            ("O", "Editar salida"),
            ("Enter", "Procesar"),
            ("X", "Exportar"),
            ("G", "Generar ejemplo"),
            ("↑↓", "Desplazar"),
        ],
    );
}

fn render_paths(f: &mut Frame, area: Rect, state: &BatchState) {
    let path_line = |label: &str, value: &str, active: bool| {
        let style = if active { ChurnTheme::selected() } else { ChurnTheme::text() };
        Line::from(vec![
            Span::styled(format!(" {label:<10}"), ChurnTheme::text_secondary()),
            Span::styled(value.to_string(), style),
            if active {
                Span::styled("▌", ChurnTheme::focused())
            } else {
                Span::raw("")
            },
        ])
    };

    let status = match &state.status {
        Some(Ok(message)) => Line::from(Span::styled(format!(" {message}"), ChurnTheme::success())),
        Some(Err(_)) => Line::from(Span::styled(" Error (ver detalle abajo)", ChurnTheme::danger())),
        None => Line::from(""),
    };

    let lines = vec![
        path_line("Entrada:", &state.input_path, state.editing == Some(PathEdit::Input)),
        path_line("Salida:", &state.output_path, state.editing == Some(PathEdit::Output)),
        status,
    ];

    let block = Block::default()
        .title(Span::styled(" Archivos ", ChurnTheme::subtitle()))
        .borders(Borders::LEFT | Borders::RIGHT | Borders::TOP)
        .border_style(ChurnTheme::border());
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_summary(f: &mut Frame, area: Rect, summary: &BatchSummary) {
    let block = Block::default()
        .title(Span::styled(" Resumen ", ChurnTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(ChurnTheme::border());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let header = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(" Clientes: ", ChurnTheme::text_secondary()),
            Span::styled(summary.total.to_string(), ChurnTheme::text()),
        ]),
        Line::from(vec![
            Span::styled(" Probabilidad media: ", ChurnTheme::text_secondary()),
            Span::styled(format!("{:.1}%", summary.mean_probability * 100.0), ChurnTheme::text()),
        ]),
    ]);
    f.render_widget(header, chunks[0]);

    for (i, tier) in [RiskTier::Alto, RiskTier::Medio, RiskTier::Bajo].into_iter().enumerate() {
        let pct = summary.percentage(tier);
        let gauge = Gauge::default()
            .gauge_style(ChurnTheme::risk_tier(tier))
            .ratio((pct / 100.0).clamp(0.0, 1.0))
            .label(format!("{} {} ({:.1}%)", tier, summary.count(tier), pct));
        f.render_widget(gauge, chunks[1 + i]);
    }

    let mut top = vec![Line::from(""), Line::from(Span::styled(" Mayor riesgo", ChurnTheme::subtitle()))];
    top.extend(summary.top.iter().map(|(row, p)| {
        Line::from(vec![
            Span::styled(format!("  fila {:<4}", row + 1), ChurnTheme::text_secondary()),
            Span::styled(format!("{:.1}%", p * 100.0), ChurnTheme::churn_gauge(*p)),
        ])
    }));
    f.render_widget(Paragraph::new(top), chunks[4]);
}

fn render_rows(f: &mut Frame, area: Rect, scored: &ScoredBatch, scroll: usize, labels: &LabelCatalog) {
    let header = Row::new(vec![
        Cell::from("#"),
        Cell::from(labels.column_label("tenure")),
        Cell::from(labels.column_label("Contract")),
        Cell::from(labels.column_label("MonthlyCharges")),
        Cell::from("Probabilidad"),
        Cell::from("Nivel"),
    ])
    .style(ChurnTheme::subtitle());

    let rows: Vec<Row> = scored
        .records
        .iter()
        .zip(&scored.predictions)
        .enumerate()
        .skip(scroll)
        .map(|(i, (record, prediction))| {
            let tier = prediction.risk_tier();
            Row::new(vec![
                Cell::from((i + 1).to_string()),
                Cell::from(record.tenure.to_string()),
                Cell::from(labels.value_label(record.contract.as_str()).to_string()),
                Cell::from(format!("{:.2}", record.monthly_charges)),
                Cell::from(format!("{:.1}%", prediction.churn_probability() * 100.0)),
                Cell::from(tier.as_str()).style(ChurnTheme::risk_tier(tier)),
            ])
            .style(ChurnTheme::text())
        })
        .collect();

    let widths = [
        Constraint::Length(5),
        Constraint::Length(18),
        Constraint::Length(18),
        Constraint::Length(16),
        Constraint::Length(13),
        Constraint::Length(6),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(Span::styled(" Predicciones ", ChurnTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(ChurnTheme::border()),
    );
    f.render_widget(table, area);
}
