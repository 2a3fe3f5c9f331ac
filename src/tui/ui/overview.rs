//! Overview page: model status and navigation.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::application::ModelInfo;
use crate::domain::{RiskTier, HIGH_RISK_THRESHOLD, MEDIUM_RISK_THRESHOLD};
use crate::tui::styles::ChurnTheme;

use super::render_page_header;

/// Overview state for rendering.
#[derive(Debug, Clone, Default)]
pub struct OverviewState {
    pub info: ModelInfo,
    pub feature_count: usize,
    pub categorical_count: usize,
    pub monitor_simulated: bool,
}

/// Render the overview page.
pub fn render_overview(f: &mut Frame, area: Rect, state: &OverviewState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(area);

    render_page_header(f, chunks[0], "Inicio", "Predicción de abandono de clientes");

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);

    render_status_panels(f, columns[0], state);
    render_navigation(f, columns[1]);
}

fn render_status_panels(f: &mut Frame, area: Rect, state: &OverviewState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // model status
            Constraint::Length(3), // class balance
            Constraint::Min(0),    // tiers
        ])
        .margin(1)
        .split(area);

    let info = &state.info;
    let status_items = vec![
        format_status_item("Modelo cargado", true),
        format_status_item("Manifiesto verificado", info.verified),
        Line::from(vec![
            Span::styled("  Origen: ", ChurnTheme::text_secondary()),
            Span::styled(info.source.clone(), ChurnTheme::text()),
        ]),
        Line::from(vec![
            Span::styled("  Variables: ", ChurnTheme::text_secondary()),
            Span::styled(state.feature_count.to_string(), ChurnTheme::text()),
            Span::styled("  Categóricas: ", ChurnTheme::text_secondary()),
            Span::styled(state.categorical_count.to_string(), ChurnTheme::text()),
        ]),
        Line::from(vec![
            Span::styled("  Monitoreo: ", ChurnTheme::text_secondary()),
            if state.monitor_simulated {
                Span::styled("DEMO (datos simulados)", ChurnTheme::warning())
            } else {
                Span::styled("histórico real", ChurnTheme::success())
            },
        ]),
    ];

    let status_block = Block::default()
        .title(Span::styled(" Estado del Sistema ", ChurnTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(ChurnTheme::border());
    f.render_widget(Paragraph::new(status_items).block(status_block), chunks[0]);

    let balance_block = Block::default()
        .title(Span::styled(" Tasa de Churn (entrenamiento) ", ChurnTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(ChurnTheme::border());
    match info.class_counts {
        Some(counts) => {
            let rate = counts.churn_rate();
            let gauge = Gauge::default()
                .block(balance_block)
                .gauge_style(ChurnTheme::churn_gauge(rate))
                .ratio(rate.clamp(0.0, 1.0))
                .label(format!("{:.1}% de {} clientes", rate * 100.0, counts.total()));
            f.render_widget(gauge, chunks[1]);
        }
        None => {
            let p = Paragraph::new(Span::styled(" sin datos", ChurnTheme::text_muted())).block(balance_block);
            f.render_widget(p, chunks[1]);
        }
    }

    let tiers: Vec<Line> = RiskTier::ALL
        .iter()
        .map(|&tier| {
            let range = match tier {
                RiskTier::Bajo => format!("p < {MEDIUM_RISK_THRESHOLD}"),
                RiskTier::Medio => format!("{MEDIUM_RISK_THRESHOLD} ≤ p < {HIGH_RISK_THRESHOLD}"),
                RiskTier::Alto => format!("p ≥ {HIGH_RISK_THRESHOLD}"),
            };
            Line::from(vec![
                Span::styled(format!("  {:<6}", tier.as_str()), ChurnTheme::risk_tier(tier)),
                Span::styled(format!("{range:<16}"), ChurnTheme::text()),
                Span::styled(tier.advice(), ChurnTheme::text_muted()),
            ])
        })
        .collect();

    let tier_block = Block::default()
        .title(Span::styled(" Niveles de Riesgo ", ChurnTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(ChurnTheme::border());
    f.render_widget(Paragraph::new(tiers).block(tier_block), chunks[2]);
}

fn format_status_item(label: &str, ok: bool) -> Line<'static> {
    let (icon, style) = if ok {
        ("OK", ChurnTheme::success())
    } else {
        ("--", ChurnTheme::warning())
    };

    Line::from(vec![
        Span::styled(format!("  {icon} "), style),
        Span::styled(label.to_string(), ChurnTheme::text()),
    ])
}

fn render_navigation(f: &mut Frame, area: Rect) {
    let pages = [
        ("2", "Predicción individual", "Formulario de cliente con probabilidad, nivel y factores."),
        ("3", "Predicción por lotes", "Puntuar un CSV y exportar predicciones_churn.csv."),
        ("4", "Insights del modelo", "Importancia de variables, métricas y segmentos."),
        ("5", "Monitoreo", "Evolución de métricas y alertas de drift."),
    ];

    let mut lines = Vec::with_capacity(pages.len() * 3);
    for (key, title, desc) in pages {
        lines.push(Line::from(vec![
            Span::styled(format!("[{key}] "), ChurnTheme::key_hint()),
            Span::styled(title, ChurnTheme::title()),
        ]));
        lines.push(Line::from(Span::styled(format!("    {desc}"), ChurnTheme::text_secondary())));
        lines.push(Line::from(""));
    }

    let block = Block::default()
        .title(Span::styled(" Páginas ", ChurnTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(ChurnTheme::border());

    let inner = Layout::default()
        .margin(1)
        .constraints([Constraint::Min(0)])
        .split(area)[0];
    f.render_widget(Paragraph::new(lines).block(block), inner);
}
