//! UI module: View components for the TUI.

pub mod batch;
pub mod insights;
pub mod monitoring;
pub mod overview;
pub mod prediction;

use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::tui::styles::{ChurnTheme, LOGO_SMALL};

pub fn render_disclaimer(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(vec![Span::styled(
            "Las probabilidades son estimaciones del modelo y no sustituyen el criterio del equipo comercial.",
            ChurnTheme::text_muted(),
        )]),
        Line::from(vec![
            Span::styled("[1-5 / F1-F5] ", ChurnTheme::key_hint()),
            Span::styled("Cambiar página  ", ChurnTheme::key_desc()),
            Span::styled("[Ctrl+Q] ", ChurnTheme::key_hint()),
            Span::styled("Salir", ChurnTheme::key_desc()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(ChurnTheme::border());

    let p = Paragraph::new(text).block(block).wrap(Wrap { trim: true });

    f.render_widget(p, area);
}

/// Page header: logo, page title and a short description.
pub(crate) fn render_page_header(f: &mut Frame, area: Rect, title: &str, subtitle: &str) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", ChurnTheme::text()),
        Span::styled(LOGO_SMALL, ChurnTheme::subtitle()),
        Span::styled(" │ ", ChurnTheme::text_muted()),
        Span::styled(title.to_string(), ChurnTheme::title()),
        Span::styled(" │ ", ChurnTheme::text_muted()),
        Span::styled(subtitle.to_string(), ChurnTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(ChurnTheme::border()),
    );

    f.render_widget(header, area);
}

/// Footer line of `[key] description` pairs.
pub(crate) fn render_key_hints(f: &mut Frame, area: Rect, hints: &[(&str, &str)]) {
    let spans: Vec<Span> = hints
        .iter()
        .flat_map(|(key, desc)| {
            [
                Span::styled(format!("[{key}] "), ChurnTheme::key_hint()),
                Span::styled(format!("{desc} "), ChurnTheme::key_desc()),
            ]
        })
        .collect();

    let footer = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(ChurnTheme::border()),
    );

    f.render_widget(footer, area);
}

pub(crate) fn render_error_panel(f: &mut Frame, area: Rect, title: &str, message: &str) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(format!("! {title}"), ChurnTheme::danger())),
        Line::from(""),
        Line::from(Span::styled(message.to_string(), ChurnTheme::text())),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(ChurnTheme::danger()),
    );

    f.render_widget(content, area);
}
