//! Individual prediction page: customer form and scored result.

use std::collections::BTreeMap;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::application::PredictionReport;
use crate::domain::customer::{field_kind, numeric_range, FieldKind, NumericRange};
use crate::domain::{CustomerRecord, FieldValue, LabelCatalog, REQUIRED_FIELDS};
use crate::tui::styles::ChurnTheme;

use super::{render_key_hints, render_page_header};

/// How a form field is edited.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldInput {
    Choice {
        options: Vec<&'static str>,
        index: usize,
    },
    Number {
        range: Option<&'static NumericRange>,
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub name: &'static str,
    pub input: FieldInput,
}

impl FormField {
    fn for_record(name: &'static str, record: &CustomerRecord) -> Self {
        let value = record.value(name);
        let input = match field_kind(name) {
            Some(FieldKind::Categorical(options)) => {
                let index = match value {
                    Some(FieldValue::Text(text)) => options.iter().position(|o| *o == text).unwrap_or(0),
                    _ => 0,
                };
                FieldInput::Choice { options, index }
            }
            Some(FieldKind::Flag) => FieldInput::Choice {
                options: vec!["No", "Yes"],
                index: usize::from(matches!(value, Some(FieldValue::Number(n)) if n != 0.0)),
            },
            _ => FieldInput::Number {
                range: numeric_range(name),
                text: match value {
                    Some(FieldValue::Number(n)) => n.to_string(),
                    _ => String::new(),
                },
            },
        };
        Self { name, input }
    }

    /// Canonical raw text, as the record parser expects it.
    #[must_use]
    pub fn raw(&self) -> &str {
        match &self.input {
            FieldInput::Choice { options, index } => options.get(*index).copied().unwrap_or_default(),
            FieldInput::Number { text, .. } => text.as_str(),
        }
    }
}

/// Prediction form state
pub struct PredictionFormState {
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    pub error_message: Option<String>,
    pub report: Option<PredictionReport>,
}

impl Default for PredictionFormState {
    fn default() -> Self {
        Self::from_record(&CustomerRecord::default())
    }
}

impl PredictionFormState {
    #[must_use]
    pub fn from_record(record: &CustomerRecord) -> Self {
        Self {
            fields: REQUIRED_FIELDS
                .iter()
                .map(|name| FormField::for_record(name, record))
                .collect(),
            selected_field: 0,
            error_message: None,
            report: None,
        }
    }

    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

    pub fn prev_field(&mut self) {
        if self.selected_field == 0 {
            self.selected_field = self.fields.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    /// Cycle a choice or step a number by `delta` steps.
    pub fn adjust(&mut self, delta: i32) {
        self.error_message = None;
        match &mut self.fields[self.selected_field].input {
            FieldInput::Choice { options, index } => {
                let len = options.len() as i64;
                if len > 0 {
                    *index = (*index as i64 + i64::from(delta)).rem_euclid(len) as usize;
                }
            }
            FieldInput::Number {
                range: Some(range),
                text,
            } => {
                let current = text.trim().parse::<f64>().unwrap_or(range.default);
                let next = range.clamp(current + range.step * f64::from(delta));
                *text = ((next * 100.0).round() / 100.0).to_string();
            }
            FieldInput::Number { range: None, .. } => {}
        }
    }

    /// Type into the current numeric field
    pub fn input_char(&mut self, c: char) {
        if let FieldInput::Number { text, .. } = &mut self.fields[self.selected_field].input {
            if c.is_ascii_digit() || c == '.' {
                text.push(c);
                self.error_message = None;
            }
        }
    }

    pub fn delete_char(&mut self) {
        if let FieldInput::Number { text, .. } = &mut self.fields[self.selected_field].input {
            text.pop();
        }
    }

    /// Parse and range-check the form.
    ///
    /// # Errors
    /// Returns a user-facing message naming the offending fields.
    pub fn to_record(&self) -> Result<CustomerRecord, String> {
        let raw: BTreeMap<&str, &str> = self.fields.iter().map(|f| (f.name, f.raw())).collect();
        let record = CustomerRecord::from_raw(|name| raw.get(name).copied(), |v| v).map_err(|e| e.to_string())?;
        record.validate_ranges().map_err(|errors| errors.join(", "))?;
        Ok(record)
    }

    /// Recompute `tenure_group` and `MultipleServices` from the other fields.
    pub fn derive(&mut self) {
        match self.to_record() {
            Ok(mut record) => {
                record.refresh_derived();
                self.replace_values(&record);
            }
            Err(e) => self.error_message = Some(e),
        }
    }

    /// Fill the form from a record, keeping the cursor.
    pub fn replace_values(&mut self, record: &CustomerRecord) {
        let selected = self.selected_field;
        *self = Self::from_record(record);
        self.selected_field = selected;
    }
}

/// Render the prediction page
pub fn render_prediction(f: &mut Frame, area: Rect, state: &PredictionFormState, labels: &LabelCatalog) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Min(0),    // Form + result
            Constraint::Length(2), // Footer/error
        ])
        .split(area);

    render_page_header(f, chunks[0], "Predicción Individual", "Datos del cliente");

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    render_form_fields(f, columns[0], state, labels);
    match &state.report {
        Some(report) => render_result(f, columns[1], report),
        None => render_idle(f, columns[1]),
    }

    if let Some(err) = &state.error_message {
        let footer = Paragraph::new(Line::from(vec![
            Span::styled("! ", ChurnTheme::danger()),
            Span::styled(err.clone(), ChurnTheme::danger()),
        ]))
        .block(Block::default().borders(Borders::TOP).border_style(ChurnTheme::border()));
        f.render_widget(footer, chunks[2]);
    } else {
        render_key_hints(
            f,
            chunks[2],
            &[
                ("↑↓", "Campo"),
                ("←→", "Cambiar"),
                ("Enter", "Predecir"),
                ("D", "Derivar"),
                ("S", "Ejemplo"),
                ("R", "Reiniciar"),
            ],
        );
    }
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &PredictionFormState, labels: &LabelCatalog) {
    let lines: Vec<Line> = state
        .fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let is_selected = i == state.selected_field;
            let label_style = if is_selected {
                ChurnTheme::focused()
            } else {
                ChurnTheme::text_secondary()
            };

            let value = match &field.input {
                FieldInput::Choice { .. } => labels.value_label(field.raw()).to_string(),
                FieldInput::Number { text, range } => match range {
                    Some(r) if text.is_empty() => format!("({}-{})", r.min, r.max),
                    _ => text.clone(),
                },
            };
            let value = if is_selected {
                Span::styled(format!("◀ {value} ▶"), ChurnTheme::selected())
            } else {
                Span::styled(value, ChurnTheme::text())
            };

            Line::from(vec![
                Span::styled(format!(" {:<28}", labels.column_label(field.name)), label_style),
                value,
            ])
        })
        .collect();

    let block = Block::default()
        .title(Span::styled(" Cliente ", ChurnTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(ChurnTheme::border_focused());

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_idle(f: &mut Frame, area: Rect) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "Complete los datos y pulse Enter",
            ChurnTheme::text_secondary(),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(ChurnTheme::border()),
    );

    f.render_widget(content, area);
}

fn render_result(f: &mut Frame, area: Rect, report: &PredictionReport) {
    let block = Block::default()
        .title(Span::styled(" Resultado ", ChurnTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(ChurnTheme::border_focused());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Tier
            Constraint::Length(3), // Probability
            Constraint::Length(2), // Confidence
            Constraint::Min(0),    // Contributions
        ])
        .margin(1)
        .split(inner);

    let tier_style = ChurnTheme::risk_tier(report.tier);
    let verdict = if report.prediction.will_churn() {
        "Probable abandono"
    } else {
        "Probable permanencia"
    };

    let tier_display = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("RIESGO {} · {}", report.tier, verdict),
            tier_style.add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(report.tier.description(), ChurnTheme::text_secondary())),
        Line::from(Span::styled(report.tier.advice(), ChurnTheme::text_muted())),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    f.render_widget(tier_display, chunks[0]);

    let p = report.churn_probability();
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::NONE))
        .gauge_style(tier_style)
        .ratio(p.clamp(0.0, 1.0))
        .label(format!("Probabilidad de churn: {:.1}%", p * 100.0));
    f.render_widget(gauge, chunks[1]);

    let confidence = Paragraph::new(Line::from(vec![
        Span::styled("Confianza: ", ChurnTheme::text_secondary()),
        Span::styled(
            format!("{:.1}%", report.prediction.confidence() * 100.0),
            ChurnTheme::text(),
        ),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(confidence, chunks[2]);

    let mut lines = vec![Line::from(Span::styled("Factores principales", ChurnTheme::subtitle()))];
    lines.extend(report.contributions.iter().map(|c| {
        let style = if c.contribution() > 0.0 {
            ChurnTheme::danger()
        } else {
            ChurnTheme::success()
        };
        Line::from(vec![
            Span::styled(format!("{:+7.3} ", c.contribution()), style),
            Span::styled(c.label.clone(), ChurnTheme::text()),
        ])
    }));
    f.render_widget(Paragraph::new(lines), chunks[3]);
}
