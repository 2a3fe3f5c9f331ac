//! Main TUI application state machine.
//!
//! Handles:
//! - Page navigation
//! - Input event handling
//! - Service integration

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::adapters::csv_io::{read_table_from_path, write_table_to_path};
use crate::adapters::{CsvMetricsSource, LoadOptions, SimulatedMetricsSource};
use crate::application::batch::EXAMPLE_FILE;
use crate::application::{
    score_table, segment_churn_rates, ChurnInsightsService, ChurnModelContext, ChurnScoringService,
    InsightsService, MonitoringService, ScoringService,
};
use crate::config::{AppConfig, SIMULATED_DAYS};
use crate::domain::sample::{example_csv, example_records, reference_records};
use crate::ports::MetricsSource;

use super::ui::{
    batch::{render_batch, BatchState, PathEdit},
    insights::{render_insights, InsightsState},
    monitoring::{render_monitoring, MonitoringState},
    overview::{render_overview, OverviewState},
    prediction::{render_prediction, FieldInput, PredictionFormState},
    render_disclaimer,
};

/// Current page in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Overview,
    Prediction,
    Batch,
    Insights,
    Monitoring,
}

impl Screen {
    fn from_digit(c: char) -> Option<Self> {
        match c {
            '1' => Some(Self::Overview),
            '2' => Some(Self::Prediction),
            '3' => Some(Self::Batch),
            '4' => Some(Self::Insights),
            '5' => Some(Self::Monitoring),
            _ => None,
        }
    }

    fn from_function_key(n: u8) -> Option<Self> {
        char::from_digit(u32::from(n), 10).and_then(Self::from_digit)
    }
}

/// Main application state
pub struct App {
    screen: Screen,
    should_quit: bool,
    config: AppConfig,

    scoring: ChurnScoringService,
    insights: ChurnInsightsService,
    monitoring: MonitoringService<Box<dyn MetricsSource>>,

    overview_state: OverviewState,
    prediction_state: PredictionFormState,
    batch_state: BatchState,
    insights_state: InsightsState,
    monitoring_state: MonitoringState,
}

impl App {
    /// Create a new application instance from configuration.
    ///
    /// # Errors
    /// Returns error if the model artifacts cannot be loaded.
    pub fn new(config: AppConfig) -> Result<Self> {
        let model_dir = config.model_dir.as_path();
        if !model_dir.exists() {
            return Err(anyhow!(
                "Model directory not found at {:?}. Set CHURNLENS_MODEL_DIR to a directory containing churn_model.json.",
                model_dir
            ));
        }

        // Refuse to start without a usable model.
        let options = LoadOptions {
            require_manifest: config.require_manifest,
        };
        let context = ChurnModelContext::load(model_dir, &options)
            .map_err(|e| anyhow!("Failed to load model from {:?}: {}", model_dir, e))?;
        let context = Arc::new(context);

        let source: Box<dyn MetricsSource> = match &config.metrics_csv {
            Some(path) => Box::new(CsvMetricsSource::new(path.clone())),
            None => Box::new(SimulatedMetricsSource::new(SIMULATED_DAYS, config.monitor_seed)),
        };
        let monitoring = MonitoringService::new(source, config.monitor_window);

        Ok(Self::with_dependencies(
            config,
            ScoringService::new(Arc::clone(&context)),
            InsightsService::new(context),
            monitoring,
        ))
    }

    /// Create application with injected services (Composition Root pattern).
    pub fn with_dependencies(
        config: AppConfig,
        scoring: ChurnScoringService,
        insights: ChurnInsightsService,
        monitoring: MonitoringService<Box<dyn MetricsSource>>,
    ) -> Self {
        let ctx = scoring.context();
        let overview_state = OverviewState {
            info: ctx.info().clone(),
            feature_count: ctx.feature_order().len(),
            categorical_count: ctx.categorical_fields().len(),
            monitor_simulated: monitoring.is_simulated(),
        };

        let mut app = Self {
            screen: Screen::Overview,
            should_quit: false,
            config,
            scoring,
            insights,
            monitoring,
            overview_state,
            prediction_state: PredictionFormState::default(),
            batch_state: BatchState::default(),
            insights_state: InsightsState::default(),
            monitoring_state: MonitoringState::default(),
        };
        app.refresh_insights();
        app.refresh_monitoring();
        app
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(f.area());

                let content_area = chunks[0];
                let labels = self.scoring.context().labels();

                match self.screen {
                    Screen::Overview => render_overview(f, content_area, &self.overview_state),
                    Screen::Prediction => {
                        render_prediction(f, content_area, &self.prediction_state, labels)
                    }
                    Screen::Batch => render_batch(f, content_area, &self.batch_state, labels),
                    Screen::Insights => {
                        render_insights(f, content_area, &self.insights_state, labels)
                    }
                    Screen::Monitoring => {
                        render_monitoring(f, content_area, &self.monitoring_state)
                    }
                }

                render_disclaimer(f, chunks[1]);
            })?;

            // Short poll to stay responsive
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Whether digits typed now belong to an input rather than navigation.
    fn capturing_text(&self) -> bool {
        match self.screen {
            Screen::Batch => self.batch_state.editing.is_some(),
            Screen::Prediction => {
                let state = &self.prediction_state;
                matches!(
                    state.fields.get(state.selected_field).map(|f| &f.input),
                    Some(FieldInput::Number { .. })
                )
            }
            _ => false,
        }
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        let target = match key {
            KeyCode::F(n) => Screen::from_function_key(n),
            KeyCode::Char(c) if !self.capturing_text() => Screen::from_digit(c),
            _ => None,
        };
        if let Some(screen) = target {
            self.screen = screen;
            return;
        }

        match self.screen {
            Screen::Overview => self.handle_overview_key(key),
            Screen::Prediction => self.handle_prediction_key(key),
            Screen::Batch => self.handle_batch_key(key),
            Screen::Insights => self.handle_insights_key(key),
            Screen::Monitoring => self.handle_monitoring_key(key),
        }
    }

    fn handle_overview_key(&mut self, key: KeyCode) {
        if let KeyCode::Char('q' | 'Q') = key {
            self.should_quit = true;
        }
    }

    fn handle_prediction_key(&mut self, key: KeyCode) {
        let form = &mut self.prediction_state;
        match key {
            KeyCode::Esc => self.screen = Screen::Overview,
            KeyCode::Up | KeyCode::BackTab => form.prev_field(),
            KeyCode::Down | KeyCode::Tab => form.next_field(),
            KeyCode::Left => form.adjust(-1),
            KeyCode::Right => form.adjust(1),
            KeyCode::Backspace => form.delete_char(),
            KeyCode::Enter => self.submit_prediction(),
            KeyCode::Char('d' | 'D') => form.derive(),
            KeyCode::Char('r' | 'R') => *form = PredictionFormState::default(),
            KeyCode::Char('s' | 'S') => match example_records() {
                Ok(records) => {
                    if let Some(record) = records.first() {
                        form.replace_values(record);
                    }
                }
                Err(e) => form.error_message = Some(e.to_string()),
            },
            KeyCode::Char(c) => form.input_char(c),
            _ => {}
        }
    }

    fn submit_prediction(&mut self) {
        let form = &mut self.prediction_state;
        let record = match form.to_record() {
            Ok(record) => record,
            Err(e) => {
                form.error_message = Some(e);
                return;
            }
        };

        match self.scoring.score_record(&record) {
            Ok(report) => {
                form.error_message = None;
                form.report = Some(report);
            }
            Err(e) => {
                tracing::error!("Prediction failed: {}", e);
                form.report = None;
                form.error_message = Some(e.to_string());
            }
        }
    }

    fn handle_batch_key(&mut self, key: KeyCode) {
        if let Some(path) = self.batch_state.path_mut() {
            match key {
                KeyCode::Enter | KeyCode::Esc => self.batch_state.editing = None,
                KeyCode::Backspace => {
                    path.pop();
                }
                KeyCode::Char(c) => path.push(c),
                _ => {}
            }
            return;
        }

        match key {
            KeyCode::Esc => self.screen = Screen::Overview,
            KeyCode::Char('e' | 'E') => self.batch_state.editing = Some(PathEdit::Input),
            KeyCode::Char('o' | 'O') => self.batch_state.editing = Some(PathEdit::Output),
            KeyCode::Enter => self.load_batch(),
            KeyCode::Char('x' | 'X') => self.export_batch(),
            KeyCode::Char('g' | 'G') => self.write_example(),
            KeyCode::Up => self.batch_state.scroll_up(),
            KeyCode::Down => self.batch_state.scroll_down(),
            _ => {}
        }
    }

    fn load_batch(&mut self) {
        let path = Path::new(&self.batch_state.input_path);
        let outcome = read_table_from_path(path)
            .map_err(crate::ChurnError::from)
            .and_then(|table| score_table(&self.scoring, &table));

        let state = &mut self.batch_state;
        state.scroll = 0;
        match outcome {
            Ok(scored) => {
                let summary = scored.summary(self.config.top_features);
                state.status = Some(Ok(format!(
                    "{} clientes procesados desde {}",
                    summary.total, state.input_path
                )));
                state.summary = Some(summary);
                state.scored = Some(scored);
                self.refresh_segments();
            }
            Err(e) => {
                tracing::warn!("Batch rejected: {}", e);
                state.scored = None;
                state.summary = None;
                state.status = Some(Err(e.to_string()));
            }
        }
    }

    fn export_batch(&mut self) {
        let state = &mut self.batch_state;
        let Some(scored) = &state.scored else {
            state.status = Some(Err("No hay predicciones para exportar".to_string()));
            return;
        };

        state.status = Some(
            write_table_to_path(Path::new(&state.output_path), &scored.table)
                .map(|()| format!("Predicciones exportadas a {}", state.output_path))
                .map_err(|e| e.to_string()),
        );
    }

    fn write_example(&mut self) {
        let state = &mut self.batch_state;
        state.status = Some(match std::fs::write(EXAMPLE_FILE, example_csv()) {
            Ok(()) => {
                state.input_path = EXAMPLE_FILE.to_string();
                Ok(format!("Ejemplo guardado en {EXAMPLE_FILE}"))
            }
            Err(e) => Err(e.to_string()),
        });
    }

    fn handle_insights_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.screen = Screen::Overview,
            KeyCode::Left => {
                self.insights_state.cycle_segment(-1);
                self.refresh_segments();
            }
            KeyCode::Right => {
                self.insights_state.cycle_segment(1);
                self.refresh_segments();
            }
            KeyCode::Char('r' | 'R') => self.refresh_insights(),
            _ => {}
        }
    }

    fn refresh_insights(&mut self) {
        let state = &mut self.insights_state;
        state.importance = self.insights.feature_importance(self.config.top_features);
        state.summary = Some(self.insights.importance_summary());
        state.metrics = self.insights.reported_metrics();
        state.class_counts = self.insights.class_distribution();
        state.segment_fields = self.scoring.context().categorical_fields().to_vec();
        if let Some(i) = state.segment_fields.iter().position(|f| f == "Contract") {
            state.segment_index = i;
        }
        self.refresh_segments();
    }

    /// Segment rates over the last scored batch, or the reference customers.
    fn refresh_segments(&mut self) {
        let (records, source) = match &self.batch_state.scored {
            Some(scored) => (
                Ok(scored.labeled()),
                format!("Último lote ({} clientes, churn predicho)", scored.records.len()),
            ),
            None => (
                reference_records(),
                "Clientes de referencia (churn observado)".to_string(),
            ),
        };

        let state = &mut self.insights_state;
        let segments = match (records, state.segment_field()) {
            (Ok(records), Some(field)) => segment_churn_rates(&records, field),
            (Err(e), _) => {
                tracing::warn!("Segment data unavailable: {}", e);
                Vec::new()
            }
            _ => Vec::new(),
        };
        state.segments = segments;
        state.segment_source = source;
    }

    fn handle_monitoring_key(&mut self, key: KeyCode) {
        let metric = self.monitoring_state.selected();
        match key {
            KeyCode::Esc => self.screen = Screen::Overview,
            KeyCode::Left => self.monitoring_state.prev_metric(),
            KeyCode::Right => self.monitoring_state.next_metric(),
            KeyCode::Up | KeyCode::Down => {
                let step = if key == KeyCode::Up { 0.01 } else { -0.01 };
                let current = self.monitoring.threshold(metric);
                self.monitoring.set_threshold(metric, current + step);
                self.refresh_monitoring();
            }
            KeyCode::Char('+') => {
                self.monitoring.set_window(self.monitoring.window() + 1);
                self.refresh_monitoring();
            }
            KeyCode::Char('-') => {
                self.monitoring.set_window(self.monitoring.window().saturating_sub(1));
                self.refresh_monitoring();
            }
            KeyCode::Char('r' | 'R') => self.refresh_monitoring(),
            _ => {}
        }
    }

    fn refresh_monitoring(&mut self) {
        match self.monitoring.report() {
            Ok(report) => {
                self.monitoring_state.report = Some(report);
                self.monitoring_state.error = None;
            }
            Err(e) => {
                tracing::warn!("Monitoring unavailable: {}", e);
                self.monitoring_state.report = None;
                self.monitoring_state.error = Some(e.to_string());
            }
        }
    }
}
