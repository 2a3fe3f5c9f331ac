//! TUI module: Terminal User Interface using Ratatui.
//!
//! Pages:
//! - Overview of the loaded model
//! - Single-customer prediction form
//! - Batch CSV scoring and export
//! - Feature importance and segment insights
//! - Metric monitoring with drift alerts

mod app;
mod styles;
mod ui;

pub use app::{App, Screen};
pub use styles::ChurnTheme;
