//! Adapters layer: Concrete implementations of ports.
//!
//! - `logistic`: logistic regression classifier
//! - `one_hot`: fitted one-hot encoder
//! - `artifacts`: loading and integrity checks for the model directory
//! - `csv_io`: batch tables and metric history files
//! - `simulated`: synthetic metric history for demos

pub mod artifacts;
pub mod csv_io;
pub mod logistic;
pub mod one_hot;
pub mod simulated;

pub use artifacts::{load_artifacts, ArtifactLoadError, LoadOptions, ModelArtifacts};
pub use csv_io::{CsvError, CsvMetricsSource};
pub use logistic::LogisticModel;
pub use one_hot::OneHotEncoder;
pub use simulated::SimulatedMetricsSource;
