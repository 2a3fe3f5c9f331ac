//! Ports layer: Trait definitions for external collaborators.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and the fitted artifacts and metric feeds.

mod classifier;
mod encoder;
mod metrics;

pub use classifier::{Classifier, InferenceError};
pub use encoder::{CategoricalEncoder, EncodeError, UnknownCategoryPolicy};
pub use metrics::{MetricsError, MetricsSource};
