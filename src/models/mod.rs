//! Classifier and artifact components

pub mod importance;
pub mod inference;
pub mod loader;

pub use importance::FeatureImportance;
pub use inference::{Classifier, OnnxClassifier};
pub use loader::ArtifactLoader;
