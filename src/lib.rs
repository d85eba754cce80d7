//! Credit Risk Scorer Library
//!
//! Turns a loan application into the feature row a pre-trained classifier
//! expects and returns its good/bad risk verdict.

pub mod config;
pub mod encoder;
pub mod error;
pub mod feature_extractor;
pub mod models;
pub mod scorer;
pub mod types;

pub use config::AppConfig;
pub use encoder::{CategoricalField, CategoryEncoder, EncoderSet};
pub use error::ScoringError;
pub use feature_extractor::{AlignedRow, FeatureColumn, FeatureExtractor, FeatureRow, SchemaStatus};
pub use models::inference::{Classifier, OnnxClassifier};
pub use scorer::ScoringContext;
pub use types::{application::RawApplication, assessment::RiskAssessment, assessment::RiskLabel};
