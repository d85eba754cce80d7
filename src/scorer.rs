//! Scoring context: loaded artifacts plus the transform and prediction steps

use crate::config::ModelsConfig;
use crate::encoder::EncoderSet;
use crate::error::Result;
use crate::feature_extractor::{align, AlignedRow, FeatureExtractor};
use crate::models::inference::Classifier;
use crate::models::loader::ArtifactLoader;
use crate::types::application::RawApplication;
use crate::types::assessment::{RiskAssessment, RiskLabel};
use tracing::{info, warn};

/// Read-only artifacts needed to score applications.
///
/// Built once at startup and passed by reference; nothing in it changes
/// after construction.
pub struct ScoringContext {
    extractor: FeatureExtractor,
    classifier: Box<dyn Classifier>,
}

impl ScoringContext {
    pub fn new(encoders: EncoderSet, classifier: Box<dyn Classifier>) -> Self {
        Self {
            extractor: FeatureExtractor::new(encoders),
            classifier,
        }
    }

    /// Load the encoders and the classifier from the configured models
    /// directory
    pub fn load(config: &ModelsConfig) -> anyhow::Result<Self> {
        let loader = ArtifactLoader::new(config);
        let encoders = loader.load_encoders()?;
        let classifier = loader.load_classifier()?;

        info!(
            models_dir = %loader.models_dir().display(),
            model = %classifier.name(),
            purposes = encoders.purposes().len(),
            "Scoring context ready"
        );

        Ok(Self::new(encoders, Box::new(classifier)))
    }

    pub fn encoders(&self) -> &EncoderSet {
        self.extractor.encoders()
    }

    /// Selectable loan purposes, straight from the purpose encoder
    pub fn purposes(&self) -> &[String] {
        self.encoders().purposes()
    }

    /// Build the row the classifier will see for `app`
    pub fn features(&self, app: &RawApplication) -> Result<AlignedRow> {
        let row = self.extractor.extract(app)?;
        Ok(align(&row, self.classifier.expected_columns()))
    }

    /// Predict the label for an already aligned row
    pub fn predict(&self, row: &AlignedRow) -> Result<RiskLabel> {
        self.classifier.predict(row)
    }

    /// Transform and predict in one step.
    ///
    /// A schema warning does not stop the prediction; it is logged and kept on
    /// the returned assessment for the caller to show.
    pub fn assess(&self, app: &RawApplication) -> Result<RiskAssessment> {
        let features = self.features(app)?;
        if let Some(warning) = features.schema.warning() {
            warn!(model = %self.classifier.name(), "{}", warning);
        }

        let label = self.predict(&features)?;
        let assessment = RiskAssessment::new(label, features);

        info!(
            assessment_id = %assessment.assessment_id,
            label = ?assessment.label,
            schema_verified = assessment.schema().is_verified(),
            "Application assessed"
        );

        Ok(assessment)
    }
}
