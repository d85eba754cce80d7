//! Artifact loader for the classifier, encoders and explanatory material

use crate::config::ModelsConfig;
use crate::encoder::{CategoricalField, CategoryEncoder, EncoderSet};
use crate::models::importance::FeatureImportance;
use crate::models::inference::OnnxClassifier;
use anyhow::{Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// ONNX metadata key holding the comma separated training column order
pub const FEATURE_NAMES_METADATA_KEY: &str = "feature_names";

/// Loader for serialized artifacts in a models directory
pub struct ArtifactLoader {
    models_dir: PathBuf,
    model_file: String,
    feature_names_file: String,
    importance_file: String,
    /// Encoder file name with a `{field}` placeholder
    encoder_file_pattern: String,
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ArtifactLoader {
    pub fn new(config: &ModelsConfig) -> Self {
        Self {
            models_dir: PathBuf::from(&config.models_dir),
            model_file: config.model_file.clone(),
            feature_names_file: config.feature_names_file.clone(),
            importance_file: config.importance_file.clone(),
            encoder_file_pattern: config.encoder_file_pattern.clone(),
            onnx_threads: config.onnx_threads,
        }
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    /// Load one encoder artifact
    pub fn load_encoder(&self, field: CategoricalField) -> Result<CategoryEncoder> {
        let path = self.models_dir.join(field.artifact_file(&self.encoder_file_pattern));
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read encoder from {}", path.display()))?;
        let encoder = CategoryEncoder::from_json(field, &json)
            .with_context(|| format!("Failed to parse encoder {}", path.display()))?;

        info!(field = %field, classes = encoder.vocabulary().len(), "Encoder loaded");
        Ok(encoder)
    }

    /// Load the encoders for every categorical field
    pub fn load_encoders(&self) -> Result<EncoderSet> {
        let set = EncoderSet::new(
            self.load_encoder(CategoricalField::Sex)?,
            self.load_encoder(CategoricalField::Housing)?,
            self.load_encoder(CategoricalField::SavingAccounts)?,
            self.load_encoder(CategoricalField::CheckingAccount)?,
            self.load_encoder(CategoricalField::Purpose)?,
        )?;
        Ok(set)
    }

    /// Column order from the sidecar file, `None` when the file is absent
    pub fn load_feature_names(&self) -> Result<Option<Vec<String>>> {
        let path = self.models_dir.join(&self.feature_names_file);
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read feature names from {}", path.display()))?;
        let names: Vec<String> = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse feature names {}", path.display()))?;

        info!(path = %path.display(), count = names.len(), "Feature names loaded");
        Ok(Some(names))
    }

    /// Load the feature importance list.
    ///
    /// The list is display only: a missing, unreadable or malformed file is
    /// logged and yields an empty list.
    pub fn load_feature_importance(&self) -> FeatureImportance {
        let path = self.models_dir.join(&self.importance_file);
        if !path.exists() {
            warn!(path = %path.display(), "Feature importance file not found");
            return FeatureImportance::default();
        }

        match read_feature_importance(&path) {
            Ok(importance) => importance,
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %format!("{e:#}"),
                    "Ignoring unusable feature importance file"
                );
                FeatureImportance::default()
            }
        }
    }

    /// Load the ONNX classifier.
    ///
    /// The expected column order comes from the model's own metadata when
    /// present, otherwise from the sidecar file.
    pub fn load_classifier(&self) -> Result<OnnxClassifier> {
        let path = self.models_dir.join(&self.model_file);
        let name = Path::new(&self.model_file)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("classifier")
            .to_string();

        info!(model = %name, path = %path.display(), threads = self.onnx_threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(&path)
            .with_context(|| format!("Failed to load model from {}", path.display()))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let label_output = session
            .outputs
            .iter()
            .find(|o| o.name.contains("label"))
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "output_label".to_string());

        let probability_output = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob"))
            .map(|o| o.name.clone());

        let declared = session
            .metadata()
            .ok()
            .and_then(|metadata| metadata.custom(FEATURE_NAMES_METADATA_KEY).ok().flatten())
            .map(|joined| parse_feature_list(&joined));
        let sidecar = self.load_feature_names()?;

        let expected_columns = match (declared, sidecar) {
            (Some(declared), Some(sidecar)) => {
                if declared != sidecar {
                    warn!(
                        model = ?declared,
                        sidecar = ?sidecar,
                        "Sidecar feature names disagree with model metadata, using model metadata"
                    );
                }
                Some(declared)
            }
            (Some(declared), None) => Some(declared),
            (None, sidecar) => sidecar,
        };

        info!(
            model = %name,
            input = %input_name,
            output = %label_output,
            declares_columns = expected_columns.is_some(),
            "Model loaded successfully"
        );

        Ok(OnnxClassifier::new(
            name,
            session,
            input_name,
            label_output,
            probability_output,
            expected_columns,
        ))
    }
}

fn read_feature_importance(path: &Path) -> Result<FeatureImportance> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read feature importance from {}", path.display()))?;
    Ok(FeatureImportance::from_json(&json)?)
}

/// Split a comma separated column list, trimming whitespace around names
fn parse_feature_list(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
