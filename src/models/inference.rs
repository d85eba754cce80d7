//! Classifier inference

use crate::error::{Result, ScoringError};
use crate::feature_extractor::AlignedRow;
use crate::types::assessment::RiskLabel;
use ort::session::Session;
use ort::value::Tensor;
use std::sync::Mutex;
use tracing::{debug, warn};

/// A trained binary classifier.
///
/// Implementations must be safe to share read-only across calls; the same
/// row always yields the same label.
pub trait Classifier: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Column order the model was trained with, if the artifact declares one
    fn expected_columns(&self) -> Option<&[String]>;

    /// Predict the label for one aligned row
    fn predict(&self, row: &AlignedRow) -> Result<RiskLabel>;
}

/// Classifier backed by an ONNX Runtime session.
///
/// `Session::run` takes `&mut self`, so the session sits behind a mutex and
/// the classifier can still be used through `&self`.
pub struct OnnxClassifier {
    name: String,
    session: Mutex<Session>,
    input_name: String,
    label_output: String,
    probability_output: Option<String>,
    expected_columns: Option<Vec<String>>,
}

impl OnnxClassifier {
    pub(crate) fn new(
        name: String,
        session: Session,
        input_name: String,
        label_output: String,
        probability_output: Option<String>,
        expected_columns: Option<Vec<String>>,
    ) -> Self {
        Self {
            name,
            session: Mutex::new(session),
            input_name,
            label_output,
            probability_output,
            expected_columns,
        }
    }

    /// Collect the label and probability tensors and resolve the verdict
    fn extract_label(&self, outputs: &ort::session::SessionOutputs) -> Result<RiskLabel> {
        let labels = outputs
            .get(self.label_output.as_str())
            .and_then(|output| output.try_extract_tensor::<i64>().ok())
            .map(|(_, data)| data);

        let probabilities = self
            .probability_output
            .as_deref()
            .and_then(|name| outputs.get(name))
            .and_then(|output| output.try_extract_tensor::<f32>().ok())
            .map(|(_, data)| data);

        resolve_label(&self.name, labels, probabilities)
    }
}

impl Classifier for OnnxClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn expected_columns(&self) -> Option<&[String]> {
        self.expected_columns.as_deref()
    }

    fn predict(&self, row: &AlignedRow) -> Result<RiskLabel> {
        // Shape [1, num_features]
        let shape = vec![1_i64, row.values.len() as i64];
        let input_tensor = Tensor::from_array((shape, row.as_f32()))
            .map_err(|e| ScoringError::Inference(format!("failed to create input tensor: {e}")))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ScoringError::Inference("session lock poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .map_err(|e| ScoringError::Inference(e.to_string()))?;

        self.extract_label(&outputs)
    }
}

/// Pick the predicted class from the model outputs.
///
/// The int64 label output wins; when it is missing or empty the most probable
/// class is used instead. Classes other than 0 and 1 are an error.
fn resolve_label(
    model: &str,
    labels: Option<&[i64]>,
    probabilities: Option<&[f32]>,
) -> Result<RiskLabel> {
    let class = match labels.and_then(|data| data.first().copied()) {
        Some(class) => {
            debug!(model = %model, class = class, "Extracted label tensor");
            class
        }
        None => {
            let class = probabilities.and_then(argmax).ok_or_else(|| {
                ScoringError::Inference(format!("model {model} produced no readable label"))
            })?;
            warn!(model = %model, "Label output unusable, using most probable class");
            class as i64
        }
    };

    RiskLabel::from_class(class).ok_or_else(|| {
        ScoringError::Inference(format!("model {model} returned unknown class {class}"))
    })
}

/// Index of the largest finite value
fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax() {
        assert_eq!(argmax(&[0.3, 0.7]), Some(1));
        assert_eq!(argmax(&[0.9, 0.1]), Some(0));
        assert_eq!(argmax(&[f32::NAN, 0.2]), Some(1));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_label_output_maps_to_verdict() {
        assert_eq!(
            resolve_label("m", Some(&[1][..]), None).unwrap(),
            RiskLabel::GoodRisk
        );
        assert_eq!(
            resolve_label("m", Some(&[0][..]), Some(&[0.2, 0.8][..])).unwrap(),
            RiskLabel::BadRisk
        );
    }

    #[test]
    fn test_probabilities_used_without_label() {
        assert_eq!(
            resolve_label("m", None, Some(&[0.35, 0.65][..])).unwrap(),
            RiskLabel::GoodRisk
        );
        assert_eq!(
            resolve_label("m", Some(&[0_i64; 0][..]), Some(&[0.9, 0.1][..])).unwrap(),
            RiskLabel::BadRisk
        );
    }

    #[test]
    fn test_unknown_class_is_an_error() {
        let err = resolve_label("m", Some(&[2][..]), None).unwrap_err();
        assert!(matches!(err, ScoringError::Inference(ref msg) if msg.contains("unknown class 2")));

        let err = resolve_label("m", None, Some(&[0.1, 0.2, 0.7][..])).unwrap_err();
        assert!(matches!(err, ScoringError::Inference(_)));
    }

    #[test]
    fn test_no_readable_label() {
        let err = resolve_label("m", None, None).unwrap_err();
        assert!(matches!(err, ScoringError::Inference(ref msg) if msg.contains("no readable label")));

        assert!(resolve_label("m", None, Some(&[f32::NAN][..])).is_err());
    }
}
