//! Feature importance scores published alongside the classifier.
//!
//! Display only; the transform never reads them.

use crate::error::{Result, ScoringError};
use serde::{Deserialize, Serialize};

/// Importance of one feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportanceEntry {
    pub feature: String,
    pub importance: f64,
}

/// Feature importance list, highest score first
#[derive(Debug, Clone, Default, Serialize)]
pub struct FeatureImportance {
    entries: Vec<ImportanceEntry>,
}

impl FeatureImportance {
    pub fn new(mut entries: Vec<ImportanceEntry>) -> Self {
        entries.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        Self { entries }
    }

    /// Parse `[{"feature": .., "importance": ..}, ..]`
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<ImportanceEntry> = serde_json::from_str(json)
            .map_err(|e| ScoringError::Artifact(format!("malformed feature importance: {e}")))?;
        Ok(Self::new(entries))
    }

    pub fn entries(&self) -> &[ImportanceEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Share of the total importance held by each entry
    pub fn normalized(&self) -> Vec<(String, f64)> {
        let total: f64 = self.entries.iter().map(|e| e.importance.max(0.0)).sum();
        self.entries
            .iter()
            .map(|e| {
                let share = if total > 0.0 {
                    e.importance.max(0.0) / total
                } else {
                    0.0
                };
                (e.feature.clone(), share)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_descending() {
        let importance = FeatureImportance::from_json(
            r#"[
                {"feature": "Age", "importance": 0.12},
                {"feature": "Credit amount_log", "importance": 0.21},
                {"feature": "Job", "importance": 0.03}
            ]"#,
        )
        .unwrap();

        let names: Vec<_> = importance.entries().iter().map(|e| e.feature.as_str()).collect();
        assert_eq!(names, ["Credit amount_log", "Age", "Job"]);
    }

    #[test]
    fn test_normalized_shares() {
        let importance = FeatureImportance::new(vec![
            ImportanceEntry {
                feature: "a".to_string(),
                importance: 3.0,
            },
            ImportanceEntry {
                feature: "b".to_string(),
                importance: 1.0,
            },
        ]);

        let shares = importance.normalized();
        assert!((shares[0].1 - 0.75).abs() < 1e-9);
        assert!((shares[1].1 - 0.25).abs() < 1e-9);
        assert!(FeatureImportance::default().normalized().is_empty());
    }

    #[test]
    fn test_malformed_rejected() {
        assert!(FeatureImportance::from_json(r#"{"Age": 0.1}"#).is_err());
    }
}
