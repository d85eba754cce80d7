//! Categorical label encoders learned at training time.
//!
//! Each encoder is an immutable ordered vocabulary. The code of a label is
//! its position in that vocabulary, the same contract as the label encoders
//! the classifier was trained with.

use crate::error::{Result, ScoringError};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

/// Placeholder for the column name in encoder file patterns
pub const FIELD_PLACEHOLDER: &str = "{field}";

/// Encoder file layout written by the training notebook
pub const DEFAULT_ENCODER_FILE_PATTERN: &str = "{field}_encoder.json";

/// The categorical columns the classifier consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoricalField {
    Sex,
    Housing,
    SavingAccounts,
    CheckingAccount,
    Purpose,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 5] = [
        CategoricalField::Sex,
        CategoricalField::Housing,
        CategoricalField::SavingAccounts,
        CategoricalField::CheckingAccount,
        CategoricalField::Purpose,
    ];

    /// Column name used by the training data and the artifact file names
    pub fn column_name(self) -> &'static str {
        match self {
            CategoricalField::Sex => "Sex",
            CategoricalField::Housing => "Housing",
            CategoricalField::SavingAccounts => "Saving accounts",
            CategoricalField::CheckingAccount => "Checking account",
            CategoricalField::Purpose => "Purpose",
        }
    }

    /// Encoder artifact file name: `pattern` with `{field}` replaced by the
    /// column name, e.g. `Saving accounts_encoder.json`
    pub fn artifact_file(self, pattern: &str) -> String {
        pattern.replace(FIELD_PLACEHOLDER, self.column_name())
    }
}

impl fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// On-disk form of an encoder: `{"classes": [...]}`
#[derive(Debug, Deserialize)]
struct EncoderArtifact {
    classes: Vec<String>,
}

/// Label to code lookup table for one categorical field
#[derive(Debug, Clone)]
pub struct CategoryEncoder {
    field: CategoricalField,
    classes: Vec<String>,
    codes: HashMap<String, usize>,
}

impl CategoryEncoder {
    /// Build an encoder from its ordered vocabulary.
    ///
    /// Rejects empty and duplicated vocabularies since either would make the
    /// code assignment ambiguous.
    pub fn new(field: CategoricalField, classes: Vec<String>) -> Result<Self> {
        if classes.is_empty() {
            return Err(ScoringError::Artifact(format!(
                "encoder for {field} has an empty vocabulary"
            )));
        }

        let mut codes = HashMap::with_capacity(classes.len());
        for (code, label) in classes.iter().enumerate() {
            if codes.insert(label.clone(), code).is_some() {
                return Err(ScoringError::Artifact(format!(
                    "encoder for {field} lists {label:?} more than once"
                )));
            }
        }

        Ok(Self {
            field,
            classes,
            codes,
        })
    }

    /// Parse an encoder artifact
    pub fn from_json(field: CategoricalField, json: &str) -> Result<Self> {
        let artifact: EncoderArtifact = serde_json::from_str(json).map_err(|e| {
            ScoringError::Artifact(format!("malformed encoder for {field}: {e}"))
        })?;
        Self::new(field, artifact.classes)
    }

    pub fn field(&self) -> CategoricalField {
        self.field
    }

    /// Code assigned to `label`
    pub fn encode(&self, label: &str) -> Result<usize> {
        self.codes
            .get(label)
            .copied()
            .ok_or_else(|| ScoringError::UnknownCategory {
                field: self.field.column_name().to_string(),
                label: label.to_string(),
            })
    }

    /// Label behind `code`, if the code is in range
    pub fn decode(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }

    /// Valid labels in code order
    pub fn vocabulary(&self) -> &[String] {
        &self.classes
    }
}

/// One encoder per categorical field, loaded once and shared read-only
#[derive(Debug, Clone)]
pub struct EncoderSet {
    sex: CategoryEncoder,
    housing: CategoryEncoder,
    saving_accounts: CategoryEncoder,
    checking_account: CategoryEncoder,
    purpose: CategoryEncoder,
}

impl EncoderSet {
    /// Assemble a set from individual encoders, checking each sits in its slot
    pub fn new(
        sex: CategoryEncoder,
        housing: CategoryEncoder,
        saving_accounts: CategoryEncoder,
        checking_account: CategoryEncoder,
        purpose: CategoryEncoder,
    ) -> Result<Self> {
        let set = Self {
            sex,
            housing,
            saving_accounts,
            checking_account,
            purpose,
        };

        for field in CategoricalField::ALL {
            let actual = set.get(field).field();
            if actual != field {
                return Err(ScoringError::Artifact(format!(
                    "encoder for {actual} supplied in place of {field}"
                )));
            }
        }

        Ok(set)
    }

    pub fn get(&self, field: CategoricalField) -> &CategoryEncoder {
        match field {
            CategoricalField::Sex => &self.sex,
            CategoricalField::Housing => &self.housing,
            CategoricalField::SavingAccounts => &self.saving_accounts,
            CategoricalField::CheckingAccount => &self.checking_account,
            CategoricalField::Purpose => &self.purpose,
        }
    }

    /// Encode `label` with the encoder for `field`
    pub fn encode(&self, field: CategoricalField, label: &str) -> Result<usize> {
        self.get(field).encode(label)
    }

    /// Selectable purposes, taken from the purpose encoder so the choices
    /// can never drift from what the classifier was trained on
    pub fn purposes(&self) -> &[String] {
        self.purpose.vocabulary()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    fn encoder(field: CategoricalField, classes: &[&str]) -> CategoryEncoder {
        CategoryEncoder::new(field, classes.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    /// Vocabularies as a label encoder fit on the German credit data sorts them
    pub(crate) fn sample_encoders() -> EncoderSet {
        EncoderSet::new(
            encoder(CategoricalField::Sex, &["female", "male"]),
            encoder(CategoricalField::Housing, &["free", "own", "rent"]),
            encoder(
                CategoricalField::SavingAccounts,
                &["little", "moderate", "quite rich", "rich", "unknown"],
            ),
            encoder(
                CategoricalField::CheckingAccount,
                &["little", "moderate", "rich", "unknown"],
            ),
            encoder(
                CategoricalField::Purpose,
                &[
                    "business",
                    "car",
                    "domestic appliances",
                    "education",
                    "furniture/equipment",
                    "radio/TV",
                    "repairs",
                    "vacation/others",
                ],
            ),
        )
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::sample_encoders;
    use super::*;

    #[test]
    fn test_encode_uses_vocabulary_position() {
        let encoders = sample_encoders();
        assert_eq!(encoders.encode(CategoricalField::Sex, "male").unwrap(), 1);
        assert_eq!(encoders.encode(CategoricalField::Housing, "own").unwrap(), 1);
        assert_eq!(
            encoders
                .encode(CategoricalField::SavingAccounts, "quite rich")
                .unwrap(),
            2
        );
    }

    #[test]
    fn test_round_trip_every_code() {
        let encoders = sample_encoders();
        for field in CategoricalField::ALL {
            let encoder = encoders.get(field);
            let size = encoder.vocabulary().len();
            for code in 0..size {
                let label = encoder.decode(code).unwrap();
                assert_eq!(encoder.encode(label).unwrap(), code, "{field}/{label}");
            }
            assert!(encoder.decode(size).is_none());
        }
    }

    #[test]
    fn test_unknown_purpose_is_an_error() {
        let encoders = sample_encoders();
        let err = encoders
            .encode(CategoricalField::Purpose, "yacht")
            .unwrap_err();
        match err {
            ScoringError::UnknownCategory { field, label } => {
                assert_eq!(field, "Purpose");
                assert_eq!(label, "yacht");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_purposes_come_from_encoder() {
        let encoders = sample_encoders();
        assert_eq!(encoders.purposes().len(), 8);
        assert_eq!(encoders.purposes()[0], "business");
    }

    #[test]
    fn test_from_json() {
        let encoder =
            CategoryEncoder::from_json(CategoricalField::Housing, r#"{"classes":["free","own","rent"]}"#)
                .unwrap();
        assert_eq!(encoder.vocabulary(), ["free", "own", "rent"]);

        assert!(CategoryEncoder::from_json(CategoricalField::Housing, r#"{"classes":[]}"#).is_err());
        assert!(
            CategoryEncoder::from_json(CategoricalField::Housing, r#"{"classes":["own","own"]}"#)
                .is_err()
        );
        assert!(CategoryEncoder::from_json(CategoricalField::Housing, "not json").is_err());
    }

    #[test]
    fn test_misplaced_encoder_rejected() {
        let sample = sample_encoders();
        let result = EncoderSet::new(
            sample.get(CategoricalField::Housing).clone(),
            sample.get(CategoricalField::Housing).clone(),
            sample.get(CategoricalField::SavingAccounts).clone(),
            sample.get(CategoricalField::CheckingAccount).clone(),
            sample.get(CategoricalField::Purpose).clone(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_artifact_file_name() {
        assert_eq!(
            CategoricalField::SavingAccounts.artifact_file(DEFAULT_ENCODER_FILE_PATTERN),
            "Saving accounts_encoder.json"
        );
        assert_eq!(
            CategoricalField::CheckingAccount.artifact_file("encoders/{field}.json"),
            "encoders/Checking account.json"
        );
    }
}
