//! Feature extraction for credit risk model inference.
//!
//! Turns a raw application into the ten numeric columns the classifier was
//! trained on, then aligns them to the column order the classifier declares.

use crate::encoder::{CategoricalField, EncoderSet};
use crate::error::Result;
use crate::types::application::RawApplication;
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

/// Number of columns in a feature row
pub const FEATURE_COUNT: usize = 10;

/// Value of the `Job` column.
///
/// The application form never asks for a job classification, so every row
/// carries skill level 1. Kept constant for parity with the trained model.
pub const JOB_PLACEHOLDER: f64 = 1.0;

/// A column of the feature row, in canonical (training) order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureColumn {
    Age,
    Sex,
    Job,
    Housing,
    SavingAccounts,
    CheckingAccount,
    Purpose,
    Duration,
    MonthlyInstallment,
    CreditAmountLog,
}

impl FeatureColumn {
    /// Canonical order, used when the classifier declares no order of its own
    pub const ALL: [FeatureColumn; FEATURE_COUNT] = [
        FeatureColumn::Age,
        FeatureColumn::Sex,
        FeatureColumn::Job,
        FeatureColumn::Housing,
        FeatureColumn::SavingAccounts,
        FeatureColumn::CheckingAccount,
        FeatureColumn::Purpose,
        FeatureColumn::Duration,
        FeatureColumn::MonthlyInstallment,
        FeatureColumn::CreditAmountLog,
    ];

    /// Column name as it appears in the training data
    pub fn name(self) -> &'static str {
        match self {
            FeatureColumn::Age => "Age",
            FeatureColumn::Sex => "Sex",
            FeatureColumn::Job => "Job",
            FeatureColumn::Housing => "Housing",
            FeatureColumn::SavingAccounts => "Saving accounts",
            FeatureColumn::CheckingAccount => "Checking account",
            FeatureColumn::Purpose => "Purpose",
            FeatureColumn::Duration => "Duration",
            FeatureColumn::MonthlyInstallment => "Monthly_Installment",
            FeatureColumn::CreditAmountLog => "Credit amount_log",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|column| column.name() == name)
    }

    fn index(self) -> usize {
        self as usize
    }

    /// Canonical column names
    pub fn names() -> Vec<String> {
        Self::ALL.iter().map(|c| c.name().to_string()).collect()
    }
}

impl fmt::Display for FeatureColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ten numeric features for one application, indexed by column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRow {
    values: [f64; FEATURE_COUNT],
}

impl FeatureRow {
    pub fn get(&self, column: FeatureColumn) -> f64 {
        self.values[column.index()]
    }

    /// Columns and values in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (FeatureColumn, f64)> + '_ {
        FeatureColumn::ALL
            .into_iter()
            .map(move |column| (column, self.get(column)))
    }
}

/// Outcome of aligning a row to the classifier's schema
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SchemaStatus {
    /// The classifier declared its column order and the row follows it
    Verified,
    /// The classifier declared no order; the canonical order was assumed
    Unverified,
    /// The declared columns do not match the row's columns.
    /// The row keeps the canonical order.
    Mismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },
}

impl SchemaStatus {
    pub fn is_verified(&self) -> bool {
        matches!(self, SchemaStatus::Verified)
    }

    /// Human readable warning, `None` when the order was verified
    pub fn warning(&self) -> Option<String> {
        match self {
            SchemaStatus::Verified => None,
            SchemaStatus::Unverified => Some(
                "model does not declare its column order; canonical order assumed".to_string(),
            ),
            SchemaStatus::Mismatch { expected, actual } => Some(format!(
                "model expects columns {expected:?} but row has {actual:?}"
            )),
        }
    }
}

/// A feature row laid out in the order handed to the classifier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedRow {
    pub columns: Vec<String>,
    pub values: Vec<f64>,
    pub schema: SchemaStatus,
}

impl AlignedRow {
    /// Values narrowed to the tensor element type the models take
    pub fn as_f32(&self) -> Vec<f32> {
        self.values.iter().map(|&v| v as f32).collect()
    }

    pub fn value(&self, name: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| self.values[i])
    }
}

/// Feature extractor that transforms applications into model input rows.
///
/// Matches the preprocessing done when the classifier was trained.
pub struct FeatureExtractor {
    encoders: EncoderSet,
}

impl FeatureExtractor {
    pub fn new(encoders: EncoderSet) -> Self {
        Self { encoders }
    }

    pub fn encoders(&self) -> &EncoderSet {
        &self.encoders
    }

    /// Extract the feature row for an application.
    ///
    /// Fails with `InvalidInput` for out-of-domain numbers and with
    /// `UnknownCategory` for labels missing from an encoder. On success every
    /// column is finite.
    pub fn extract(&self, app: &RawApplication) -> Result<FeatureRow> {
        app.validate()?;

        let credit_amount_log = app.credit_amount.ln();
        let monthly_installment = app.credit_amount / f64::from(app.duration_months);

        let code = |field: CategoricalField, label: &str| -> Result<f64> {
            Ok(self.encoders.encode(field, label)? as f64)
        };

        let mut values = [0.0; FEATURE_COUNT];
        values[FeatureColumn::Age.index()] = f64::from(app.age);
        values[FeatureColumn::Sex.index()] = code(CategoricalField::Sex, app.sex.label())?;
        values[FeatureColumn::Job.index()] = JOB_PLACEHOLDER;
        values[FeatureColumn::Housing.index()] =
            code(CategoricalField::Housing, app.housing.label())?;
        values[FeatureColumn::SavingAccounts.index()] =
            code(CategoricalField::SavingAccounts, app.savings.label())?;
        values[FeatureColumn::CheckingAccount.index()] =
            code(CategoricalField::CheckingAccount, app.checking.label())?;
        values[FeatureColumn::Purpose.index()] = code(CategoricalField::Purpose, &app.purpose)?;
        values[FeatureColumn::Duration.index()] = f64::from(app.duration_months);
        values[FeatureColumn::MonthlyInstallment.index()] = monthly_installment;
        values[FeatureColumn::CreditAmountLog.index()] = credit_amount_log;

        debug!(
            monthly_installment = monthly_installment,
            credit_amount_log = credit_amount_log,
            "Features extracted"
        );

        Ok(FeatureRow { values })
    }
}

/// Lay a row out in the classifier's declared column order.
///
/// With no declared order the canonical order is used and the result is
/// marked `Unverified`. A declared order that is not a permutation of the
/// ten known columns yields `Mismatch` with both lists.
pub fn align(row: &FeatureRow, expected: Option<&[String]>) -> AlignedRow {
    let canonical = || AlignedRow {
        columns: FeatureColumn::names(),
        values: row.iter().map(|(_, v)| v).collect(),
        schema: SchemaStatus::Unverified,
    };

    let Some(expected) = expected else {
        warn!("Model does not declare a column order, assuming canonical order");
        return canonical();
    };

    match resolve_order(expected) {
        Some(order) => AlignedRow {
            columns: expected.to_vec(),
            values: order.iter().map(|&column| row.get(column)).collect(),
            schema: SchemaStatus::Verified,
        },
        None => {
            let actual = FeatureColumn::names();
            warn!(
                expected = ?expected,
                actual = ?actual,
                "Model column order does not match extracted features"
            );
            AlignedRow {
                schema: SchemaStatus::Mismatch {
                    expected: expected.to_vec(),
                    actual,
                },
                ..canonical()
            }
        }
    }
}

/// Map declared names onto columns, requiring each column exactly once
fn resolve_order(expected: &[String]) -> Option<Vec<FeatureColumn>> {
    if expected.len() != FEATURE_COUNT {
        return None;
    }

    let mut seen = [false; FEATURE_COUNT];
    let mut order = Vec::with_capacity(FEATURE_COUNT);
    for name in expected {
        let column = FeatureColumn::from_name(name)?;
        if std::mem::replace(&mut seen[column.index()], true) {
            return None;
        }
        order.push(column);
    }
    Some(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::test_support::sample_encoders;
    use crate::error::ScoringError;
    use crate::types::application::{CheckingTier, Housing, SavingsTier, Sex};

    fn scenario() -> RawApplication {
        RawApplication {
            age: 30,
            sex: Sex::Male,
            housing: Housing::Own,
            savings: SavingsTier::Little,
            checking: CheckingTier::Moderate,
            purpose: "business".to_string(),
            duration_months: 12,
            credit_amount: 1000.0,
        }
    }

    #[test]
    fn test_scenario_row() {
        let extractor = FeatureExtractor::new(sample_encoders());
        let row = extractor.extract(&scenario()).unwrap();

        assert_eq!(row.get(FeatureColumn::Age), 30.0);
        assert_eq!(row.get(FeatureColumn::Sex), 1.0);
        assert_eq!(row.get(FeatureColumn::Job), 1.0);
        assert_eq!(row.get(FeatureColumn::Housing), 1.0);
        assert_eq!(row.get(FeatureColumn::SavingAccounts), 0.0);
        assert_eq!(row.get(FeatureColumn::CheckingAccount), 1.0);
        assert_eq!(row.get(FeatureColumn::Purpose), 0.0);
        assert_eq!(row.get(FeatureColumn::Duration), 12.0);
        assert!((row.get(FeatureColumn::MonthlyInstallment) - 83.333_333).abs() < 1e-4);
        assert!((row.get(FeatureColumn::CreditAmountLog) - 6.9078).abs() < 1e-4);
        assert!(row.iter().all(|(_, v)| v.is_finite()));
    }

    #[test]
    fn test_monthly_installment_exact() {
        let extractor = FeatureExtractor::new(sample_encoders());
        let mut app = scenario();
        app.credit_amount = 1200.0;

        let row = extractor.extract(&app).unwrap();
        assert_eq!(row.get(FeatureColumn::MonthlyInstallment), 100.0);
        assert_eq!(row.get(FeatureColumn::CreditAmountLog), 1200.0_f64.ln());
    }

    #[test]
    fn test_job_is_constant() {
        let extractor = FeatureExtractor::new(sample_encoders());
        let mut app = scenario();
        for (age, amount) in [(18, 100.0), (55, 7300.0), (100, 20_000.0)] {
            app.age = age;
            app.credit_amount = amount;
            let row = extractor.extract(&app).unwrap();
            assert_eq!(row.get(FeatureColumn::Job), JOB_PLACEHOLDER);
        }
    }

    #[test]
    fn test_zero_duration_never_divides() {
        let extractor = FeatureExtractor::new(sample_encoders());
        let mut app = scenario();
        app.duration_months = 0;

        assert!(matches!(
            extractor.extract(&app),
            Err(ScoringError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_unknown_purpose() {
        let extractor = FeatureExtractor::new(sample_encoders());
        let mut app = scenario();
        app.purpose = "space travel".to_string();

        assert!(matches!(
            extractor.extract(&app),
            Err(ScoringError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn test_align_without_declared_order() {
        let extractor = FeatureExtractor::new(sample_encoders());
        let row = extractor.extract(&scenario()).unwrap();

        let aligned = align(&row, None);
        assert_eq!(aligned.schema, SchemaStatus::Unverified);
        assert_eq!(aligned.columns, FeatureColumn::names());
        assert_eq!(aligned.values.len(), FEATURE_COUNT);
        assert!(aligned.schema.warning().is_some());
    }

    #[test]
    fn test_align_reorders_to_declared_order() {
        let extractor = FeatureExtractor::new(sample_encoders());
        let row = extractor.extract(&scenario()).unwrap();

        let mut declared = FeatureColumn::names();
        declared.reverse();
        let aligned = align(&row, Some(declared.as_slice()));

        assert!(aligned.schema.is_verified());
        assert_eq!(aligned.columns, declared);
        assert_eq!(aligned.values[0], row.get(FeatureColumn::CreditAmountLog));
        assert_eq!(aligned.values[9], 30.0);
        assert_eq!(aligned.value("Job"), Some(1.0));
    }

    #[test]
    fn test_align_reports_mismatch() {
        let extractor = FeatureExtractor::new(sample_encoders());
        let row = extractor.extract(&scenario()).unwrap();

        let mut declared = FeatureColumn::names();
        declared[8] = "Installment".to_string();
        let aligned = align(&row, Some(declared.as_slice()));

        match &aligned.schema {
            SchemaStatus::Mismatch { expected, actual } => {
                assert_eq!(expected, &declared);
                assert_eq!(actual, &FeatureColumn::names());
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
        assert_eq!(aligned.columns, FeatureColumn::names());
    }

    #[test]
    fn test_align_rejects_duplicates_and_short_lists() {
        let extractor = FeatureExtractor::new(sample_encoders());
        let row = extractor.extract(&scenario()).unwrap();

        let mut duplicated = FeatureColumn::names();
        duplicated[1] = "Age".to_string();
        assert!(matches!(
            align(&row, Some(duplicated.as_slice())).schema,
            SchemaStatus::Mismatch { .. }
        ));

        let short = FeatureColumn::names()[..9].to_vec();
        assert!(matches!(
            align(&row, Some(short.as_slice())).schema,
            SchemaStatus::Mismatch { .. }
        ));
    }

    #[test]
    fn test_feature_names() {
        assert_eq!(FeatureColumn::names().len(), FEATURE_COUNT);
        assert_eq!(
            FeatureColumn::from_name("Monthly_Installment"),
            Some(FeatureColumn::MonthlyInstallment)
        );
        assert_eq!(FeatureColumn::from_name("Credit amount"), None);
    }
}
