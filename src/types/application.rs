//! Loan application data structures

use crate::error::{Result, ScoringError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Accepted applicant age in years
pub const AGE_RANGE: RangeInclusive<u32> = 18..=100;
/// Accepted loan duration in months
pub const DURATION_RANGE: RangeInclusive<u32> = 1..=72;
/// Accepted credit amount
pub const CREDIT_AMOUNT_RANGE: RangeInclusive<f64> = 100.0..=20_000.0;

/// Applicant sex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

/// Housing situation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Housing {
    Own,
    Rent,
    Free,
}

/// Savings account tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SavingsTier {
    Little,
    Moderate,
    Rich,
    #[serde(rename = "quite rich", alias = "quite_rich")]
    QuiteRich,
    Unknown,
}

/// Checking account tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckingTier {
    Little,
    Moderate,
    Rich,
    Unknown,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Sex::Male, Sex::Female];

    /// Label as seen by the encoder at training time
    pub fn label(self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

impl Housing {
    pub const ALL: [Housing; 3] = [Housing::Own, Housing::Rent, Housing::Free];

    pub fn label(self) -> &'static str {
        match self {
            Housing::Own => "own",
            Housing::Rent => "rent",
            Housing::Free => "free",
        }
    }
}

impl SavingsTier {
    pub const ALL: [SavingsTier; 5] = [
        SavingsTier::Little,
        SavingsTier::Moderate,
        SavingsTier::Rich,
        SavingsTier::QuiteRich,
        SavingsTier::Unknown,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SavingsTier::Little => "little",
            SavingsTier::Moderate => "moderate",
            SavingsTier::Rich => "rich",
            SavingsTier::QuiteRich => "quite rich",
            SavingsTier::Unknown => "unknown",
        }
    }
}

impl CheckingTier {
    pub const ALL: [CheckingTier; 4] = [
        CheckingTier::Little,
        CheckingTier::Moderate,
        CheckingTier::Rich,
        CheckingTier::Unknown,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CheckingTier::Little => "little",
            CheckingTier::Moderate => "moderate",
            CheckingTier::Rich => "rich",
            CheckingTier::Unknown => "unknown",
        }
    }
}

/// Match a user-supplied label against a fixed set of choices.
///
/// Spaces, dashes and underscores are interchangeable so `quite rich`,
/// `quite-rich` and `quite_rich` all resolve to the same tier.
fn parse_choice<T: Copy>(
    field: &'static str,
    input: &str,
    choices: &[T],
    label: fn(T) -> &'static str,
) -> Result<T> {
    let normalize = |s: &str| s.trim().to_lowercase().replace(['-', '_'], " ");
    let wanted = normalize(input);

    choices
        .iter()
        .copied()
        .find(|&choice| label(choice) == wanted)
        .ok_or_else(|| ScoringError::UnknownCategory {
            field: field.to_string(),
            label: input.to_string(),
        })
}

impl FromStr for Sex {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self> {
        parse_choice("sex", s, &Self::ALL, Self::label)
    }
}

impl FromStr for Housing {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self> {
        parse_choice("housing", s, &Self::ALL, Self::label)
    }
}

impl FromStr for SavingsTier {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self> {
        parse_choice("savings", s, &Self::ALL, Self::label)
    }
}

impl FromStr for CheckingTier {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self> {
        parse_choice("checking", s, &Self::ALL, Self::label)
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Housing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for SavingsTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for CheckingTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One loan application as entered by the user.
///
/// Ephemeral: built per request, consumed by the feature extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawApplication {
    /// Age in years
    pub age: u32,

    pub sex: Sex,

    pub housing: Housing,

    /// Savings account tier
    #[serde(alias = "saving_accounts")]
    pub savings: SavingsTier,

    /// Checking account tier
    #[serde(alias = "checking_account")]
    pub checking: CheckingTier,

    /// Loan purpose, one of the purpose encoder's labels
    pub purpose: String,

    /// Loan duration in months
    #[serde(alias = "duration")]
    pub duration_months: u32,

    /// Requested credit amount
    pub credit_amount: f64,
}

impl RawApplication {
    /// Create an application with the form defaults for everything but purpose
    pub fn new(purpose: impl Into<String>) -> Self {
        Self {
            age: 30,
            sex: Sex::Male,
            housing: Housing::Own,
            savings: SavingsTier::Little,
            checking: CheckingTier::Little,
            purpose: purpose.into(),
            duration_months: 12,
            credit_amount: 1000.0,
        }
    }

    /// Check every numeric field against its domain.
    ///
    /// Runs before any derived feature is computed, so a zero duration or a
    /// non-positive amount never reaches the division or the logarithm.
    pub fn validate(&self) -> Result<()> {
        if !AGE_RANGE.contains(&self.age) {
            return Err(ScoringError::invalid(
                "age",
                format!(
                    "{} is outside {}..={}",
                    self.age,
                    AGE_RANGE.start(),
                    AGE_RANGE.end()
                ),
            ));
        }

        if self.duration_months == 0 {
            return Err(ScoringError::invalid(
                "duration_months",
                "duration must be at least one month",
            ));
        }
        if !DURATION_RANGE.contains(&self.duration_months) {
            return Err(ScoringError::invalid(
                "duration_months",
                format!(
                    "{} is outside {}..={}",
                    self.duration_months,
                    DURATION_RANGE.start(),
                    DURATION_RANGE.end()
                ),
            ));
        }

        if !self.credit_amount.is_finite() || self.credit_amount <= 0.0 {
            return Err(ScoringError::invalid(
                "credit_amount",
                format!("{} is not a positive amount", self.credit_amount),
            ));
        }
        if !CREDIT_AMOUNT_RANGE.contains(&self.credit_amount) {
            return Err(ScoringError::invalid(
                "credit_amount",
                format!(
                    "{} is outside {}..={}",
                    self.credit_amount,
                    CREDIT_AMOUNT_RANGE.start(),
                    CREDIT_AMOUNT_RANGE.end()
                ),
            ));
        }

        Ok(())
    }
}
