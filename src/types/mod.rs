//! Type definitions for credit risk scoring

pub mod application;
pub mod assessment;

pub use application::{CheckingTier, Housing, RawApplication, SavingsTier, Sex};
pub use assessment::{RiskAssessment, RiskLabel};
