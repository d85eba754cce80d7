//! Credit Risk Scorer - Main Entry Point
//!
//! Loads the classifier and encoders, scores one application, and prints the
//! verdict along with the explanatory material published with the model.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use credit_risk_scorer::{
    config::AppConfig,
    models::{ArtifactLoader, FeatureImportance},
    types::{CheckingTier, Housing, RawApplication, RiskAssessment, SavingsTier, Sex},
    ScoringContext,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "credit-risk",
    about = "Predict whether a loan applicant is a good or bad credit risk",
    version
)]
struct Cli {
    /// Configuration file (defaults to config/config.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the configured models directory
    #[arg(long, global = true, value_name = "DIR")]
    models_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score one application
    Assess(AssessArgs),
    /// List the loan purposes the model knows
    Purposes,
    /// Show feature importance and the supporting charts
    Explain,
}

#[derive(Args, Debug)]
struct AssessArgs {
    /// Read the application from a JSON file instead of flags
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Age in years
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(18..=100))]
    age: u32,

    /// male or female
    #[arg(long, default_value = "male")]
    sex: Sex,

    /// own, rent or free
    #[arg(long, default_value = "own")]
    housing: Housing,

    /// little, moderate, rich, quite-rich or unknown
    #[arg(long, default_value = "little")]
    savings: SavingsTier,

    /// little, moderate, rich or unknown
    #[arg(long, default_value = "little")]
    checking: CheckingTier,

    /// Loan purpose (see `purposes`); defaults to the first known purpose
    #[arg(long)]
    purpose: Option<String>,

    /// Duration in months
    #[arg(long, default_value_t = 12, value_parser = clap::value_parser!(u32).range(1..=72))]
    duration: u32,

    /// Credit amount
    #[arg(long, default_value_t = 1000.0)]
    credit_amount: f64,

    /// Print the feature row handed to the model
    #[arg(long)]
    show_features: bool,

    /// Print the assessment as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    if let Some(dir) = &cli.models_dir {
        config.models.models_dir = dir.clone();
    }

    init_logging(&config)?;
    info!(models_dir = %config.models.models_dir, "Starting credit risk scorer");

    match cli.command {
        Command::Assess(args) => {
            let context =
                ScoringContext::load(&config.models).context("Failed to load model artifacts")?;
            assess(&context, &args)
        }
        Command::Purposes => {
            let encoders = ArtifactLoader::new(&config.models)
                .load_encoders()
                .context("Failed to load encoders")?;
            for purpose in encoders.purposes() {
                println!("{purpose}");
            }
            Ok(())
        }
        Command::Explain => {
            let importance = ArtifactLoader::new(&config.models).load_feature_importance();
            explain(&importance, &config);
            Ok(())
        }
    }
}

/// Logs go to stderr so stdout only carries the verdict
fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(format!(
            "credit_risk_scorer={level},credit_risk={level},ort=warn",
            level = config.logging.level
        ))
    })?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.json_logs() {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

fn assess(context: &ScoringContext, args: &AssessArgs) -> Result<()> {
    let application = match &args.input {
        Some(path) => read_application(path)?,
        None => RawApplication {
            age: args.age,
            sex: args.sex,
            housing: args.housing,
            savings: args.savings,
            checking: args.checking,
            purpose: match &args.purpose {
                Some(purpose) => purpose.clone(),
                None => context
                    .purposes()
                    .first()
                    .cloned()
                    .context("Purpose encoder has no classes")?,
            },
            duration_months: args.duration,
            credit_amount: args.credit_amount,
        },
    };

    let assessment = context.assess(&application)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&assessment)?);
    } else {
        print_assessment(&assessment, args.show_features);
    }
    Ok(())
}

fn read_application(path: &Path) -> Result<RawApplication> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read application from {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse application {}", path.display()))
}

fn print_assessment(assessment: &RiskAssessment, show_features: bool) {
    println!(
        "Prediction: {} - {}",
        assessment.label,
        assessment.label.summary()
    );

    if let Some(warning) = assessment.schema().warning() {
        println!("Warning: {warning}");
    }

    if show_features {
        let features = &assessment.features;
        let width = features.columns.iter().map(String::len).max().unwrap_or(0);
        println!();
        for (name, value) in features.columns.iter().zip(&features.values) {
            println!("  {name:<width$}  {value:.4}");
        }
    }
}

fn explain(importance: &FeatureImportance, config: &AppConfig) {
    if importance.is_empty() {
        println!("No feature importance published with this model.");
    } else {
        println!("Feature importance:");
        let width = importance
            .entries()
            .iter()
            .map(|e| e.feature.len())
            .max()
            .unwrap_or(0);
        for (feature, share) in importance.normalized() {
            let bar = "#".repeat((share * 40.0).round() as usize);
            println!("  {feature:<width$}  {:>5.1}%  {bar}", share * 100.0);
        }
    }

    println!();
    println!("Charts:");
    for (title, path) in config.charts.entries() {
        let status = if Path::new(path).exists() {
            ""
        } else {
            " (missing)"
        };
        println!("  {title}: {path}{status}");
    }
}
