//! Crop recommendation command line interface
//!
//! Recommends a crop from soil and climate measurements or from live weather,
//! prints dataset insights, and verifies a trained artifact set.

mod config;
mod report;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use croprec_core::artifacts::verify_digests;
use croprec_core::{
    CoreError, ErrorKind, FeatureVector, Predictor, Recommendation, FEATURE_RANGES,
};
use croprec_trainer::{insights, Dataset};
use croprec_weather::{OpenWeatherClient, WeatherAdapter, WeatherError, WeatherOutcome};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "croprec")]
#[command(about = "Crop recommendation from soil and weather conditions", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./croprec.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the trained artifacts (overrides configuration)
    #[arg(long, global = true)]
    model_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend a crop from the seven measurements
    Predict(PredictArgs),
    /// Recommend a crop from a city's current weather
    Weather {
        /// City name, e.g. "Lucknow"
        #[arg(long)]
        city: String,
    },
    /// Label distribution, feature importance and correlations
    Insights {
        /// Labeled CSV (overrides configuration)
        #[arg(long)]
        dataset: Option<PathBuf>,
    },
    /// Check artifact digests against the manifest
    Verify,
}

#[derive(Args, Debug)]
struct PredictArgs {
    /// Nitrogen (N), 0-150
    #[arg(long, alias = "n", default_value_t = FEATURE_RANGES[0].default)]
    nitrogen: f64,

    /// Phosphorus (P), 0-150
    #[arg(long, alias = "p", default_value_t = FEATURE_RANGES[1].default)]
    phosphorus: f64,

    /// Potassium (K), 0-210
    #[arg(long, alias = "k", default_value_t = FEATURE_RANGES[2].default)]
    potassium: f64,

    /// Temperature in °C, 0-50
    #[arg(long, default_value_t = FEATURE_RANGES[3].default)]
    temperature: f64,

    /// Relative humidity in %, 0-100
    #[arg(long, default_value_t = FEATURE_RANGES[4].default)]
    humidity: f64,

    /// Soil pH, 0-14
    #[arg(long, default_value_t = FEATURE_RANGES[5].default)]
    ph: f64,

    /// Rainfall in mm, 0-300
    #[arg(long, default_value_t = FEATURE_RANGES[6].default)]
    rainfall: f64,
}

impl PredictArgs {
    /// Range-checked feature vector; out-of-range input never reaches the model
    fn features(&self) -> Result<FeatureVector> {
        let raw = [
            self.nitrogen,
            self.phosphorus,
            self.potassium,
            self.temperature,
            self.humidity,
            self.ph,
            self.rainfall,
        ];
        let mut checked = Vec::with_capacity(raw.len());
        for (range, value) in FEATURE_RANGES.iter().zip(raw) {
            checked.push(range.check(value)?);
        }
        Ok(FeatureVector::from_slice(&checked)?)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.model_dir {
        config.model_dir = dir;
    }
    init_logging(&config)?;
    debug!("Using model directory {}", config.model_dir.display());

    match cli.command {
        Commands::Predict(args) => handle_predict(&config, &args),
        Commands::Weather { city } => handle_weather(&config, &city).await,
        Commands::Insights { dataset } => handle_insights(&config, dataset),
        Commands::Verify => handle_verify(&config.model_dir),
    }
}

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}

fn load_predictor(model_dir: &Path) -> Result<Predictor> {
    Predictor::load(model_dir).with_context(|| {
        format!(
            "Failed to load model artifacts from {} (run croprec-train first)",
            model_dir.display()
        )
    })
}

fn remedy(err: &CoreError) -> &'static str {
    match err.kind() {
        ErrorKind::CallerInput => "fix the input values and try again",
        ErrorKind::Configuration => "retrain the artifacts with croprec-train",
    }
}

fn print_recommendation(rec: &Recommendation) {
    let name = rec.display_name();
    println!("Recommended Crop: {name}");
    println!("About {name}: {}", rec.info.text());
}

fn handle_predict(config: &AppConfig, args: &PredictArgs) -> Result<()> {
    let features = args.features()?;
    let predictor = load_predictor(&config.model_dir)?;

    let rec = predictor
        .predict(&features)
        .map_err(|err| anyhow::anyhow!("Prediction failed: {err} ({})", remedy(&err)))?;
    info!("Predicted {} (class {})", rec.crop, rec.code);
    print_recommendation(&rec);
    Ok(())
}

async fn handle_weather(config: &AppConfig, city: &str) -> Result<()> {
    if city.trim().is_empty() {
        eprintln!("Warning: {}", WeatherError::EmptyCity.user_message());
        return Ok(());
    }

    let client = match OpenWeatherClient::new(config.weather.clone()) {
        Ok(client) => client,
        Err(WeatherError::MissingApiKey) => {
            bail!("No weather API key configured; set weather.api_key or CROPREC_WEATHER__API_KEY")
        }
        Err(err) => return Err(err).context("Failed to create weather client"),
    };
    let predictor = load_predictor(&config.model_dir)?;
    let adapter = WeatherAdapter::new(client);

    match adapter
        .recommend_with(city, |features| predictor.predict(features))
        .await
    {
        WeatherOutcome::Recommended {
            observation,
            recommendation,
            ..
        } => {
            println!(
                "Current weather in {}: {:.1}°C, {:.0}% humidity",
                city.trim(),
                observation.temperature,
                observation.humidity
            );
            println!(
                "Based on {}'s weather, recommended crop: {}",
                city.trim(),
                recommendation.display_name()
            );
            println!(
                "About {}: {}",
                recommendation.display_name(),
                recommendation.info.text()
            );
            println!(
                "Note: soil nutrients, pH and rainfall are placeholder values; \
                 treat this as a lower-confidence recommendation."
            );
        }
        WeatherOutcome::Warning(message) => {
            eprintln!("Warning: {message}");
        }
    }
    Ok(())
}

fn handle_insights(config: &AppConfig, dataset: Option<PathBuf>) -> Result<()> {
    let path = match dataset.or_else(|| config.dataset.clone()) {
        Some(path) => path,
        None => bail!("No dataset given; pass --dataset or set dataset / CROPREC_DATASET"),
    };
    let dataset = Dataset::from_csv(&path)
        .with_context(|| format!("Failed to load dataset {}", path.display()))?;
    info!("Loaded {} rows from {}", dataset.len(), path.display());

    println!("{}", report::label_distribution(&insights::label_distribution(&dataset)));

    match Predictor::load(&config.model_dir) {
        Ok(predictor) => {
            let ranking = insights::feature_importance_ranking(&predictor.artifacts().forest);
            println!("{}", report::importance_ranking(&ranking));
        }
        Err(err) => warn!(
            "Skipping feature importance, no usable model in {}: {}",
            config.model_dir.display(),
            err
        ),
    }

    print!("{}", report::correlation_matrix(&insights::correlation_matrix(&dataset)));
    Ok(())
}

fn handle_verify(model_dir: &Path) -> Result<()> {
    let checks = verify_digests(model_dir)
        .with_context(|| format!("Failed to read manifest in {}", model_dir.display()))?;
    println!("Artifacts in {}:", model_dir.display());
    print!("{}", report::artifact_checks(&checks));

    if checks.iter().any(|check| !check.is_ok()) {
        bail!("Artifact set does not match its manifest; retrain to replace it as a whole");
    }

    let predictor = load_predictor(model_dir)?;
    if let Some(manifest) = predictor.manifest() {
        println!(
            "Manifest v{}: {} labels, {} trees, seed {}, held-out accuracy {:.4}",
            manifest.format_version,
            manifest.labels.len(),
            manifest.training.n_trees,
            manifest.training.seed,
            manifest.training.accuracy
        );
    }
    Ok(())
}
