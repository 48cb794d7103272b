use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use stormcast::api::{http, mock};
use stormcast::common::log;
use stormcast::scoring::ScoringMode;
use stormcast::{AppCfg, PredictResponse, Predictor, WeatherRecord};

#[derive(Parser)]
#[command(name = "stormcast", version, about = "Weather event prediction service")]
struct Cli {
    /// Interface to bind
    #[arg(long, global = true)]
    host: Option<String>,

    /// Port to bind
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Scoring strategy: fallback or learned (untrained placeholder)
    #[arg(long, global = true)]
    scoring: Option<ScoringMode>,

    /// Base seed for the placeholder networks
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print model status and run a sample storm prediction
    Check,

    /// Predict from a JSON weather record
    Predict {
        /// Inline JSON object
        #[arg(short, long, conflicts_with = "file")]
        input: Option<String>,

        /// Path to a JSON file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Run the HTTP prediction API
    Serve,

    /// Run the raw-socket mock API with canned responses
    Mock,
}

fn load_config(cli: &Cli) -> Result<AppCfg> {
    let mut cfg = AppCfg::load().context("loading configuration from environment")?;
    if let Some(host) = &cli.host {
        cfg.host = host.clone();
    }
    if let Some(port) = cli.port {
        cfg.port = port;
    }
    if let Some(scoring) = cli.scoring {
        cfg.scoring = scoring;
    }
    if let Some(seed) = cli.seed {
        cfg.seed = seed;
    }
    cfg.log_json |= cli.log_json;
    Ok(cfg)
}

fn sample_record() -> WeatherRecord {
    let sample = json!({
        "temperature": 35,
        "humidity": 85,
        "pressure": 995,
        "wind_speed": 45,
        "visibility": 2,
        "cloud_cover": 90,
        "uv_index": 1,
        "precipitation": 15
    });
    match sample {
        Value::Object(map) => map,
        _ => WeatherRecord::new(),
    }
}

fn read_record(input: Option<String>, file: Option<PathBuf>) -> Result<WeatherRecord> {
    let raw = match (input, file) {
        (Some(inline), _) => inline,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?,
        (None, None) => bail!("pass --input '<json>' or --file <path>"),
    };
    match serde_json::from_str::<Value>(&raw).context("parsing weather record")? {
        Value::Object(map) => Ok(map),
        _ => bail!("weather record must be a JSON object"),
    }
}

fn run_check(predictor: &Predictor) -> Result<()> {
    let health = predictor.health_check();
    println!("Model status:   {:?}", health.model_status);
    println!("SD environment: {}", health.sd_environment);
    println!("Scoring mode:   {}", predictor.mode());
    println!("Algorithms:     {} loaded", health.algorithms_count);

    match predictor.predict_response(&sample_record()) {
        PredictResponse::Success(result) => {
            let best = result.best();
            println!("Sample prediction:");
            println!("  algorithm:  {}", best.algorithm);
            println!("  event:      {}", best.event_type);
            println!("  confidence: {:.1}%", best.confidence.value() * 100.0);
            println!("  rarity:     {}", best.rarity.as_str());
            Ok(())
        }
        PredictResponse::Failure { error } => bail!("sample prediction failed: {error}"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = load_config(&cli)?;
    log::init(&cfg);

    match cli.command.unwrap_or(Command::Check) {
        Command::Check => run_check(&Predictor::from_config(&cfg)),
        Command::Predict { input, file } => {
            let record = read_record(input, file)?;
            let response = Predictor::from_config(&cfg).predict_response(&record);
            println!("{}", serde_json::to_string_pretty(&response)?);
            if !response.is_success() {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Serve => {
            let predictor = Arc::new(Predictor::from_config(&cfg));
            http::serve(&cfg, predictor).await?;
            Ok(())
        }
        Command::Mock => {
            mock::serve(&cfg).await?;
            Ok(())
        }
    }
}
