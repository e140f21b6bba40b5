//! `predmaint` command-line entry point.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use predmaint_api::config::ServerConfig;
use predmaint_core::sensor::DEFAULT_SENSOR_NAMES;
use predmaint_core::simulator::Esp32Simulator;
use predmaint_core::synthetic::SyntheticConfig;
use predmaint_core::thresholds::default_rules;
use predmaint_db::repositories::StatsRepo;
use predmaint_db::DbPool;
use predmaint_pipeline::collector::{self, DEFAULT_SUMMARY_LIMIT};
use predmaint_pipeline::predictor::{
    ModelStore, PredictionOutcome, Predictor, SequenceStep, DEFAULT_RESIDUAL_THRESHOLD,
};
use predmaint_pipeline::run::{run_pipeline, RunOptions, PREDICTION_REPORT_FILE, TRAINING_RESULTS_FILE};
use predmaint_pipeline::simulate::{run_simulation, save_records, SimulationOptions};
use predmaint_pipeline::{anomaly, loader, open_database, report, topology, trainer, PipelineConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

const DEMO_REPORT_FILE: &str = "demo_report.json";

#[derive(Parser)]
#[command(name = "predmaint", version, about = "Industrial IoT predictive-maintenance pipeline")]
struct Cli {
    /// Database URL; overrides `DATABASE_URL`.
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Directory for trained models; overrides `MODELS_DIR`.
    #[arg(long, global = true)]
    models_dir: Option<PathBuf>,

    /// Directory for JSON reports; overrides `OUTPUT_DIR`.
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply migrations and create the default asset and sensors.
    Setup,
    /// Run the ESP32 simulator and write its records to a JSON file.
    Simulate {
        #[command(flatten)]
        simulation: SimulationArgs,
        /// Output file.
        #[arg(short, long, default_value = "sensor_data.json")]
        output: PathBuf,
    },
    /// Load a simulator JSON file into the database.
    Ingest {
        file: PathBuf,
    },
    /// Generate synthetic history and load it.
    LoadSynthetic {
        #[command(flatten)]
        synthetic: SyntheticArgs,
    },
    /// Load synthetic history plus sample alerts and predictions, then report.
    Demo {
        #[command(flatten)]
        synthetic: SyntheticArgs,
    },
    /// Train a linear model per sensor.
    Train {
        #[command(flatten)]
        sensors: SensorArgs,
    },
    /// Predict the next reading of each sensor and store it.
    Predict {
        #[command(flatten)]
        sensors: SensorArgs,
        /// Also forecast this many steps ahead.
        #[arg(long)]
        steps: Option<i64>,
    },
    /// Check latest readings against thresholds and store alerts.
    Detect {
        #[command(flatten)]
        sensors: SensorArgs,
        /// Also compare latest readings with model predictions.
        #[arg(long)]
        residual: bool,
        /// Residual threshold in standard deviations.
        #[arg(long, default_value_t = DEFAULT_RESIDUAL_THRESHOLD)]
        threshold: f64,
    },
    /// Write the prediction report.
    Report {
        #[command(flatten)]
        sensors: SensorArgs,
    },
    /// Print database counts and per-sensor statistics.
    Stats,
    /// Simulate, ingest, train, predict and detect in one pass.
    Run {
        #[command(flatten)]
        simulation: SimulationArgs,
        #[command(flatten)]
        sensors: SensorArgs,
    },
    /// Serve the dashboard data API.
    Serve,
}

#[derive(Args)]
struct SimulationArgs {
    /// Seconds to sample for.
    #[arg(long, default_value_t = 120)]
    duration: u64,
    /// Seconds between samples.
    #[arg(long, default_value_t = 5)]
    interval: u64,
    /// Seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,
}

impl SimulationArgs {
    fn options(&self) -> SimulationOptions {
        SimulationOptions {
            duration: Duration::from_secs(self.duration),
            interval: Duration::from_secs(self.interval),
        }
    }
}

#[derive(Args)]
struct SyntheticArgs {
    /// Days of history ending now.
    #[arg(long, default_value_t = 7)]
    days: i64,
    /// Minutes between readings.
    #[arg(long, default_value_t = 5)]
    frequency: i64,
    #[arg(long)]
    seed: Option<u64>,
}

impl SyntheticArgs {
    fn config(&self) -> SyntheticConfig {
        SyntheticConfig {
            days: self.days,
            frequency_minutes: self.frequency,
        }
    }
}

#[derive(Args)]
struct SensorArgs {
    /// Sensor to process; repeat for several. Defaults to all four.
    #[arg(long = "sensor")]
    sensors: Vec<String>,
}

impl SensorArgs {
    fn names(&self) -> Vec<String> {
        if self.sensors.is_empty() {
            DEFAULT_SENSOR_NAMES.iter().map(|s| s.to_string()).collect()
        } else {
            self.sensors.clone()
        }
    }
}

fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    predmaint_api::init_tracing("predmaint=info,predmaint_pipeline=info,predmaint_api=info");

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = ?e, "Command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = PipelineConfig::from_env();
    if let Some(url) = cli.database_url {
        config.database_url = url;
    }
    if let Some(dir) = cli.models_dir {
        config.models_dir = dir;
    }
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }

    // The simulator needs no database.
    if let Command::Simulate { simulation, output } = &cli.command {
        let mut simulator = Esp32Simulator::new(rng(simulation.seed));
        run_simulation(&mut simulator, &simulation.options()).await?;
        save_records(output, simulator.records()).await?;
        if let Some(summary) = simulator.summary() {
            print_json(&summary)?;
        }
        return Ok(());
    }

    let pool = open_database(&config)
        .await
        .with_context(|| format!("opening database {}", config.database_url))?;

    match cli.command {
        Command::Simulate { .. } => Ok(()),
        Command::Setup => {
            let topology = topology::ensure_default_topology(&pool).await?;
            print_json(&topology)
        }
        Command::Ingest { file } => {
            let records = collector::load_json_file(&file).await?;
            let topology = topology::ensure_default_topology(&pool).await?;
            let readings = collector::process_records(&records, &topology)?;
            let inserted = collector::load(&pool, &readings).await?;
            println!("{inserted} readings loaded from {}", file.display());
            Ok(())
        }
        Command::LoadSynthetic { synthetic } => {
            topology::ensure_default_topology(&pool).await?;
            let cfg = synthetic.config();
            let inserted =
                loader::load_synthetic(&pool, &cfg, cfg.default_start()?, &mut rng(synthetic.seed))
                    .await?;
            println!("{inserted} synthetic readings loaded");
            Ok(())
        }
        Command::Demo { synthetic } => demo(&pool, &config, &synthetic).await,
        Command::Train { sensors } => {
            let names = sensors.names();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let training = trainer::train_all(&pool, &config.models_dir, &refs).await;
            trainer::save_results(&config.output_dir.join(TRAINING_RESULTS_FILE), &training)
                .await?;
            print_json(&training)
        }
        Command::Predict { sensors, steps } => {
            let predictor = predictor(&pool, &config).await?;
            print_json(&forecast_sensors(&predictor, &sensors.names(), steps).await)
        }
        Command::Detect {
            sensors,
            residual,
            threshold,
        } => {
            let anomalies = anomaly::detect_latest(&pool, &default_rules()).await?;
            print_json(&anomalies)?;
            if residual {
                let predictor = predictor(&pool, &config).await?;
                // Without --sensor, every sensor that has a model is checked.
                let names: Vec<String> = if sensors.sensors.is_empty() {
                    predictor.store().sensor_names().map(str::to_string).collect()
                } else {
                    sensors.sensors
                };
                for sensor in names {
                    match predictor.detect_residual_anomaly(&sensor, threshold).await {
                        Ok(Some(found)) => {
                            anomaly::record_residual_anomaly(&pool, &found).await?;
                            print_json(&found)?;
                        }
                        Ok(None) => {}
                        Err(e) => tracing::warn!(sensor = %sensor, error = %e, "Residual check failed"),
                    }
                }
            }
            Ok(())
        }
        Command::Report { sensors } => {
            let predictor = predictor(&pool, &config).await?;
            let names = sensors.names();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let prediction_report = predictor.prediction_report(&refs).await;
            report::write_json(&config.output_dir.join(PREDICTION_REPORT_FILE), &prediction_report)
                .await?;
            print_json(&prediction_report)
        }
        Command::Stats => {
            print_json(&StatsRepo::database_stats(&pool).await?)?;
            print_json(&collector::sensor_summary_report(&pool, DEFAULT_SUMMARY_LIMIT).await?)
        }
        Command::Run {
            simulation,
            sensors,
        } => {
            let options = RunOptions {
                simulation: simulation.options(),
                sensors: sensors.names(),
                seed: simulation.seed,
            };
            let summary = run_pipeline(&pool, &config, &options).await?;
            print_json(&summary)
        }
        Command::Serve => {
            let server = ServerConfig::from_env();
            predmaint_api::serve(pool, server).await?;
            Ok(())
        }
    }
}

async fn predictor(pool: &DbPool, config: &PipelineConfig) -> anyhow::Result<Predictor> {
    let store = ModelStore::load_dir(&config.models_dir).await?;
    if store.is_empty() {
        anyhow::bail!(
            "no models found in {}; run `predmaint train` first",
            config.models_dir.display()
        );
    }
    Ok(Predictor::new(pool.clone(), store, config.model_version.clone()))
}

/// `predict` output for one sensor. A step that failed is logged and left empty.
#[derive(Debug, Serialize)]
struct SensorForecast {
    sensor: String,
    next: Option<PredictionOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sequence: Option<Vec<SequenceStep>>,
}

async fn forecast_sensors(
    predictor: &Predictor,
    sensors: &[String],
    steps: Option<i64>,
) -> Vec<SensorForecast> {
    let mut forecasts = Vec::with_capacity(sensors.len());
    for sensor in sensors {
        let next = match predictor.predict_next(sensor).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::warn!(sensor = %sensor, error = %e, "Prediction failed");
                None
            }
        };
        let sequence = match steps {
            Some(steps) => match predictor.predict_sequence(sensor, steps).await {
                Ok(sequence) => Some(sequence),
                Err(e) => {
                    tracing::warn!(sensor = %sensor, error = %e, "Sequence forecast failed");
                    None
                }
            },
            None => None,
        };
        forecasts.push(SensorForecast {
            sensor: sensor.clone(),
            next,
            sequence,
        });
    }
    forecasts
}

async fn demo(pool: &DbPool, config: &PipelineConfig, synthetic: &SyntheticArgs) -> anyhow::Result<()> {
    let mut rng = rng(synthetic.seed);
    topology::ensure_default_topology(pool).await?;

    let cfg = synthetic.config();
    loader::load_synthetic(pool, &cfg, cfg.default_start()?, &mut rng).await?;
    loader::create_sample_alerts(pool).await?;
    loader::create_sample_predictions(pool, &mut rng, &config.model_version).await?;

    let demo_report = loader::demo_report(pool).await?;
    report::write_json(&config.output_dir.join(DEMO_REPORT_FILE), &demo_report).await?;
    print_json(&demo_report)
}
