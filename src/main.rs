use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use neurotrade::application::optimization::parallel_benchmark::{
    BacktestJob, ParallelBacktestRunner,
};
use neurotrade::application::optimization::simulator::BacktestOptions;
use neurotrade::application::pipeline::NeuralPipeline;
use neurotrade::config::Config;
use neurotrade::domain::market::Timeframe;
use neurotrade::domain::market::broker_profile::{BrokerId, broker_profile};
use neurotrade::domain::market::indicator_advisor::recommend_indicators;
use neurotrade::domain::market::symbol::MarketType;
use neurotrade::domain::ports::MarketDataProvider;
use neurotrade::infrastructure::{CsvHistoryProvider, MockMarketDataProvider, TwelveDataProvider};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about = "Self-training binary-options signal engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Source {
    /// Deterministic synthetic series
    Mock,
    /// Local `time,price,volume,high,low` file
    Csv,
    /// Twelve Data REST API (needs TWELVE_DATA_API_KEYS)
    Twelvedata,
}

#[derive(Args)]
struct SourceArgs {
    #[arg(long, value_enum, default_value = "mock")]
    source: Source,

    /// CSV file for `--source csv`
    #[arg(long)]
    file: Option<PathBuf>,

    #[arg(short, long, default_value = "1min")]
    timeframe: Timeframe,

    /// Overrides MODEL_SEED
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Market physics, broker profile and indicator advice
    Physics {
        #[arg(short, long, default_value = "EUR/USD")]
        symbol: String,

        #[arg(long, default_value = "POCKET_OPTION")]
        broker: BrokerId,

        #[command(flatten)]
        source: SourceArgs,
    },
    /// Full analysis: physics, both predictors and their consensus
    Ensemble {
        #[arg(short, long, default_value = "EUR/USD")]
        symbol: String,

        #[command(flatten)]
        source: SourceArgs,
    },
    /// Walk-forward backtest
    Backtest {
        /// Symbol(s) to backtest (comma separated)
        #[arg(short, long, default_value = "EUR/USD")]
        symbols: String,

        #[command(flatten)]
        source: SourceArgs,
    },
}

fn build_provider(args: &SourceArgs, config: &Config) -> Result<Arc<dyn MarketDataProvider>> {
    let provider: Arc<dyn MarketDataProvider> = match args.source {
        Source::Mock => Arc::new(MockMarketDataProvider::default()),
        Source::Csv => {
            let path = args
                .file
                .clone()
                .context("--file is required with --source csv")?;
            Arc::new(CsvHistoryProvider::new(path))
        }
        Source::Twelvedata => {
            let md = &config.market_data;
            Arc::new(
                TwelveDataProvider::builder()
                    .base_url(md.twelve_data_base_url.clone())
                    .api_keys(md.twelve_data_api_keys.clone())
                    .output_size(md.output_size)
                    .timeout(Duration::from_secs(md.http_timeout_secs))
                    .max_retries(md.max_retries)
                    .build()?,
            )
        }
    };
    Ok(provider)
}

fn build_pipeline(config: &Config, seed: Option<u64>) -> Result<NeuralPipeline> {
    let mut model = config.model.to_model_config()?;
    if let Some(seed) = seed {
        model = model.with_seed(seed);
    }
    let backtest = config.backtest.to_backtest_config()?;
    Ok(NeuralPipeline::new(model, backtest))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Physics {
            symbol,
            broker,
            source,
        } => {
            let provider = build_provider(&source, &config)?;
            let pipeline = build_pipeline(&config, source.seed)?;
            let data = provider.fetch(&symbol, source.timeframe).await?;
            let physics = pipeline.compute_physics(&data);

            print_json(&json!({
                "symbol": symbol,
                "timeframe": source.timeframe,
                "observations": data.len(),
                "physics": physics,
                "broker": broker_profile(&symbol, &physics, broker),
                "indicators": recommend_indicators(&physics, MarketType::from_symbol(&symbol)),
            }))?;
        }
        Commands::Ensemble { symbol, source } => {
            let provider = build_provider(&source, &config)?;
            let pipeline = build_pipeline(&config, source.seed)?;
            let analysis = pipeline
                .analyze(provider.as_ref(), &symbol, source.timeframe)
                .await?;
            print_json(&analysis)?;
        }
        Commands::Backtest { symbols, source } => {
            let provider = build_provider(&source, &config)?;
            let pipeline = build_pipeline(&config, source.seed)?;

            let mut jobs = Vec::new();
            for symbol in symbols.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                let history = provider.fetch(symbol, source.timeframe).await?;
                jobs.push(BacktestJob {
                    symbol: symbol.to_string(),
                    timeframe: source.timeframe,
                    history,
                });
            }
            info!(jobs = jobs.len(), "Starting backtests");

            let runner = ParallelBacktestRunner::new(pipeline.simulator().clone());
            let options = BacktestOptions {
                seed: pipeline.model_config().seed,
                cancel: None,
            };
            let batches = tokio::task::spawn_blocking(move || runner.run_parallel(jobs, &options))
                .await
                .context("Backtest worker panicked")?;

            let report: Vec<_> = batches
                .into_iter()
                .map(|batch| match batch.result {
                    Ok(result) => json!({ "symbol": batch.symbol, "result": result }),
                    Err(e) => json!({ "symbol": batch.symbol, "error": e.to_string() }),
                })
                .collect();
            print_json(&report)?;
        }
    }

    Ok(())
}
