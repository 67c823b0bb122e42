//! Headless arena runner.
//!
//! Loads content from a data directory, runs one scenario through the
//! runtime and prints how every actor fared.
mod config;
mod report;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use config::CliConfig;
use game_content::{ConfigLoader, ContentFactory, Scenario, ScenarioLoader};
use report::Outcome;
use runtime::{Runtime, RuntimeConfig, Topic, drain};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = CliConfig::from_env();

    // Keep the guard alive so buffered file logs are flushed on exit
    let _guard = setup_logging(config.log_dir.as_deref())?;

    let (runtime, name) = build_runtime(&config)?;
    run(runtime, &name, &config).await
}

/// Setup logging to stderr and, when a directory is given, to a file.
fn setup_logging(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let file_appender = tracing_appender::rolling::never(dir, "arena.log");
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking_file)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if let Some(dir) = log_dir {
        tracing::info!("Log file: {}/arena.log", dir.display());
    }
    Ok(guard)
}

fn load_scenario(config: &CliConfig, factory: &ContentFactory) -> Result<Scenario> {
    if config.scenario.ends_with(".ron") {
        ScenarioLoader::load(Path::new(&config.scenario))
    } else {
        factory.load_scenario(&config.scenario)
    }
}

fn build_runtime(config: &CliConfig) -> Result<(Runtime, String)> {
    let factory = ContentFactory::new(&config.data_dir);

    let game_config = match &config.config_path {
        Some(path) => ConfigLoader::load(path)?,
        None => factory.load_config()?,
    };
    let catalog = factory.load_tunings()?;
    let mut scenario = load_scenario(config, &factory)?;
    ScenarioLoader::check_references(&scenario, &catalog)
        .with_context(|| format!("Scenario '{}' references missing tunings", scenario.name))?;
    if let Some(seed) = config.seed {
        scenario.seed = seed;
    }

    let name = scenario.name.clone();
    tracing::info!(
        scenario = %name,
        seed = scenario.seed,
        tunings = catalog.len(),
        "building arena"
    );

    let runtime = Runtime::builder()
        .config(RuntimeConfig {
            game_config,
            ..RuntimeConfig::default()
        })
        .catalog(catalog)
        .scenario(scenario)
        .build()
        .with_context(|| format!("Failed to build arena for scenario '{name}'"))?;
    Ok((runtime, name))
}

async fn run(mut runtime: Runtime, name: &str, config: &CliConfig) -> Result<()> {
    let mut receivers = runtime
        .events()
        .subscribe_multiple(&[Topic::Combat, Topic::Lifecycle, Topic::Behavior]);

    let frame_dt = config.frame_dt();
    let mut pacing = config
        .realtime
        .then(|| tokio::time::interval(Duration::from_secs_f32(frame_dt)));

    tracing::info!(
        frames = config.frames(),
        frame_dt,
        realtime = config.realtime,
        "running arena"
    );

    let mut outcome = Outcome::Timeout;
    for _ in 0..config.frames() {
        if let Some(interval) = pacing.as_mut() {
            interval.tick().await;
        }
        runtime.step(frame_dt)?;

        for receiver in receivers.values_mut() {
            for event in drain(receiver) {
                report::log_event(&event);
            }
        }

        if let Some(decided) = Outcome::decided(runtime.records()) {
            outcome = decided;
            break;
        }
    }

    tracing::info!(?outcome, time = runtime.sim_time(), "arena finished");
    print!(
        "{}",
        report::summary(name, runtime.sim_time(), outcome, runtime.records())
    );
    Ok(())
}
