use std::sync::Arc;

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use senkron::{
    backend::failsafe::Failsafe,
    bodies::BodySet,
    config::EngineConfig,
    journal::{FanoutJournal, JsonlJournal, RunJournal, TracingJournal},
    jpl_ephem::download_jpl_file::EphemFileSource,
    orchestrator::EphemerisOrchestrator,
    snapshot::SnapshotWriter,
    time::{format_utc, parse_instant},
};

#[cfg(feature = "jpl-download")]
use senkron::jpl_ephem::download_jpl_file::fetch_kernel;

#[derive(Parser)]
#[command(
    name = "senkron",
    version,
    about = "Geocentric ecliptic longitudes with backend failover"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand reading the engine configuration.
#[derive(Args)]
struct ConfigArgs {
    /// JSON configuration file
    #[arg(long)]
    config: Option<Utf8PathBuf>,
    /// Directory holding the kernels (overrides the configuration)
    #[arg(long)]
    ephemeris_dir: Option<Utf8PathBuf>,
    /// Use the extended body set (adds Uranus, Neptune, Pluto, Chiron, Ceres, Eris)
    #[arg(long)]
    extended: bool,
}

impl ConfigArgs {
    fn load(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::from_json_file(path)
                .with_context(|| format!("reading configuration {path}"))?,
            None => EngineConfig::default(),
        }
        .with_default_cache();
        if let Some(dir) = &self.ephemeris_dir {
            config.ephemeris_dir = dir.clone();
        }
        if self.extended {
            config.body_set = BodySet::Extended;
        }
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compute, cross validate and persist a snapshot
    Run {
        /// Instant to compute, ISO 8601 UTC or `now`
        #[arg(long, default_value = "now")]
        at: String,
        #[command(flatten)]
        config: ConfigArgs,
        /// Directory receiving the snapshot and the summary
        #[arg(long)]
        out_dir: Option<Utf8PathBuf>,
        /// Kernel tried first, e.g. `horizon:DE440` or `naif:de440s`
        #[arg(long)]
        kernel: Option<String>,
    },
    /// Print the failsafe result as JSON
    Failsafe {
        #[arg(long, default_value = "now")]
        at: String,
        /// Use the extended body set (adds Uranus, Neptune, Pluto, Chiron, Ceres, Eris)
        #[arg(long)]
        extended: bool,
    },
    /// Report which precise backends can be loaded
    Probe {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Download a kernel into the kernel cache, or into `--ephemeris-dir` when given
    #[cfg(feature = "jpl-download")]
    Fetch {
        /// Kernel to download, e.g. `horizon:DE440` or `naif:de440s`
        source: String,
        #[command(flatten)]
        config: ConfigArgs,
    },
}

fn build_journal(config: &EngineConfig) -> Arc<dyn RunJournal> {
    let mut journal = FanoutJournal::default();
    journal.push(Arc::new(TracingJournal));
    if let Some(path) = config.journal_path() {
        journal.push(Arc::new(JsonlJournal::new(path)));
    }
    Arc::new(journal)
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            at,
            config,
            out_dir,
            kernel,
        } => {
            let instant = parse_instant(&at)?;
            let mut config = config.load()?;
            if let Some(dir) = out_dir {
                config.output_dir = dir;
            }
            if let Some(kernel) = kernel {
                config.pin_kernel(&EphemFileSource::try_from(kernel.as_str())?);
            }

            let journal = build_journal(&config);
            let orchestrator = EphemerisOrchestrator::from_config(&config, journal)?;
            let writer = SnapshotWriter::new(config.output_dir.clone());
            let (outcome, path) = orchestrator
                .run_and_persist(instant, &writer)
                .await
                .context("ephemeris run failed")?;

            info!(
                "{} at {}: engine={} precision={}",
                path,
                format_utc(instant),
                outcome.engine(),
                outcome.precision()
            );
            print!("{}", outcome.into_snapshot().summary());
        }
        Commands::Failsafe { at, extended } => {
            let instant = parse_instant(&at)?;
            let body_set = if extended {
                BodySet::Extended
            } else {
                BodySet::Classical
            };
            let result = Failsafe::new(body_set).compute(instant);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Probe { config } => {
            let config = config.load()?;
            let orchestrator =
                EphemerisOrchestrator::from_config(&config, Arc::new(TracingJournal))?;
            for status in orchestrator.probe_backends() {
                let mark = if status.available { "yes" } else { "no" };
                println!("{:<24} available={:<3} {}", status.engine, mark, status.detail);
            }
        }
        #[cfg(feature = "jpl-download")]
        Commands::Fetch { source, config } => {
            let destination = match &config.ephemeris_dir {
                Some(dir) => dir.clone(),
                None => config.load()?.download_dir().to_path_buf(),
            };
            let source = EphemFileSource::try_from(source.as_str())?;
            let path = fetch_kernel(&source, &destination)
                .await
                .with_context(|| format!("downloading {source}"))?;
            println!("{path}");
        }
    }
    Ok(())
}
