use std::path::PathBuf;
use std::process;

use anyhow::Result;
use chrono::Utc;
use clap::{ArgAction, Parser};
use tracing::info;

use iterate::config::Config;
use iterate::display;
use iterate::driver;
use iterate::errors::IterateError;
use iterate::logging::{self, LogOptions, LogSink};
use iterate::report;
use iterate::runner::ProcessExecutor;

/// iterate - roll through scripts systematically
///
/// Instruments the serial processing of provisioning scripts for debugging.
#[derive(Parser)]
#[command(name = "iterate", version)]
struct Cli {
    /// Run the commands at indices 0..=STAGE. The default list of six
    /// commands accepts 0-5; stage 5 runs the kube-system playbook too
    #[arg(env = "STAGE", default_value_t = 1)]
    stage: usize,

    #[arg(long, env = "MAAS_API_URL")]
    maas_url: Option<String>,

    #[arg(long, env = "MAAS_API_KEY", hide_env_values = true)]
    maas_key: Option<String>,

    /// Log at debug level
    #[arg(long, env = "DEBUG")]
    debug: bool,

    /// Write the JSON run report [default: true]
    #[arg(long, env = "OUTPUT_LOG", action = ArgAction::Set)]
    output_log: Option<bool>,

    /// Directory that receives `<stage>/<id>.json` reports
    #[arg(long, env = "ITERATE_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Send log lines to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Extra TOML config file, applied over .iterate.toml and the global one
    #[arg(long, env = "ITERATE_CONFIG")]
    config: Option<PathBuf>,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    logging::init_logging(&LogOptions {
        debug: cli.debug || config.debug,
        sink: cli.log_file.map(LogSink::File).unwrap_or_default(),
    })?;

    let maas_url = cli.maas_url.unwrap_or(config.maas_url.clone());
    let maas_key = cli
        .maas_key
        .or(config.maas_key.clone())
        .ok_or(IterateError::MissingApiKey)?;
    let output_log = cli.output_log.unwrap_or(config.output_log);
    let log_dir = cli.log_dir.unwrap_or(config.log_dir.clone());

    let commands = config.command_lines();
    let mut executor = ProcessExecutor::new()
        .env("MAAS_API_URL", maas_url)
        .env("MAAS_API_KEY", maas_key);

    let started = Utc::now();
    let results = driver::run_stage(&commands, cli.stage, &mut executor)?;

    if output_log {
        let path = report::write_report(&log_dir, cli.stage, &results, started)?;
        info!("Wrote run report to {}", path.display());
    }

    for line in display::format_summary(&results) {
        info!("{}", line);
    }

    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{}", err);
        process::exit(1);
    }
}
