//! # schemagen
//!
//! Runs one schema generation pass. The configuration file is the optional
//! positional argument and defaults to `schemagen.json` in the working
//! directory. Exits with status 1 when the run fails.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use registry_schemagen::config::DEFAULT_CONFIG_FILE;
use registry_schemagen::config::RunConfig;
use registry_schemagen::log_tools::TracingLevel;
use registry_schemagen::schema_gen::Orchestrator;
use registry_schemagen::type_loader::AmbientContext;

/// Generate a JSON schema for every concrete subtype of a base type
#[derive(Parser, Debug)]
#[command(name = "schemagen", version, about, long_about = None)]
struct Cli {
    /// Path to the run configuration
    #[arg(default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Log level, overriding `logLevel` from the configuration
    #[arg(long)]
    log_level: Option<TracingLevel>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match RunConfig::from_json_file(&cli.config) {
        Ok(config) => config,
        Err(report) => {
            eprintln!("schemagen: {report:?}");
            return ExitCode::FAILURE;
        },
    };

    let level = cli.log_level.unwrap_or(config.log_level);
    if let Err(report) = TracingLevel::init_tracing(level, config.log_file.as_deref()) {
        eprintln!("schemagen: {report:?}");
        return ExitCode::FAILURE;
    }

    match Orchestrator::new(AmbientContext::global()).run(&config) {
        Ok(_) => ExitCode::SUCCESS,
        Err(report) => {
            eprintln!("schemagen: {report}");
            ExitCode::FAILURE
        },
    }
}
