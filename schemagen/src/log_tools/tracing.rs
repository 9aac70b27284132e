use std::path::Path;
use std::str::FromStr;

use error_stack::Report;
use serde::Deserialize;
use strum::Display;
use tracing_subscriber::Registry;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use super::lazy_file_writer::LazyFileWriter;
use crate::error::Error;
use crate::error::Result;

/// Log level of a run, from the configuration or the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TracingLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Progress messages
    #[default]
    Info,
    /// Resolution and scanning details
    Debug,
    /// Everything
    Trace,
}

impl FromStr for TracingLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(format!(
                "Invalid tracing level '{s}'. Valid levels are: error, warn, info, debug, trace"
            )),
        }
    }
}

impl From<TracingLevel> for LevelFilter {
    fn from(level: TracingLevel) -> Self {
        match level {
            TracingLevel::Error => Self::ERROR,
            TracingLevel::Warn => Self::WARN,
            TracingLevel::Info => Self::INFO,
            TracingLevel::Debug => Self::DEBUG,
            TracingLevel::Trace => Self::TRACE,
        }
    }
}

impl TracingLevel {
    /// Install the global subscriber: stderr, plus `log_file` when given
    ///
    /// The log file is only created once something is written to it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when a global subscriber is already set.
    pub fn init_tracing(level: Self, log_file: Option<&Path>) -> Result<()> {
        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false);
        let file_layer = log_file.map(|path| {
            tracing_subscriber::fmt::layer()
                .with_writer(LazyFileWriter::new(path.to_path_buf()))
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
        });

        Registry::default()
            .with(LevelFilter::from(level))
            .with(stderr_layer)
            .with(file_layer)
            .try_init()
            .map_err(|e| {
                Report::new(Error::Configuration(format!(
                    "Failed to initialize logging: {e}"
                )))
            })
    }
}
