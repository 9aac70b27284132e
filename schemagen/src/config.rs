//! Run configuration
//!
//! Read from a JSON file with camelCase keys:
//!
//! ```json
//! {
//!   "namespaces": ["com.acme.model"],
//!   "baseTypeName": "com.acme.model.Event",
//!   "outputDirectory": "schemas",
//!   "buildDirectory": "target/classes",
//!   "classpath": ["registry/model.json", "registry/vendor"],
//!   "logLevel": "debug",
//!   "logFile": "target/schemagen.log"
//! }
//! ```

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use error_stack::Report;
use error_stack::ResultExt;
use serde::Deserialize;

use crate::error::Error;
use crate::error::Result;
use crate::log_tools::TracingLevel;

/// Configuration file read when none is given on the command line
pub const DEFAULT_CONFIG_FILE: &str = "schemagen.json";

/// Raw run configuration, as supplied
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    /// Namespace roots to scan; required, may be empty
    pub namespaces:       Option<Vec<String>>,
    /// Type every discovered type must extend
    pub base_type_name:   Option<String>,
    /// Where schema files are written
    pub output_directory: Option<PathBuf>,
    /// Base for a relative `output_directory`
    #[serde(default)]
    pub build_directory:  Option<PathBuf>,
    /// Registry locations in resolution order
    #[serde(default)]
    pub classpath:        Vec<String>,
    /// Log level of the binary
    #[serde(default)]
    pub log_level:        TracingLevel,
    /// Optional log file next to stderr output
    #[serde(default)]
    pub log_file:         Option<PathBuf>,
}

impl RunConfig {
    /// Read a configuration file
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileOperation`] when the file cannot be read and
    /// [`Error::Configuration`] when it is not a valid configuration.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Report::new(Error::io_failed("read configuration", path, e)))?;
        serde_json::from_str(&content).change_context_lazy(|| {
            Error::Configuration(format!("{} is not a valid configuration", path.display()))
        })
    }

    /// Check required settings and resolve the output directory
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] naming the first missing setting.
    pub fn validate(&self) -> Result<ValidatedConfig> {
        let namespaces = self
            .namespaces
            .clone()
            .ok_or_else(|| Report::new(Error::missing("namespaces")))?;

        let base_type_name = self
            .base_type_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Report::new(Error::missing("base type name")))?
            .to_string();

        let output_directory = self
            .output_directory
            .as_ref()
            .filter(|dir| !dir.as_os_str().is_empty())
            .ok_or_else(|| Report::new(Error::missing("output directory")))?;
        let output_directory = match &self.build_directory {
            Some(build_directory) if output_directory.is_relative() => {
                build_directory.join(output_directory)
            },
            _ => output_directory.clone(),
        };

        Ok(ValidatedConfig {
            namespaces,
            base_type_name,
            output_directory,
            classpath: self.classpath.clone(),
        })
    }
}

/// Configuration that passed validation; fixed for the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConfig {
    namespaces:       Vec<String>,
    base_type_name:   String,
    output_directory: PathBuf,
    classpath:        Vec<String>,
}

impl ValidatedConfig {
    /// Namespace roots to scan
    #[must_use]
    pub fn namespaces(&self) -> &[String] { &self.namespaces }

    /// Fully-qualified name of the base type
    #[must_use]
    pub fn base_type_name(&self) -> &str { &self.base_type_name }

    /// Resolved output directory
    #[must_use]
    pub fn output_directory(&self) -> &Path { &self.output_directory }

    /// Classpath elements in order
    #[must_use]
    pub fn classpath(&self) -> &[String] { &self.classpath }
}
