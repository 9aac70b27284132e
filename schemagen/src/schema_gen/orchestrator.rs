//! One generation run: validate, install the extended context, scan, generate, write
//!
//! Fatal failures (configuration, base type, output directory) end the run
//! before anything is written. Failures of a single discovered type are
//! recorded in the [`RunReport`] and never change the run's outcome. The
//! previous ambient context is back in place whenever [`Orchestrator::run`]
//! returns.

use std::path::PathBuf;
use std::sync::Arc;

use error_stack::Report;
use error_stack::ResultExt;
use strum::Display;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::generator::SchemaGenerator;
use super::scanner::DiscoveredType;
use super::scanner::TypeScanner;
use super::writer::OutputWriter;
use crate::config::RunConfig;
use crate::error::Error;
use crate::error::Result;
use crate::type_loader::AmbientContext;
use crate::type_loader::ClasspathResolver;
use crate::type_loader::TypeLoader;

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RunState {
    /// Configuration not checked yet
    Unvalidated,
    /// Configuration accepted
    Validated,
    /// Extended context installed, types being processed
    Running,
    /// Completed without a fatal error
    Succeeded,
    /// Stopped by a fatal error
    Failed,
}

/// Pipeline step at which a single type failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum FailureStage {
    /// The candidate type could not be resolved during scanning
    Resolution,
    /// No schema document could be built
    Generation,
    /// The schema file could not be written
    Write,
}

/// What happened to one type
#[derive(Debug)]
pub enum TypeOutcome {
    /// Schema written to `path`
    Written {
        /// Fully-qualified name
        type_path: String,
        /// File the schema was written to
        path:      PathBuf,
    },
    /// Type skipped
    Failed {
        /// Fully-qualified name
        type_path: String,
        /// Where processing stopped
        stage:     FailureStage,
        /// The underlying error
        reason:    Report<Error>,
    },
}

impl TypeOutcome {
    /// Fully-qualified name of the type
    #[must_use]
    pub fn type_path(&self) -> &str {
        match self {
            Self::Written { type_path, .. } | Self::Failed { type_path, .. } => type_path,
        }
    }
}

/// Per-type outcomes of a successful run
#[derive(Debug, Default)]
pub struct RunReport {
    outcomes: Vec<TypeOutcome>,
}

impl RunReport {
    /// Every outcome in processing order
    #[must_use]
    pub fn outcomes(&self) -> &[TypeOutcome] { &self.outcomes }

    /// Files written, in processing order
    pub fn written(&self) -> impl Iterator<Item = &PathBuf> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            TypeOutcome::Written { path, .. } => Some(path),
            TypeOutcome::Failed { .. } => None,
        })
    }

    /// Types that were skipped
    pub fn failed(&self) -> impl Iterator<Item = &TypeOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, TypeOutcome::Failed { .. }))
    }

    fn push(&mut self, outcome: TypeOutcome) { self.outcomes.push(outcome); }
}

/// Drives a generation run against an ambient context
#[derive(Debug)]
pub struct Orchestrator<'a> {
    context: &'a AmbientContext,
    state:   RunState,
}

impl<'a> Orchestrator<'a> {
    /// Create an orchestrator layering its loader over `context`
    #[must_use]
    pub const fn new(context: &'a AmbientContext) -> Self {
        Self {
            context,
            state: RunState::Unvalidated,
        }
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn state(&self) -> RunState { self.state }

    /// Run the whole pipeline once
    ///
    /// Returns the per-type report on success.
    ///
    /// # Errors
    ///
    /// Returns the fatal error that stopped the run: invalid configuration,
    /// an unresolvable base type or an output directory that cannot be created.
    pub fn run(&mut self, config: &RunConfig) -> Result<RunReport> {
        match self.execute(config) {
            Ok(report) => {
                self.transition(RunState::Succeeded);
                let failed = report.failed().count();
                info!(
                    "Generated {} schemas, skipped {failed} types",
                    report.written().count()
                );
                Ok(report)
            },
            Err(report) => {
                self.transition(RunState::Failed);
                error!("Schema generation failed: {report:?}");
                Err(report)
            },
        }
    }

    fn execute(&mut self, config: &RunConfig) -> Result<RunReport> {
        let config = config.validate()?;
        self.transition(RunState::Validated);

        if config.namespaces().is_empty() {
            info!("No namespaces configured, nothing to do");
            return Ok(RunReport::default());
        }
        info!(
            "Generating schemas for subtypes of {} in {:?}",
            config.base_type_name(),
            config.namespaces()
        );

        let mut resolver = ClasspathResolver::new();
        let entries = resolver.resolve(config.classpath());
        if !resolver.rejected().is_empty() {
            warn!(
                "Skipped {} of {} classpath elements",
                resolver.rejected().len(),
                config.classpath().len()
            );
        }
        let loader = Arc::new(TypeLoader::from_classpath(self.context.current(), &entries));
        let ambient = Arc::clone(&loader);
        let _guard = self.context.install(ambient);
        self.transition(RunState::Running);

        let base = loader
            .resolve(config.base_type_name())
            .change_context_lazy(|| {
                Error::TypeResolution(format!(
                    "Base type {} cannot be resolved",
                    config.base_type_name()
                ))
            })?;
        let writer = OutputWriter::prepare(config.output_directory())?;

        let scan = TypeScanner::new(&loader).scan(config.namespaces(), &base);
        let mut report = RunReport::default();
        for (type_path, reason) in scan.unresolved {
            report.push(TypeOutcome::Failed {
                type_path,
                stage: FailureStage::Resolution,
                reason,
            });
        }

        let generator = SchemaGenerator::new(&loader);
        for discovered in &scan.discovered {
            info!("Processing {}", discovered.type_path());
            report.push(Self::process(&generator, &writer, discovered));
        }
        Ok(report)
    }

    fn process(
        generator: &SchemaGenerator<'_>,
        writer: &OutputWriter,
        discovered: &DiscoveredType,
    ) -> TypeOutcome {
        let type_path = discovered.type_path().to_string();
        let document = match generator.generate(discovered) {
            Ok(document) => document,
            Err(reason) => {
                warn!("Skipping {type_path}: {reason:?}");
                return TypeOutcome::Failed {
                    type_path,
                    stage: FailureStage::Generation,
                    reason,
                };
            },
        };
        match writer.write(&type_path, &document) {
            Ok(path) => TypeOutcome::Written { type_path, path },
            Err(reason) => {
                error!("Could not write schema of {type_path}: {reason:?}");
                TypeOutcome::Failed {
                    type_path,
                    stage: FailureStage::Write,
                    reason,
                }
            },
        }
    }

    fn transition(&mut self, next: RunState) {
        debug!("Run state: {} -> {next}", self.state);
        self.state = next;
    }
}
