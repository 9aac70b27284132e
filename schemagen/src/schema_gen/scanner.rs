//! Subtype discovery under namespace roots

use error_stack::Report;
use itertools::Itertools;
use tracing::debug;
use tracing::warn;

use crate::error::Error;
use crate::type_loader::TypeHandle;
use crate::type_loader::TypeIndex;
use crate::type_loader::TypeLoader;

/// A concrete type proven to be a proper subtype of the base type
///
/// Only [`TypeScanner::scan`] creates these.
#[derive(Debug, Clone)]
pub struct DiscoveredType {
    handle: TypeHandle,
}

impl DiscoveredType {
    /// Fully-qualified name
    #[must_use]
    pub fn type_path(&self) -> &str { self.handle.type_path() }

    /// The resolved type
    #[must_use]
    pub const fn handle(&self) -> &TypeHandle { &self.handle }
}

/// Result of one scan
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Discovered subtypes, sorted by type path
    pub discovered: Vec<DiscoveredType>,
    /// Candidates that could not be resolved, with the reason
    pub unresolved: Vec<(String, Report<Error>)>,
}

/// Enumerates subtypes of a base type through a loader
#[derive(Debug)]
pub struct TypeScanner<'a> {
    loader: &'a TypeLoader,
}

impl<'a> TypeScanner<'a> {
    /// Create a scanner resolving through `loader`
    #[must_use]
    pub const fn new(loader: &'a TypeLoader) -> Self { Self { loader } }

    /// Find every concrete proper subtype of `base` under `namespaces`
    ///
    /// The base type itself and abstract types are excluded. Overlapping
    /// namespaces yield each type once. A candidate that cannot be resolved is
    /// recorded in [`ScanOutcome::unresolved`] and the scan goes on.
    #[must_use]
    pub fn scan<S: AsRef<str>>(&self, namespaces: &[S], base: &TypeHandle) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();

        let candidates = namespaces
            .iter()
            .flat_map(|namespace| self.loader.enumerate(namespace.as_ref()))
            .sorted()
            .dedup();

        for type_path in candidates {
            if type_path == base.type_path() {
                continue;
            }
            let handle = match self.loader.resolve(&type_path) {
                Ok(handle) => handle,
                Err(report) => {
                    warn!("Cannot resolve candidate {type_path}: {report:?}");
                    outcome.unresolved.push((type_path, report));
                    continue;
                },
            };
            if handle.is_abstract {
                debug!("Skipping abstract type {type_path}");
                continue;
            }
            match self.loader.is_subtype(&handle, base) {
                Ok(true) => outcome.discovered.push(DiscoveredType { handle }),
                Ok(false) => {},
                Err(report) => {
                    warn!("Cannot check hierarchy of {type_path}: {report:?}");
                    outcome.unresolved.push((type_path, report));
                },
            }
        }

        debug!(
            "Discovered {} subtypes of {}",
            outcome.discovered.len(),
            base.type_path()
        );
        outcome
    }
}
