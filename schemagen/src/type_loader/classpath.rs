//! Classpath resolution
//!
//! Turns the externally supplied dependency locations into an ordered set of
//! loadable entries. A malformed element is logged and skipped; it never
//! aborts the run, and an empty result is valid.

use std::path::Path;
use std::path::PathBuf;

use error_stack::Report;
use itertools::Itertools;
use tracing::debug;
use tracing::warn;

use crate::error::Error;
use crate::error::Result;

/// File extension of registry documents
pub const REGISTRY_EXTENSION: &str = "json";

/// Shape of a loadable location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A directory walked recursively for registry documents
    Directory,
    /// A single registry document
    Document,
}

/// A single loadable location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClasspathEntry {
    path: PathBuf,
    kind: EntryKind,
}

impl ClasspathEntry {
    /// Validate one raw classpath element
    ///
    /// # Errors
    ///
    /// Returns [`Error::Classpath`] when the element is empty or does not name
    /// a directory or registry document.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Report::new(Error::Classpath("empty element".to_string())));
        }
        if trimmed.contains('\0') {
            return Err(Report::new(Error::Classpath(format!(
                "'{}' contains a NUL byte",
                trimmed.escape_debug()
            ))));
        }

        let path = PathBuf::from(trimmed);
        let kind = if path.is_dir() {
            EntryKind::Directory
        } else if path.is_file() {
            if !has_registry_extension(&path) {
                return Err(Report::new(Error::Classpath(format!(
                    "'{trimmed}' is not a .{REGISTRY_EXTENSION} registry document"
                ))));
            }
            EntryKind::Document
        } else {
            return Err(Report::new(Error::Classpath(format!("'{trimmed}' does not exist"))));
        };

        Ok(Self { path, kind })
    }

    /// Location on disk
    #[must_use]
    pub fn path(&self) -> &Path { &self.path }

    /// Directory or single document
    #[must_use]
    pub const fn kind(&self) -> EntryKind { self.kind }
}

/// Whether `path` names a registry document
#[must_use]
pub fn has_registry_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case(REGISTRY_EXTENSION))
}

/// Builds the ordered set of classpath entries for a run
#[derive(Debug, Default)]
pub struct ClasspathResolver {
    rejected: Vec<Report<Error>>,
}

impl ClasspathResolver {
    /// Create a resolver with no recorded rejections
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Validate `elements` in order, skipping malformed ones and duplicates
    pub fn resolve<S: AsRef<str>>(&mut self, elements: &[S]) -> Vec<ClasspathEntry> {
        elements
            .iter()
            .filter_map(|element| match ClasspathEntry::parse(element.as_ref()) {
                Ok(entry) => {
                    debug!("Element: {}", entry.path().display());
                    Some(entry)
                },
                Err(report) => {
                    warn!("Ignored classpath element: {report:?}");
                    self.rejected.push(report);
                    None
                },
            })
            .unique_by(|entry| entry.path.clone())
            .collect()
    }

    /// Errors for every element skipped so far
    #[must_use]
    pub fn rejected(&self) -> &[Report<Error>] { &self.rejected }
}
