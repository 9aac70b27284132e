//! Identity-preserving type loader
//!
//! Resolving the same name through two different paths would produce two
//! equal-looking but distinct descriptors, and identity based subtype checks
//! would silently fail. The loader therefore memoizes every resolution: the
//! first request for a name loads it, every later request (from the scanner,
//! the base type lookup or nested member inspection) gets the same handle.

use std::collections::HashSet;
use std::ops::Deref;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use itertools::Itertools;
use tracing::debug;

use super::classpath::ClasspathEntry;
use super::registry_index::RegistryIndex;
use super::type_descriptor::TypeDescriptor;
use super::type_index::TypeIndex;
use crate::error::Result;

/// Shared handle to a resolved type
///
/// Handles compare by identity through [`TypeHandle::same`]; two handles
/// for equal descriptors loaded separately are *not* the same type.
#[derive(Debug, Clone)]
pub struct TypeHandle(Arc<TypeDescriptor>);

impl TypeHandle {
    fn new(descriptor: TypeDescriptor) -> Self { Self(Arc::new(descriptor)) }

    /// Whether both handles refer to the very same resolved type
    #[must_use]
    pub fn same(&self, other: &Self) -> bool { Arc::ptr_eq(&self.0, &other.0) }

    /// Fully-qualified name
    #[must_use]
    pub fn type_path(&self) -> &str { &self.0.type_path }
}

impl Deref for TypeHandle {
    type Target = TypeDescriptor;

    fn deref(&self) -> &Self::Target { &self.0 }
}

/// Type loader layering classpath entries under a parent context
#[derive(Debug)]
pub struct TypeLoader {
    /// Consulted first
    parent:   Arc<dyn TypeIndex>,
    /// Consulted when the parent does not define a name
    extended: Box<dyn TypeIndex>,
    /// Every name resolved so far
    cache:    DashMap<String, TypeHandle>,
}

impl TypeLoader {
    /// Create a loader over `extended` that delegates to `parent` first
    #[must_use]
    pub fn new(parent: Arc<dyn TypeIndex>, extended: impl TypeIndex + 'static) -> Self {
        Self {
            parent,
            extended: Box::new(extended),
            cache: DashMap::new(),
        }
    }

    /// Create a loader over the registry documents of `entries`
    #[must_use]
    pub fn from_classpath(parent: Arc<dyn TypeIndex>, entries: &[ClasspathEntry]) -> Self {
        Self::new(parent, RegistryIndex::open(entries))
    }

    /// Resolve `type_path` to its handle, loading it on first request
    ///
    /// Concurrent first requests for the same name converge on one handle:
    /// the load happens while the map entry is held.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeNotFound`](crate::error::Error::TypeNotFound) when
    /// no index defines `type_path`, or the defining index's error when its
    /// descriptor cannot be loaded.
    pub fn resolve(&self, type_path: &str) -> Result<TypeHandle> {
        if let Some(handle) = self.cache.get(type_path) {
            debug!("Type already resolved: {type_path}");
            return Ok(handle.clone());
        }

        match self.cache.entry(type_path.to_string()) {
            Entry::Occupied(occupied) => Ok(occupied.get().clone()),
            Entry::Vacant(vacant) => {
                debug!("Resolving: {type_path}");
                let handle = TypeHandle::new(self.find(type_path)?);
                vacant.insert(handle.clone());
                Ok(handle)
            },
        }
    }

    /// Number of names resolved so far
    #[cfg(test)]
    pub(crate) fn resolved_count(&self) -> usize { self.cache.len() }

    /// Whether `candidate` transitively extends `base`
    ///
    /// Supertypes are followed through [`Self::resolve`] and compared by
    /// identity. A type never counts as its own subtype, even through a
    /// supertype cycle. Supertypes that no index defines are not followed.
    ///
    /// # Errors
    ///
    /// Fails when a defined supertype cannot be loaded.
    pub fn is_subtype(&self, candidate: &TypeHandle, base: &TypeHandle) -> Result<bool> {
        Ok(self
            .lineage(candidate)?
            .iter()
            .skip(1)
            .any(|supertype| supertype.same(base)))
    }

    /// `handle` followed by its transitive supertypes, nearest first
    ///
    /// Every type appears once; cycles end the walk. Supertypes that no index
    /// defines are left out.
    ///
    /// # Errors
    ///
    /// Fails when a defined supertype cannot be loaded.
    pub fn lineage(&self, handle: &TypeHandle) -> Result<Vec<TypeHandle>> {
        let mut visited = HashSet::from([handle.type_path().to_string()]);
        let mut lineage = vec![handle.clone()];
        let mut next = 0;
        while let Some(current) = lineage.get(next).cloned() {
            next += 1;
            for supertype in &current.supertypes {
                if !visited.insert(supertype.as_str().to_string()) {
                    continue;
                }
                match self.resolve(supertype.as_str()) {
                    Ok(resolved) => lineage.push(resolved),
                    Err(report) if report.current_context().is_not_found() => {
                        debug!(
                            "{} extends unknown type {}",
                            current.type_path(),
                            supertype.as_str()
                        );
                    },
                    Err(report) => return Err(report),
                }
            }
        }
        Ok(lineage)
    }

    /// Parent first, then the classpath entries
    fn find(&self, type_path: &str) -> Result<TypeDescriptor> {
        match self.parent.load(type_path) {
            Err(report) if report.current_context().is_not_found() => {
                self.extended.load(type_path)
            },
            found => found,
        }
    }
}

impl TypeIndex for TypeLoader {
    fn label(&self) -> &str { "loader" }

    fn enumerate(&self, namespace: &str) -> Vec<String> {
        self.parent
            .enumerate(namespace)
            .into_iter()
            .merge(self.extended.enumerate(namespace))
            .dedup()
            .collect()
    }

    fn load(&self, type_path: &str) -> Result<TypeDescriptor> {
        self.resolve(type_path).map(|handle| (*handle).clone())
    }

    fn contains(&self, type_path: &str) -> bool {
        self.cache.contains_key(type_path)
            || self.parent.contains(type_path)
            || self.extended.contains(type_path)
    }
}
