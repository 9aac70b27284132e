//! Ambient resolution context
//!
//! The ambient context is the type index that code outside a generation run
//! resolves names through. A run installs its extended loader for its own
//! duration and must leave the previous index in place afterwards, whatever
//! the outcome. Installation hands back a [`ContextGuard`] that restores the
//! previous index when dropped, including during unwinding.

use std::sync::Arc;
use std::sync::LazyLock;
use std::sync::PoisonError;
use std::sync::RwLock;

use tracing::debug;

use super::type_index::BuiltinIndex;
use super::type_index::TypeIndex;

/// Process-wide ambient context, rooted at the builtin primitives
static GLOBAL_CONTEXT: LazyLock<AmbientContext> = LazyLock::new(AmbientContext::default);

/// A replaceable slot holding the current type index
#[derive(Debug)]
pub struct AmbientContext {
    current: RwLock<Arc<dyn TypeIndex>>,
}

impl Default for AmbientContext {
    fn default() -> Self { Self::new(Arc::new(BuiltinIndex)) }
}

impl AmbientContext {
    /// Create a context whose current index is `root`
    #[must_use]
    pub fn new(root: Arc<dyn TypeIndex>) -> Self {
        Self {
            current: RwLock::new(root),
        }
    }

    /// The process-wide context
    #[must_use]
    pub fn global() -> &'static Self { &GLOBAL_CONTEXT }

    /// The index currently installed
    #[must_use]
    pub fn current(&self) -> Arc<dyn TypeIndex> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Install `index` until the returned guard is dropped
    #[must_use = "the previous context is restored as soon as the guard is dropped"]
    pub fn install(&self, index: Arc<dyn TypeIndex>) -> ContextGuard<'_> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        debug!("Installing {} context over {}", index.label(), current.label());
        let previous = std::mem::replace(&mut *current, index);
        ContextGuard {
            context:  self,
            previous: Some(previous),
        }
    }
}

/// Restores the previously installed index on drop
#[derive(Debug)]
pub struct ContextGuard<'a> {
    context:  &'a AmbientContext,
    previous: Option<Arc<dyn TypeIndex>>,
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            let mut current = self
                .context
                .current
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            debug!("Restoring {} context", previous.label());
            *current = previous;
        }
    }
}
