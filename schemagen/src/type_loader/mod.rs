//! Type resolution: classpath entries, type indexes and the caching loader

mod ambient;
mod classpath;
mod loader;
mod registry_index;
mod type_descriptor;
mod type_index;

pub use ambient::AmbientContext;
pub use ambient::ContextGuard;
pub use classpath::ClasspathEntry;
pub use classpath::ClasspathResolver;
pub use classpath::EntryKind;
pub use loader::TypeHandle;
pub use loader::TypeLoader;
#[cfg(test)]
pub(crate) use loader::tests as test_support;
pub use registry_index::RegistryIndex;
pub use type_descriptor::TypeDescriptor;
pub use type_descriptor::TypeKind;
pub use type_descriptor::TypeRef;
pub use type_index::BuiltinIndex;
pub use type_index::TypeIndex;
pub use type_index::in_namespace;
