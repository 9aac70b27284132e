//! Pluggable type index
//!
//! A [`TypeIndex`] answers two questions: which type names live under a
//! namespace root, and what a named type looks like. Registry documents on
//! the classpath, the builtin primitives and the [`TypeLoader`](super::TypeLoader)
//! itself all implement it, so any of them can serve as the ambient context.

use std::fmt::Debug;

use super::type_descriptor::TypeDescriptor;
use crate::error::Error;
use crate::error::Result;
use crate::json_schema::JsonSchemaType;

/// A source of type descriptors
pub trait TypeIndex: Debug + Send + Sync {
    /// Short label used in log messages
    fn label(&self) -> &str;

    /// All type names lying under `namespace`, sorted
    fn enumerate(&self, namespace: &str) -> Vec<String>;

    /// Load a fresh descriptor for `type_path`
    ///
    /// Every call produces an independent value. Fails with
    /// [`Error::TypeNotFound`] when this index does not define the type.
    fn load(&self, type_path: &str) -> Result<TypeDescriptor>;

    /// Whether this index defines `type_path`
    fn contains(&self, type_path: &str) -> bool;
}

/// Whether `type_path` lies under the namespace root `namespace`
///
/// A blank namespace matches every type. Otherwise the name must continue
/// past the root with a `.` or `::` separator.
#[must_use]
pub fn in_namespace(type_path: &str, namespace: &str) -> bool {
    let namespace = namespace.trim();
    if namespace.is_empty() {
        return true;
    }
    type_path
        .strip_prefix(namespace)
        .is_some_and(|rest| rest.starts_with('.') || rest.starts_with("::"))
}

/// Primitive value types known to every run
const PRIMITIVES: &[(&str, JsonSchemaType)] = &[
    ("()", JsonSchemaType::Null),
    ("alloc::string::String", JsonSchemaType::String),
    ("bool", JsonSchemaType::Boolean),
    ("char", JsonSchemaType::String),
    ("f32", JsonSchemaType::Number),
    ("f64", JsonSchemaType::Number),
    ("i128", JsonSchemaType::Integer),
    ("i16", JsonSchemaType::Integer),
    ("i32", JsonSchemaType::Integer),
    ("i64", JsonSchemaType::Integer),
    ("i8", JsonSchemaType::Integer),
    ("isize", JsonSchemaType::Integer),
    ("std::string::String", JsonSchemaType::String),
    ("str", JsonSchemaType::String),
    ("u128", JsonSchemaType::Integer),
    ("u16", JsonSchemaType::Integer),
    ("u32", JsonSchemaType::Integer),
    ("u64", JsonSchemaType::Integer),
    ("u8", JsonSchemaType::Integer),
    ("usize", JsonSchemaType::Integer),
];

/// The root of every resolution chain: primitive value types
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinIndex;

impl BuiltinIndex {
    fn schema_type(type_path: &str) -> Option<JsonSchemaType> {
        PRIMITIVES
            .iter()
            .find(|(name, _)| *name == type_path)
            .map(|(_, schema_type)| *schema_type)
    }
}

impl TypeIndex for BuiltinIndex {
    fn label(&self) -> &str { "builtin" }

    fn enumerate(&self, namespace: &str) -> Vec<String> {
        let mut names: Vec<String> = PRIMITIVES
            .iter()
            .map(|(name, _)| *name)
            .filter(|name| in_namespace(name, namespace))
            .map(str::to_string)
            .collect();
        names.sort();
        names
    }

    fn load(&self, type_path: &str) -> Result<TypeDescriptor> {
        Self::schema_type(type_path)
            .map(|schema_type| TypeDescriptor::value(type_path, schema_type))
            .ok_or_else(|| Error::type_not_found(type_path).into())
    }

    fn contains(&self, type_path: &str) -> bool { Self::schema_type(type_path).is_some() }
}
