//! Type index over the registry documents found on the classpath

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use error_stack::Report;
use error_stack::ResultExt;
use serde_json::Value;
use tracing::debug;
use tracing::warn;

use super::classpath::ClasspathEntry;
use super::classpath::EntryKind;
use super::classpath::has_registry_extension;
use super::type_descriptor::TypeDescriptor;
use super::type_index::TypeIndex;
use super::type_index::in_namespace;
use crate::error::Error;
use crate::error::Result;
use crate::json_object::JsonObjectAccess;
use crate::json_schema::SchemaField;

/// Raw registry entry and the document it came from
#[derive(Debug, Clone)]
struct IndexedType {
    source:     PathBuf,
    definition: Value,
}

/// Index of every type defined by the classpath entries
///
/// Definitions are kept as raw JSON and only deserialized on [`TypeIndex::load`].
/// When several entries define the same name the first one in classpath order wins.
#[derive(Debug, Default)]
pub struct RegistryIndex {
    types: BTreeMap<String, IndexedType>,
}

impl RegistryIndex {
    /// Index the registry documents of `entries` in order
    ///
    /// Unreadable or malformed documents are logged and skipped.
    #[must_use]
    pub fn open(entries: &[ClasspathEntry]) -> Self {
        let mut index = Self::default();
        for entry in entries {
            let documents = match entry.kind() {
                EntryKind::Document => vec![entry.path().to_path_buf()],
                EntryKind::Directory => collect_documents(entry.path()),
            };
            for document in documents {
                if let Err(report) = index.add_document(&document) {
                    warn!("Skipping registry document: {report:?}");
                }
            }
        }
        debug!("Indexed {} registered types", index.types.len());
        index
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize { self.types.len() }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool { self.types.is_empty() }

    fn add_document(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path)
            .map_err(|e| Report::new(Error::io_failed("read registry document", path, e)))?;
        let document: Value = serde_json::from_str(&content)
            .change_context(Error::Classpath(format!("{} is not valid JSON", path.display())))?;

        // A single descriptor carries its own typePath; anything else is a registry map
        if let Some(type_path) = document.get_field_str(SchemaField::TypePath) {
            let type_path = type_path.to_string();
            self.insert(type_path, path, document);
            return Ok(());
        }

        let Value::Object(registry) = document else {
            return Err(Report::new(Error::Classpath(format!(
                "{} is neither a type descriptor nor a registry object",
                path.display()
            ))));
        };
        for (key, mut definition) in registry {
            let type_path = definition
                .get_field_str(SchemaField::TypePath)
                .map_or_else(|| key.clone(), str::to_string);
            // Registry maps may omit typePath in favour of the key
            if let Value::Object(fields) = &mut definition {
                fields
                    .entry(SchemaField::TypePath.as_ref())
                    .or_insert_with(|| Value::String(type_path.clone()));
            }
            self.insert(type_path, path, definition);
        }
        Ok(())
    }

    fn insert(&mut self, type_path: String, source: &Path, definition: Value) {
        match self.types.entry(type_path) {
            btree_map::Entry::Vacant(vacant) => {
                vacant.insert(IndexedType {
                    source: source.to_path_buf(),
                    definition,
                });
            },
            btree_map::Entry::Occupied(occupied) => {
                debug!(
                    "{} in {} is shadowed by {}",
                    occupied.key(),
                    source.display(),
                    occupied.get().source.display()
                );
            },
        }
    }
}

impl TypeIndex for RegistryIndex {
    fn label(&self) -> &str { "classpath" }

    fn enumerate(&self, namespace: &str) -> Vec<String> {
        self.types
            .keys()
            .filter(|type_path| in_namespace(type_path, namespace))
            .cloned()
            .collect()
    }

    fn load(&self, type_path: &str) -> Result<TypeDescriptor> {
        let indexed = self
            .types
            .get(type_path)
            .ok_or_else(|| Report::new(Error::type_not_found(type_path)))?;

        serde_json::from_value(indexed.definition.clone())
            .change_context(Error::TypeResolution(format!(
                "{type_path} has a malformed descriptor"
            )))
            .attach(format!("Defined in: {}", indexed.source.display()))
    }

    fn contains(&self, type_path: &str) -> bool { self.types.contains_key(type_path) }
}

/// Check if a directory should be skipped during scanning
fn should_skip_directory(dir: &Path) -> bool {
    dir.file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with('.'))
}

/// All registry documents below `root`, in a stable order
fn collect_documents(root: &Path) -> Vec<PathBuf> {
    let mut documents = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to read classpath directory {}: {e}", dir.display());
                continue;
            },
        };
        let mut paths: Vec<PathBuf> = entries.flatten().map(|entry| entry.path()).collect();
        paths.sort();
        for path in paths {
            if path.is_dir() {
                if !should_skip_directory(&path) {
                    pending.push(path);
                }
            } else if has_registry_extension(&path) {
                documents.push(path);
            }
        }
    }
    documents.sort();
    documents
}
