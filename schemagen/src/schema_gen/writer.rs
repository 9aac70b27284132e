//! Persisting schema documents

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use error_stack::Report;
use error_stack::ResultExt;
use tracing::info;

use super::generator::SchemaDocument;
use crate::error::Error;
use crate::error::Result;

/// Appended to the type path to form the output file name
pub const SCHEMA_FILE_SUFFIX: &str = "-schema.json";

/// Writes one file per schema document into an existing output directory
#[derive(Debug, Clone)]
pub struct OutputWriter {
    directory: PathBuf,
}

impl OutputWriter {
    /// Create `directory` and its parents if missing
    ///
    /// An existing directory is fine.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileOperation`] when the directory cannot be created.
    pub fn prepare(directory: &Path) -> Result<Self> {
        fs::create_dir_all(directory).map_err(|e| {
            Report::new(Error::io_failed("create output directory", directory, e))
        })?;
        Ok(Self {
            directory: directory.to_path_buf(),
        })
    }

    /// File name of the schema for `type_path`
    ///
    /// Path separators are replaced so the file always lands in the output
    /// directory itself.
    #[must_use]
    pub fn file_name(type_path: &str) -> String {
        format!("{}{SCHEMA_FILE_SUFFIX}", type_path.replace(['/', '\\'], "_"))
    }

    /// Write `document` as pretty-printed JSON, replacing any earlier file
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileOperation`] when the file cannot be written.
    pub fn write(&self, type_path: &str, document: &SchemaDocument) -> Result<PathBuf> {
        let path = self.directory.join(Self::file_name(type_path));
        let mut content = serde_json::to_vec_pretty(document).change_context_lazy(|| {
            Error::FileOperation(format!("Failed to serialize schema of {type_path}"))
        })?;
        content.push(b'\n');

        fs::write(&path, content)
            .map_err(|e| Report::new(Error::io_failed("write schema file", &path, e)))?;
        info!("Wrote {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, reason = "tests")]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::Value;
    use tempfile::TempDir;

    use super::*;
    use crate::json_schema::JsonSchemaType;
    use crate::schema_gen::generator::PropertySchema;

    fn document(title: &str) -> SchemaDocument {
        SchemaDocument {
            schema_type: JsonSchemaType::Object,
            id:          format!("urn:jsonschema:x:{title}"),
            title:       Some(title.to_string()),
            properties:  BTreeMap::from([(
                "userId".to_string(),
                PropertySchema::of(JsonSchemaType::String),
            )]),
        }
    }

    #[test]
    fn test_prepare_creates_nested_directories_and_is_idempotent() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let target = temp_dir.path().join("generated/schemas");

        OutputWriter::prepare(&target).expect("first prepare");
        assert!(target.is_dir());
        OutputWriter::prepare(&target).expect("prepare over an existing directory");
    }

    #[test]
    fn test_prepare_fails_when_path_is_a_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file = temp_dir.path().join("taken");
        fs::write(&file, "x").expect("write");

        let report = OutputWriter::prepare(&file).expect_err("a file is not a directory");
        assert!(matches!(report.current_context(), Error::FileOperation(_)));
    }

    #[test]
    fn test_write_uses_type_path_file_name_and_overwrites() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let writer = OutputWriter::prepare(temp_dir.path()).expect("prepare");

        writer
            .write("com.acme.model.LoginEvent", &document("Old"))
            .expect("first write");
        let path = writer
            .write("com.acme.model.LoginEvent", &document("LoginEvent"))
            .expect("second write");

        assert_eq!(
            path,
            temp_dir.path().join("com.acme.model.LoginEvent-schema.json")
        );
        let content = fs::read_to_string(&path).expect("read back");
        assert!(content.contains("\n  \"type\": \"object\""));
        let json: Value = serde_json::from_str(&content).expect("valid JSON");
        assert_eq!(json["title"], "LoginEvent");
        assert_eq!(json["properties"]["userId"]["type"], "string");
    }

    #[test]
    fn test_file_name_keeps_output_in_directory() {
        assert_eq!(
            OutputWriter::file_name("a/b\\c.D"),
            "a_b_c.D-schema.json"
        );
    }

    #[test]
    fn test_write_failure_is_reported() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let target = temp_dir.path().join("out");
        let writer = OutputWriter::prepare(&target).expect("prepare");
        fs::remove_dir(&target).expect("remove output directory");

        let report = writer
            .write("x.Gone", &document("Gone"))
            .expect_err("directory is gone");
        assert!(matches!(report.current_context(), Error::FileOperation(_)));
    }
}
