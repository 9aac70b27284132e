//! JSON schema vocabulary
//!
//! Type names emitted into generated schema documents and the field names
//! read from registry documents.

use serde::Deserialize;
use serde::Serialize;
use strum::AsRefStr;
use strum::Display;
use strum::EnumString;

/// JSON schema type names used in generated documents and `Value` descriptors
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, Serialize, Deserialize, EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JsonSchemaType {
    /// JSON object
    Object,
    /// JSON array
    Array,
    /// JSON string
    String,
    /// Any JSON number
    Number,
    /// Integral JSON number
    Integer,
    /// JSON boolean
    Boolean,
    /// JSON null
    Null,
}

/// Registry document field names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "camelCase")]
pub enum SchemaField {
    /// The $ref field for type references
    #[strum(serialize = "$ref")]
    Ref,
    /// The type field
    Type,
    /// The type path field (e.g., "`com.acme.model.LoginEvent`")
    TypePath,
}
