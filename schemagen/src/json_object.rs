//! Extension trait for type-safe JSON field access on registry documents

use serde_json::Map;
use serde_json::Value;

use crate::json_schema::SchemaField;

/// JSON Schema reference prefix for type definitions
pub const SCHEMA_REF_PREFIX: &str = "#/$defs/";

/// Extension trait for type-safe JSON field access
pub trait JsonObjectAccess {
    /// Get field value using any type that can be a string reference
    fn get_field<T: AsRef<str>>(&self, field: T) -> Option<&Value>;

    /// Get field value as string
    fn get_field_str<T: AsRef<str>>(&self, field: T) -> Option<&str> {
        self.get_field(field).and_then(Value::as_str)
    }

    /// Extract the referenced type from a member definition
    ///
    /// Accepts both the registry form and a bare type name:
    /// ```json
    /// { "type": { "$ref": "#/$defs/alloc::string::String" } }
    /// { "type": "alloc::string::String" }
    /// ```
    fn extract_field_type(&self) -> Option<&str> {
        self.get_field(SchemaField::Type).and_then(type_reference)
    }
}

/// Read a type reference value: `{"$ref": "#/$defs/X"}` or `"X"`
pub fn type_reference(value: &Value) -> Option<&str> {
    match value {
        Value::String(name) => Some(name.as_str()),
        Value::Object(_) => value
            .get_field_str(SchemaField::Ref)
            .map(|ref_str| ref_str.strip_prefix(SCHEMA_REF_PREFIX).unwrap_or(ref_str)),
        _ => None,
    }
}

/// Read an element reference (`items`, `valueType`, `prefixItems` entries)
///
/// Elements may hold the reference directly or wrap it in a member definition.
pub fn element_type(element: &Value) -> Option<&str> {
    element
        .extract_field_type()
        .or_else(|| type_reference(element))
}

impl JsonObjectAccess for Value {
    fn get_field<T: AsRef<str>>(&self, field: T) -> Option<&Self> { self.get(field.as_ref()) }
}

impl JsonObjectAccess for Map<String, Value> {
    fn get_field<T: AsRef<str>>(&self, field: T) -> Option<&Value> { self.get(field.as_ref()) }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_extract_field_type_from_ref() {
        let member = json!({ "type": { "$ref": "#/$defs/alloc::string::String" } });
        assert_eq!(member.extract_field_type(), Some("alloc::string::String"));
    }

    #[test]
    fn test_extract_field_type_from_bare_name() {
        let member = json!({ "type": "u64" });
        assert_eq!(member.extract_field_type(), Some("u64"));
    }

    #[test]
    fn test_extract_field_type_rejects_other_shapes() {
        assert_eq!(json!({ "type": 3 }).extract_field_type(), None);
        assert_eq!(json!({ "kind": "Struct" }).extract_field_type(), None);
    }

    #[test]
    fn test_element_type_accepts_wrapped_and_direct_references() {
        let wrapped = json!({ "type": { "$ref": "#/$defs/f32" } });
        let direct = json!({ "$ref": "#/$defs/f32" });
        assert_eq!(element_type(&wrapped), Some("f32"));
        assert_eq!(element_type(&direct), Some("f32"));
        assert_eq!(element_type(&json!("f32")), Some("f32"));
        assert_eq!(element_type(&json!(null)), None);
    }
}
