//! Type descriptors as found in registry documents
//!
//! A descriptor is the loaded, owned form of one registry entry. Loading the
//! same entry twice yields two equal but independent descriptors, which is
//! why descriptors are only ever handed out wrapped in a cached
//! [`TypeHandle`](super::TypeHandle).

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use strum::AsRefStr;
use strum::Display;
use strum::EnumString;

use crate::json_object::SCHEMA_REF_PREFIX;
use crate::json_schema::JsonSchemaType;

/// Category of a registered type
///
/// These correspond to the `kind` field of registry documents. Entries
/// without a `kind` are leaf values.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
#[serde(rename_all = "PascalCase")]
#[strum(serialize_all = "PascalCase")]
pub enum TypeKind {
    /// Fixed size array type
    Array,
    /// Enum type
    Enum,
    /// List type
    List,
    /// Map type (`HashMap`, `BTreeMap`, etc.)
    Map,
    /// Optional wrapper around one inner type
    Option,
    /// Set type (`HashSet`, `BTreeSet`, etc.)
    Set,
    /// Regular struct type
    Struct,
    /// Tuple type
    Tuple,
    /// Tuple struct type
    TupleStruct,
    /// Value type (primitive types like i32, f32, bool, String)
    #[default]
    Value,
}

/// A reference to another registered type
///
/// Deserializes from either `{"$ref": "#/$defs/<name>"}` or a bare name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "RawTypeRef")]
pub struct TypeRef(String);

impl TypeRef {
    /// The referenced fully-qualified name
    #[must_use]
    pub fn as_str(&self) -> &str { &self.0 }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTypeRef {
    Name(String),
    Ref {
        #[serde(rename = "$ref")]
        reference: String,
    },
}

impl From<RawTypeRef> for TypeRef {
    fn from(raw: RawTypeRef) -> Self {
        match raw {
            RawTypeRef::Name(name) => Self(name),
            RawTypeRef::Ref { reference } => Self(
                reference
                    .strip_prefix(SCHEMA_REF_PREFIX)
                    .map_or_else(|| reference.clone(), str::to_string),
            ),
        }
    }
}

/// One registered type
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDescriptor {
    /// Fully-qualified name
    pub type_path:    String,
    /// Display name; derived from `type_path` when absent
    #[serde(default)]
    pub short_path:   Option<String>,
    /// Category of the type
    #[serde(default)]
    pub kind:         TypeKind,
    /// JSON schema type of a `Value` kind
    #[serde(default, rename = "type")]
    pub schema_type:  Option<JsonSchemaType>,
    /// Interfaces and abstract bases are never emitted
    #[serde(default, rename = "abstract")]
    pub is_abstract:  bool,
    /// Types this type directly extends or implements
    #[serde(default)]
    pub supertypes:   Vec<TypeRef>,
    /// Declared members in declaration order, each `{ "type": <type ref> }`
    #[serde(default)]
    pub properties:   Map<String, Value>,
    /// Element reference of list, array, set and option kinds
    #[serde(default)]
    pub items:        Option<Value>,
    /// Value reference of map kinds
    #[serde(default)]
    pub value_type:   Option<Value>,
    /// Element references of tuple kinds
    #[serde(default)]
    pub prefix_items: Vec<Value>,
    /// Enum variants
    #[serde(default)]
    pub one_of:       Vec<Value>,
}

impl TypeDescriptor {
    /// A leaf value type with a fixed JSON schema type
    #[must_use]
    pub fn value(type_path: &str, schema_type: JsonSchemaType) -> Self {
        Self {
            type_path:    type_path.to_string(),
            short_path:   None,
            kind:         TypeKind::Value,
            schema_type:  Some(schema_type),
            is_abstract:  false,
            supertypes:   Vec::new(),
            properties:   Map::new(),
            items:        None,
            value_type:   None,
            prefix_items: Vec::new(),
            one_of:       Vec::new(),
        }
    }

    /// Display name used as schema title
    ///
    /// Falls back to the last path segment, ignoring generic arguments.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if let Some(short_path) = &self.short_path {
            return short_path;
        }
        let head_end = self.type_path.find('<').unwrap_or(self.type_path.len());
        let start = self.type_path[..head_end]
            .rfind(['.', ':'])
            .map_or(0, |index| index + 1);
        &self.type_path[start..]
    }
}
