//! Schema document generation for discovered types
//!
//! Member types are resolved through the run's loader and described inline.
//! A type's members include those declared on its supertypes; a member
//! declared closer to the type replaces an inherited one of the same name.
//! A member type that is already being described further up the chain is cut
//! off with a bare object schema, and a document that expands past
//! [`MAX_SCHEMA_NODES`] member schemas fails instead of growing without bound.

use std::collections::BTreeMap;

use error_stack::Report;
use error_stack::ResultExt;
use itertools::Itertools;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::scanner::DiscoveredType;
use crate::error::Error;
use crate::error::Result;
use crate::json_object::JsonObjectAccess;
use crate::json_object::element_type;
use crate::json_schema::JsonSchemaType;
use crate::type_loader::TypeHandle;
use crate::type_loader::TypeKind;
use crate::type_loader::TypeLoader;

/// Prefix of the `id` given to every generated document
const SCHEMA_ID_PREFIX: &str = "urn:jsonschema:";

/// Most member schemas described for a single document
pub const MAX_SCHEMA_NODES: usize = 10_000;

/// Schema of one member, described structurally
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySchema {
    /// JSON schema type of the member
    #[serde(rename = "type")]
    pub schema_type:           JsonSchemaType,
    /// Element schema of arrays
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items:                 Option<Box<Self>>,
    /// Nested members of objects
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties:            Option<BTreeMap<String, Self>>,
    /// Value schema of maps
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<Self>>,
    /// Allowed values of unit-only enums
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values:           Option<Vec<String>>,
    /// Always `false`: no member is marked required
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required:              bool,
}

impl PropertySchema {
    /// A schema carrying only a type
    #[must_use]
    pub const fn of(schema_type: JsonSchemaType) -> Self {
        Self {
            schema_type,
            items: None,
            properties: None,
            additional_properties: None,
            enum_values: None,
            required: false,
        }
    }
}

/// Generated schema for one discovered type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaDocument {
    /// Always [`JsonSchemaType::Object`]
    #[serde(rename = "type")]
    pub schema_type: JsonSchemaType,
    /// `urn:jsonschema:` followed by the type path with `:` separators
    pub id:          String,
    /// Display name of the type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title:       Option<String>,
    /// Members by name
    pub properties:  BTreeMap<String, PropertySchema>,
}

/// Build the document id for `type_path`
#[must_use]
pub fn schema_id(type_path: &str) -> String {
    format!(
        "{SCHEMA_ID_PREFIX}{}",
        type_path.replace("::", ":").replace('.', ":")
    )
}

/// Turns discovered types into schema documents
#[derive(Debug)]
pub struct SchemaGenerator<'a> {
    loader: &'a TypeLoader,
}

impl<'a> SchemaGenerator<'a> {
    /// Create a generator resolving member types through `loader`
    #[must_use]
    pub const fn new(loader: &'a TypeLoader) -> Self { Self { loader } }

    /// Describe `discovered` and its members
    ///
    /// # Errors
    ///
    /// Returns [`Error::Generation`] when a member has no declared type or
    /// its type cannot be resolved or mapped.
    pub fn generate(&self, discovered: &DiscoveredType) -> Result<SchemaDocument> {
        let handle = discovered.handle();
        let mut walk = Walk::new(handle.type_path());
        let properties = self.members(handle, &mut walk)?;
        debug!(
            "Generated {} properties for {} ({} member schemas)",
            properties.len(),
            handle.type_path(),
            walk.nodes
        );

        Ok(SchemaDocument {
            schema_type: JsonSchemaType::Object,
            id: schema_id(handle.type_path()),
            title: Some(handle.display_name().to_string()),
            properties,
        })
    }

    /// Own and inherited members of `owner`
    fn members(
        &self,
        owner: &TypeHandle,
        walk: &mut Walk,
    ) -> Result<BTreeMap<String, PropertySchema>> {
        let lineage = self.loader.lineage(owner).change_context_lazy(|| {
            Error::Generation(format!(
                "{} has supertypes that cannot be loaded",
                owner.type_path()
            ))
        })?;

        let mut declared = BTreeMap::new();
        for declaring in lineage.iter().rev() {
            for (name, member) in &declaring.properties {
                declared.insert(name.as_str(), (declaring, member));
            }
        }

        let mut properties = BTreeMap::new();
        for (name, (declaring, member)) in declared {
            let Some(member_type) = member.extract_field_type() else {
                return Err(Report::new(Error::member_failed(
                    declaring.type_path(),
                    name,
                    "no declared type",
                )));
            };
            let schema = self.describe(member_type, walk).change_context_lazy(|| {
                Error::member_failed(declaring.type_path(), name, "type cannot be described")
            })?;
            properties.insert(name.to_string(), schema);
        }
        Ok(properties)
    }

    fn describe(&self, type_path: &str, walk: &mut Walk) -> Result<PropertySchema> {
        walk.count()?;
        if walk.chain.iter().any(|seen| seen == type_path) {
            debug!("Recursive reference to {type_path}, emitting a bare object");
            return Ok(PropertySchema::of(JsonSchemaType::Object));
        }

        let handle = self.loader.resolve(type_path)?;
        walk.chain.push(type_path.to_string());
        let schema = self.describe_handle(&handle, walk);
        walk.chain.pop();
        schema
    }

    fn describe_handle(&self, handle: &TypeHandle, walk: &mut Walk) -> Result<PropertySchema> {
        match handle.kind {
            TypeKind::Value => handle.schema_type.map(PropertySchema::of).ok_or_else(|| {
                Report::new(Error::Generation(format!(
                    "{} declares no schema type",
                    handle.type_path()
                )))
            }),
            TypeKind::Struct => Ok(PropertySchema {
                properties: Some(self.members(handle, walk)?),
                ..PropertySchema::of(JsonSchemaType::Object)
            }),
            TypeKind::TupleStruct if handle.prefix_items.len() == 1 => {
                self.element(handle, &handle.prefix_items[0], walk)
            },
            TypeKind::Tuple | TypeKind::TupleStruct => {
                let elements = handle
                    .prefix_items
                    .iter()
                    .map(|element| self.element(handle, element, walk))
                    .collect::<Result<Vec<_>>>()?;
                Ok(PropertySchema {
                    items: elements.into_iter().all_equal_value().ok().map(Box::new),
                    ..PropertySchema::of(JsonSchemaType::Array)
                })
            },
            TypeKind::List | TypeKind::Array | TypeKind::Set => {
                let items = self.element(handle, required_ref(handle, handle.items.as_ref())?, walk)?;
                Ok(PropertySchema {
                    items: Some(Box::new(items)),
                    ..PropertySchema::of(JsonSchemaType::Array)
                })
            },
            TypeKind::Map => {
                let values =
                    self.element(handle, required_ref(handle, handle.value_type.as_ref())?, walk)?;
                Ok(PropertySchema {
                    additional_properties: Some(Box::new(values)),
                    ..PropertySchema::of(JsonSchemaType::Object)
                })
            },
            TypeKind::Option => {
                self.element(handle, required_ref(handle, handle.items.as_ref())?, walk)
            },
            TypeKind::Enum => Ok(describe_enum(handle)),
        }
    }

    /// Describe the type referenced by `element`, a reference or a member definition
    fn element(
        &self,
        owner: &TypeHandle,
        element: &Value,
        walk: &mut Walk,
    ) -> Result<PropertySchema> {
        let Some(reference) = element_type(element) else {
            return Err(Report::new(Error::Generation(format!(
                "{} has an element without a type reference",
                owner.type_path()
            ))));
        };
        self.describe(reference, walk)
    }
}

/// Progress of one document: the types being described and the schemas built
#[derive(Debug)]
struct Walk {
    chain: Vec<String>,
    nodes: usize,
}

impl Walk {
    fn new(root: &str) -> Self {
        Self {
            chain: vec![root.to_string()],
            nodes: 0,
        }
    }

    fn count(&mut self) -> Result<()> {
        self.nodes += 1;
        if self.nodes > MAX_SCHEMA_NODES {
            return Err(Report::new(Error::Generation(format!(
                "schema of {} expands past {MAX_SCHEMA_NODES} member schemas",
                self.chain[0]
            ))));
        }
        Ok(())
    }
}

fn required_ref<'h>(handle: &TypeHandle, reference: Option<&'h Value>) -> Result<&'h Value> {
    reference.ok_or_else(|| {
        Report::new(Error::Generation(format!(
            "{} ({}) declares no element type",
            handle.type_path(),
            handle.kind
        )))
    })
}

/// Unit-only enums become string enums, anything else an object
fn describe_enum(handle: &TypeHandle) -> PropertySchema {
    let unit_variants: Option<Vec<String>> = handle
        .one_of
        .iter()
        .map(|variant| variant.as_str().map(str::to_string))
        .collect();

    match unit_variants {
        Some(variants) if !variants.is_empty() => PropertySchema {
            enum_values: Some(variants),
            ..PropertySchema::of(JsonSchemaType::String)
        },
        _ => PropertySchema::of(JsonSchemaType::Object),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, reason = "tests")]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::schema_gen::scanner::TypeScanner;
    use crate::type_loader::BuiltinIndex;
    use crate::type_loader::test_support::CountingIndex;
    use crate::type_loader::test_support::shared_loader;

    fn shapes() -> CountingIndex {
        CountingIndex::default()
            .with(json!({ "typePath": "x.Base", "kind": "Struct", "abstract": true }))
            .with(json!({
                "typePath": "x.Point",
                "kind": "Struct",
                "properties": { "x": { "type": "f32" }, "y": { "type": "f32" } }
            }))
            .with(json!({ "typePath": "x.Id", "kind": "TupleStruct", "prefixItems": ["u64"] }))
            .with(json!({
                "typePath": "x.Pair",
                "kind": "Tuple",
                "prefixItems": [{ "type": "u8" }, { "$ref": "#/$defs/u16" }]
            }))
            .with(json!({
                "typePath": "x.Mixed",
                "kind": "Tuple",
                "prefixItems": ["u8", "bool"]
            }))
            .with(json!({
                "typePath": "x.Tags",
                "kind": "List",
                "items": { "type": "alloc::string::String" }
            }))
            .with(json!({ "typePath": "x.Scores", "kind": "Map", "valueType": { "type": "f64" } }))
            .with(json!({ "typePath": "x.MaybePoint", "kind": "Option", "items": "x.Point" }))
            .with(json!({ "typePath": "x.Color", "kind": "Enum", "oneOf": ["Red", "Green"] }))
            .with(json!({
                "typePath": "x.Shape",
                "kind": "Enum",
                "oneOf": [{ "shortPath": "Circle" }, "Empty"]
            }))
            .with(json!({
                "typePath": "x.Node",
                "kind": "Struct",
                "properties": { "value": { "type": "i32" }, "next": { "type": "x.MaybeNode" } }
            }))
            .with(json!({ "typePath": "x.MaybeNode", "kind": "Option", "items": "x.Node" }))
            .with(json!({
                "typePath": "x.Everything",
                "kind": "Struct",
                "supertypes": ["x.Base"],
                "properties": {
                    "point": { "type": "x.Point" },
                    "id": { "type": "x.Id" },
                    "pair": { "type": "x.Pair" },
                    "mixed": { "type": "x.Mixed" },
                    "tags": { "type": "x.Tags" },
                    "scores": { "type": "x.Scores" },
                    "maybe": { "type": "x.MaybePoint" },
                    "color": { "type": "x.Color" },
                    "shape": { "type": "x.Shape" },
                    "node": { "type": "x.Node" }
                }
            }))
            .with(json!({
                "typePath": "x.Ghostly",
                "kind": "Struct",
                "supertypes": ["x.Base"],
                "properties": { "ghost": { "type": "x.Missing" } }
            }))
            .with(json!({ "typePath": "x.Opaque" }))
            .with(json!({
                "typePath": "x.Holder",
                "kind": "Struct",
                "supertypes": ["x.Base"],
                "properties": { "opaque": { "type": "x.Opaque" } }
            }))
            .with(json!({
                "typePath": "x.Animal",
                "kind": "Struct",
                "supertypes": ["x.Base"],
                "properties": { "name": { "type": "alloc::string::String" }, "age": { "type": "u8" } }
            }))
            .with(json!({
                "typePath": "x.Dog",
                "kind": "Struct",
                "supertypes": ["x.Animal", "x.Unlisted"],
                "properties": { "age": { "type": "f32" }, "breed": { "type": "alloc::string::String" } }
            }))
            .with(json!({
                "typePath": "x.Kennel",
                "kind": "Struct",
                "supertypes": ["x.Base"],
                "properties": { "resident": { "type": "x.Dog" } }
            }))
            .with(json!({
                "typePath": "x.Untyped",
                "kind": "Struct",
                "supertypes": ["x.Base"],
                "properties": { "what": {} }
            }))
    }

    fn generate(loader: &TypeLoader, type_path: &str) -> Result<SchemaDocument> {
        let base = loader.resolve("x.Base").unwrap();
        let outcome = TypeScanner::new(loader).scan(&["x"], &base);
        let discovered = outcome
            .discovered
            .iter()
            .find(|discovered| discovered.type_path() == type_path)
            .expect("type should be discovered");
        SchemaGenerator::new(loader).generate(discovered)
    }

    fn shapes_loader() -> TypeLoader { TypeLoader::new(Arc::new(BuiltinIndex), shapes()) }

    #[test]
    fn test_scenario_members_map_to_primitive_types() {
        let (loader, _index) = shared_loader();
        let base = loader.resolve("com.acme.model.Event").unwrap();
        let outcome = TypeScanner::new(&loader).scan(&["com.acme.model"], &base);
        let generator = SchemaGenerator::new(&loader);

        let login = generator.generate(&outcome.discovered[0]).unwrap();
        assert_eq!(login.title.as_deref(), Some("LoginEvent"));
        assert_eq!(login.id, "urn:jsonschema:com:acme:model:LoginEvent");
        assert_eq!(login.properties["userId"].schema_type, JsonSchemaType::String);

        let logout = generator.generate(&outcome.discovered[1]).unwrap();
        assert_eq!(logout.properties["userId"].schema_type, JsonSchemaType::String);
        assert_eq!(logout.properties["durationMs"].schema_type, JsonSchemaType::Integer);
        assert!(logout.properties.values().all(|property| !property.required));

        let json = serde_json::to_value(&logout).unwrap();
        assert_eq!(json["type"], "object");
        assert_eq!(json["properties"]["durationMs"], json!({ "type": "integer" }));
        assert!(json["properties"]["userId"].get("required").is_none());
    }

    #[test]
    fn test_structural_kinds_are_described_inline() {
        let loader = shapes_loader();
        let document = generate(&loader, "x.Everything").unwrap();
        let json = serde_json::to_value(&document).unwrap();
        let properties = &json["properties"];

        assert_eq!(
            properties["point"],
            json!({
                "type": "object",
                "properties": { "x": { "type": "number" }, "y": { "type": "number" } }
            })
        );
        assert_eq!(properties["id"], json!({ "type": "integer" }));
        assert_eq!(
            properties["pair"],
            json!({ "type": "array", "items": { "type": "integer" } })
        );
        assert_eq!(properties["mixed"], json!({ "type": "array" }));
        assert_eq!(
            properties["tags"],
            json!({ "type": "array", "items": { "type": "string" } })
        );
        assert_eq!(
            properties["scores"],
            json!({ "type": "object", "additionalProperties": { "type": "number" } })
        );
        assert_eq!(properties["maybe"], properties["point"]);
        assert_eq!(
            properties["color"],
            json!({ "type": "string", "enum": ["Red", "Green"] })
        );
        assert_eq!(properties["shape"], json!({ "type": "object" }));
    }

    #[test]
    fn test_inherited_members_are_included_and_overridable() {
        let loader = shapes_loader();
        let dog = serde_json::to_value(generate(&loader, "x.Dog").unwrap()).unwrap();
        assert_eq!(
            dog["properties"],
            json!({
                "age": { "type": "number" },
                "breed": { "type": "string" },
                "name": { "type": "string" }
            })
        );

        let kennel = generate(&loader, "x.Kennel").unwrap();
        let resident = kennel.properties["resident"].properties.as_ref().unwrap();
        assert_eq!(
            resident.keys().map(String::as_str).collect::<Vec<_>>(),
            ["age", "breed", "name"]
        );
    }

    #[test]
    fn test_inherited_member_failure_names_declaring_type() {
        let index = CountingIndex::default()
            .with(json!({ "typePath": "x.Base", "kind": "Struct", "abstract": true }))
            .with(json!({
                "typePath": "x.Parent",
                "kind": "Struct",
                "abstract": true,
                "supertypes": ["x.Base"],
                "properties": { "broken": { "type": "x.Missing" } }
            }))
            .with(json!({ "typePath": "x.Child", "kind": "Struct", "supertypes": ["x.Parent"] }));
        let loader = TypeLoader::new(Arc::new(BuiltinIndex), index);
        let report = generate(&loader, "x.Child").unwrap_err();
        assert_eq!(
            *report.current_context(),
            Error::member_failed("x.Parent", "broken", "type cannot be described")
        );
    }

    #[test]
    fn test_shared_member_types_past_the_limit_fail_generation() {
        let mut index = CountingIndex::default()
            .with(json!({ "typePath": "x.Base", "kind": "Struct", "abstract": true }))
            .with(json!({
                "typePath": "x.Level0",
                "kind": "Struct",
                "supertypes": ["x.Base"],
                "properties": { "left": { "type": "x.Level1" }, "right": { "type": "x.Level1" } }
            }))
            .with(json!({
                "typePath": "x.Small",
                "kind": "Struct",
                "supertypes": ["x.Base"],
                "properties": { "left": { "type": "x.Level14" }, "right": { "type": "x.Level14" } }
            }));
        for depth in 1..16 {
            let next = format!("x.Level{}", depth + 1);
            index = index.with(json!({
                "typePath": format!("x.Level{depth}"),
                "kind": "Struct",
                "properties": { "left": { "type": next }, "right": { "type": next } }
            }));
        }
        index = index.with(json!({
            "typePath": "x.Level16",
            "kind": "Struct",
            "properties": { "leaf": { "type": "u8" } }
        }));
        let loader = TypeLoader::new(Arc::new(BuiltinIndex), index);

        let small = generate(&loader, "x.Small").unwrap();
        let level15 = small.properties["left"].properties.as_ref().unwrap();
        assert_eq!(level15["right"], level15["left"]);

        let report = generate(&loader, "x.Level0").unwrap_err();
        let limit = Error::Generation(format!(
            "schema of x.Level0 expands past {MAX_SCHEMA_NODES} member schemas"
        ));
        assert!(
            report
                .frames()
                .filter_map(|frame| frame.downcast_ref::<Error>())
                .any(|error| *error == limit)
        );
    }

    #[test]
    fn test_recursive_members_are_cut_with_bare_object() {
        let loader = shapes_loader();
        let document = generate(&loader, "x.Everything").unwrap();
        let node = &document.properties["node"];
        let next = &node.properties.as_ref().unwrap()["next"];
        assert_eq!(*next, PropertySchema::of(JsonSchemaType::Object));
    }

    #[test]
    fn test_member_types_share_loader_cache() {
        let loader = shapes_loader();
        generate(&loader, "x.Everything").unwrap();
        let before = loader.resolved_count();
        generate(&loader, "x.Everything").unwrap();
        assert_eq!(loader.resolved_count(), before);
    }

    #[test]
    fn test_unresolvable_member_fails_generation() {
        let loader = shapes_loader();
        let report = generate(&loader, "x.Ghostly").unwrap_err();
        assert_eq!(
            *report.current_context(),
            Error::member_failed("x.Ghostly", "ghost", "type cannot be described")
        );
    }

    #[test]
    fn test_value_without_schema_type_fails_generation() {
        let loader = shapes_loader();
        let report = generate(&loader, "x.Holder").unwrap_err();
        assert!(matches!(report.current_context(), Error::Generation(_)));
    }

    #[test]
    fn test_member_without_type_fails_generation() {
        let loader = shapes_loader();
        let report = generate(&loader, "x.Untyped").unwrap_err();
        assert_eq!(
            *report.current_context(),
            Error::member_failed("x.Untyped", "what", "no declared type")
        );
    }

    #[test]
    fn test_schema_id_replaces_both_separator_styles() {
        assert_eq!(schema_id("com.acme.Event"), "urn:jsonschema:com:acme:Event");
        assert_eq!(schema_id("game::input::Jump"), "urn:jsonschema:game:input:Jump");
    }
}
