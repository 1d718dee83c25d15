//! Builds [`SchemaRef`] nodes and lowered [`StructFields`] from raw JSON
//! Schema fragments (4.G).

use crate::ir::{
    ArrayConstraints, CompositionKind, Discriminator, DocRegistry, Field, FieldKind, FieldValidation,
    JsonAny, NumericConstraints, ObjectConstraints, OpenApiSpec, SchemaNode, SchemaRef,
    StringConstraints, StructFields, XmlMeta,
};
use crate::resolver::{find_component, resolve_ref, unescape_pointer_segment, Bucket, Found};
use serde_json::{Map, Value};

/// Local (same-document) `$ref`/`$dynamicRef` name, or `None` for a
/// cross-document reference (which carries a URI before the `#`).
pub fn local_ref_name(reference: &str) -> Option<String> {
    if reference.starts_with('#') {
        Some(unescape_pointer_segment(reference.rsplit('/').next().unwrap_or(reference)))
    } else {
        None
    }
}

/// Resolves a `$ref`/`$dynamicRef` string to the component name it points at,
/// following cross-document references through `registry` when the string
/// carries a base URI (4.E). Falls back to `None` when the reference is
/// cross-document but no registry (or no matching document) is available.
fn resolve_schema_ref_name(reference: &str, spec: &OpenApiSpec, registry: Option<&DocRegistry>) -> Option<String> {
    if let Some(name) = local_ref_name(reference) {
        return Some(name);
    }
    let (target, fragment) = resolve_ref(spec, reference, registry?)?;
    match find_component(target, &fragment, Bucket::Schemas) {
        Some(Found::Schema(_)) => Some(unescape_pointer_segment(fragment.rsplit('/').next().unwrap_or(&fragment))),
        _ => None,
    }
}

const RECOGNIZED_KEYS: &[&str] = &[
    "$ref", "$dynamicRef", "allOf", "anyOf", "oneOf", "not", "if", "then", "else", "type",
    "format", "contentMediaType", "contentEncoding", "items", "enum", "const", "default",
    "example", "examples", "deprecated", "readOnly", "writeOnly", "minimum", "maximum",
    "exclusiveMinimum", "exclusiveMaximum", "multipleOf", "minLength", "maxLength", "pattern",
    "minItems", "maxItems", "uniqueItems", "minProperties", "maxProperties", "discriminator",
    "xml", "externalDocs", "properties", "required", "additionalProperties",
];

/// Constructs a [`SchemaRef`] from a JSON Schema fragment. `registry` is
/// consulted to resolve `$ref`/`$dynamicRef` strings that carry a
/// cross-document base URI; pass `None` when no registry is available (the
/// reference's `ref_string` is still preserved verbatim either way).
pub fn schema_ref_from_json(value: &Value, spec: &OpenApiSpec, registry: Option<&DocRegistry>) -> SchemaRef {
    match value {
        Value::Bool(b) => SchemaRef { node: SchemaNode::Boolean(*b), ..SchemaRef::empty() },
        Value::Object(obj) => schema_ref_from_object(obj, spec, registry),
        _ => SchemaRef::empty(),
    }
}

fn schema_ref_from_object(obj: &Map<String, Value>, spec: &OpenApiSpec, registry: Option<&DocRegistry>) -> SchemaRef {
    if let Some(Value::String(r)) = obj.get("$ref") {
        let ref_name = resolve_schema_ref_name(r, spec, registry);
        let mut schema = SchemaRef::reference(r.clone(), ref_name);
        apply_common_fields(&mut schema, obj);
        return schema;
    }
    if let Some(Value::String(r)) = obj.get("$dynamicRef") {
        let mut schema = SchemaRef::empty();
        schema.dynamic_ref = Some(r.clone());
        schema.ref_name = resolve_schema_ref_name(r, spec, registry);
        apply_common_fields(&mut schema, obj);
        return schema;
    }

    for (key, kind) in [
        ("allOf", CompositionKind::AllOf),
        ("anyOf", CompositionKind::AnyOf),
        ("oneOf", CompositionKind::OneOf),
    ] {
        if let Some(Value::Array(items)) = obj.get(key) {
            let members = items.iter().map(|v| schema_ref_from_json(v, spec, registry)).collect();
            let mut schema = SchemaRef { node: SchemaNode::Composition { kind, members }, ..SchemaRef::empty() };
            apply_common_fields(&mut schema, obj);
            return schema;
        }
    }
    if let Some(not_val) = obj.get("not") {
        let mut schema = SchemaRef {
            node: SchemaNode::Not(Box::new(schema_ref_from_json(not_val, spec, registry))),
            ..SchemaRef::empty()
        };
        apply_common_fields(&mut schema, obj);
        return schema;
    }
    if let Some(if_val) = obj.get("if") {
        let if_schema = Box::new(schema_ref_from_json(if_val, spec, registry));
        let then_schema = obj.get("then").map(|v| Box::new(schema_ref_from_json(v, spec, registry)));
        let else_schema = obj.get("else").map(|v| Box::new(schema_ref_from_json(v, spec, registry)));
        let mut schema = SchemaRef {
            node: SchemaNode::Conditional { if_schema, then_schema, else_schema },
            ..SchemaRef::empty()
        };
        apply_common_fields(&mut schema, obj);
        return schema;
    }

    let (type_str, nullable) = extract_type(obj.get("type"));

    if type_str.as_deref() == Some("array") {
        let items = obj.get("items").map(|v| Box::new(schema_ref_from_json(v, spec, registry)));
        let mut schema = SchemaRef { node: SchemaNode::Array { items }, nullable, ..SchemaRef::empty() };
        apply_common_fields(&mut schema, obj);
        return schema;
    }

    let mut schema = SchemaRef { node: SchemaNode::Inline { inline_type: type_str }, nullable, ..SchemaRef::empty() };
    apply_common_fields(&mut schema, obj);
    schema
}

/// `type` may be a string or an array that may include `"null"`; the first
/// non-null array element becomes the representative type.
fn extract_type(value: Option<&Value>) -> (Option<String>, bool) {
    match value {
        Some(Value::String(s)) => (Some(s.clone()), false),
        Some(Value::Array(arr)) => {
            let mut nullable = false;
            let mut first = None;
            for v in arr {
                if let Value::String(s) = v {
                    if s == "null" {
                        nullable = true;
                    } else if first.is_none() {
                        first = Some(s.clone());
                    }
                }
            }
            (first, nullable)
        }
        _ => (None, false),
    }
}

fn apply_common_fields(schema: &mut SchemaRef, obj: &Map<String, Value>) {
    schema.format = obj.get("format").and_then(Value::as_str).map(String::from);
    schema.content_media_type = obj.get("contentMediaType").and_then(Value::as_str).map(String::from);
    schema.content_encoding = obj.get("contentEncoding").and_then(Value::as_str).map(String::from);

    schema.numeric = NumericConstraints {
        minimum: obj.get("minimum").and_then(Value::as_f64),
        maximum: obj.get("maximum").and_then(Value::as_f64),
        exclusive_minimum: match obj.get("exclusiveMinimum") {
            Some(Value::Bool(true)) => obj.get("minimum").and_then(Value::as_f64),
            Some(v) => v.as_f64(),
            None => None,
        },
        exclusive_maximum: match obj.get("exclusiveMaximum") {
            Some(Value::Bool(true)) => obj.get("maximum").and_then(Value::as_f64),
            Some(v) => v.as_f64(),
            None => None,
        },
        multiple_of: obj.get("multipleOf").and_then(Value::as_f64),
    };
    if matches!(obj.get("exclusiveMinimum"), Some(Value::Bool(true))) {
        schema.numeric.minimum = None;
    }
    if matches!(obj.get("exclusiveMaximum"), Some(Value::Bool(true))) {
        schema.numeric.maximum = None;
    }

    schema.string = StringConstraints {
        min_length: obj.get("minLength").and_then(Value::as_u64),
        max_length: obj.get("maxLength").and_then(Value::as_u64),
        pattern: obj.get("pattern").and_then(Value::as_str).map(String::from),
    };

    schema.array = ArrayConstraints {
        min_items: obj.get("minItems").and_then(Value::as_u64),
        max_items: obj.get("maxItems").and_then(Value::as_u64),
        unique_items: obj.get("uniqueItems").and_then(Value::as_bool).unwrap_or(false),
    };

    schema.object = ObjectConstraints {
        min_properties: obj.get("minProperties").and_then(Value::as_u64),
        max_properties: obj.get("maxProperties").and_then(Value::as_u64),
    };

    if let Some(Value::Array(values)) = obj.get("enum") {
        schema.enum_values = values.iter().map(JsonAny::from_value).collect();
    }
    schema.const_value = obj.get("const").map(JsonAny::from_value);
    schema.default_value = obj.get("default").map(JsonAny::from_value);

    if let Some(Value::Array(values)) = obj.get("examples") {
        schema.examples = values.iter().map(JsonAny::from_value).collect();
    }
    if let Some(example) = obj.get("example") {
        schema.examples.push(JsonAny::from_value(example));
    }

    schema.deprecated = obj.get("deprecated").and_then(Value::as_bool).unwrap_or(false);
    schema.read_only = obj.get("readOnly").and_then(Value::as_bool).unwrap_or(false);
    schema.write_only = obj.get("writeOnly").and_then(Value::as_bool).unwrap_or(false);

    if let Some(Value::Object(d)) = obj.get("discriminator") {
        let property_name = d.get("propertyName").and_then(Value::as_str).unwrap_or("").to_string();
        let mapping = match d.get("mapping") {
            Some(Value::Object(m)) => m
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect(),
            _ => Vec::new(),
        };
        schema.discriminator = Some(Discriminator {
            property_name,
            mapping,
            default_mapping: d.get("defaultMapping").and_then(Value::as_str).map(String::from),
        });
    }

    if let Some(Value::Object(x)) = obj.get("xml") {
        schema.xml = Some(XmlMeta {
            name: x.get("name").and_then(Value::as_str).map(String::from),
            namespace: x.get("namespace").and_then(Value::as_str).map(String::from),
            prefix: x.get("prefix").and_then(Value::as_str).map(String::from),
            attribute: x.get("attribute").and_then(Value::as_bool).unwrap_or(false),
            wrapped: x.get("wrapped").and_then(Value::as_bool).unwrap_or(false),
        });
    }

    if let Some(Value::Object(ed)) = obj.get("externalDocs") {
        schema.external_docs = Some(crate::ir::ExternalDocs {
            description: ed.get("description").and_then(Value::as_str).map(String::from),
            url: ed.get("url").and_then(Value::as_str).unwrap_or("").to_string(),
        });
    }

    let mut unknown = Map::new();
    for (key, value) in obj {
        if !RECOGNIZED_KEYS.contains(&key.as_str()) {
            unknown.insert(key.clone(), value.clone());
        }
    }
    if !unknown.is_empty() {
        schema.unknown = Some(Value::Object(unknown).to_string());
    }
}

/// `true` when `value` is an object-shaped schema: explicit `"type":
/// "object"`, or a schema with `properties` and no other representative
/// type (the common case for OpenAPI request/response bodies).
pub fn is_object_like(value: &Value) -> bool {
    match value {
        Value::Object(obj) => match obj.get("type") {
            Some(Value::String(t)) => t == "object",
            None => obj.contains_key("properties"),
            _ => false,
        },
        _ => false,
    }
}

/// `true` when `value` is an array whose `items` are object-like.
pub fn is_array_of_object_like(value: &Value) -> bool {
    matches!(value, Value::Object(obj) if obj.get("type").and_then(Value::as_str) == Some("array"))
        && value.get("items").map(is_object_like).unwrap_or(false)
}

/// Lowers an object-shaped schema's `properties`/`required` into the
/// generator-facing [`StructFields`] IR. `registry` resolves cross-document
/// `$ref`s within property definitions, same as [`schema_ref_from_json`].
pub fn lower_to_struct_fields(value: &Value, spec: &OpenApiSpec, registry: Option<&DocRegistry>) -> StructFields {
    let mut fields = Vec::new();
    let Value::Object(obj) = value else { return fields };
    let Some(Value::Object(properties)) = obj.get("properties") else { return fields };
    let required: Vec<&str> = match obj.get("required") {
        Some(Value::Array(names)) => names.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };

    for (name, prop) in properties {
        fields.push(field_from_property(name, prop, required.contains(&name.as_str()), spec, registry));
    }
    fields
}

fn field_from_property(
    name: &str,
    prop: &Value,
    required: bool,
    spec: &OpenApiSpec,
    registry: Option<&DocRegistry>,
) -> Field {
    let Value::Object(obj) = prop else {
        return Field {
            name: name.to_string(),
            kind: FieldKind::Primitive,
            ref_type: None,
            required,
            default_literal: None,
            validation: FieldValidation::default(),
        };
    };

    if let Some(Value::String(r)) = obj.get("$ref") {
        return Field {
            name: name.to_string(),
            kind: FieldKind::Object,
            ref_type: resolve_schema_ref_name(r, spec, registry),
            required,
            default_literal: None,
            validation: FieldValidation::default(),
        };
    }

    let type_str = obj.get("type").and_then(Value::as_str);
    let has_enum = obj.get("enum").is_some();

    let kind = if has_enum {
        FieldKind::Enum
    } else {
        match type_str {
            Some("string") => FieldKind::String,
            Some("array") => FieldKind::Array,
            Some("object") | None => FieldKind::Object,
            _ => FieldKind::Primitive,
        }
    };

    let ref_type = match kind {
        FieldKind::Array => obj
            .get("items")
            .and_then(|i| i.get("$ref"))
            .and_then(Value::as_str)
            .and_then(|r| resolve_schema_ref_name(r, spec, registry)),
        _ => None,
    };

    let validation = FieldValidation {
        min: obj.get("minimum").and_then(Value::as_f64),
        max: obj.get("maximum").and_then(Value::as_f64),
        exclusive_min: match obj.get("exclusiveMinimum") {
            Some(Value::Bool(true)) => obj.get("minimum").and_then(Value::as_f64),
            Some(v) => v.as_f64(),
            None => None,
        },
        exclusive_max: match obj.get("exclusiveMaximum") {
            Some(Value::Bool(true)) => obj.get("maximum").and_then(Value::as_f64),
            Some(v) => v.as_f64(),
            None => None,
        },
        min_len: obj.get("minLength").and_then(Value::as_u64),
        max_len: obj.get("maxLength").and_then(Value::as_u64),
        pattern: obj.get("pattern").and_then(Value::as_str).map(String::from),
        min_items: obj.get("minItems").and_then(Value::as_u64),
        max_items: obj.get("maxItems").and_then(Value::as_u64),
        unique_items: obj.get("uniqueItems").and_then(Value::as_bool).unwrap_or(false),
    };

    Field {
        name: name.to_string(),
        kind,
        ref_type,
        required,
        default_literal: obj.get("default").map(default_literal_text),
        validation,
    }
}

fn default_literal_text(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{s}\""),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ref_field_carries_resolved_local_name() {
        let spec = OpenApiSpec::default();
        let schema = json!({
            "type": "object",
            "properties": { "b": { "$ref": "#/components/schemas/B" } }
        });
        let fields = lower_to_struct_fields(&schema, &spec, None);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "b");
        assert_eq!(fields[0].kind, FieldKind::Object);
        assert_eq!(fields[0].ref_type.as_deref(), Some("B"));
    }

    #[test]
    fn required_flag_propagates() {
        let spec = OpenApiSpec::default();
        let schema = json!({
            "type": "object",
            "properties": { "name": {"type": "string"} },
            "required": ["name"]
        });
        let fields = lower_to_struct_fields(&schema, &spec, None);
        assert!(fields[0].required);
    }

    #[test]
    fn exclusive_minimum_legacy_boolean_form() {
        let spec = OpenApiSpec::default();
        let schema = json!({"type": "integer", "minimum": 0, "exclusiveMinimum": true});
        let s = schema_ref_from_json(&schema, &spec, None);
        assert_eq!(s.numeric.exclusive_minimum, Some(0.0));
        assert_eq!(s.numeric.minimum, None);
    }

    #[test]
    fn exclusive_minimum_2020_12_numeric_form() {
        let spec = OpenApiSpec::default();
        let schema = json!({"type": "integer", "exclusiveMinimum": 5});
        let s = schema_ref_from_json(&schema, &spec, None);
        assert_eq!(s.numeric.exclusive_minimum, Some(5.0));
    }

    #[test]
    fn nullable_type_array_with_null() {
        let spec = OpenApiSpec::default();
        let schema = json!({"type": ["string", "null"]});
        let s = schema_ref_from_json(&schema, &spec, None);
        assert!(s.nullable);
        assert!(matches!(s.node, SchemaNode::Inline { inline_type: Some(ref t) } if t == "string"));
    }

    #[test]
    fn cross_document_ref_resolves_via_registry() {
        let mut other = OpenApiSpec::default();
        other.document_uri = Some("https://h/other.json".to_string());
        other.components.schemas.push(("B".to_string(), SchemaRef::inline("integer")));

        let mut spec = OpenApiSpec::default();
        spec.document_uri = Some("https://h/main.json".to_string());

        let mut registry = DocRegistry::new();
        registry.add("https://h/other.json", &other);

        let schema = json!({"$ref": "other.json#/components/schemas/B"});
        let s = schema_ref_from_json(&schema, &spec, Some(&registry));
        assert_eq!(s.ref_name.as_deref(), Some("B"));
    }

    #[test]
    fn cross_document_ref_without_registry_leaves_name_unresolved() {
        let spec = OpenApiSpec::default();
        let schema = json!({"$ref": "other.json#/components/schemas/B"});
        let s = schema_ref_from_json(&schema, &spec, None);
        assert_eq!(s.ref_name, None);
        assert_eq!(s.ref_string.as_deref(), Some("other.json#/components/schemas/B"));
    }
}
