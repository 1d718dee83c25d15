//! Promotes anonymous inline object schemas to named components (4.H).

use crate::ir::{DocRegistry, OpenApiSpec};
use crate::schema_build::lower_to_struct_fields;
use serde_json::Value;

/// Where an inline schema was found, driving its deterministic base name.
pub enum LiftSite<'a> {
    RequestBody { op_id: &'a str },
    ResponseBody { op_id: &'a str, status: &'a str },
    Querystring { param_name: &'a str },
}

fn base_name(site: &LiftSite<'_>, is_item: bool) -> String {
    let suffix = if is_item { "_Item" } else { "" };
    match site {
        LiftSite::RequestBody { op_id } => format!("Inline_{op_id}_Request{suffix}"),
        LiftSite::ResponseBody { op_id, status } => format!("Inline_{op_id}_Response_{status}{suffix}"),
        LiftSite::Querystring { param_name } => format!("Inline_Querystring_{param_name}"),
    }
}

fn sanitize(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' { c } else { '_' })
        .collect();
    if sanitized.is_empty() {
        "InlineSchema".to_string()
    } else {
        sanitized
    }
}

fn unique_name(spec: &OpenApiSpec, candidate: String) -> String {
    let collides = |name: &str| {
        spec.defined_schemas.iter().any(|(n, _)| n == name) || spec.raw_schemas.iter().any(|(n, _)| n == name)
    };
    if !collides(&candidate) {
        return candidate;
    }
    let mut counter = 1u32;
    loop {
        let attempt = format!("{candidate}_{counter}");
        if !collides(&attempt) {
            return attempt;
        }
        counter += 1;
    }
}

/// If `value` is an object-like schema (or an array of object-like items),
/// lowers it into `StructFields`, registers it under a deterministic
/// collision-free name in `spec.defined_schemas`, and returns that name so
/// the caller can rewrite the enclosing reference.
///
/// Composition schemas (`allOf`/`anyOf`/`oneOf`/`not`) additionally have
/// their raw JSON text preserved in `spec.raw_schemas` for
/// composition-aware emission.
pub fn lift_inline_schema(
    spec: &mut OpenApiSpec,
    site: LiftSite<'_>,
    value: &Value,
    registry: Option<&DocRegistry>,
) -> Option<String> {
    use crate::schema_build::{is_array_of_object_like, is_object_like};

    let (target_value, is_item) = if is_object_like(value) {
        (value, false)
    } else if is_array_of_object_like(value) {
        (value.get("items")?, true)
    } else {
        return None;
    };

    let name = unique_name(spec, sanitize(&base_name(&site, is_item)));
    log::debug!("lifting inline schema to component '{name}'");
    let fields = lower_to_struct_fields(target_value, spec, registry);
    spec.defined_schemas.push((name.clone(), fields));

    if uses_composition(target_value) {
        spec.raw_schemas.push((name.clone(), target_value.to_string()));
    }

    Some(name)
}

fn uses_composition(value: &Value) -> bool {
    matches!(value, Value::Object(obj) if obj.contains_key("allOf") || obj.contains_key("anyOf") || obj.contains_key("oneOf") || obj.contains_key("not"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_body_inline_object_is_lifted() {
        let mut spec = OpenApiSpec::default();
        let schema = json!({"type": "object", "properties": {"name": {"type": "string"}}});
        let name =
            lift_inline_schema(&mut spec, LiftSite::RequestBody { op_id: "createThing" }, &schema, None).unwrap();
        assert!(name.starts_with("Inline_createThing_Request"));
        assert_eq!(spec.defined_schemas.len(), 1);
        assert_eq!(spec.defined_schemas[0].0, name);
    }

    #[test]
    fn collisions_append_counter() {
        let mut spec = OpenApiSpec::default();
        spec.defined_schemas.push(("Inline_op_Request".to_string(), Vec::new()));
        let schema = json!({"type": "object", "properties": {}});
        let name = lift_inline_schema(&mut spec, LiftSite::RequestBody { op_id: "op" }, &schema, None).unwrap();
        assert_eq!(name, "Inline_op_Request_1");
    }

    #[test]
    fn non_object_schema_is_not_lifted() {
        let mut spec = OpenApiSpec::default();
        let schema = json!({"type": "integer"});
        assert!(lift_inline_schema(&mut spec, LiftSite::RequestBody { op_id: "op" }, &schema, None).is_none());
    }
}
