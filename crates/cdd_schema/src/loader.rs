//! Top-level OpenAPI 3.1/3.2 (or bare JSON Schema) document loader (4.F).

use crate::error::{LoadError, LoadResult};
use crate::ir::*;
use crate::lift::{lift_inline_schema, LiftSite};
use crate::schema_build::{is_array_of_object_like, is_object_like, lower_to_struct_fields, schema_ref_from_json};
use serde_json::{Map, Value};

const FIXED_VERBS: &[&str] = &["get", "post", "put", "delete", "patch", "head", "options", "trace", "query"];

fn is_supported_openapi_version(v: &str) -> bool {
    v.starts_with("3.1.") || v.starts_with("3.2.")
}

fn str_at<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}

fn owned_str_at(obj: &Map<String, Value>, key: &str) -> Option<String> {
    str_at(obj, key).map(String::from)
}

fn bool_at(obj: &Map<String, Value>, key: &str) -> bool {
    obj.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn collect_extensions(obj: &Map<String, Value>) -> Vec<(String, JsonAny)> {
    obj.iter()
        .filter(|(k, _)| k.starts_with("x-"))
        .map(|(k, v)| (k.clone(), JsonAny::from_value(v)))
        .collect()
}

/// Entry point: loads a single JSON document already parsed into a
/// [`serde_json::Value`]. `retrieval_uri` is the location this document was
/// fetched from, used to seed `self_uri`/`document_uri` when the document
/// carries no `$self`.
/// `registry` supplies the other documents already loaded in this run, for
/// resolving `$ref`s that carry a base URI outside this document (4.E/4.F).
pub fn load_from_json(root: &Value, retrieval_uri: &str, registry: Option<&DocRegistry>) -> LoadResult<OpenApiSpec> {
    let obj = root.as_object().ok_or_else(|| LoadError::invalid("document root must be a JSON object"))?;

    let mut spec = OpenApiSpec::default();
    spec.retrieval_uri = Some(retrieval_uri.to_string());

    match owned_str_at(obj, "openapi") {
        Some(version) => {
            if !is_supported_openapi_version(&version) {
                log::warn!("rejecting document at '{retrieval_uri}': unsupported openapi version '{version}'");
                return Err(LoadError::invalid(format!("unsupported openapi version '{version}'")));
            }
            log::debug!("loading openapi {version} document from '{retrieval_uri}'");
            spec.openapi_version = Some(version);
            spec.is_schema_document = false;
            load_openapi_document(&mut spec, obj, registry)?;
        }
        None => {
            log::debug!("'{retrieval_uri}' has no 'openapi' field, treating as a bare JSON Schema document");
            spec.is_schema_document = true;
            load_schema_document(&mut spec, root, obj, registry)?;
        }
    }

    let self_uri = owned_str_at(obj, "$self");
    spec.document_uri = Some(self_uri.clone().unwrap_or_else(|| retrieval_uri.to_string()));
    spec.self_uri = self_uri;
    spec.json_schema_dialect = owned_str_at(obj, "jsonSchemaDialect");

    crate::validate::run_validators(&spec)?;
    Ok(spec)
}

fn load_schema_document(
    spec: &mut OpenApiSpec,
    root: &Value,
    obj: &Map<String, Value>,
    registry: Option<&DocRegistry>,
) -> LoadResult<()> {
    if is_object_like(root) {
        let fields = lower_to_struct_fields(root, spec, registry);
        spec.defined_schemas.push(("Root".to_string(), fields));
    } else {
        spec.raw_schemas.push(("Root".to_string(), root.to_string()));
    }
    spec.extensions = collect_extensions(obj);
    Ok(())
}

fn load_openapi_document(spec: &mut OpenApiSpec, obj: &Map<String, Value>, registry: Option<&DocRegistry>) -> LoadResult<()> {
    spec.extensions = collect_extensions(obj);

    if let Some(Value::Object(info_obj)) = obj.get("info") {
        spec.info = Some(parse_info(info_obj)?);
    } else {
        return Err(LoadError::invalid("missing required 'info' object"));
    }

    if let Some(Value::Object(ed)) = obj.get("externalDocs") {
        spec.external_docs = Some(parse_external_docs(ed));
    }

    if let Some(Value::Array(tags)) = obj.get("tags") {
        for t in tags {
            if let Value::Object(tag_obj) = t {
                spec.tags.push(parse_tag(tag_obj));
            }
        }
    }

    if let Some(Value::Array(sec)) = obj.get("security") {
        spec.security = parse_security_requirements(sec);
    }

    if let Some(Value::Array(servers)) = obj.get("servers") {
        spec.servers = parse_servers(servers)?;
    }

    if let Some(Value::Object(paths)) = obj.get("paths") {
        for (route, item) in paths {
            if !route.starts_with('/') {
                return Err(LoadError::invalid(format!("path '{route}' must start with '/'")));
            }
            let Value::Object(item_obj) = item else { continue };
            let path = parse_path_item(spec, route, item_obj, registry)?;
            spec.paths.push((route.clone(), path));
        }
    }

    if let Some(Value::Object(webhooks)) = obj.get("webhooks") {
        for (name, item) in webhooks {
            let Value::Object(item_obj) = item else { continue };
            let path = parse_path_item(spec, name, item_obj, registry)?;
            spec.webhooks.push((name.clone(), path));
        }
    }

    if let Some(Value::Object(components)) = obj.get("components") {
        let components = parse_components(spec, components, registry)?;
        spec.components = components;
    }

    Ok(())
}

fn parse_components(spec: &mut OpenApiSpec, obj: &Map<String, Value>, registry: Option<&DocRegistry>) -> LoadResult<Components> {
    let mut components = Components::default();

    if let Some(Value::Object(schemas)) = obj.get("schemas") {
        for (name, schema_val) in schemas {
            if is_object_like(schema_val) {
                let fields = lower_to_struct_fields(schema_val, spec, registry);
                components.schemas.push((name.clone(), schema_ref_from_json(schema_val, spec, registry)));
                spec.defined_schemas.push((name.clone(), fields));
            } else {
                components.schemas.push((name.clone(), schema_ref_from_json(schema_val, spec, registry)));
                spec.raw_schemas.push((name.clone(), schema_val.to_string()));
            }
        }
    }

    if let Some(Value::Object(responses)) = obj.get("responses") {
        for (name, r) in responses {
            if let Value::Object(robj) = r {
                components.responses.push((name.clone(), parse_response(spec, "component", name, robj, registry)?));
            }
        }
    }

    if let Some(Value::Object(parameters)) = obj.get("parameters") {
        for (name, p) in parameters {
            if let Value::Object(pobj) = p {
                components.parameters.push((name.clone(), parse_parameter(spec, registry, pobj)?));
            }
        }
    }

    if let Some(Value::Object(request_bodies)) = obj.get("requestBodies") {
        for (name, rb) in request_bodies {
            if let Value::Object(rbobj) = rb {
                if let Some(Value::Object(content)) = rbobj.get("content") {
                    for (media_name, media_val) in content {
                        if let Value::Object(media_obj) = media_val {
                            components
                                .request_bodies
                                .push((name.clone(), parse_media_type(media_name, media_obj, spec, registry)));
                        }
                    }
                }
            }
        }
    }

    if let Some(Value::Object(headers)) = obj.get("headers") {
        for (name, h) in headers {
            if let Value::Object(hobj) = h {
                components.headers.push((name.clone(), parse_parameter_like_header(name, hobj, spec, registry)?));
            }
        }
    }

    if let Some(Value::Object(security_schemes)) = obj.get("securitySchemes") {
        for (name, v) in security_schemes {
            components.security_schemes.push((name.clone(), JsonAny::from_value(v)));
        }
    }

    if let Some(Value::Object(links)) = obj.get("links") {
        for (name, v) in links {
            components.links.push((name.clone(), JsonAny::from_value(v)));
        }
    }

    if let Some(Value::Object(callbacks)) = obj.get("callbacks") {
        for (name, cb) in callbacks {
            if let Value::Object(cb_obj) = cb {
                for (_, expr_item) in cb_obj {
                    if let Value::Object(expr_obj) = expr_item {
                        let path = parse_path_item(spec, name, expr_obj, registry)?;
                        components.callbacks.push((name.clone(), path));
                    }
                }
            }
        }
    }

    if let Some(Value::Object(path_items)) = obj.get("pathItems") {
        for (name, item) in path_items {
            if let Value::Object(item_obj) = item {
                let path = parse_path_item(spec, name, item_obj, registry)?;
                components.path_items.push((name.clone(), path));
            }
        }
    }

    Ok(components)
}

fn parse_info(obj: &Map<String, Value>) -> LoadResult<Info> {
    let license = match obj.get("license") {
        Some(Value::Object(l)) => {
            let identifier = owned_str_at(l, "identifier");
            let url = owned_str_at(l, "url");
            if identifier.is_some() && url.is_some() {
                return Err(LoadError::invalid("license.identifier and license.url are mutually exclusive"));
            }
            Some(License { name: str_at(l, "name").unwrap_or("").to_string(), identifier, url })
        }
        _ => None,
    };
    let contact = match obj.get("contact") {
        Some(Value::Object(c)) => Some(Contact {
            name: owned_str_at(c, "name"),
            url: owned_str_at(c, "url"),
            email: owned_str_at(c, "email"),
        }),
        _ => None,
    };
    Ok(Info {
        title: str_at(obj, "title").unwrap_or("").to_string(),
        summary: owned_str_at(obj, "summary"),
        description: owned_str_at(obj, "description"),
        terms_of_service: owned_str_at(obj, "termsOfService"),
        contact,
        license,
        version: str_at(obj, "version").unwrap_or("").to_string(),
    })
}

fn parse_external_docs(obj: &Map<String, Value>) -> ExternalDocs {
    ExternalDocs { description: owned_str_at(obj, "description"), url: str_at(obj, "url").unwrap_or("").to_string() }
}

fn parse_tag(obj: &Map<String, Value>) -> Tag {
    Tag {
        name: str_at(obj, "name").unwrap_or("").to_string(),
        summary: owned_str_at(obj, "summary"),
        description: owned_str_at(obj, "description"),
        parent: owned_str_at(obj, "parent"),
        external_docs: match obj.get("externalDocs") {
            Some(Value::Object(ed)) => Some(parse_external_docs(ed)),
            _ => None,
        },
    }
}

fn parse_security_requirements(sec: &[Value]) -> Vec<Vec<(String, Vec<String>)>> {
    sec.iter()
        .filter_map(|req| req.as_object())
        .map(|req| {
            req.iter()
                .map(|(name, scopes)| {
                    let scopes = match scopes {
                        Value::Array(arr) => arr.iter().filter_map(Value::as_str).map(String::from).collect(),
                        _ => Vec::new(),
                    };
                    (name.clone(), scopes)
                })
                .collect()
        })
        .collect()
}

fn parse_servers(servers: &[Value]) -> LoadResult<Vec<Server>> {
    servers
        .iter()
        .filter_map(Value::as_object)
        .map(|s| {
            let mut variables = Vec::new();
            if let Some(Value::Object(vars)) = s.get("variables") {
                for (name, v) in vars {
                    let Value::Object(vobj) = v else { continue };
                    let default = str_at(vobj, "default").unwrap_or("").to_string();
                    let enum_values = match vobj.get("enum") {
                        Some(Value::Array(arr)) => arr.iter().filter_map(Value::as_str).map(String::from).collect(),
                        _ => Vec::new(),
                    };
                    variables.push((
                        name.clone(),
                        ServerVariable { default, enum_values, description: owned_str_at(vobj, "description") },
                    ));
                }
            }
            Ok(Server { url: str_at(s, "url").unwrap_or("").to_string(), description: owned_str_at(s, "description"), variables })
        })
        .collect()
}

fn parse_parameter(spec: &mut OpenApiSpec, registry: Option<&DocRegistry>, obj: &Map<String, Value>) -> LoadResult<Parameter> {
    let location = match str_at(obj, "in") {
        Some("path") => ParameterLocation::Path,
        Some("query") => ParameterLocation::Query,
        Some("querystring") => ParameterLocation::Querystring,
        Some("header") => ParameterLocation::Header,
        Some("cookie") => ParameterLocation::Cookie,
        other => return Err(LoadError::invalid(format!("unknown parameter location '{other:?}'"))),
    };
    let param_name = str_at(obj, "name").unwrap_or("").to_string();
    let mut content_media_types = Vec::new();
    if let Some(Value::Object(content)) = obj.get("content") {
        for (name, v) in content {
            if let Value::Object(vobj) = v {
                content_media_types.push(parse_media_type(name, vobj, spec, registry));
            }
        }
        if location == ParameterLocation::Querystring {
            if let Some((preferred_name, _)) = select_preferred_media(content) {
                let preferred_name = preferred_name.to_string();
                if let Some(lifted) =
                    lift_preferred_schema(spec, registry, content, LiftSite::Querystring { param_name: &param_name })
                {
                    if let Some(media) = content_media_types.iter_mut().find(|m| m.name == preferred_name) {
                        media.schema = Some(lifted);
                    }
                }
            }
        }
    }
    Ok(Parameter {
        name: param_name,
        location,
        required: bool_at(obj, "required"),
        deprecated: bool_at(obj, "deprecated"),
        style: owned_str_at(obj, "style"),
        explode: bool_at(obj, "explode"),
        allow_reserved: bool_at(obj, "allowReserved"),
        allow_empty_value: bool_at(obj, "allowEmptyValue"),
        schema: obj.get("schema").map(|v| schema_ref_from_json(v, spec, registry)),
        content_media_types,
        example: obj.get("example").map(JsonAny::from_value),
        examples: parse_named_examples(obj),
        ref_string: owned_str_at(obj, "$ref"),
    })
}

/// `components.headers` entries are parameter objects without a `name`/`in`.
fn parse_parameter_like_header(
    name: &str,
    obj: &Map<String, Value>,
    spec: &OpenApiSpec,
    registry: Option<&DocRegistry>,
) -> LoadResult<Parameter> {
    Ok(Parameter {
        name: name.to_string(),
        location: ParameterLocation::Header,
        required: bool_at(obj, "required"),
        deprecated: bool_at(obj, "deprecated"),
        style: owned_str_at(obj, "style"),
        explode: bool_at(obj, "explode"),
        allow_reserved: false,
        allow_empty_value: false,
        schema: obj.get("schema").map(|v| schema_ref_from_json(v, spec, registry)),
        content_media_types: Vec::new(),
        example: obj.get("example").map(JsonAny::from_value),
        examples: parse_named_examples(obj),
        ref_string: owned_str_at(obj, "$ref"),
    })
}

fn parse_named_examples(obj: &Map<String, Value>) -> Vec<(String, JsonAny)> {
    match obj.get("examples") {
        Some(Value::Object(examples)) => examples.iter().map(|(k, v)| (k.clone(), JsonAny::from_value(v))).collect(),
        _ => Vec::new(),
    }
}

fn parse_media_type(name: &str, obj: &Map<String, Value>, spec: &OpenApiSpec, registry: Option<&DocRegistry>) -> MediaType {
    let mut media = MediaType::new(name);
    media.schema = obj.get("schema").map(|v| schema_ref_from_json(v, spec, registry));
    media.item_schema = obj.get("itemSchema").map(|v| schema_ref_from_json(v, spec, registry));
    media.example = obj.get("example").map(JsonAny::from_value);
    media.examples = parse_named_examples(obj);
    media.ref_string = owned_str_at(obj, "$ref");
    media
}

/// Ranks a media type name for "preferred" selection: exact matches beat
/// `type/*` wildcards beat `*/*`; among ties, JSON-flavored types are
/// preferred, then form-urlencoded, then multipart, then anything else.
fn media_type_score(name: &str) -> (u8, u8) {
    let specificity = if name == "*/*" {
        0
    } else if name.ends_with("/*") {
        1
    } else {
        2
    };
    let preference = if name.ends_with("+json") || name == "application/json" {
        3
    } else if name == "application/x-www-form-urlencoded" {
        2
    } else if name == "multipart/form-data" {
        1
    } else {
        0
    };
    (specificity, preference)
}

fn select_preferred_media<'a>(content: &'a Map<String, Value>) -> Option<(&'a str, &'a Value)> {
    content
        .iter()
        .map(|(k, v)| (k.as_str(), v))
        .max_by_key(|(name, _)| media_type_score(name))
}

fn lift_preferred_schema(
    spec: &mut OpenApiSpec,
    registry: Option<&DocRegistry>,
    content: &Map<String, Value>,
    site: LiftSite<'_>,
) -> Option<SchemaRef> {
    let (_, media_val) = select_preferred_media(content)?;
    let schema_val = media_val.as_object().and_then(|o| o.get("schema"))?;
    if is_object_like(schema_val) || is_array_of_object_like(schema_val) {
        let lifted = lift_inline_schema(spec, site, schema_val, registry)?;
        Some(SchemaRef::reference(format!("#/components/schemas/{lifted}"), Some(lifted)))
    } else {
        Some(schema_ref_from_json(schema_val, spec, registry))
    }
}

fn parse_response(
    spec: &mut OpenApiSpec,
    op_id: &str,
    code: &str,
    obj: &Map<String, Value>,
    registry: Option<&DocRegistry>,
) -> LoadResult<Response> {
    let (content_media_types, schema) = match obj.get("content") {
        Some(Value::Object(content)) => {
            let media_types: Vec<MediaType> =
                content.iter().filter_map(|(n, v)| v.as_object().map(|o| parse_media_type(n, o, spec, registry))).collect();
            let schema = lift_preferred_schema(spec, registry, content, LiftSite::ResponseBody { op_id, status: code });
            (media_types, schema)
        }
        _ => (Vec::new(), None),
    };
    let headers = match obj.get("headers") {
        Some(Value::Object(h)) => h
            .iter()
            .filter_map(|(name, v)| v.as_object().map(|o| (name.clone(), o)))
            .map(|(name, o)| parse_parameter_like_header(&name, o, spec, registry).map(|p| (name, p)))
            .collect::<LoadResult<Vec<_>>>()?,
        _ => Vec::new(),
    };
    let links = match obj.get("links") {
        Some(Value::Object(l)) => l.iter().map(|(k, v)| (k.clone(), v.to_string())).collect(),
        _ => Vec::new(),
    };
    Ok(Response {
        code: code.to_string(),
        summary: owned_str_at(obj, "summary"),
        description: str_at(obj, "description").unwrap_or("").to_string(),
        content_media_types,
        schema,
        headers,
        links,
        example: obj.get("example").map(JsonAny::from_value),
        examples: parse_named_examples(obj),
    })
}

fn is_valid_response_code(code: &str) -> bool {
    if code == "default" {
        return true;
    }
    if code.len() != 3 {
        return false;
    }
    let bytes = code.as_bytes();
    bytes[0].is_ascii_digit()
        && (bytes[1].is_ascii_digit() || bytes[1] == b'X')
        && (bytes[2].is_ascii_digit() || bytes[2] == b'X')
}

fn parse_operation(
    spec: &mut OpenApiSpec,
    verb: &str,
    method: &str,
    obj: &Map<String, Value>,
    registry: Option<&DocRegistry>,
) -> LoadResult<Operation> {
    let operation_id = owned_str_at(obj, "operationId");
    let op_key = operation_id.clone().unwrap_or_else(|| format!("{method}_{verb}"));

    let mut parameters = Vec::new();
    if let Some(Value::Array(params)) = obj.get("parameters") {
        for p in params.iter().filter_map(Value::as_object) {
            let param = parse_parameter(spec, registry, p)?;
            if let Some(existing) = parameters.iter_mut().find(|existing: &&mut Parameter| {
                let e: &Parameter = existing;
                e.name == param.name && e.location == param.location
            }) {
                *existing = param;
            } else {
                parameters.push(param);
            }
        }
    }

    let (req_body_media_types, req_body, req_body_required) = match obj.get("requestBody") {
        Some(Value::Object(rb)) => match rb.get("content") {
            Some(Value::Object(content)) => {
                let media_types: Vec<MediaType> =
                    content.iter().filter_map(|(n, v)| v.as_object().map(|o| parse_media_type(n, o, spec, registry))).collect();
                let schema = lift_preferred_schema(spec, registry, content, LiftSite::RequestBody { op_id: &op_key });
                (media_types, schema, bool_at(rb, "required"))
            }
            _ => (Vec::new(), None, false),
        },
        _ => (Vec::new(), None, false),
    };

    let mut responses = Vec::new();
    if let Some(Value::Object(resp_obj)) = obj.get("responses") {
        for (code, r) in resp_obj {
            if !is_valid_response_code(code) {
                return Err(LoadError::invalid(format!("invalid response code '{code}'")));
            }
            if let Value::Object(robj) = r {
                responses.push(parse_response(spec, &op_key, code, robj, registry)?);
            }
        }
    }

    let mut callbacks = Vec::new();
    if let Some(Value::Object(cb_map)) = obj.get("callbacks") {
        for (name, cb) in cb_map {
            if let Value::Object(cb_obj) = cb {
                for (_, expr_item) in cb_obj {
                    if let Value::Object(expr_obj) = expr_item {
                        callbacks.push((name.clone(), parse_path_item(spec, name, expr_obj, registry)?));
                    }
                }
            }
        }
    }

    let tags = match obj.get("tags") {
        Some(Value::Array(arr)) => arr.iter().filter_map(Value::as_str).map(String::from).collect(),
        _ => Vec::new(),
    };

    let servers = match obj.get("servers") {
        Some(Value::Array(arr)) => parse_servers(arr)?,
        _ => Vec::new(),
    };

    Ok(Operation {
        verb: verb.to_string(),
        method: method.to_string(),
        operation_id,
        summary: owned_str_at(obj, "summary"),
        description: owned_str_at(obj, "description"),
        deprecated: bool_at(obj, "deprecated"),
        security: match obj.get("security") {
            Some(Value::Array(arr)) => Some(parse_security_requirements(arr)),
            _ => None,
        },
        parameters,
        req_body_ref: None,
        req_body,
        req_body_media_types,
        req_body_required,
        responses,
        callbacks,
        tags,
        servers,
        external_docs: match obj.get("externalDocs") {
            Some(Value::Object(ed)) => Some(parse_external_docs(ed)),
            _ => None,
        },
    })
}

fn parse_path_item(
    spec: &mut OpenApiSpec,
    route: &str,
    obj: &Map<String, Value>,
    registry: Option<&DocRegistry>,
) -> LoadResult<Path> {
    let mut path = Path::default();
    path.route = route.to_string();
    path.ref_string = owned_str_at(obj, "$ref");
    path.summary = owned_str_at(obj, "summary");
    path.description = owned_str_at(obj, "description");
    path.extensions = collect_extensions(obj);

    if let Some(Value::Array(params)) = obj.get("parameters") {
        for p in params.iter().filter_map(Value::as_object) {
            path.parameters.push(parse_parameter(spec, registry, p)?);
        }
    }

    if let Some(Value::Array(servers)) = obj.get("servers") {
        path.servers = parse_servers(servers)?;
    }

    for verb in FIXED_VERBS {
        if let Some(Value::Object(op_obj)) = obj.get(*verb) {
            path.operations.push(parse_operation(spec, verb, &verb.to_uppercase(), op_obj, registry)?);
        }
    }

    if let Some(Value::Object(additional)) = obj.get("additionalOperations") {
        for (method, op_val) in additional {
            if let Value::Object(op_obj) = op_val {
                path.additional_operations.push(parse_operation(spec, method, method, op_obj, registry)?);
            }
        }
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minimal_document_loads() {
        let doc = json!({
            "openapi": "3.1.0",
            "info": {"title": "t", "version": "1.0.0"},
            "paths": {}
        });
        let spec = load_from_json(&doc, "memory://doc.json", None).unwrap();
        assert_eq!(spec.openapi_version.as_deref(), Some("3.1.0"));
        assert!(!spec.is_schema_document);
    }

    #[test]
    fn rejects_unsupported_version() {
        let doc = json!({"openapi": "2.0.0", "info": {"title": "t", "version": "1.0.0"}, "paths": {}});
        assert!(load_from_json(&doc, "memory://doc.json", None).is_err());
    }

    #[test]
    fn rejects_path_without_leading_slash() {
        let doc = json!({
            "openapi": "3.1.0",
            "info": {"title": "t", "version": "1.0.0"},
            "paths": {"items": {"get": {"responses": {"200": {"description": "ok"}}}}}
        });
        assert!(load_from_json(&doc, "memory://doc.json", None).is_err());
    }

    #[test]
    fn bare_schema_document_loads() {
        let doc = json!({"type": "object", "properties": {"name": {"type": "string"}}});
        let spec = load_from_json(&doc, "memory://schema.json", None).unwrap();
        assert!(spec.is_schema_document);
        assert_eq!(spec.defined_schemas.len(), 1);
    }

    #[test]
    fn inline_request_body_object_is_lifted_during_load() {
        let doc = json!({
            "openapi": "3.1.0",
            "info": {"title": "t", "version": "1.0.0"},
            "paths": {
                "/things": {
                    "post": {
                        "operationId": "createThing",
                        "requestBody": {
                            "content": {
                                "application/json": {
                                    "schema": {"type": "object", "properties": {"name": {"type": "string"}}}
                                }
                            }
                        },
                        "responses": {"200": {"description": "ok"}}
                    }
                }
            }
        });
        let spec = load_from_json(&doc, "memory://doc.json", None).unwrap();
        assert!(spec.defined_schemas.iter().any(|(n, _)| n.starts_with("Inline_createThing_Request")));
    }

    #[test]
    fn duplicate_operation_id_across_paths_rejected() {
        let doc = json!({
            "openapi": "3.1.0",
            "info": {"title": "t", "version": "1.0.0"},
            "paths": {
                "/a": {"get": {"operationId": "dup", "responses": {"200": {"description": "ok"}}}},
                "/b": {"get": {"operationId": "dup", "responses": {"200": {"description": "ok"}}}}
            }
        });
        assert!(load_from_json(&doc, "memory://doc.json", None).is_err());
    }

    #[test]
    fn querystring_parameter_inline_schema_is_lifted() {
        let doc = json!({
            "openapi": "3.1.0",
            "info": {"title": "t", "version": "1.0.0"},
            "paths": {
                "/things": {
                    "get": {
                        "operationId": "listThings",
                        "parameters": [{
                            "name": "filter",
                            "in": "querystring",
                            "content": {
                                "application/json": {
                                    "schema": {"type": "object", "properties": {"q": {"type": "string"}}}
                                }
                            }
                        }],
                        "responses": {"200": {"description": "ok"}}
                    }
                }
            }
        });
        let spec = load_from_json(&doc, "memory://doc.json", None).unwrap();
        assert!(spec.defined_schemas.iter().any(|(n, _)| n.starts_with("Inline_Querystring_filter")));
    }
}
