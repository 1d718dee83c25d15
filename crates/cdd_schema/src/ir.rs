//! Normalized OpenAPI 3.1/3.2 + JSON Schema intermediate representation.
//!
//! Every section below is loader-owned: an [`OpenApiSpec`] is a self
//! contained tree with no external string sharing. Ordered sections are kept
//! as `Vec<(String, T)>` rather than a map so iteration reproduces the
//! source JSON object's key order, per the OpenAPI list-ordering guarantee.

use std::fmt;

/// A minimal tagged "any JSON value" used for extensions and schema
/// metadata that the loader preserves but does not interpret. Object and
/// array values are kept as their serialized text (`Raw`) rather than a
/// recursive tree, since nothing downstream needs to walk into them.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonAny {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    /// Serialized JSON text for an object or array value.
    Raw(String),
}

impl JsonAny {
    pub fn from_value(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => JsonAny::Null,
            serde_json::Value::Bool(b) => JsonAny::Bool(*b),
            serde_json::Value::Number(n) => JsonAny::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => JsonAny::String(s.clone()),
            other => JsonAny::Raw(other.to_string()),
        }
    }
}

/// `allOf`/`anyOf`/`oneOf` composition kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionKind {
    AllOf,
    AnyOf,
    OneOf,
}

/// The structural shape a [`SchemaRef`] takes, independent of the
/// constraints and metadata it may also carry.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// A bare JSON Schema boolean (`true` or `false`).
    Boolean(bool),
    /// A named `$ref`/`$dynamicRef`; the name lives on [`SchemaRef::ref_name`].
    Reference,
    /// An inline primitive (`string`, `integer`, `number`, `boolean`,
    /// `object` with no lowering needed, or absent `type`).
    Inline { inline_type: Option<String> },
    Array { items: Option<Box<SchemaRef>> },
    Composition { kind: CompositionKind, members: Vec<SchemaRef> },
    Not(Box<SchemaRef>),
    Conditional {
        if_schema: Box<SchemaRef>,
        then_schema: Option<Box<SchemaRef>>,
        else_schema: Option<Box<SchemaRef>>,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericConstraints {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: Option<f64>,
    pub exclusive_maximum: Option<f64>,
    pub multiple_of: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringConstraints {
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArrayConstraints {
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub unique_items: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectConstraints {
    pub min_properties: Option<u64>,
    pub max_properties: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Discriminator {
    pub property_name: String,
    pub mapping: Vec<(String, String)>,
    pub default_mapping: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlMeta {
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub prefix: Option<String>,
    pub attribute: bool,
    pub wrapped: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExternalDocs {
    pub description: Option<String>,
    pub url: String,
}

/// A discriminated schema node carrying its own constraints and metadata,
/// per 4.G. `SchemaRef` cycles through `ref_name` strings, never through
/// owning pointers, so no reference cycle can arise in the owned tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaRef {
    pub node: SchemaNode,
    pub ref_string: Option<String>,
    pub ref_name: Option<String>,
    pub dynamic_ref: Option<String>,
    pub format: Option<String>,
    pub content_media_type: Option<String>,
    pub content_encoding: Option<String>,
    pub nullable: bool,
    pub numeric: NumericConstraints,
    pub string: StringConstraints,
    pub array: ArrayConstraints,
    pub object: ObjectConstraints,
    pub enum_values: Vec<JsonAny>,
    pub const_value: Option<JsonAny>,
    pub default_value: Option<JsonAny>,
    pub examples: Vec<JsonAny>,
    pub deprecated: bool,
    pub read_only: bool,
    pub write_only: bool,
    pub discriminator: Option<Discriminator>,
    pub xml: Option<XmlMeta>,
    pub external_docs: Option<ExternalDocs>,
    /// Serialized text of keys this loader does not interpret, preserved
    /// for round-tripping.
    pub unknown: Option<String>,
}

impl SchemaRef {
    pub fn inline(inline_type: impl Into<String>) -> Self {
        SchemaRef {
            node: SchemaNode::Inline { inline_type: Some(inline_type.into()) },
            ..SchemaRef::empty()
        }
    }

    pub fn reference(ref_string: impl Into<String>, ref_name: Option<String>) -> Self {
        SchemaRef {
            node: SchemaNode::Reference,
            ref_string: Some(ref_string.into()),
            ref_name,
            ..SchemaRef::empty()
        }
    }

    pub fn empty() -> Self {
        SchemaRef {
            node: SchemaNode::Inline { inline_type: None },
            ref_string: None,
            ref_name: None,
            dynamic_ref: None,
            format: None,
            content_media_type: None,
            content_encoding: None,
            nullable: false,
            numeric: NumericConstraints::default(),
            string: StringConstraints::default(),
            array: ArrayConstraints::default(),
            object: ObjectConstraints::default(),
            enum_values: Vec::new(),
            const_value: None,
            default_value: None,
            examples: Vec::new(),
            deprecated: false,
            read_only: false,
            write_only: false,
            discriminator: None,
            xml: None,
            external_docs: None,
            unknown: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterLocation {
    Path,
    Query,
    Querystring,
    Header,
    Cookie,
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
            ParameterLocation::Querystring => "querystring",
            ParameterLocation::Header => "header",
            ParameterLocation::Cookie => "cookie",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Encoding {
    pub property_or_prefix: String,
    pub content_type: Option<String>,
    pub headers: Vec<(String, SchemaRef)>,
    pub style: Option<String>,
    pub explode: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaType {
    pub name: String,
    pub schema: Option<SchemaRef>,
    pub item_schema: Option<SchemaRef>,
    pub encoding: Vec<Encoding>,
    pub prefix_encoding: Vec<Encoding>,
    pub item_encoding: Option<Encoding>,
    pub example: Option<JsonAny>,
    pub examples: Vec<(String, JsonAny)>,
    pub ref_string: Option<String>,
}

impl MediaType {
    pub fn new(name: impl Into<String>) -> Self {
        MediaType {
            name: name.into(),
            schema: None,
            item_schema: None,
            encoding: Vec::new(),
            prefix_encoding: Vec::new(),
            item_encoding: None,
            example: None,
            examples: Vec::new(),
            ref_string: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub location: ParameterLocation,
    pub required: bool,
    pub deprecated: bool,
    pub style: Option<String>,
    pub explode: bool,
    pub allow_reserved: bool,
    pub allow_empty_value: bool,
    pub schema: Option<SchemaRef>,
    pub content_media_types: Vec<MediaType>,
    pub example: Option<JsonAny>,
    pub examples: Vec<(String, JsonAny)>,
    pub ref_string: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    pub code: String,
    pub summary: Option<String>,
    pub description: String,
    pub content_media_types: Vec<MediaType>,
    pub schema: Option<SchemaRef>,
    pub headers: Vec<(String, Parameter)>,
    pub links: Vec<(String, String)>,
    pub example: Option<JsonAny>,
    pub examples: Vec<(String, JsonAny)>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operation {
    pub verb: String,
    pub method: String,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub deprecated: bool,
    pub security: Option<Vec<Vec<(String, Vec<String>)>>>,
    pub parameters: Vec<Parameter>,
    pub req_body_ref: Option<String>,
    pub req_body: Option<SchemaRef>,
    pub req_body_media_types: Vec<MediaType>,
    pub req_body_required: bool,
    pub responses: Vec<Response>,
    pub callbacks: Vec<(String, Path)>,
    pub tags: Vec<String>,
    pub servers: Vec<Server>,
    pub external_docs: Option<ExternalDocs>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    pub route: String,
    pub ref_string: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub parameters: Vec<Parameter>,
    pub servers: Vec<Server>,
    pub operations: Vec<Operation>,
    pub additional_operations: Vec<Operation>,
    pub extensions: Vec<(String, JsonAny)>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerVariable {
    pub default: String,
    pub enum_values: Vec<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Server {
    pub url: String,
    pub description: Option<String>,
    pub variables: Vec<(String, ServerVariable)>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tag {
    pub name: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub parent: Option<String>,
    pub external_docs: Option<ExternalDocs>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct License {
    pub name: String,
    pub identifier: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contact {
    pub name: Option<String>,
    pub url: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Info {
    pub title: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub terms_of_service: Option<String>,
    pub contact: Option<Contact>,
    pub license: Option<License>,
    pub version: String,
}

/// The validation-ready field shape a struct-compatible schema lowers to.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Primitive,
    String,
    Enum,
    Object,
    Array,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldValidation {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub exclusive_min: Option<f64>,
    pub exclusive_max: Option<f64>,
    pub min_len: Option<u64>,
    pub max_len: Option<u64>,
    pub pattern: Option<String>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub unique_items: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    pub ref_type: Option<String>,
    pub required: bool,
    pub default_literal: Option<String>,
    pub validation: FieldValidation,
}

pub type StructFields = Vec<Field>;

/// Ordered component buckets: `schemas`, `responses`, `parameters`,
/// `requestBodies`, `headers`, `securitySchemes`, `links`, `callbacks`,
/// `pathItems`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Components {
    pub schemas: Vec<(String, SchemaRef)>,
    pub responses: Vec<(String, Response)>,
    pub parameters: Vec<(String, Parameter)>,
    pub request_bodies: Vec<(String, MediaType)>,
    pub headers: Vec<(String, Parameter)>,
    pub security_schemes: Vec<(String, JsonAny)>,
    pub links: Vec<(String, JsonAny)>,
    pub callbacks: Vec<(String, Path)>,
    pub path_items: Vec<(String, Path)>,
}

/// Top-level OpenAPI document IR (4.G / §3).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpenApiSpec {
    pub openapi_version: Option<String>,
    pub is_schema_document: bool,
    pub self_uri: Option<String>,
    pub retrieval_uri: Option<String>,
    pub document_uri: Option<String>,
    pub json_schema_dialect: Option<String>,
    pub info: Option<Info>,
    pub external_docs: Option<ExternalDocs>,
    pub extensions: Vec<(String, JsonAny)>,
    pub security: Vec<Vec<(String, Vec<String>)>>,
    pub servers: Vec<Server>,
    pub tags: Vec<Tag>,
    pub paths: Vec<(String, Path)>,
    pub webhooks: Vec<(String, Path)>,
    pub components: Components,
    pub raw_schemas: Vec<(String, String)>,
    pub defined_schemas: Vec<(String, StructFields)>,
}

/// Ordered table of base URIs to loaded specs, for cross-document `$ref`
/// resolution. Holds non-owning handles; entries must not outlive the specs
/// they reference.
#[derive(Debug, Default)]
pub struct DocRegistry<'a> {
    entries: Vec<(String, &'a OpenApiSpec)>,
}

impl<'a> DocRegistry<'a> {
    pub fn new() -> Self {
        DocRegistry { entries: Vec::new() }
    }

    pub fn add(&mut self, base_uri: impl Into<String>, spec: &'a OpenApiSpec) {
        self.entries.push((base_uri.into(), spec));
    }

    pub fn lookup(&self, base_uri: &str) -> Option<&'a OpenApiSpec> {
        self.entries
            .iter()
            .find(|(uri, _)| uri == base_uri)
            .map(|(_, spec)| *spec)
    }
}
