//! # cdd-schema
//!
//! OpenAPI 3.1/3.2 document loading: reference resolution, a normalized
//! JSON-Schema intermediate representation, inline-schema lifting, and the
//! cross-cutting validators that run once a document is fully parsed.
//!
//! ```
//! use cdd_schema::load_from_json;
//! use serde_json::json;
//!
//! let doc = json!({
//!     "openapi": "3.1.0",
//!     "info": {"title": "example", "version": "1.0.0"},
//!     "paths": {}
//! });
//! let spec = load_from_json(&doc, "memory://example.json", None).unwrap();
//! assert_eq!(spec.openapi_version.as_deref(), Some("3.1.0"));
//! ```

pub mod error;
pub mod ir;
pub mod lift;
pub mod loader;
pub mod resolver;
pub mod schema_build;
pub mod validate;

pub use error::{ErrorCode, LoadError, LoadResult};
pub use ir::{
    Components, Contact, DocRegistry, Encoding, ExternalDocs, Field, FieldKind, FieldValidation,
    Info, JsonAny, License, MediaType, Operation, OpenApiSpec, Parameter, ParameterLocation, Path,
    Response, SchemaNode, SchemaRef, Server, ServerVariable, StructFields, Tag,
};
pub use lift::{lift_inline_schema, LiftSite};
pub use loader::load_from_json;
pub use resolver::{find_component, resolve_ref, resolve_uri, Bucket, Found};
pub use schema_build::{is_array_of_object_like, is_object_like, lower_to_struct_fields, schema_ref_from_json};
pub use validate::run_validators;
