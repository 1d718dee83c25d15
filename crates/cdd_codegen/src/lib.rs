//! # cdd-codegen
//!
//! The generator-kernel contract: given a lowered [`cdd_schema::StructFields`]
//! or enum member list, describes the C function signatures, return-code
//! taxonomy, and validation dispatch a code generator would emit — without
//! rendering any C text itself (4.I).
//!
//! ```
//! use cdd_codegen::{StructContract, StructFunction};
//! use cdd_schema::{Field, FieldKind, FieldValidation};
//!
//! let fields = vec![Field {
//!     name: "name".to_string(),
//!     kind: FieldKind::String,
//!     ref_type: None,
//!     required: true,
//!     default_literal: None,
//!     validation: FieldValidation::default(),
//! }];
//! let contract = StructContract::from_struct_fields("Widget", &fields);
//! assert_eq!(StructFunction::ToJson.c_name(&contract.name), "Widget_to_json");
//! ```

pub mod emission;

pub use emission::{
    decompose_pattern, escape_c_ident, wrap_with_guard, EnumContract, FieldContract, GuardConfig,
    GuardKind, PatternCheck, ReturnCode, RootArrayContract, StructContract, StructFunction,
    ValidationCheck, ValueFormat,
};
