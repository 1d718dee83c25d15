//! Generator-kernel contract (4.I): the function signatures and dispatch
//! rules a C code generator would emit for a lowered struct or enum, kept as
//! data rather than rendered C text. Real emission is out of scope; this
//! module answers "what functions exist, named how, returning what" so a
//! downstream emitter has everything it needs without re-deriving it.

use cdd_schema::{Field, FieldKind, StructFields};

// =============================================================================
// C identifier escaping
// =============================================================================

/// The closed C89-through-C23 keyword set, plus the runtime identifiers a
/// generated kernel reserves for itself.
fn is_c_reserved(name: &str) -> bool {
    matches!(
        name,
        "auto" | "break" | "case" | "char" | "const" | "continue" | "default" | "do" | "double"
            | "else" | "enum" | "extern" | "float" | "for" | "goto" | "if" | "inline" | "int"
            | "long" | "register" | "restrict" | "return" | "short" | "signed" | "sizeof"
            | "static" | "struct" | "switch" | "typedef" | "union" | "unsigned" | "void"
            | "volatile" | "while"
            | "_Alignas" | "alignas" | "_Alignof" | "alignof" | "_Atomic" | "_BitInt" | "_Bool"
            | "bool" | "_Complex" | "_Decimal32" | "_Decimal64" | "_Decimal128" | "_Generic"
            | "_Imaginary" | "_Noreturn" | "_Static_assert" | "static_assert" | "_Thread_local"
            | "thread_local" | "constexpr" | "false" | "true" | "nullptr" | "typeof"
            | "typeof_unqual"
            | "size_t" | "ssize_t" | "ptrdiff_t" | "intptr_t"
    )
}

/// Prefixes a reserved identifier with `cdd_` so generated code never
/// collides with a C keyword or a runtime helper name.
pub fn escape_c_ident(name: &str) -> String {
    if is_c_reserved(name) {
        format!("cdd_{name}")
    } else {
        name.to_string()
    }
}

// =============================================================================
// Return codes
// =============================================================================

/// The integer taxonomy every emitted function returns (§6/§7): `0` on
/// success, otherwise one of the four propagated error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnCode {
    Success,
    Invalid,
    Range,
    NoMem,
    Io,
}

impl ReturnCode {
    pub fn as_c_expr(self) -> &'static str {
        match self {
            ReturnCode::Success => "0",
            ReturnCode::Invalid => "EINVAL",
            ReturnCode::Range => "ERANGE",
            ReturnCode::NoMem => "ENOMEM",
            ReturnCode::Io => "EIO",
        }
    }
}

// =============================================================================
// Struct contract
// =============================================================================

/// One of the nine kernel functions §6 requires per struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructFunction {
    ToJson,
    FromJson,
    FromJsonObject,
    Cleanup,
    Default,
    DeepCopy,
    Eq,
    Debug,
    Display,
}

impl StructFunction {
    pub const ALL: [StructFunction; 9] = [
        StructFunction::ToJson,
        StructFunction::FromJson,
        StructFunction::FromJsonObject,
        StructFunction::Cleanup,
        StructFunction::Default,
        StructFunction::DeepCopy,
        StructFunction::Eq,
        StructFunction::Debug,
        StructFunction::Display,
    ];

    /// The `S_*` name this function is emitted under for struct `struct_name`.
    pub fn c_name(self, struct_name: &str) -> String {
        let struct_name = escape_c_ident(struct_name);
        let suffix = match self {
            StructFunction::ToJson => "to_json",
            StructFunction::FromJson => "from_json",
            StructFunction::FromJsonObject => "from_jsonObject",
            StructFunction::Cleanup => "cleanup",
            StructFunction::Default => "default",
            StructFunction::DeepCopy => "deepcopy",
            StructFunction::Eq => "eq",
            StructFunction::Debug => "debug",
            StructFunction::Display => "display",
        };
        format!("{struct_name}_{suffix}")
    }

    /// The C signature (return type and parameter list) for this function,
    /// per §6's "Output surface of the code generator" table.
    pub fn c_signature(self, struct_name: &str) -> String {
        let s = escape_c_ident(struct_name);
        let name = self.c_name(struct_name);
        match self {
            StructFunction::ToJson => format!("int {name}(const struct {s}*, char**)"),
            StructFunction::FromJson => format!("int {name}(const char*, struct {s}**)"),
            StructFunction::FromJsonObject => format!("int {name}(const JsonObject*, struct {s}**)"),
            StructFunction::Cleanup => format!("void {name}(struct {s}*)"),
            StructFunction::Default => format!("int {name}(struct {s}**)"),
            StructFunction::DeepCopy => format!("int {name}(const struct {s}*, struct {s}**)"),
            StructFunction::Eq => format!("int {name}(const struct {s}*, const struct {s}*)"),
            StructFunction::Debug => format!("int {name}(const struct {s}*, File*)"),
            StructFunction::Display => format!("int {name}(const struct {s}*, File*)"),
        }
    }
}

/// The full kernel contract for one lowered struct: its nine function
/// signatures plus the per-field dispatch the generator would use to fill
/// their bodies.
#[derive(Debug, Clone)]
pub struct StructContract {
    pub name: String,
    pub fields: Vec<FieldContract>,
}

impl StructContract {
    pub fn from_struct_fields(name: &str, fields: &StructFields) -> Self {
        StructContract { name: name.to_string(), fields: fields.iter().map(FieldContract::from_field).collect() }
    }

    pub fn functions(&self) -> impl Iterator<Item = (StructFunction, String)> + '_ {
        StructFunction::ALL.into_iter().map(move |f| (f, f.c_signature(&self.name)))
    }
}

/// How a single field's value is formatted by `to_json` and validated by
/// `from_jsonObject`, derived from its [`FieldKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum ValueFormat {
    Integer,
    Float,
    Boolean,
    StringQuoted,
    EnumToStr { enum_name: String },
    NestedObject { struct_name: String },
    Array { element: Box<ValueFormat> },
}

#[derive(Debug, Clone)]
pub struct FieldContract {
    pub name: String,
    pub required: bool,
    pub format: ValueFormat,
    pub validation: Vec<ValidationCheck>,
}

/// A single `from_jsonObject` constraint check and the return code it
/// produces on violation.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationCheck {
    Range,
    Length,
    Pattern(PatternCheck),
}

impl FieldContract {
    fn from_field(field: &Field) -> Self {
        let format = match field.kind {
            FieldKind::Primitive => classify_primitive_literal(field.default_literal.as_deref()),
            FieldKind::String => ValueFormat::StringQuoted,
            FieldKind::Enum => ValueFormat::EnumToStr {
                enum_name: field.ref_type.clone().unwrap_or_else(|| format!("{}Enum", field.name)),
            },
            FieldKind::Object => {
                ValueFormat::NestedObject { struct_name: field.ref_type.clone().unwrap_or_else(|| field.name.clone()) }
            }
            FieldKind::Array => ValueFormat::Array { element: Box::new(ValueFormat::NestedObject {
                struct_name: field.ref_type.clone().unwrap_or_else(|| field.name.clone()),
            }) },
        };

        let mut validation = Vec::new();
        let v = &field.validation;
        if v.min.is_some() || v.max.is_some() || v.exclusive_min.is_some() || v.exclusive_max.is_some() {
            validation.push(ValidationCheck::Range);
        }
        if v.min_len.is_some() || v.max_len.is_some() || v.min_items.is_some() || v.max_items.is_some() {
            validation.push(ValidationCheck::Length);
        }
        if let Some(pattern) = &v.pattern {
            validation.push(ValidationCheck::Pattern(decompose_pattern(pattern)));
        }

        FieldContract { name: field.name.clone(), required: field.required, format, validation }
    }
}

/// `default_literal` is stored as plain text (`schema_build::default_literal_text`);
/// classify it back into a format without re-parsing the schema, since the
/// lowered [`Field`] does not itself distinguish integer from float.
fn classify_primitive_literal(default_literal: Option<&str>) -> ValueFormat {
    match default_literal {
        Some("true") | Some("false") => ValueFormat::Boolean,
        Some(lit) if lit.contains('.') => ValueFormat::Float,
        _ => ValueFormat::Integer,
    }
}

// =============================================================================
// Pattern decomposition (4.I / §8 "Pattern decomposition")
// =============================================================================

/// A `pattern` constraint decomposed into the `strcmp`/`strncmp`/`strstr`
/// check it compiles down to — no regex runtime is ever emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternCheck {
    /// `^foo$` — whole-string equality.
    Exact(String),
    /// `^foo` — the value must start with this text.
    Prefix(String),
    /// `foo$` — the value must end with this text.
    Suffix(String),
    /// `foo` — the text must occur anywhere in the value.
    Substring(String),
}

pub fn decompose_pattern(pattern: &str) -> PatternCheck {
    let starts = pattern.starts_with('^');
    let ends = pattern.ends_with('$');
    let start = if starts { 1 } else { 0 };
    let end = if ends { pattern.len() - 1 } else { pattern.len() };
    let end = end.max(start);
    let inner = &pattern[start..end];

    match (starts, ends) {
        (true, true) => PatternCheck::Exact(inner.to_string()),
        (true, false) => PatternCheck::Prefix(inner.to_string()),
        (false, true) => PatternCheck::Suffix(inner.to_string()),
        (false, false) => PatternCheck::Substring(pattern.to_string()),
    }
}

// =============================================================================
// Enum contract
// =============================================================================

#[derive(Debug, Clone)]
pub struct EnumContract {
    pub name: String,
    pub members: Vec<String>,
}

impl EnumContract {
    pub fn to_str_name(&self) -> String {
        format!("{}_to_str", escape_c_ident(&self.name))
    }

    pub fn from_str_name(&self) -> String {
        format!("{}_from_str", escape_c_ident(&self.name))
    }

    /// The fallback member returned by `from_str` when no spelling matches,
    /// and by `to_str` when asked to render an out-of-range value.
    pub fn unknown_member(&self) -> String {
        format!("{}_UNKNOWN", escape_c_ident(&self.name))
    }
}

// =============================================================================
// Root array contract
// =============================================================================

/// For a root JSON array of primitives or objects, the three functions
/// emitted with the `(const T*, size_t, char**)` / `(const char*, T**,
/// size_t*)` signatures from 4.I.
#[derive(Debug, Clone)]
pub struct RootArrayContract {
    pub element_type: String,
}

impl RootArrayContract {
    pub fn from_json_signature(&self) -> String {
        format!("int {}_array_from_json(const char*, {}**, size_t*)", self.element_type, self.element_type)
    }

    pub fn to_json_signature(&self) -> String {
        format!("int {}_array_to_json(const {}*, size_t, char**)", self.element_type, self.element_type)
    }

    pub fn cleanup_signature(&self) -> String {
        format!("void {}_array_cleanup({}*, size_t)", self.element_type, self.element_type)
    }
}

// =============================================================================
// Preprocessor guards
// =============================================================================

/// Which configured guard macro (if any) wraps an emitted function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardKind {
    Enum,
    Json,
    Utils,
}

#[derive(Debug, Clone, Default)]
pub struct GuardConfig {
    pub enum_guard: Option<String>,
    pub json_guard: Option<String>,
    pub utils_guard: Option<String>,
}

impl GuardConfig {
    pub fn macro_for(&self, kind: GuardKind) -> Option<&str> {
        match kind {
            GuardKind::Enum => self.enum_guard.as_deref(),
            GuardKind::Json => self.json_guard.as_deref(),
            GuardKind::Utils => self.utils_guard.as_deref(),
        }
    }
}

/// Wraps `body` in `#ifdef <guard>` / `#endif` when `guard` names a macro,
/// otherwise returns `body` unchanged.
pub fn wrap_with_guard(guard: Option<&str>, body: &str) -> String {
    match guard {
        Some(macro_name) => format!("#ifdef {macro_name}\n{body}\n#endif\n"),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdd_schema::{Field, FieldKind, FieldValidation};

    fn field(name: &str, kind: FieldKind) -> Field {
        Field { name: name.to_string(), kind, ref_type: None, required: false, default_literal: None, validation: FieldValidation::default() }
    }

    #[test]
    fn reserved_identifier_is_escaped() {
        assert_eq!(escape_c_ident("struct"), "cdd_struct");
        assert_eq!(escape_c_ident("name"), "name");
    }

    #[test]
    fn struct_function_signatures_match_contract() {
        assert_eq!(StructFunction::ToJson.c_signature("Widget"), "int Widget_to_json(const struct Widget*, char**)");
        assert_eq!(StructFunction::Cleanup.c_signature("Widget"), "void Widget_cleanup(struct Widget*)");
        assert_eq!(StructFunction::Eq.c_signature("Widget"), "int Widget_eq(const struct Widget*, const struct Widget*)");
    }

    #[test]
    fn reserved_struct_name_escaped_in_signature() {
        assert_eq!(StructFunction::Cleanup.c_signature("struct"), "void cdd_struct_cleanup(struct cdd_struct*)");
    }

    #[test]
    fn pattern_decomposition_four_cases() {
        assert_eq!(decompose_pattern("^foo$"), PatternCheck::Exact("foo".to_string()));
        assert_eq!(decompose_pattern("^foo"), PatternCheck::Prefix("foo".to_string()));
        assert_eq!(decompose_pattern("foo$"), PatternCheck::Suffix("foo".to_string()));
        assert_eq!(decompose_pattern("foo"), PatternCheck::Substring("foo".to_string()));
    }

    #[test]
    fn enum_contract_names_and_unknown_fallback() {
        let e = EnumContract { name: "Color".to_string(), members: vec!["Red".to_string(), "Blue".to_string()] };
        assert_eq!(e.to_str_name(), "Color_to_str");
        assert_eq!(e.from_str_name(), "Color_from_str");
        assert_eq!(e.unknown_member(), "Color_UNKNOWN");
    }

    #[test]
    fn root_array_contract_signatures() {
        let c = RootArrayContract { element_type: "Widget".to_string() };
        assert_eq!(c.to_json_signature(), "int Widget_array_to_json(const Widget*, size_t, char**)");
        assert_eq!(c.from_json_signature(), "int Widget_array_from_json(const char*, Widget**, size_t*)");
    }

    #[test]
    fn guard_wraps_body_when_configured() {
        assert_eq!(wrap_with_guard(Some("MY_GUARD"), "int x;"), "#ifdef MY_GUARD\nint x;\n#endif\n");
        assert_eq!(wrap_with_guard(None, "int x;"), "int x;");
    }

    #[test]
    fn struct_contract_from_fields_classifies_formats() {
        let mut int_field = field("count", FieldKind::Primitive);
        int_field.default_literal = Some("0".to_string());
        let fields = vec![int_field, field("label", FieldKind::String)];
        let contract = StructContract::from_struct_fields("Widget", &fields);
        assert_eq!(contract.fields[0].format, ValueFormat::Integer);
        assert_eq!(contract.fields[1].format, ValueFormat::StringQuoted);
    }
}
