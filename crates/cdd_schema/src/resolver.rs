//! JSON-pointer and `$id`/`$anchor` reference resolution (4.E).

use crate::ir::{Components, DocRegistry, MediaType, OpenApiSpec, Parameter, Path, Response, SchemaRef};

/// Splits a `$ref` string into its URI part (possibly empty) and fragment
/// part (without the leading `#`), e.g. `"other.json#/components/schemas/A"`
/// becomes `(Some("other.json"), Some("/components/schemas/A"))`.
pub fn split_ref(reference: &str) -> (Option<&str>, Option<&str>) {
    match reference.find('#') {
        Some(idx) => {
            let uri = &reference[..idx];
            let fragment = &reference[idx + 1..];
            (if uri.is_empty() { None } else { Some(uri) }, Some(fragment))
        }
        None => (if reference.is_empty() { None } else { Some(reference) }, None),
    }
}

/// Un-escapes a single JSON-pointer segment: `~1` -> `/`, `~0` -> `~`.
pub fn unescape_pointer_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

/// Strips `.` and `..` dot segments from a URI path, respecting the
/// scheme/authority boundary so a leading `//host` is never touched.
pub fn remove_dot_segments(uri: &str) -> String {
    let (prefix, path) = split_authority(uri);
    let mut output: Vec<&str> = Vec::new();
    let absolute = path.starts_with('/');
    for segment in path.split('/') {
        match segment {
            "." => {}
            ".." => {
                output.pop();
            }
            other => output.push(other),
        }
    }
    let mut rebuilt = output.join("/");
    if absolute && !rebuilt.starts_with('/') {
        rebuilt = format!("/{rebuilt}");
    }
    format!("{prefix}{rebuilt}")
}

/// Splits `uri` into a `scheme://authority` prefix (kept verbatim) and the
/// remaining path, so dot-segment removal never crosses into the authority.
fn split_authority(uri: &str) -> (&str, &str) {
    if let Some(scheme_end) = uri.find("://") {
        let after_scheme = scheme_end + 3;
        if let Some(path_start) = uri[after_scheme..].find('/') {
            let split_at = after_scheme + path_start;
            return (&uri[..split_at], &uri[split_at..]);
        }
        return (uri, "");
    }
    ("", uri)
}

/// Resolves `reference` (possibly relative) against `base`, RFC 3986 style:
/// absolute URIs (with a scheme) pass through unchanged; scheme-relative
/// (`//host/path`) inherit the base scheme; absolute paths replace the
/// base's path; relative paths are merged against the base's directory;
/// fragment-only references resolve to the base itself.
pub fn resolve_uri(base: &str, reference: &str) -> String {
    if reference.is_empty() {
        return base.to_string();
    }
    if reference.contains("://") {
        return remove_dot_segments(reference);
    }
    if let Some(rest) = reference.strip_prefix("//") {
        let scheme = base.split("://").next().unwrap_or("");
        return remove_dot_segments(&format!("{scheme}://{rest}"));
    }
    if reference.starts_with('/') {
        let (authority, _) = split_authority(base);
        return remove_dot_segments(&format!("{authority}{reference}"));
    }
    // Relative path: merge against base's directory.
    let base_dir = match base.rfind('/') {
        Some(idx) => &base[..=idx],
        None => "",
    };
    remove_dot_segments(&format!("{base_dir}{reference}"))
}

/// Resolves a `$ref`/`$dynamicRef` string against `spec`, returning the
/// target spec and the (possibly rewritten) fragment-bearing ref string used
/// to locate the component within it.
///
/// If the reference carries a base URI it is resolved against
/// `spec.document_uri` and looked up in `registry`; a fragment-only
/// reference binds to `spec` itself.
pub fn resolve_ref<'a>(
    spec: &'a OpenApiSpec,
    reference: &str,
    registry: &DocRegistry<'a>,
) -> Option<(&'a OpenApiSpec, String)> {
    let (uri_part, fragment) = split_ref(reference);
    let fragment = fragment.unwrap_or("").to_string();

    match uri_part {
        None => Some((spec, fragment)),
        Some(uri) => {
            let base = spec.document_uri.as_deref().unwrap_or("");
            let resolved_base = resolve_uri(base, uri);
            registry.lookup(&resolved_base).map(|target| (target, fragment))
        }
    }
}

/// The component bucket a reference fragment targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Schemas,
    Responses,
    Parameters,
    RequestBodies,
    Headers,
    PathItems,
}

/// A component found by [`find_component`], one variant per [`Bucket`].
pub enum Found<'a> {
    Schema(&'a SchemaRef),
    Response(&'a Response),
    Parameter(&'a Parameter),
    RequestBody(&'a MediaType),
    PathItem(&'a Path),
}

/// Performs JSON-pointer unescape on the final fragment segment and
/// linearly searches the named `bucket` of `spec.components` for it.
pub fn find_component<'a>(spec: &'a OpenApiSpec, fragment: &str, bucket: Bucket) -> Option<Found<'a>> {
    let name = unescape_pointer_segment(fragment.rsplit('/').next().unwrap_or(fragment));
    let components: &Components = &spec.components;
    match bucket {
        Bucket::Schemas => components
            .schemas
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, s)| Found::Schema(s)),
        Bucket::Responses => components
            .responses
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, r)| Found::Response(r)),
        Bucket::Parameters => components
            .parameters
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, p)| Found::Parameter(p)),
        Bucket::Headers => components
            .headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, p)| Found::Parameter(p)),
        Bucket::RequestBodies => components
            .request_bodies
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, m)| Found::RequestBody(m)),
        Bucket::PathItems => components
            .path_items
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, p)| Found::PathItem(p)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_ref_with_uri_and_fragment() {
        assert_eq!(
            split_ref("other.json#/components/schemas/A"),
            (Some("other.json"), Some("/components/schemas/A"))
        );
    }

    #[test]
    fn split_ref_fragment_only() {
        assert_eq!(split_ref("#/components/schemas/A"), (None, Some("/components/schemas/A")));
    }

    #[test]
    fn unescape_pointer_segment_handles_both_escapes() {
        assert_eq!(unescape_pointer_segment("a~1b~0c"), "a/b~c");
    }

    #[test]
    fn remove_dot_segments_collapses_parent_refs() {
        assert_eq!(remove_dot_segments("/a/b/../c"), "/a/c");
        assert_eq!(remove_dot_segments("https://h/a/./b"), "https://h/a/b");
    }

    #[test]
    fn resolve_uri_relative_merges_against_base_dir() {
        assert_eq!(resolve_uri("https://h/a/b.json", "c.json"), "https://h/a/c.json");
    }

    #[test]
    fn resolve_uri_absolute_path_replaces_path_only() {
        assert_eq!(resolve_uri("https://h/a/b.json", "/c.json"), "https://h/c.json");
    }

    #[test]
    fn resolve_uri_scheme_relative_inherits_scheme() {
        assert_eq!(resolve_uri("https://h/a/b.json", "//other/c.json"), "https://other/c.json");
    }

    #[test]
    fn find_component_locates_request_body_by_name() {
        let mut spec = OpenApiSpec::default();
        spec.components.request_bodies.push(("Widget".to_string(), MediaType::new("application/json")));
        match find_component(&spec, "/components/requestBodies/Widget", Bucket::RequestBodies) {
            Some(Found::RequestBody(m)) => assert_eq!(m.name, "application/json"),
            _ => panic!("expected RequestBody match"),
        }
    }

    #[test]
    fn find_component_locates_path_item_by_name() {
        let mut spec = OpenApiSpec::default();
        let mut path = Path::default();
        path.route = "/widgets".to_string();
        spec.components.path_items.push(("Widgets".to_string(), path));
        match find_component(&spec, "/components/pathItems/Widgets", Bucket::PathItems) {
            Some(Found::PathItem(p)) => assert_eq!(p.route, "/widgets"),
            _ => panic!("expected PathItem match"),
        }
    }

    #[test]
    fn resolve_ref_cross_document_via_registry() {
        let mut other = OpenApiSpec::default();
        other.document_uri = Some("https://h/other.json".to_string());
        other.components.schemas.push(("B".to_string(), SchemaRef::inline("integer")));

        let mut spec = OpenApiSpec::default();
        spec.document_uri = Some("https://h/main.json".to_string());

        let mut registry = DocRegistry::new();
        registry.add("https://h/other.json", &other);

        let (target, fragment) = resolve_ref(&spec, "other.json#/components/schemas/B", &registry).unwrap();
        assert_eq!(fragment, "/components/schemas/B");
        match find_component(target, &fragment, Bucket::Schemas) {
            Some(Found::Schema(_)) => {}
            _ => panic!("expected Schema match in cross-document target"),
        }
    }
}
