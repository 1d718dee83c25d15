//! Cross-cutting post-parse invariants (4.J).

use crate::error::{LoadError, LoadResult};
use crate::ir::{OpenApiSpec, Parameter, ParameterLocation, Path, Server};
use std::collections::{HashMap, HashSet};

/// Runs every validator in the order listed in 4.J, stopping at the first
/// failure (the loader aborts at first error, per §7).
pub fn run_validators(spec: &OpenApiSpec) -> LoadResult<()> {
    check_operation_id_uniqueness(spec)?;
    check_path_templating_and_collision(spec)?;
    check_querystring_usage(spec)?;
    check_parameter_schema_content_invariant(spec)?;
    check_tag_parents(spec)?;
    check_server_variables(spec)?;
    Ok(())
}

fn collect_operation_ids(path: &Path, ids: &mut Vec<String>) {
    for op in path.operations.iter().chain(path.additional_operations.iter()) {
        if let Some(id) = &op.operation_id {
            ids.push(id.clone());
        }
        for (_, callback_path) in &op.callbacks {
            collect_operation_ids(callback_path, ids);
        }
    }
}

fn check_operation_id_uniqueness(spec: &OpenApiSpec) -> LoadResult<()> {
    let mut ids = Vec::new();
    for (_, path) in spec.paths.iter().chain(spec.webhooks.iter()) {
        collect_operation_ids(path, &mut ids);
    }
    for (_, path) in &spec.components.path_items {
        collect_operation_ids(path, &mut ids);
    }
    for (_, path) in &spec.components.callbacks {
        collect_operation_ids(path, &mut ids);
    }

    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id.clone()) {
            return Err(LoadError::invalid(format!("duplicate operationId '{id}'")));
        }
    }
    Ok(())
}

fn template_names(route: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut chars = route.char_indices().peekable();
    while let Some((_, c)) = chars.next() {
        if c == '{' {
            let mut name = String::new();
            for (_, c2) in chars.by_ref() {
                if c2 == '}' {
                    break;
                }
                name.push(c2);
            }
            names.push(name);
        }
    }
    names
}

fn normalize_template(route: &str) -> String {
    let mut out = String::new();
    let mut in_brace = false;
    for c in route.chars() {
        match c {
            '{' => {
                in_brace = true;
                out.push_str("{}");
            }
            '}' => in_brace = false,
            _ if in_brace => {}
            _ => out.push(c),
        }
    }
    out
}

fn path_param_required(path: &Path, name: &str) -> bool {
    path.parameters
        .iter()
        .chain(path.operations.iter().flat_map(|op| op.parameters.iter()))
        .any(|p| p.location == ParameterLocation::Path && p.name == name && p.required)
}

fn check_path_templating_and_collision(spec: &OpenApiSpec) -> LoadResult<()> {
    let mut seen_templates: HashMap<String, String> = HashMap::new();

    for (route, path) in &spec.paths {
        let names = template_names(route);
        let mut seen_in_route = HashSet::new();
        for name in &names {
            if !seen_in_route.insert(name.clone()) {
                return Err(LoadError::invalid(format!("duplicate path template name '{{{name}}}' in '{route}'")));
            }
            if !path_param_required(path, name) {
                return Err(LoadError::invalid(format!(
                    "route '{route}' uses template '{{{name}}}' without a required path parameter"
                )));
            }
        }

        let normalized = normalize_template(route);
        if let Some(existing) = seen_templates.get(&normalized) {
            if existing != route {
                return Err(LoadError::invalid(format!(
                    "route '{route}' collides with '{existing}' after template normalization"
                )));
            }
        } else {
            seen_templates.insert(normalized, route.clone());
        }
    }
    Ok(())
}

fn effective_parameters<'a>(path: &'a Path, op: &'a crate::ir::Operation) -> Vec<&'a Parameter> {
    path.parameters.iter().chain(op.parameters.iter()).collect()
}

fn check_querystring_usage_for(params: &[&Parameter]) -> LoadResult<()> {
    let querystring_count = params.iter().filter(|p| p.location == ParameterLocation::Querystring).count();
    let query_count = params.iter().filter(|p| p.location == ParameterLocation::Query).count();
    if querystring_count > 1 {
        return Err(LoadError::invalid("at most one querystring parameter is allowed per operation"));
    }
    if querystring_count > 0 && query_count > 0 {
        return Err(LoadError::invalid("a querystring parameter cannot coexist with query parameters"));
    }
    Ok(())
}

fn check_querystring_usage(spec: &OpenApiSpec) -> LoadResult<()> {
    for (_, path) in spec.paths.iter().chain(spec.webhooks.iter()) {
        for op in path.operations.iter().chain(path.additional_operations.iter()) {
            let params = effective_parameters(path, op);
            check_querystring_usage_for(&params)?;
            for (_, callback_path) in &op.callbacks {
                for callback_op in callback_path.operations.iter() {
                    let callback_params = effective_parameters(callback_path, callback_op);
                    check_querystring_usage_for(&callback_params)?;
                }
            }
        }
    }
    Ok(())
}

/// A [`Parameter`] must set exactly one of `schema`/`content`; `querystring`
/// parameters must use `content` (3/§3 parameter invariant).
fn check_parameter_invariant(p: &Parameter) -> LoadResult<()> {
    let has_schema = p.schema.is_some();
    let has_content = !p.content_media_types.is_empty();
    if has_schema && has_content {
        return Err(LoadError::invalid(format!("parameter '{}' sets both 'schema' and 'content'", p.name)));
    }
    if p.location == ParameterLocation::Querystring && !has_content {
        return Err(LoadError::invalid(format!("querystring parameter '{}' must use 'content', not 'schema'", p.name)));
    }
    Ok(())
}

fn check_parameter_schema_content_invariant(spec: &OpenApiSpec) -> LoadResult<()> {
    for (_, path) in spec.paths.iter().chain(spec.webhooks.iter()) {
        for p in &path.parameters {
            check_parameter_invariant(p)?;
        }
        for op in path.operations.iter().chain(path.additional_operations.iter()) {
            for p in &op.parameters {
                check_parameter_invariant(p)?;
            }
            for (_, callback_path) in &op.callbacks {
                for p in &callback_path.parameters {
                    check_parameter_invariant(p)?;
                }
                for callback_op in &callback_path.operations {
                    for p in &callback_op.parameters {
                        check_parameter_invariant(p)?;
                    }
                }
            }
        }
    }
    for (_, p) in &spec.components.parameters {
        check_parameter_invariant(p)?;
    }
    for (_, p) in &spec.components.headers {
        check_parameter_invariant(p)?;
    }
    Ok(())
}

fn check_tag_parents(spec: &OpenApiSpec) -> LoadResult<()> {
    let defined: HashSet<&str> = spec.tags.iter().map(|t| t.name.as_str()).collect();

    for tag in &spec.tags {
        if let Some(parent) = &tag.parent {
            if !defined.contains(parent.as_str()) {
                return Err(LoadError::invalid(format!("tag '{}' has undefined parent '{}'", tag.name, parent)));
            }
        }
    }

    for tag in &spec.tags {
        let mut visited = HashSet::new();
        let mut current = tag.name.as_str();
        loop {
            if !visited.insert(current) {
                return Err(LoadError::invalid(format!("tag parent cycle detected at '{}'", tag.name)));
            }
            match spec.tags.iter().find(|t| t.name == current).and_then(|t| t.parent.as_deref()) {
                Some(parent) => current = parent,
                None => break,
            }
        }
    }
    Ok(())
}

fn check_server_url_variables(server: &Server) -> LoadResult<()> {
    let names = template_names(&server.url);
    let mut seen = HashSet::new();
    for name in &names {
        if !seen.insert(name.clone()) {
            return Err(LoadError::invalid(format!("server variable '{{{name}}}' used more than once")));
        }
        let var = server
            .variables
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
            .ok_or_else(|| LoadError::invalid(format!("server variable '{{{name}}}' is not defined")))?;
        if !var.enum_values.is_empty() && !var.enum_values.contains(&var.default) {
            return Err(LoadError::invalid(format!("server variable '{name}' default is not within its enum")));
        }
    }
    Ok(())
}

fn check_server_variables(spec: &OpenApiSpec) -> LoadResult<()> {
    for server in &spec.servers {
        check_server_url_variables(server)?;
    }
    for (_, path) in &spec.paths {
        for server in &path.servers {
            check_server_url_variables(server)?;
        }
        for op in &path.operations {
            for server in &op.servers {
                check_server_url_variables(server)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Operation, ServerVariable};

    #[test]
    fn duplicate_operation_ids_rejected() {
        let mut spec = OpenApiSpec::default();
        let mut op1 = Operation::default();
        op1.operation_id = Some("foo".to_string());
        let mut op2 = Operation::default();
        op2.operation_id = Some("foo".to_string());

        let mut p1 = Path::default();
        p1.route = "/a".to_string();
        p1.operations.push(op1);
        let mut p2 = Path::default();
        p2.route = "/b".to_string();
        p2.operations.push(op2);

        spec.paths.push(("/a".to_string(), p1));
        spec.paths.push(("/b".to_string(), p2));

        assert!(check_operation_id_uniqueness(&spec).is_err());
    }

    #[test]
    fn missing_required_path_parameter_rejected() {
        let mut spec = OpenApiSpec::default();
        let mut path = Path::default();
        path.route = "/items/{id}".to_string();
        spec.paths.push(("/items/{id}".to_string(), path));
        assert!(check_path_templating_and_collision(&spec).is_err());
    }

    #[test]
    fn server_variable_default_outside_enum_rejected() {
        let server = Server {
            url: "https://{env}.example.com".to_string(),
            description: None,
            variables: vec![(
                "env".to_string(),
                ServerVariable { default: "prod".to_string(), enum_values: vec!["staging".to_string()], description: None },
            )],
        };
        assert!(check_server_url_variables(&server).is_err());
    }

    fn bare_parameter(name: &str, location: ParameterLocation) -> Parameter {
        Parameter {
            name: name.to_string(),
            location,
            required: false,
            deprecated: false,
            style: None,
            explode: false,
            allow_reserved: false,
            allow_empty_value: false,
            schema: None,
            content_media_types: Vec::new(),
            example: None,
            examples: Vec::new(),
            ref_string: None,
        }
    }

    #[test]
    fn querystring_parameter_without_content_rejected() {
        let p = bare_parameter("filter", ParameterLocation::Querystring);
        assert!(check_parameter_invariant(&p).is_err());
    }

    #[test]
    fn parameter_with_schema_and_content_rejected() {
        let mut p = bare_parameter("filter", ParameterLocation::Query);
        p.schema = Some(crate::ir::SchemaRef::inline("string"));
        p.content_media_types.push(crate::ir::MediaType::new("application/json"));
        assert!(check_parameter_invariant(&p).is_err());
    }

    #[test]
    fn querystring_parameter_with_content_accepted() {
        let mut p = bare_parameter("filter", ParameterLocation::Querystring);
        p.content_media_types.push(crate::ir::MediaType::new("application/json"));
        assert!(check_parameter_invariant(&p).is_ok());
    }

    #[test]
    fn tag_cycle_rejected() {
        let mut spec = OpenApiSpec::default();
        spec.tags.push(crate::ir::Tag { name: "a".to_string(), parent: Some("b".to_string()), ..Default::default() });
        spec.tags.push(crate::ir::Tag { name: "b".to_string(), parent: Some("a".to_string()), ..Default::default() });
        assert!(check_tag_parents(&spec).is_err());
    }
}
