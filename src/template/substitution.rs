//! Variable substitution engine for templates

use std::collections::HashMap;

/// Substitute `{{variable}}` placeholders in a template string.
///
/// A placeholder with no matching variable renders as an empty string.
/// An unterminated `{{` is copied through verbatim.
pub fn substitute(template: &str, variables: &HashMap<String, String>) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = after[..end].trim();
                if let Some(value) = variables.get(key) {
                    result.push_str(value);
                }
                rest = &after[end + 2..];
            }
            None => {
                result.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    result.push_str(rest);
    result
}

/// Merge caller-supplied template variables with request metadata.
///
/// Metadata wins on key collision.
pub fn merge_variables(
    template_vars: &HashMap<String, String>,
    metadata: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut merged = template_vars.clone();
    for (key, value) in metadata {
        merged.insert(key.clone(), value.clone());
    }
    merged
}
