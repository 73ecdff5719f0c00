use std::collections::HashMap;
use std::env;

/// Expand `${VAR_NAME}` references in a header value. Unset variables are
/// left as-is so the eventual 401 points at the right name.
pub fn expand_header_value(value: &str) -> String {
    let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();
    let mut result = value.to_string();

    for cap in re.captures_iter(value) {
        let var_name = &cap[1];
        if let Ok(replacement) = env::var(var_name) {
            result = result.replace(&cap[0], &replacement);
        }
    }

    result
}

/// Expand `${VAR}` references in every header value of a map.
pub fn expand_headers(headers: &HashMap<String, String>) -> HashMap<String, String> {
    headers
        .iter()
        .map(|(key, value)| (key.clone(), expand_header_value(value)))
        .collect()
}
