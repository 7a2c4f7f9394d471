//! Environment variable expansion for settings values
//!
//! Handles `${VAR}` and `${VAR:-default}`. Variables are looked up in the
//! supplied map first and the process environment second.

use crate::{ConfigError, Result};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("variable pattern is valid"));

/// Resolve environment variables in a string
pub fn resolve_env_vars(input: &str, env_vars: &HashMap<String, String>) -> Result<String> {
    let mut result = String::with_capacity(input.len());
    let mut last = 0;
    let mut missing = Vec::new();

    for cap in VAR_PATTERN.captures_iter(input) {
        let Some(full_match) = cap.get(0) else {
            continue;
        };
        let var_expr = &cap[1];

        let (var_name, default_value) = match var_expr.find(":-") {
            Some(pos) => (&var_expr[..pos], Some(&var_expr[pos + 2..])),
            None => (var_expr, None),
        };

        result.push_str(&input[last..full_match.start()]);
        last = full_match.end();

        if let Some(value) = env_vars.get(var_name) {
            result.push_str(value);
        } else if let Ok(value) = std::env::var(var_name) {
            result.push_str(&value);
        } else if let Some(default) = default_value {
            result.push_str(default);
        } else {
            missing.push(var_name.to_string());
        }
    }

    if !missing.is_empty() {
        return Err(ConfigError::EnvVarNotFound(missing.join(", ")));
    }

    result.push_str(&input[last..]);
    Ok(result)
}
