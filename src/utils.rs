use std::env::VarError;
use std::env::var;

/// Get the value of ENV var, or a default
///
/// Only when:
/// - It is set
/// - It is not blank
pub fn env_var_or_else<F>(var_name: &str, or_else: F) -> String
where
    F: FnOnce() -> String,
{
    configured(var(var_name)).unwrap_or_else(or_else)
}

/// A configured value, blank values count as not configured
fn configured(value: Result<String, VarError>) -> Option<String> {
    value.ok().filter(|value| !value.trim().is_empty())
}
