use std::env::var;

/// Get the value of ENV var
///
/// Only when:
/// - It is set
/// - It is not empty
pub fn env_var(var_name: &'static str) -> Option<String> {
    var(var_name).ok().filter(|value| !value.is_empty())
}

/// Get the value of ENV var, or a default
///
/// The default is used when the var is not set or empty
pub fn env_var_or_else(var_name: &'static str, or_else: fn() -> String) -> String {
    env_var(var_name).unwrap_or_else(or_else)
}

/// Parse a boolean-ish value: `true`/`false`, `1`/`0`, `yes`/`no`, `on`/`off`
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert_eq!(Some(true), parse_flag("TRUE"));
        assert_eq!(Some(true), parse_flag(" 1 "));
        assert_eq!(Some(false), parse_flag("no"));
        assert_eq!(Some(false), parse_flag("off"));
        assert_eq!(None, parse_flag("maybe"));
    }
}
