//! Compiler configuration.
//!
//! All configuration is driven by environment variables with conservative
//! defaults that match DynamoDB's documented limits.

use std::env;

/// Default prefix of value placeholders (`:v1`, `:v2`, ...).
pub const DEFAULT_VALUE_PREFIX: &str = ":v";
/// DynamoDB rejects any single expression longer than 4 KB.
pub const DEFAULT_MAX_EXPRESSION_BYTES: usize = 4096;
/// DynamoDB accepts at most 100 operands on the right of `IN`.
pub const DEFAULT_MAX_IN_OPERANDS: usize = 100;

/// Settings shared by every compiler working against one symbol table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Prefix of value placeholders. Must start with `:`.
    pub value_prefix: String,
    /// Upper bound on the byte length of any one compiled expression.
    pub max_expression_bytes: usize,
    /// Upper bound on the number of `IN` operands.
    pub max_in_operands: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            value_prefix: DEFAULT_VALUE_PREFIX.to_owned(),
            max_expression_bytes: DEFAULT_MAX_EXPRESSION_BYTES,
            max_in_operands: DEFAULT_MAX_IN_OPERANDS,
        }
    }
}

impl CompilerConfig {
    /// Load configuration from environment variables.
    ///
    /// Recognized variables are `DYNOEXPR_VALUE_PREFIX`,
    /// `DYNOEXPR_MAX_EXPRESSION_BYTES` and `DYNOEXPR_MAX_IN_OPERANDS`.
    /// Invalid values are logged and the default is kept.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = env::var("DYNOEXPR_VALUE_PREFIX") {
            if is_valid_value_prefix(&v) {
                config.value_prefix = v;
            } else {
                tracing::warn!(value = %v, "ignoring DYNOEXPR_VALUE_PREFIX, must be ':' followed by [A-Za-z0-9_]");
            }
        }
        if let Some(n) = env_usize("DYNOEXPR_MAX_EXPRESSION_BYTES") {
            config.max_expression_bytes = n;
        }
        if let Some(n) = env_usize("DYNOEXPR_MAX_IN_OPERANDS") {
            config.max_in_operands = n;
        }

        config
    }
}

fn is_valid_value_prefix(prefix: &str) -> bool {
    prefix
        .strip_prefix(':')
        .is_some_and(|rest| rest.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'))
}

fn env_usize(key: &str) -> Option<usize> {
    let raw = env::var(key).ok()?;
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            tracing::warn!(key, value = %raw, "ignoring invalid positive integer");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_create_default_config() {
        let config = CompilerConfig::default();
        assert_eq!(config.value_prefix, ":v");
        assert_eq!(config.max_expression_bytes, 4096);
        assert_eq!(config.max_in_operands, 100);
    }

    #[test]
    fn test_should_validate_value_prefix() {
        assert!(is_valid_value_prefix(":v"));
        assert!(is_valid_value_prefix(":val_"));
        assert!(is_valid_value_prefix(":"));
        assert!(!is_valid_value_prefix("v"));
        assert!(!is_valid_value_prefix(":v-"));
    }
}
