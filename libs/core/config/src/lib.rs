//! Shared configuration helpers
//!
//! Every binary and domain crate in the workspace loads its settings from
//! environment variables through the helpers in this crate, so missing or
//! malformed values surface as a [`ConfigError`] naming the offending key.

pub mod tracing;

use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable '{0}' is required but not set")]
    MissingEnvVar(String),

    #[error("Failed to parse environment variable '{key}': {details}")]
    ParseError { key: String, details: String },
}

/// Application environment, decides the log format
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn from_env() -> Self {
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        if app_env.eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

/// Trait for configuration that can be loaded from environment variables
pub trait FromEnv: Sized {
    fn from_env() -> Result<Self, ConfigError>;
}

/// Load an environment variable, falling back to `default` when unset
pub fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Load an environment variable or return [`ConfigError::MissingEnvVar`]
///
/// Empty values count as missing.
pub fn env_required(key: &str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnvVar(key.to_string())),
    }
}

/// Load an optional environment variable; empty values are treated as unset
pub fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse an environment variable into `T`, falling back to `default` when unset
pub fn env_parse_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_optional(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::ParseError {
            key: key.to_string(),
            details: e.to_string(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_defaults_to_development() {
        temp_env::with_var_unset("APP_ENV", || {
            let env = Environment::from_env();
            assert_eq!(env, Environment::Development);
            assert!(env.is_development());
            assert!(!env.is_production());
        });
    }

    #[test]
    fn test_environment_production_case_insensitive() {
        temp_env::with_var("APP_ENV", Some("PRODUCTION"), || {
            assert_eq!(Environment::from_env(), Environment::Production);
        });

        temp_env::with_var("APP_ENV", Some("staging"), || {
            assert_eq!(Environment::from_env(), Environment::Development);
        });
    }

    #[test]
    fn test_env_or_default() {
        temp_env::with_var("LYRICS_TEST_VAR", Some("test_value"), || {
            assert_eq!(env_or_default("LYRICS_TEST_VAR", "default"), "test_value");
        });
        temp_env::with_var_unset("LYRICS_MISSING_VAR", || {
            assert_eq!(env_or_default("LYRICS_MISSING_VAR", "default"), "default");
        });
    }

    #[test]
    fn test_env_required_missing() {
        temp_env::with_var_unset("LYRICS_MISSING_REQUIRED", || {
            let err = env_required("LYRICS_MISSING_REQUIRED").unwrap_err();
            assert!(err.to_string().contains("LYRICS_MISSING_REQUIRED"));
            assert!(err.to_string().contains("required"));
        });
    }

    #[test]
    fn test_env_required_rejects_blank_value() {
        temp_env::with_var("LYRICS_BLANK", Some("   "), || {
            assert!(matches!(
                env_required("LYRICS_BLANK"),
                Err(ConfigError::MissingEnvVar(_))
            ));
        });
    }

    #[test]
    fn test_env_parse_or_default() {
        temp_env::with_var("LYRICS_TIMEOUT", Some("45"), || {
            assert_eq!(env_parse_or_default("LYRICS_TIMEOUT", 30u64).unwrap(), 45);
        });
        temp_env::with_var_unset("LYRICS_TIMEOUT", || {
            assert_eq!(env_parse_or_default("LYRICS_TIMEOUT", 30u64).unwrap(), 30);
        });
        temp_env::with_var("LYRICS_TIMEOUT", Some("soon"), || {
            let err = env_parse_or_default("LYRICS_TIMEOUT", 30u64).unwrap_err();
            assert!(
                matches!(err, ConfigError::ParseError { ref key, .. } if key == "LYRICS_TIMEOUT")
            );
        });
    }
}
