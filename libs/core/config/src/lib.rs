//! Environment-driven configuration shared by every binary in the workspace.
//!
//! Each config struct implements [`FromEnv`]; apps compose them into their
//! own `Config`. A variable that is set to the empty string counts as unset.

pub mod server;
pub mod tracing;

use std::env;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable '{0}' is required but not set")]
    MissingEnvVar(String),

    #[error("Invalid value for environment variable '{key}': {details}")]
    ParseError { key: String, details: String },
}

impl ConfigError {
    pub fn invalid(key: &str, details: impl Into<String>) -> Self {
        Self::ParseError {
            key: key.to_string(),
            details: details.into(),
        }
    }
}

/// Deployment flavor, read from `APP_ENV`. Anything other than
/// `production` (any case) is development.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn from_env() -> Self {
        var("APP_ENV")
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default()
    }

    pub fn is_production(&self) -> bool {
        *self == Environment::Production
    }

    pub fn is_development(&self) -> bool {
        *self == Environment::Development
    }
}

impl FromStr for Environment {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s.trim().eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        })
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Environment::Development => "development",
            Environment::Production => "production",
        })
    }
}

/// Configuration that can be loaded from environment variables
pub trait FromEnv: Sized {
    fn from_env() -> Result<Self, ConfigError>;
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}

/// Value of `key`, or `default` when unset
pub fn env_or_default(key: &str, default: &str) -> String {
    var(key).unwrap_or_else(|| default.to_string())
}

/// Value of `key`, or [`ConfigError::MissingEnvVar`]
pub fn env_required(key: &str) -> Result<String, ConfigError> {
    var(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Parse `key` into `T`, falling back to `default` when unset.
///
/// A value that is set but does not parse is an error, not a silent fallback.
pub fn env_parse_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match var(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e: T::Err| ConfigError::invalid(key, format!("{raw:?}: {e}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parsing() {
        let cases = [
            (None, Environment::Development),
            (Some("production"), Environment::Production),
            (Some("PRODUCTION"), Environment::Production),
            (Some(" Production "), Environment::Production),
            (Some("staging"), Environment::Development),
            (Some(""), Environment::Development),
        ];

        for (raw, expected) in cases {
            temp_env::with_var("APP_ENV", raw, || {
                assert_eq!(Environment::from_env(), expected, "APP_ENV={raw:?}");
            });
        }
    }

    #[test]
    fn test_environment_display() {
        assert_eq!(Environment::Production.to_string(), "production");
        assert!(Environment::default().is_development());
    }

    #[test]
    fn test_empty_value_counts_as_unset() {
        temp_env::with_var("ACCOUNTS_TEST_VAR", Some(""), || {
            assert_eq!(env_or_default("ACCOUNTS_TEST_VAR", "fallback"), "fallback");
            assert!(matches!(
                env_required("ACCOUNTS_TEST_VAR"),
                Err(ConfigError::MissingEnvVar(_))
            ));
        });
    }

    #[test]
    fn test_env_required_reports_key() {
        temp_env::with_var_unset("ACCOUNTS_TEST_VAR", || {
            let err = env_required("ACCOUNTS_TEST_VAR").unwrap_err();
            assert!(err.to_string().contains("ACCOUNTS_TEST_VAR"));
        });

        temp_env::with_var("ACCOUNTS_TEST_VAR", Some("set"), || {
            assert_eq!(env_required("ACCOUNTS_TEST_VAR").unwrap(), "set");
        });
    }

    #[test]
    fn test_env_parse_or_default() {
        temp_env::with_var_unset("TTL_SECONDS", || {
            assert_eq!(env_parse_or_default("TTL_SECONDS", 42i64).unwrap(), 42);
        });

        temp_env::with_var("TTL_SECONDS", Some("3600"), || {
            assert_eq!(env_parse_or_default("TTL_SECONDS", 42i64).unwrap(), 3600);
        });

        temp_env::with_var("TTL_SECONDS", Some("a week"), || {
            let err = env_parse_or_default::<i64>("TTL_SECONDS", 42).unwrap_err();
            assert!(err.to_string().contains("TTL_SECONDS"));
            assert!(err.to_string().contains("a week"));
        });
    }
}
