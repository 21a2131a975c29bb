use core_config::{FromEnv, env_or_default, server::ServerConfig};
use domain_accounts::SessionConfig;

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: Environment,
    pub server: ServerConfig,
    pub session: SessionConfig,
    /// Mount point for the accounts routes, e.g. `/api/v1`
    pub api_prefix: String,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?; // Uses defaults: HOST=0.0.0.0, PORT=8080
        let session = SessionConfig::from_env()?; // JWT_SECRET is required

        let api_prefix = env_or_default("API_PREFIX", "/api/v1");
        if !api_prefix.starts_with('/') || api_prefix.len() < 2 {
            eyre::bail!("API_PREFIX must start with '/' and name a path, got {api_prefix:?}");
        }

        Ok(Self {
            environment,
            server,
            session,
            api_prefix,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "config-test-secret-that-is-32-chars-long";

    #[test]
    fn test_config_defaults() {
        temp_env::with_vars(
            [
                ("JWT_SECRET", Some(SECRET)),
                ("APP_ENV", None),
                ("PORT", None),
                ("API_PREFIX", None),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert!(config.environment.is_development());
                assert_eq!(config.server.port, 8080);
                assert_eq!(config.api_prefix, "/api/v1");
            },
        );
    }

    #[test]
    fn test_config_requires_jwt_secret() {
        temp_env::with_var_unset("JWT_SECRET", || {
            assert!(Config::from_env().is_err());
        });
    }

    #[test]
    fn test_config_rejects_bad_prefix() {
        temp_env::with_vars(
            [("JWT_SECRET", Some(SECRET)), ("API_PREFIX", Some("api"))],
            || {
                assert!(Config::from_env().is_err());
            },
        );
    }
}
