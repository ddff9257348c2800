//! Configuration Module
//!
//! Loads cache configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{TtlTier, DEFAULT_TTL};

/// Prefix applied to every durable-tier key owned by the cache.
pub const DEFAULT_KEY_PREFIX: &str = "cache_";

// == Environment ==
/// Deployment profile; selects the default TTL when none is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Staging,
    Production,
}

impl Environment {
    /// Default TTL for this profile.
    pub fn default_ttl(self) -> Duration {
        match self {
            Environment::Development | Environment::Test => TtlTier::Short.duration(),
            Environment::Staging | Environment::Production => DEFAULT_TTL,
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "staging" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment: {other}")),
        }
    }
}

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Deployment profile
    pub environment: Environment,
    /// TTL for writes that do not name one
    pub default_ttl: Duration,
    /// Whether writes are mirrored into the durable tier
    pub persist: bool,
    /// Directory for the file-backed tier; platform cache dir when None
    pub cache_dir: Option<PathBuf>,
    /// Namespace prefix for durable keys
    pub key_prefix: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PITWALL_ENV` - development, test, staging or production (default: production)
    /// - `PITWALL_CACHE_TTL_MS` - Default TTL in milliseconds (default: from PITWALL_ENV)
    /// - `PITWALL_CACHE_PERSIST` - Mirror writes to disk (default: true)
    /// - `PITWALL_CACHE_DIR` - Durable tier directory (default: platform cache dir)
    /// - `PITWALL_CACHE_PREFIX` - Durable key prefix (default: cache_)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`Config::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("PITWALL_ENV")
            .and_then(|v| v.parse().ok())
            .unwrap_or(Environment::Production);

        // Explicit TTL wins over the environment profile
        let default_ttl = lookup("PITWALL_CACHE_TTL_MS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or_else(|| environment.default_ttl());

        Self {
            environment,
            default_ttl,
            persist: lookup("PITWALL_CACHE_PERSIST")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(true),
            cache_dir: lookup("PITWALL_CACHE_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            key_prefix: lookup("PITWALL_CACHE_PREFIX")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_KEY_PREFIX.to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: Environment::Production,
            default_ttl: DEFAULT_TTL,
            persist: true,
            cache_dir: None,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.default_ttl, Duration::from_secs(300));
        assert!(config.persist);
        assert!(config.cache_dir.is_none());
        assert_eq!(config.key_prefix, "cache_");
    }

    #[test]
    fn test_config_from_empty_lookup_matches_default() {
        let config = Config::from_lookup(|_| None);
        let default = Config::default();
        assert_eq!(config.environment, default.environment);
        assert_eq!(config.default_ttl, default.default_ttl);
        assert_eq!(config.persist, default.persist);
        assert_eq!(config.key_prefix, default.key_prefix);
    }

    #[test]
    fn test_environment_selects_default_ttl() {
        let config = Config::from_lookup(lookup_from(&[("PITWALL_ENV", "development")]));
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.default_ttl, TtlTier::Short.duration());
    }

    #[test]
    fn test_explicit_ttl_overrides_environment() {
        let config = Config::from_lookup(lookup_from(&[
            ("PITWALL_ENV", "dev"),
            ("PITWALL_CACHE_TTL_MS", "1500"),
        ]));
        assert_eq!(config.default_ttl, Duration::from_millis(1500));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = Config::from_lookup(lookup_from(&[
            ("PITWALL_ENV", "moon"),
            ("PITWALL_CACHE_TTL_MS", "soon"),
            ("PITWALL_CACHE_PERSIST", "maybe"),
            ("PITWALL_CACHE_PREFIX", ""),
        ]));
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.default_ttl, DEFAULT_TTL);
        assert!(config.persist);
        assert_eq!(config.key_prefix, DEFAULT_KEY_PREFIX);
    }

    #[test]
    fn test_persistence_and_paths() {
        let config = Config::from_lookup(lookup_from(&[
            ("PITWALL_CACHE_PERSIST", "off"),
            ("PITWALL_CACHE_DIR", "/tmp/pitwall"),
            ("PITWALL_CACHE_PREFIX", "f1_"),
        ]));
        assert!(!config.persist);
        assert_eq!(config.cache_dir, Some(PathBuf::from("/tmp/pitwall")));
        assert_eq!(config.key_prefix, "f1_");
    }
}
