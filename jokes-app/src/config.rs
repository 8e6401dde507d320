use crate::application::{DEFAULT_CACHE_TTL, DEFAULT_RECENT_WINDOW};
use crate::infrastructure::security::DEFAULT_MAX_JOKE_LENGTH;
use jokes_errors::AppError;
use std::{env, fmt::Display, str::FromStr, time::Duration};

use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Postgres connection string; the in-memory store is used when unset.
    pub database_url: Option<String>,
    pub cache_ttl: Duration,
    pub recent_window: usize,
    pub max_joke_len: usize,
    pub seed_defaults: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            cache_ttl: DEFAULT_CACHE_TTL,
            recent_window: DEFAULT_RECENT_WINDOW,
            max_joke_len: DEFAULT_MAX_JOKE_LENGTH,
            seed_defaults: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();
        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            cache_ttl: Duration::from_secs(try_load(
                &lookup,
                "JOKE_CACHE_TTL_SECS",
                defaults.cache_ttl.as_secs(),
            )?),
            recent_window: try_load(&lookup, "JOKE_RECENT_WINDOW", defaults.recent_window)?,
            max_joke_len: try_load(&lookup, "JOKE_MAX_LEN", defaults.max_joke_len)?,
            seed_defaults: try_load(&lookup, "JOKE_SEED_DEFAULTS", defaults.seed_defaults)?,
        })
    }
}

fn try_load<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, AppError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e| {
            warn!("Invalid {key} value: {e}");
            AppError::Config(format!("{key}={raw:?}: {e}"))
        }),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.cache_ttl, Duration::from_secs(30));
        assert_eq!(config.recent_window, 3);
        assert_eq!(config.max_joke_len, 500);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/jokes"),
            ("JOKE_CACHE_TTL_SECS", "5"),
            ("JOKE_RECENT_WINDOW", " 0 "),
            ("JOKE_SEED_DEFAULTS", "false"),
        ]))
        .unwrap();
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/jokes")
        );
        assert_eq!(config.cache_ttl, Duration::from_secs(5));
        assert_eq!(config.recent_window, 0);
        assert!(!config.seed_defaults);
    }

    #[test]
    fn test_blank_database_url_means_memory() {
        let config = Config::from_lookup(lookup(&[("DATABASE_URL", "  ")])).unwrap();
        assert_eq!(config.database_url, None);
    }

    #[test]
    fn test_malformed_value_is_an_error() {
        let err = Config::from_lookup(lookup(&[("JOKE_MAX_LEN", "lots")])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
