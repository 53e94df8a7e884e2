use crate::catalog::CatalogSource;
use crate::errors::ConfigError;
use chrono::Duration;
use std::{collections::HashMap, env, fmt::Display, path::PathBuf, str::FromStr};
use tracing::info;
use url::Url;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/votes.json";
const DEFAULT_CACHE_SECS: u64 = 60;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:8080";

/// Startup configuration, read once and shared through the app state.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub catalog_source: CatalogSource,
    pub catalog_cache_ttl: Duration,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(env::vars().collect())
    }

    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            vars.get(key)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
        };

        let catalog_source = match (get("CATALOG_SOURCE_URL"), get("CATALOG_PATH")) {
            (Some(url), _) => CatalogSource::Remote(Url::parse(url).map_err(|err| {
                ConfigError::Invalid {
                    key: "CATALOG_SOURCE_URL",
                    reason: err.to_string(),
                }
            })?),
            (None, Some(path)) => CatalogSource::File(PathBuf::from(path)),
            (None, None) => {
                info!("no catalog source configured, serving the built-in catalog");
                CatalogSource::Builtin
            }
        };

        let cors_origins = get("CORS_ORIGINS")
            .unwrap_or(DEFAULT_CORS_ORIGIN)
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            port: parse_or("PORT", get("PORT"), DEFAULT_PORT)?,
            data_path: get("APP_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH)),
            catalog_source,
            catalog_cache_ttl: cache_ttl(parse_or(
                "CATALOG_CACHE_SECS",
                get("CATALOG_CACHE_SECS"),
                DEFAULT_CACHE_SECS,
            )?)?,
            cors_origins,
        })
    }
}

fn cache_ttl(secs: u64) -> Result<Duration, ConfigError> {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or_else(|| ConfigError::Invalid {
            key: "CATALOG_CACHE_SECS",
            reason: format!("{secs} seconds is out of range"),
        })
}

fn parse_or<T: FromStr>(key: &'static str, value: Option<&str>, default: T) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    match value {
        Some(raw) => raw.parse().map_err(|err: T::Err| ConfigError::Invalid {
            key,
            reason: err.to_string(),
        }),
        None => Ok(default),
    }
}
