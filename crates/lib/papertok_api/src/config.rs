//! API server configuration.

use std::str::FromStr;
use std::time::Duration;

use papertok_core::arxiv::ArxivConfig;
use papertok_core::auth::{AuthError, TokenConfig};
use thiserror::Error;

/// Configuration errors. Reported at startup, never as a panic.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid auth settings: {0}")]
    Auth(#[from] AuthError),
}

/// Per-client request throttling.
#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    pub enabled: bool,
    /// Sustained requests per minute.
    pub requests_per_minute: u32,
    pub burst: u32,
    /// One bucket per client IP instead of one shared bucket.
    pub per_ip: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_minute: 60,
            burst: 10,
            per_ip: true,
        }
    }
}

/// Configuration for the API server.
#[derive(Clone)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8080").
    pub bind_addr: String,
    /// PostgreSQL connection URL. Users are kept in memory when unset.
    pub database_url: Option<String>,
    /// JWT signing secret.
    pub jwt_secret: String,
    pub jwt_expires_in: Duration,
    pub jwt_refresh_expires_in: Duration,
    pub arxiv_base_url: String,
    pub arxiv_timeout: Duration,
    pub cache_enabled: bool,
    pub cache_ttl: Duration,
    pub cache_sweep_interval: Duration,
    /// Allowed CORS origins; `*` allows any.
    pub cors_allowed_origins: Vec<String>,
    pub rate_limit: RateLimitConfig,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("jwt_secret", &"<redacted>")
            .field("jwt_expires_in", &self.jwt_expires_in)
            .field("arxiv_base_url", &self.arxiv_base_url)
            .field("cache_enabled", &self.cache_enabled)
            .field("cache_ttl", &self.cache_ttl)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("rate_limit", &self.rate_limit)
            .finish_non_exhaustive()
    }
}

impl ApiConfig {
    /// Config with defaults for everything except the signing secret.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".into(),
            database_url: None,
            jwt_secret: jwt_secret.into(),
            jwt_expires_in: Duration::from_secs(86_400),
            jwt_refresh_expires_in: Duration::from_secs(604_800),
            arxiv_base_url: papertok_core::arxiv::client::DEFAULT_BASE_URL.into(),
            arxiv_timeout: papertok_core::arxiv::client::DEFAULT_TIMEOUT,
            cache_enabled: true,
            cache_ttl: Duration::from_secs(300),
            cache_sweep_interval: papertok_core::cache::DEFAULT_SWEEP_INTERVAL,
            cors_allowed_origins: vec![
                "http://localhost:5173".into(),
                "http://localhost:3000".into(),
            ],
            rate_limit: RateLimitConfig::default(),
        }
    }

    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                      | Default                                       |
    /// |-------------------------------|-----------------------------------------------|
    /// | `BIND_ADDR`                   | `127.0.0.1:8080`                              |
    /// | `DATABASE_URL`                | unset (in-memory users)                       |
    /// | `JWT_SECRET`                  | required                                      |
    /// | `JWT_EXPIRES_IN_SECS`         | `86400`                                       |
    /// | `JWT_REFRESH_EXPIRES_IN_SECS` | `604800`                                      |
    /// | `ARXIV_BASE_URL`              | `http://export.arxiv.org/api/query`           |
    /// | `ARXIV_TIMEOUT_SECS`          | `10`                                          |
    /// | `CACHE_ENABLED`               | `true`                                        |
    /// | `CACHE_TTL_SECS`              | `300`                                         |
    /// | `CACHE_SWEEP_INTERVAL_SECS`   | `60`                                          |
    /// | `CORS_ALLOWED_ORIGINS`        | `http://localhost:5173,http://localhost:3000` |
    /// | `RATE_LIMIT_ENABLED`          | `true`                                        |
    /// | `RATE_LIMIT_REQUESTS`         | `60` per minute                               |
    /// | `RATE_LIMIT_BURST`            | `10`                                          |
    /// | `RATE_LIMIT_PER_IP`           | `true`                                        |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let mut config = Self::new(secret);

        if let Some(addr) = lookup("BIND_ADDR") {
            config.bind_addr = addr;
        }
        config.database_url = lookup("DATABASE_URL").filter(|s| !s.is_empty());
        config.jwt_expires_in = secs(&lookup, "JWT_EXPIRES_IN_SECS", config.jwt_expires_in)?;
        config.jwt_refresh_expires_in = secs(
            &lookup,
            "JWT_REFRESH_EXPIRES_IN_SECS",
            config.jwt_refresh_expires_in,
        )?;
        if let Some(url) = lookup("ARXIV_BASE_URL") {
            config.arxiv_base_url = url;
        }
        config.arxiv_timeout = secs(&lookup, "ARXIV_TIMEOUT_SECS", config.arxiv_timeout)?;
        config.cache_enabled = parsed(&lookup, "CACHE_ENABLED", config.cache_enabled, parse_bool)?;
        config.cache_ttl = secs(&lookup, "CACHE_TTL_SECS", config.cache_ttl)?;
        config.cache_sweep_interval = secs(
            &lookup,
            "CACHE_SWEEP_INTERVAL_SECS",
            config.cache_sweep_interval,
        )?;
        if let Some(origins) = lookup("CORS_ALLOWED_ORIGINS") {
            config.cors_allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }

        let rl = &mut config.rate_limit;
        rl.enabled = parsed(&lookup, "RATE_LIMIT_ENABLED", rl.enabled, parse_bool)?;
        rl.requests_per_minute = parsed(
            &lookup,
            "RATE_LIMIT_REQUESTS",
            rl.requests_per_minute,
            parse_positive,
        )?;
        rl.burst = parsed(&lookup, "RATE_LIMIT_BURST", rl.burst, parse_positive)?;
        rl.per_ip = parsed(&lookup, "RATE_LIMIT_PER_IP", rl.per_ip, parse_bool)?;

        if config.cache_sweep_interval.is_zero() {
            return Err(ConfigError::Invalid {
                name: "CACHE_SWEEP_INTERVAL_SECS",
                value: "0".into(),
                reason: "must be positive".into(),
            });
        }

        config.token_config()?.validate()?;
        config.cache_ttl()?;
        Ok(config)
    }

    /// Token policy derived from the JWT settings.
    pub fn token_config(&self) -> Result<TokenConfig, ConfigError> {
        Ok(TokenConfig::new(self.jwt_secret.clone())
            .with_access_token_expiry(chrono_duration("JWT_EXPIRES_IN_SECS", self.jwt_expires_in)?)
            .with_refresh_token_expiry(chrono_duration(
                "JWT_REFRESH_EXPIRES_IN_SECS",
                self.jwt_refresh_expires_in,
            )?))
    }

    pub fn arxiv_config(&self) -> ArxivConfig {
        ArxivConfig {
            base_url: self.arxiv_base_url.clone(),
            timeout: self.arxiv_timeout,
        }
    }

    /// Cache entry lifetime as a signed duration.
    pub fn cache_ttl(&self) -> Result<chrono::Duration, ConfigError> {
        chrono_duration("CACHE_TTL_SECS", self.cache_ttl)
    }
}

fn chrono_duration(name: &'static str, d: Duration) -> Result<chrono::Duration, ConfigError> {
    chrono::Duration::from_std(d).map_err(|e| ConfigError::Invalid {
        name,
        value: format!("{}", d.as_secs()),
        reason: e.to_string(),
    })
}

fn parsed<F, T>(
    lookup: &F,
    name: &'static str,
    default: T,
    parse: fn(&str) -> Result<T, String>,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => parse(value.trim()).map_err(|reason| ConfigError::Invalid {
            name,
            value,
            reason,
        }),
    }
}

fn secs<F>(lookup: &F, name: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    parsed(lookup, name, default, |s| {
        u64::from_str(s)
            .map(Duration::from_secs)
            .map_err(|e| e.to_string())
    })
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err("expected true or false".into()),
    }
}

fn parse_positive(s: &str) -> Result<u32, String> {
    match u32::from_str(s) {
        Ok(0) => Err("must be positive".into()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}
