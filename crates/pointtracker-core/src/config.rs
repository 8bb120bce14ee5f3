use crate::app_config::{AppConfig, Environment, MAX_SCRAPER_CONCURRENCY};
use crate::ConfigError;

const DEFAULT_USER_AGENT: &str = "PointTracker/1.0 (Personal points tracker; respectful crawler)";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a plain
/// `HashMap` lookup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            other => Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("expected a boolean, got '{other}'"),
            }),
        }
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("POINTTRACKER_ENV", "development"))?;
    let log_level = or_default("POINTTRACKER_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("POINTTRACKER_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("POINTTRACKER_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("POINTTRACKER_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let scraper_base_url = or_default("POINTTRACKER_SCRAPER_BASE_URL", "https://milesopedia.com");
    let scraper_sitemap_path = or_default("POINTTRACKER_SCRAPER_SITEMAP_PATH", "/card-sitemap.xml");
    let scraper_user_agent = or_default("POINTTRACKER_SCRAPER_USER_AGENT", DEFAULT_USER_AGENT);
    let scraper_request_timeout_secs =
        parse_u64("POINTTRACKER_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_rate_limit_ms = parse_u64("POINTTRACKER_SCRAPER_RATE_LIMIT_MS", "3000")?;
    let scraper_concurrency = parse_usize("POINTTRACKER_SCRAPER_CONCURRENCY", "20")?
        .clamp(1, MAX_SCRAPER_CONCURRENCY);
    let scraper_max_attempts = parse_u32("POINTTRACKER_SCRAPER_MAX_ATTEMPTS", "3")?.max(1);
    let scraper_retry_backoff_ms = parse_u64("POINTTRACKER_SCRAPER_RETRY_BACKOFF_MS", "3000")?;
    let scraper_headless = parse_bool("POINTTRACKER_SCRAPER_HEADLESS", "false")?;
    let scraper_render_timeout_ms = parse_u64("POINTTRACKER_SCRAPER_RENDER_TIMEOUT_MS", "15000")?;

    let anthropic_api_key = lookup("ANTHROPIC_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty());
    let anthropic_model = or_default("ANTHROPIC_MODEL", "claude-3-5-haiku-20241022");
    let anthropic_base_url = or_default("ANTHROPIC_BASE_URL", "https://api.anthropic.com");

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        scraper_base_url,
        scraper_sitemap_path,
        scraper_user_agent,
        scraper_request_timeout_secs,
        scraper_rate_limit_ms,
        scraper_concurrency,
        scraper_max_attempts,
        scraper_retry_backoff_ms,
        scraper_headless,
        scraper_render_timeout_ms,
        anthropic_api_key,
        anthropic_model,
        anthropic_base_url,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "POINTTRACKER_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
