use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    pub max_open_conns: u32,
    pub min_idle_conns: u32,
    pub max_idle_time: Duration,
    pub query_timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub env: String,
    pub db: DbConfig,
    pub token_ttl: Duration,
    pub cors_trusted_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let db = DbConfig {
            max_open_conns: env_parse("DB_MAX_OPEN_CONNS", 25),
            min_idle_conns: env_parse("DB_MIN_IDLE_CONNS", 0),
            max_idle_time: parse_duration(
                &std::env::var("DB_MAX_IDLE_TIME").unwrap_or_else(|_| "15m".into()),
            )
            .context("DB_MAX_IDLE_TIME")?,
            query_timeout: Duration::from_secs(env_parse("DB_QUERY_TIMEOUT_SECS", 3)),
        };

        Ok(Self {
            database_url,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_parse("APP_PORT", 4000),
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
            db,
            token_ttl: token_ttl_from_hours(env_parse("TOKEN_TTL_HOURS", 24))?,
            cors_trusted_origins: split_origins(
                &std::env::var("CORS_TRUSTED_ORIGINS").unwrap_or_default(),
            ),
        })
    }
}

/// Upper bound on token lifetime: one year.
const MAX_TOKEN_TTL_HOURS: u64 = 365 * 24;

fn token_ttl_from_hours(hours: u64) -> anyhow::Result<Duration> {
    if hours == 0 || hours > MAX_TOKEN_TTL_HOURS {
        anyhow::bail!("TOKEN_TTL_HOURS must be between 1 and {MAX_TOKEN_TTL_HOURS}, got {hours}");
    }
    let secs = hours
        .checked_mul(60 * 60)
        .context("TOKEN_TTL_HOURS overflows")?;
    Ok(Duration::from_secs(secs))
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

/// Parses `90s`, `15m`, `2h` or a bare number of seconds.
pub(crate) fn parse_duration(raw: &str) -> anyhow::Result<Duration> {
    let raw = raw.trim();
    let (digits, unit) = match raw.char_indices().find(|(_, c)| !c.is_ascii_digit()) {
        Some((i, _)) => raw.split_at(i),
        None => (raw, "s"),
    };
    let n: u64 = digits
        .parse()
        .with_context(|| format!("invalid duration `{raw}`"))?;
    let secs = match unit {
        "s" => n,
        "m" => n * 60,
        "h" => n * 60 * 60,
        other => anyhow::bail!("unknown duration unit `{other}`"),
    };
    Ok(Duration::from_secs(secs))
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}
