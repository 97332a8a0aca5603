// src/config.rs

use std::env;
use std::str::FromStr;

use dotenvy::dotenv;

use crate::error::ConfigError;

/// Hours a submission locks out a retake.
pub const DEFAULT_LOCK_WINDOW_HOURS: i64 = 24;

/// Longest accepted lock window (one year).
pub const MAX_LOCK_WINDOW_HOURS: i64 = 24 * 366;

/// Seconds between sweeps of expired submissions.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 600;

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. `None` runs on the in-memory store.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,
    /// Path or http(s) URL of the question sheet.
    pub questions_source: String,
    pub quiz_id: String,
    pub lock_window_hours: i64,
    pub sweep_interval_secs: u64,
    pub static_dir: String,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database_url = lookup("DATABASE_URL").filter(|v| !v.is_empty());

        let jwt_secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let lock_window_hours = parse_var(&lookup, "LOCK_WINDOW_HOURS", DEFAULT_LOCK_WINDOW_HOURS)?;
        if !(1..=MAX_LOCK_WINDOW_HOURS).contains(&lock_window_hours) {
            return Err(ConfigError::Invalid {
                key: "LOCK_WINDOW_HOURS",
                value: lock_window_hours.to_string(),
            });
        }

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration: parse_var(&lookup, "JWT_EXPIRATION", 3600)?,
            rust_log: var("RUST_LOG", "info"),
            questions_source: var("QUESTIONS_SOURCE", "static/Data/Questions.csv"),
            quiz_id: var("QUIZ_ID", "java-basics"),
            lock_window_hours,
            sweep_interval_secs: parse_var(&lookup, "SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL_SECS)?,
            static_dir: var("STATIC_DIR", "static"),
            bind_addr: var("BIND_ADDR", "0.0.0.0:3000"),
        })
    }

    /// Falls back to the default window if `lock_window_hours` was set out
    /// of range after loading.
    pub fn lock_window(&self) -> chrono::Duration {
        let hours = if (1..=MAX_LOCK_WINDOW_HOURS).contains(&self.lock_window_hours) {
            self.lock_window_hours
        } else {
            DEFAULT_LOCK_WINDOW_HOURS
        };
        chrono::Duration::hours(hours)
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("JWT_SECRET", "secret")]).unwrap();
        assert_eq!(config.database_url, None);
        assert_eq!(config.lock_window(), chrono::Duration::hours(24));
        assert_eq!(config.questions_source, "static/Data/Questions.csv");
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
    }

    #[test]
    fn test_secret_required() {
        assert_eq!(load(&[]).unwrap_err(), ConfigError::Missing("JWT_SECRET"));
    }

    #[test]
    fn test_lock_window_out_of_range_rejected() {
        for value in ["9223372036854775807", "0", "-3", "nope"] {
            let result = load(&[("JWT_SECRET", "secret"), ("LOCK_WINDOW_HOURS", value)]);
            assert!(
                matches!(result, Err(ConfigError::Invalid { key: "LOCK_WINDOW_HOURS", .. })),
                "{value}"
            );
        }

        let config = load(&[("JWT_SECRET", "secret"), ("LOCK_WINDOW_HOURS", "48")]).unwrap();
        assert_eq!(config.lock_window(), chrono::Duration::hours(48));
    }

    #[test]
    fn test_lock_window_never_panics() {
        let mut config = load(&[("JWT_SECRET", "secret")]).unwrap();
        config.lock_window_hours = i64::MAX;
        assert_eq!(config.lock_window(), chrono::Duration::hours(24));
    }
}
