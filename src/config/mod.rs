use std::env;
use std::time::Duration;
use anyhow::{Result, Context};
use tracing::{info, warn};

use crate::services::upload_session::{DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_IDLE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub max_concurrent_requests: usize,
    pub max_upload_body_mb: usize,
    pub max_sessions: usize,
    pub session_idle_secs: u64,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let config = Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| {
                info!("SERVER_HOST not set, using default: 0.0.0.0");
                "0.0.0.0".to_string()
            }),
            server_port: Self::parse_env_var("SERVER_PORT", 8080)
                .context("Failed to parse SERVER_PORT")?,
            max_concurrent_requests: Self::parse_env_var("MAX_CONCURRENT_REQUESTS", 100)
                .context("Failed to parse MAX_CONCURRENT_REQUESTS")?,
            max_upload_body_mb: Self::parse_env_var("MAX_UPLOAD_BODY_MB", 32)
                .context("Failed to parse MAX_UPLOAD_BODY_MB")?,
            max_sessions: Self::parse_env_var("MAX_SESSIONS", DEFAULT_MAX_SESSIONS)
                .context("Failed to parse MAX_SESSIONS")?,
            session_idle_secs: Self::parse_env_var(
                "SESSION_IDLE_SECONDS",
                DEFAULT_SESSION_IDLE.as_secs(),
            )
            .context("Failed to parse SESSION_IDLE_SECONDS")?,
            log_format: Self::log_format_from_env(),
        };

        config.validate()?;

        info!("Configuration loaded successfully: {:?}", config);
        Ok(config)
    }

    /// Read before the subscriber exists, so parse failures are silent.
    pub fn log_format_from_env() -> LogFormat {
        env::var("LOG_FORMAT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(LogFormat::Pretty)
    }

    /// `PORT` takes precedence over `SERVER_PORT`.
    pub fn listen_port(&self) -> u16 {
        env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(self.server_port)
    }

    pub fn max_upload_body_bytes(&self) -> usize {
        self.max_upload_body_mb * 1024 * 1024
    }

    pub fn session_idle_ttl(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }

    fn parse_env_var<T>(var_name: &str, default: T) -> Result<T>
    where
        T: std::str::FromStr + Copy + std::fmt::Debug,
        T::Err: std::fmt::Display,
    {
        match env::var(var_name) {
            Ok(val) => match val.parse() {
                Ok(parsed) => Ok(parsed),
                Err(e) => {
                    warn!("Failed to parse {}: {} (using default: {:?})", var_name, e, default);
                    Ok(default)
                }
            },
            Err(_) => {
                info!("{} not set, using default: {:?}", var_name, default);
                Ok(default)
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.server_port == 0 {
            return Err(anyhow::anyhow!("SERVER_PORT must be greater than 0"));
        }
        if self.max_concurrent_requests == 0 {
            return Err(anyhow::anyhow!("MAX_CONCURRENT_REQUESTS must be greater than 0"));
        }
        if self.max_sessions == 0 {
            return Err(anyhow::anyhow!("MAX_SESSIONS must be greater than 0"));
        }
        let gate_limit_mb = crate::services::policy::MAX_FILE_SIZE_BYTES / (1024 * 1024);
        if (self.max_upload_body_mb as u64) <= gate_limit_mb {
            return Err(anyhow::anyhow!(
                "MAX_UPLOAD_BODY_MB must be greater than the {}MB file size limit",
                gate_limit_mb
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 8080,
            max_concurrent_requests: 100,
            max_upload_body_mb: 32,
            max_sessions: DEFAULT_MAX_SESSIONS,
            session_idle_secs: DEFAULT_SESSION_IDLE.as_secs(),
            log_format: LogFormat::Pretty,
        }
    }
}
