// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Process configuration, read from the environment at startup.
//!
//! Missing or malformed required values are fatal: `main` refuses to start
//! rather than guessing a port or a peer address.

use logpong_core::StartupPolicy;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_DATA_DIR: &str = "/usr/src/app/files";
pub const DEFAULT_LOG_FILE: &str = "timestamp.txt";
pub const DEFAULT_COUNTER_FILE: &str = "ping-pong.txt";
pub const DEFAULT_CONFIG_FILE: &str = "config/information.txt";
pub const DEFAULT_WRITE_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_TAIL_INTERVAL_MS: u64 = 500;
pub const DEFAULT_TAIL_BATCH_SIZE: usize = logpong_core::tail::DEFAULT_BATCH_SIZE;
pub const DEFAULT_RECENT_LINES: usize = 100;
pub const DEFAULT_COUNTER_TIMEOUT_MS: u64 = 2_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Which service this process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Prints a fresh record to stdout every write interval.
    Now,
    /// Appends to the shared log; serves the aggregate status.
    Writer,
    /// Tails the shared log.
    Reader,
    /// Counter service.
    PingPong,
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "now" => Ok(Role::Now),
            "writer" => Ok(Role::Writer),
            "reader" => Ok(Role::Reader),
            "pingpong" | "ping-pong" => Ok(Role::PingPong),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterServiceConfig {
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
}

impl CounterServiceConfig {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub role: Role,
    pub bind_addr: SocketAddr,
    pub data_dir: PathBuf,
    pub log_file: String,
    pub counter_file: String,
    pub counter_on_start: StartupPolicy,
    /// Unset keeps the tail cursor in memory only.
    pub tail_cursor_file: Option<PathBuf>,
    pub write_interval: Duration,
    pub tail_interval: Duration,
    pub tail_batch_size: NonZeroUsize,
    pub recent_lines: usize,
    pub config_file: PathBuf,
    pub message: Option<String>,
    pub counter_service: Option<CounterServiceConfig>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            role: Role::Now,
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            log_file: DEFAULT_LOG_FILE.to_string(),
            counter_file: DEFAULT_COUNTER_FILE.to_string(),
            counter_on_start: StartupPolicy::Reset,
            tail_cursor_file: None,
            write_interval: Duration::from_millis(DEFAULT_WRITE_INTERVAL_MS),
            tail_interval: Duration::from_millis(DEFAULT_TAIL_INTERVAL_MS),
            tail_batch_size: NonZeroUsize::new(DEFAULT_TAIL_BATCH_SIZE).unwrap_or(NonZeroUsize::MIN),
            recent_lines: DEFAULT_RECENT_LINES,
            config_file: PathBuf::from(DEFAULT_CONFIG_FILE),
            message: None,
            counter_service: None,
        }
    }
}

impl NodeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Lookup(lookup);

        let role: Role = env.required_parse("ROLE")?;
        let port: u16 = env.required_parse("PORT")?;
        let host: IpAddr = env.parse_or("BIND_HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?;

        let data_dir = env
            .get("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let counter_on_start = match env.get("COUNTER_ON_START") {
            None => StartupPolicy::Reset,
            Some(v) => match v.trim().to_ascii_lowercase().as_str() {
                "reset" => StartupPolicy::Reset,
                "resume" => StartupPolicy::Resume,
                _ => return Err(ConfigError::Invalid { key: "COUNTER_ON_START", value: v.clone() }),
            },
        };

        let tail_batch_size = env.parse_or("TAIL_BATCH_SIZE", DEFAULT_TAIL_BATCH_SIZE)?;
        let tail_batch_size = NonZeroUsize::new(tail_batch_size).ok_or(ConfigError::Invalid {
            key: "TAIL_BATCH_SIZE",
            value: tail_batch_size.to_string(),
        })?;

        let write_interval = env.millis_or("WRITE_INTERVAL_MS", DEFAULT_WRITE_INTERVAL_MS)?;
        let tail_interval = env.millis_or("TAIL_INTERVAL_MS", DEFAULT_TAIL_INTERVAL_MS)?;

        let message = env.get("MESSAGE");
        // Optional for the reader, required for the writer; half a peer is always an error.
        let counter_service = match (env.get("COUNTER_SERVICE_HOST"), env.get("COUNTER_SERVICE_PORT")) {
            (Some(host), Some(_)) => Some(CounterServiceConfig {
                host,
                port: env.required_parse("COUNTER_SERVICE_PORT")?,
                timeout: env.millis_or("COUNTER_TIMEOUT_MS", DEFAULT_COUNTER_TIMEOUT_MS)?,
            }),
            (Some(_), None) => return Err(ConfigError::Missing("COUNTER_SERVICE_PORT")),
            (None, Some(_)) => return Err(ConfigError::Missing("COUNTER_SERVICE_HOST")),
            (None, None) => None,
        };

        if role == Role::Writer {
            if message.is_none() {
                return Err(ConfigError::Missing("MESSAGE"));
            }
            if counter_service.is_none() {
                return Err(ConfigError::Missing("COUNTER_SERVICE_HOST"));
            }
        }

        Ok(Self {
            role,
            bind_addr: SocketAddr::new(host, port),
            tail_cursor_file: env.get("TAIL_CURSOR_FILE").map(|p| data_dir.join(p)),
            data_dir,
            log_file: env.get("LOG_FILE").unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
            counter_file: env
                .get("COUNTER_FILE")
                .unwrap_or_else(|| DEFAULT_COUNTER_FILE.to_string()),
            counter_on_start,
            write_interval,
            tail_interval,
            tail_batch_size,
            recent_lines: env.parse_or("RECENT_LINES", DEFAULT_RECENT_LINES)?,
            config_file: env
                .get("CONFIG_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE)),
            message,
            counter_service,
        })
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(&self.log_file)
    }

    pub fn counter_path(&self) -> PathBuf {
        self.data_dir.join(&self.counter_file)
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }
}

struct Lookup<F>(F);

impl<F> Lookup<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn required_parse<T: FromStr>(&self, key: &'static str) -> Result<T, ConfigError> {
        let value = self.get(key).ok_or(ConfigError::Missing(key))?;
        value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value })
    }

    fn parse_or<T: FromStr>(&self, key: &'static str, default: T) -> Result<T, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { key, value }),
        }
    }

    fn millis_or(&self, key: &'static str, default_ms: u64) -> Result<Duration, ConfigError> {
        let ms: u64 = self.parse_or(key, default_ms)?;
        if ms == 0 {
            return Err(ConfigError::Invalid { key, value: ms.to_string() });
        }
        Ok(Duration::from_millis(ms))
    }
}
