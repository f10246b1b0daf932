use std::{env, path::PathBuf, time::Duration};

/// Default local tunnel proxy port.
pub const DEFAULT_PROXY_PORT: u16 = 8118;

/// Default bound on establishing the proxy connection.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 30000;

pub const DEFAULT_DAEMON_READY_TIMEOUT_MS: u64 = 60000;

pub struct Config {
    pub port: u16,
    pub proxy_port: u16,
    pub connect_timeout: Duration,
    /// Idle bound per read after connect; `None` reads until close.
    pub read_timeout: Option<Duration>,
    pub daemon_ready_timeout: Duration,
    pub hidden_service_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: parse_var("PORT").unwrap_or(3000),
            proxy_port: parse_var("PROXY_PORT")
                .filter(|p| *p != 0)
                .unwrap_or(DEFAULT_PROXY_PORT),
            connect_timeout: Duration::from_millis(
                parse_var("CONNECT_TIMEOUT_MS").unwrap_or(DEFAULT_CONNECT_TIMEOUT_MS),
            ),
            read_timeout: parse_var("READ_TIMEOUT_MS").map(Duration::from_millis),
            daemon_ready_timeout: Duration::from_millis(
                parse_var("DAEMON_READY_TIMEOUT_MS").unwrap_or(DEFAULT_DAEMON_READY_TIMEOUT_MS),
            ),
            hidden_service_dir: env::var("HIDDEN_SERVICE_DIR").ok().map(PathBuf::from),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
