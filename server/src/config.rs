use std::time::Duration;

use clap::Parser;
use lib::constants::{DEFAULT_HOST, DEFAULT_SERVER_PORT};

const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Bound on a single write to one recipient.
    pub write_timeout: Duration,
    /// Sessions silent for longer than this are treated as disconnected.
    pub idle_timeout: Option<Duration>,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_SERVER_PORT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            idle_timeout: None,
        }
    }
}

/// murmur chat relay server
#[derive(Parser, Debug)]
#[command(name = "murmur-server", version, about = "Multi-client TCP chat relay")]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = "MURMUR_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "MURMUR_PORT", default_value_t = DEFAULT_SERVER_PORT)]
    pub port: u16,

    /// Per-recipient write timeout in milliseconds
    #[arg(long, env = "MURMUR_WRITE_TIMEOUT_MS", default_value_t = 5000)]
    pub write_timeout_ms: u64,

    /// Disconnect clients idle for this many seconds (disabled when unset)
    #[arg(long, env = "MURMUR_IDLE_TIMEOUT_SECS")]
    pub idle_timeout_secs: Option<u64>,
}

impl Cli {
    pub fn into_config(self) -> ServerConfig {
        ServerConfig {
            host: self.host,
            port: self.port,
            write_timeout: Duration::from_millis(self.write_timeout_ms),
            idle_timeout: self.idle_timeout_secs.map(Duration::from_secs),
        }
    }
}
