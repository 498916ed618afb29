use clap::Parser;
use std::time::Duration;

use crate::error::ConfigError;
use crate::models::Schema;

pub const DEFAULT_PORT: u16 = 80;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Startup parameters for the poller.
///
/// Every flag can also be given through its environment variable, and a
/// `.env` file in the working directory is loaded before parsing.
#[derive(Parser, Debug, Clone)]
#[command(name = "rg11-poller", about = "Poll an RG11 rain sensor and print its readings")]
pub struct PollerConfig {
    /// Hostname or IP address of the device.
    #[arg(env = "RG11_HOST")]
    pub host: String,

    /// TCP port the device listens on.
    #[arg(long, env = "RG11_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Connect and read timeout in seconds.
    #[arg(long, env = "RG11_TIMEOUT_SECS", default_value = "5", value_parser = parse_seconds)]
    pub timeout: Duration,

    /// Pause between poll cycles in seconds.
    #[arg(long, env = "RG11_INTERVAL_SECS", default_value = "1", value_parser = parse_seconds)]
    pub interval: Duration,

    /// Payload layout emitted by the device firmware.
    #[arg(long, env = "RG11_SCHEMA", value_enum, default_value_t = Schema::Extended)]
    pub schema: Schema,

    /// Treat a known-bad checksum as a failed cycle instead of just reporting it.
    #[arg(long, env = "RG11_VERIFY_CHECKSUM")]
    pub verify_checksum: bool,
}

impl PollerConfig {
    /// Configuration with the default port, timeout, interval and schema
    pub fn new(host: impl Into<String>) -> Self {
        PollerConfig {
            host: host.into(),
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
            interval: DEFAULT_INTERVAL,
            schema: Schema::default(),
            verify_checksum: false,
        }
    }

    /// Load `.env`, then parse command line flags and environment variables.
    ///
    /// Exits the process with usage information on malformed flags, like any
    /// clap program. Semantic problems are returned as ConfigError.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let config = PollerConfig::parse();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_seconds(value: &str) -> Result<Duration, String> {
    let secs: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid number of seconds '{}': {}", value, e))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid duration '{}': {}", value, e))
}
