use async_trait::async_trait;
use std::time::Duration;

use crate::config::PollerConfig;
use crate::device::connection::poll_once;
use crate::error::PollError;

/// Source of raw device replies, one per poll cycle.
#[async_trait]
pub trait Transport {
    /// Fetch one raw payload from the device.
    async fn request(&self) -> Result<Vec<u8>, PollError>;
}

/// Opens a fresh TCP connection for every request.
#[derive(Debug, Clone)]
pub struct TcpTransport {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpTransport {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        TcpTransport {
            host: host.into(),
            port,
            timeout,
        }
    }

    pub fn from_config(config: &PollerConfig) -> Self {
        Self::new(config.host.clone(), config.port, config.timeout)
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn request(&self) -> Result<Vec<u8>, PollError> {
        poll_once(&self.host, self.port, self.timeout).await
    }
}
