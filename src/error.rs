/// Error types for polling, decoding and configuration
use std::fmt;
use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::models::Schema;

/// Phase of a poll exchange that ran out of time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Connect,
    Write,
    Read,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Connect => write!(f, "connect"),
            Stage::Write => write!(f, "write"),
            Stage::Read => write!(f, "read"),
        }
    }
}

/// Payload could not be turned into a SensorReport
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("expected {expected} bytes for {schema} payload, got {actual}")]
    Length {
        schema: Schema,
        expected: usize,
        actual: usize,
    },
    #[error("checksum mismatch: device sent {reported:#06x}, computed {computed:#06x}")]
    ChecksumMismatch { reported: u16, computed: u16 },
}

/// Everything that can go wrong in a single poll cycle.
///
/// All variants are recoverable: the poll loop prints them and carries on.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("connection to {addr} failed: {source}")]
    Connection {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("{stage} to {addr} timed out after {after:?}")]
    Timeout {
        addr: String,
        stage: Stage,
        after: Duration,
    },
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("device host must not be empty")]
    EmptyHost,
    #[error("timeout must be greater than zero")]
    ZeroTimeout,
}
