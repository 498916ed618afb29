//! Poll an RG11 rain/condensation sensor over TCP and decode its readings.

pub mod config;
pub mod device;
pub mod error;
pub mod models;
pub mod poller;
pub mod protocol;
pub mod stats;
pub mod utils;

pub use config::PollerConfig;
pub use device::{poll_once, TcpTransport, Transport};
pub use error::{ConfigError, DecodeError, PollError, Stage};
pub use models::{Schema, SensorReport};
pub use poller::Poller;
pub use protocol::decode;
