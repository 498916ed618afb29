pub mod connection;
pub mod transport;

pub use connection::poll_once;
pub use transport::{TcpTransport, Transport};
