/// Raw TCP exchange with the RG11 device
use log::debug;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::error::{PollError, Stage};

/// Request line the firmware waits for before dumping its message struct
pub const REQUEST: &[u8] = b"GET / HTTP/1.0\r\n\r\n";
/// Upper bound for the single read of the device reply
pub const MAX_RESPONSE_LEN: usize = 1_000_000;

/// Perform one request/response exchange with the device
///
/// Connects with `limit` as the connect timeout, sends the request line,
/// then does a single read bounded by the same limit. The device sends its
/// whole payload in one burst, so no attempt is made to read further.
/// The write side is shut down before the socket is dropped.
///
/// # Returns
/// The raw reply bytes. Nothing is parsed here, not even an HTTP status line.
pub async fn poll_once(host: &str, port: u16, limit: Duration) -> Result<Vec<u8>, PollError> {
    let addr = format!("{}:{}", host, port);

    let mut stream = match timeout(limit, TcpStream::connect((host, port))).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => return Err(PollError::Connection { addr, source: e }),
        Err(_) => {
            return Err(PollError::Timeout {
                addr,
                stage: Stage::Connect,
                after: limit,
            })
        }
    };
    debug!("Connected to {}", addr);

    match timeout(limit, stream.write_all(REQUEST)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(PollError::Connection { addr, source: e }),
        Err(_) => {
            return Err(PollError::Timeout {
                addr,
                stage: Stage::Write,
                after: limit,
            })
        }
    }

    let mut buffer = vec![0u8; MAX_RESPONSE_LEN];
    let len = match timeout(limit, stream.read(&mut buffer)).await {
        Ok(Ok(len)) => len,
        Ok(Err(e)) => return Err(PollError::Connection { addr, source: e }),
        Err(_) => {
            return Err(PollError::Timeout {
                addr,
                stage: Stage::Read,
                after: limit,
            })
        }
    };
    buffer.truncate(len);
    debug!("Received {} bytes from {}", len, addr);

    // The reply is already in hand, a failed half-close changes nothing
    if let Err(e) = stream.shutdown().await {
        debug!("Shutdown of {} failed: {}", addr, e);
    }

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn refused_connection_is_recoverable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = poll_once("127.0.0.1", port, Duration::from_millis(500)).await;
        assert!(matches!(result, Err(PollError::Connection { .. })));
    }

    #[tokio::test]
    async fn silent_device_times_out_on_read() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(2)).await;
            drop(socket);
        });

        let result = poll_once("127.0.0.1", port, Duration::from_millis(100)).await;
        assert!(matches!(
            result,
            Err(PollError::Timeout {
                stage: Stage::Read,
                ..
            })
        ));
        server.abort();
    }

    #[tokio::test]
    async fn returns_raw_reply_bytes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 18];
            socket.read_exact(&mut request).await.unwrap();
            socket.write_all(b"HTTP/1.0 200 OK").await.unwrap();
            request
        });

        let reply = poll_once("127.0.0.1", port, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(reply, b"HTTP/1.0 200 OK".to_vec());
        assert_eq!(&server.await.unwrap()[..], REQUEST);
    }
}
