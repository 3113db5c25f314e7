//! Connection to the APL host over localhost TCP.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use thiserror::Error;
use tokio::io::BufReader;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::array::Array;
use crate::codec::{self, Payload};
use crate::error::ArrayError;
use crate::ipc::framing::{read_line_message, write_line_message};

/// Connection-specific error types.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Neither the IPv6 nor the IPv4 loopback accepted the connection.
    #[error("Connection failed: {0}")]
    ConnectionFailed(#[source] std::io::Error),

    /// No payload arrived within the read timeout.
    #[error("Read timed out after {0}s")]
    Timeout(u64),

    /// Framing-level error (oversized line, bad UTF-8, broken stream).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A line arrived but is not a valid payload.
    #[error("Payload error: {0}")]
    Payload(#[from] ArrayError),

    /// I/O error during communication.
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),
}

impl From<std::io::Error> for ConnectionError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::ConnectionRefused => {
                ConnectionError::ConnectionFailed(err)
            }
            _ => ConnectionError::Io(err),
        }
    }
}

/// A line-framed payload stream to the APL host.
///
/// Reads wait indefinitely unless a timeout is set with
/// [`Connection::set_timeout`]; the host may stay silent for as long as the
/// user is idle.
pub struct Connection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    peer: SocketAddr,
    timeout: Option<Duration>,
}

impl Connection {
    /// Connect to the host listening on `port` on this machine.
    ///
    /// The IPv6 loopback is tried first, then the IPv4 loopback.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionError::ConnectionFailed` with the IPv4 error if
    /// both attempts fail.
    pub async fn connect_localhost(port: u16) -> Result<Self, ConnectionError> {
        let stream = match TcpStream::connect((Ipv6Addr::LOCALHOST, port)).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::debug!("IPv6 connect to port {} failed ({}), trying IPv4", port, e);
                TcpStream::connect((Ipv4Addr::LOCALHOST, port))
                    .await
                    .map_err(ConnectionError::ConnectionFailed)?
            }
        };

        let conn = Self::from_stream(stream)?;
        tracing::info!("Connected to {}", conn.peer);
        Ok(conn)
    }

    /// Wrap an already-connected stream.
    pub fn from_stream(stream: TcpStream) -> Result<Self, ConnectionError> {
        let peer = stream.peer_addr()?;
        let (read_half, write_half) = stream.into_split();

        Ok(Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            peer,
            timeout: None,
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Set the read timeout. `None` waits forever.
    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    /// Receive and decode the next payload.
    ///
    /// Returns `Ok(None)` once the host closes the connection.
    ///
    /// # Errors
    ///
    /// - `ConnectionError::Timeout` if a timeout is set and expires
    /// - `ConnectionError::Protocol` if the line cannot be read
    /// - `ConnectionError::Payload` if the line is not a valid payload; the
    ///   stream stays usable and the next call reads the following line
    pub async fn recv(&mut self) -> Result<Option<Payload>, ConnectionError> {
        let line = match self.timeout {
            Some(limit) => timeout(limit, read_line_message(&mut self.reader))
                .await
                .map_err(|_| ConnectionError::Timeout(limit.as_secs()))?,
            None => read_line_message(&mut self.reader).await,
        }
        .map_err(|e| ConnectionError::Protocol(format!("Failed to read payload: {:#}", e)))?;

        match line {
            Some(text) => Ok(Some(codec::decode(&text)?)),
            None => Ok(None),
        }
    }

    /// Encode and send a payload.
    pub async fn send_payload(&mut self, payload: &Payload) -> Result<(), ConnectionError> {
        self.send_text(&payload.encode()).await
    }

    /// Encode and send an array.
    pub async fn send_array(&mut self, array: &Array) -> Result<(), ConnectionError> {
        self.send_text(&codec::encode(array)).await
    }

    async fn send_text(&mut self, text: &str) -> Result<(), ConnectionError> {
        write_line_message(&mut self.writer, text)
            .await
            .map_err(|e| ConnectionError::Protocol(format!("Failed to send payload: {:#}", e)))
    }
}

/// Send every payload back to the host until it disconnects.
///
/// Lines that fail to decode are logged and skipped. Returns the number of
/// payloads echoed.
///
/// # Errors
///
/// Returns the first transport error (timeout, framing, I/O).
pub async fn serve_echo(conn: &mut Connection) -> Result<usize, ConnectionError> {
    let mut echoed = 0;

    loop {
        match conn.recv().await {
            Ok(Some(payload)) => {
                if let Payload::Array(array) = &payload {
                    tracing::debug!("Echoing array of shape {:?}", array.shape());
                }
                conn.send_payload(&payload).await?;
                echoed += 1;
            }
            Ok(None) => return Ok(echoed),
            Err(ConnectionError::Payload(e)) => {
                tracing::warn!("Skipping undecodable payload: {}", e);
            }
            Err(e) => return Err(e),
        }
    }
}
