//! Transport plumbing between the companion process and the APL host.
//!
//! The host listens on a local TCP port; the companion connects to it and
//! both sides exchange one JSON payload per line.
//!
//! ```text
//! ┌─────────────────┐        localhost TCP        ┌─────────────────────┐
//! │    APL host     │  ◄────────────────────────► │ companion           │
//! │  (listener)     │    one JSON payload / line  │ (Connection)        │
//! └─────────────────┘                             └─────────────────────┘
//! ```
//!
//! Payloads are decoded with [`crate::codec`]; what the host asks for in a
//! payload is not interpreted here.
//!
//! # Usage
//!
//! ```ignore
//! use aplbridge::ipc::Connection;
//!
//! let mut conn = Connection::connect_localhost(port).await?;
//! while let Some(payload) = conn.recv().await? {
//!     conn.send_payload(&payload).await?;
//! }
//! ```

mod connection;
mod framing;

pub use connection::{serve_echo, Connection, ConnectionError};
pub use framing::{
    read_line_message, read_line_message_with_limit, write_line_message, MAX_MESSAGE_SIZE,
};
