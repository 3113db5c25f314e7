//! aplbridge - companion process for an APL host.
//!
//! Connects to the host on a local port, then reads one JSON payload per
//! line and answers each with its re-encoded form until the host closes the
//! connection. Hosts use it to check their side of the array protocol.
//!
//! ```text
//! aplbridge <port>
//! ```
//!
//! Environment:
//! - `RUST_LOG` - log filter (default `aplbridge=info`), output on stderr
//! - `APLBRIDGE_READ_TIMEOUT` - seconds to wait for a payload before giving up

use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aplbridge::ipc::{serve_echo, Connection};

/// Parse the port from the first command-line argument.
fn parse_port(arg: Option<String>) -> Result<u16> {
    let Some(arg) = arg else {
        bail!("usage: aplbridge <port>");
    };
    arg.parse()
        .with_context(|| format!("Invalid port: {}", arg))
}

/// Read the optional payload timeout from the environment.
fn read_timeout_from_env() -> Result<Option<Duration>> {
    match std::env::var("APLBRIDGE_READ_TIMEOUT") {
        Ok(value) => {
            let secs: u64 = value
                .parse()
                .with_context(|| format!("Invalid APLBRIDGE_READ_TIMEOUT value: {}", value))?;
            Ok(Some(Duration::from_secs(secs)))
        }
        Err(_) => Ok(None),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout may belong to the host, so logs go to stderr
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "aplbridge=info".into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    tracing::info!("Starting aplbridge v{}", env!("CARGO_PKG_VERSION"));

    let port = parse_port(std::env::args().nth(1))?;
    let timeout = read_timeout_from_env()?;

    tracing::info!("Connecting to APL at port {}", port);
    let mut conn = Connection::connect_localhost(port)
        .await
        .with_context(|| format!("Failed to connect to APL at port {}", port))?;
    conn.set_timeout(timeout);

    match serve_echo(&mut conn).await {
        Ok(count) => {
            tracing::info!("Host closed the connection after {} payloads", count);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Connection error: {}", e);
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port(Some("4502".to_string())).unwrap(), 4502);
        assert!(parse_port(None).is_err());
        assert!(parse_port(Some("70000".to_string())).is_err());
        assert!(parse_port(Some("port".to_string())).is_err());
    }
}
