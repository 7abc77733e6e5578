//! Transport abstraction for the telemetry actor.
//!
//! The actor only needs "open a byte sink to this address".  [`TcpConnector`]
//! is the production backend; tests substitute in-memory connectors.

use std::io::Write;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use crate::error::TelemetryError;

/// An open, writable connection.  Dropping it closes the connection.
pub type Link = Box<dyn Write + Send>;

/// Anything that can open a [`Link`] to an address.
pub trait Connector: Send + 'static {
    fn connect(&mut self, addr: &str, timeout: Duration) -> Result<Link, TelemetryError>;
}

// ── TCP backend ───────────────────────────────────────────────────────────

/// Plain TCP stream connector.
#[derive(Clone, Debug, Default)]
pub struct TcpConnector {
    pub write_timeout: Option<Duration>,
}

impl TcpConnector {
    pub fn new(write_timeout: Option<Duration>) -> Self {
        TcpConnector { write_timeout }
    }
}

impl Connector for TcpConnector {
    fn connect(&mut self, addr: &str, timeout: Duration) -> Result<Link, TelemetryError> {
        let candidates: Vec<_> = addr.to_socket_addrs()
            .map_err(|source| TelemetryError::Resolve { addr: addr.to_string(), source })?
            .collect();

        let mut last_err = None;
        for sock_addr in candidates {
            match TcpStream::connect_timeout(&sock_addr, timeout) {
                Ok(stream) => {
                    stream.set_nodelay(true).ok();
                    stream.set_write_timeout(self.write_timeout).ok();
                    debug!(%sock_addr, "tcp stream open");
                    return Ok(Box::new(stream));
                }
                Err(e) => last_err = Some(e),
            }
        }

        match last_err {
            Some(source) => Err(TelemetryError::Connect { addr: addr.to_string(), source }),
            None         => Err(TelemetryError::NoAddress { addr: addr.to_string() }),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
