//! # pinch_telemetry
//!
//! Best-effort delivery of pinch events to a remote consumer over one
//! persistent TCP stream.
//!
//! A single actor thread owns the connection.  Callers hold a
//! [`TelemetryClient`] and only ever enqueue intents:
//!
//! | Intent | Effect |
//! |---|---|
//! | `connect()` | Close any link, then try up to `max_reconnect_attempts` times, `reconnect_delay` apart |
//! | `send(event)` | Write one newline-terminated JSON record; on failure reconnect at once |
//! | `shutdown()` | Cancel any retry, close the link, join the thread |
//!
//! Records sent while disconnected are dropped unless a replay buffer is
//! configured.  Nothing is acknowledged or persisted.
//!
//! ## Wire format
//!
//! ```text
//! {"hand":"left","finger":"index","is_pinching":true,"distance":0.05,"confidence":0.97}\n
//! ```

pub mod error;
pub mod event;
pub mod config;
pub mod connector;
pub mod client;

pub use error::TelemetryError;
pub use event::{decode_frames, PinchEvent, DELIMITER};
pub use config::TelemetryConfig;
pub use connector::{Connector, Link, TcpConnector};
pub use client::{ConnectionState, TelemetryClient, TelemetryStatus};
