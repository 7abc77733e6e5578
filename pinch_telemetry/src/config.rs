use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Connection settings for [`TelemetryClient`](crate::TelemetryClient).
///
/// Durations are written in milliseconds in configuration files.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub host: String,
    pub port: u16,
    /// Attempts per connect sequence before giving up.
    pub max_reconnect_attempts: u32,
    #[serde(rename = "reconnect_delay_ms", with = "millis")]
    pub reconnect_delay: Duration,
    #[serde(rename = "connect_timeout_ms", with = "millis")]
    pub connect_timeout: Duration,
    #[serde(rename = "write_timeout_ms", with = "opt_millis")]
    pub write_timeout: Option<Duration>,
    /// Records kept while disconnected and replayed on reconnect.
    /// Zero drops them.
    pub replay_capacity: usize,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        TelemetryConfig {
            host:                   "127.0.0.1".to_string(),
            port:                   12345,
            max_reconnect_attempts: 3,
            reconnect_delay:        Duration::from_secs(2),
            connect_timeout:        Duration::from_secs(5),
            write_timeout:          None,
            replay_capacity:        0,
        }
    }
}

impl TelemetryConfig {
    /// `host:port` as handed to the resolver.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

mod opt_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match d {
            Some(d) => s.serialize_some(&(d.as_millis() as u64)),
            None    => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Option::<u64>::deserialize(d).map(|ms| ms.map(Duration::from_millis))
    }
}
