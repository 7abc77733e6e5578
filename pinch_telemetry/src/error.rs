use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("could not resolve {addr}: {source}")]
    Resolve {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("{addr} resolved to no socket addresses")]
    NoAddress { addr: String },

    #[error("connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("write failed: {0}")]
    Write(#[from] io::Error),

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
