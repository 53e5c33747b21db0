use shared::{MapError, ProtocolError};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("handshake did not complete within {0:?}")]
    HandshakeTimeout(Duration),
    #[error("join rejected: {0}")]
    Rejected(String),
    #[error("connection closed before JOIN_ACK")]
    ClosedBeforeAck,
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("map error: {0}")]
    Map(#[from] MapError),
}
