use std::io;

use thiserror::Error;

use crate::network::address::Endpoint;

/// Why a socket-level step failed.
#[derive(Debug, Error)]
pub enum ConnectionFailure {
    #[error("connection refused")]
    Refused,
    #[error("timed out")]
    Timeout,
    #[error("host unreachable")]
    Unreachable,
    /// The peer closed the stream before the expected data arrived.
    #[error("stream closed before payload complete ({received} of {expected} bytes)")]
    Closed { expected: usize, received: usize },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ConnectionFailure {
    /// Sorts a raw socket error into the failure kinds callers report on.
    pub fn from_io(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionRefused => ConnectionFailure::Refused,
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => ConnectionFailure::Timeout,
            io::ErrorKind::HostUnreachable | io::ErrorKind::NetworkUnreachable => {
                ConnectionFailure::Unreachable
            }
            _ => ConnectionFailure::Io(err),
        }
    }
}

/// Error taxonomy shared by every instrument operation.
#[derive(Debug, Error)]
pub enum ScoprError {
    /// The address could not be turned into a reachable endpoint. No network
    /// I/O was attempted.
    #[error("invalid device address '{address}': {reason}")]
    Address { address: String, reason: String },

    #[error("{kind} ({endpoint})")]
    Connection {
        endpoint: Endpoint,
        #[source]
        kind: ConnectionFailure,
    },

    /// The instrument answered, but not in the expected shape.
    #[error("unexpected reply from {endpoint}: {message}")]
    Protocol { endpoint: Endpoint, message: String },

    /// The resource enumeration collaborator failed as a whole.
    #[error("resource enumeration failed: {0}")]
    Discovery(#[source] anyhow::Error),
}

impl ScoprError {
    pub fn address(address: &str, reason: impl Into<String>) -> Self {
        ScoprError::Address {
            address: address.to_string(),
            reason: reason.into(),
        }
    }

    pub fn connection(endpoint: &Endpoint, kind: ConnectionFailure) -> Self {
        ScoprError::Connection {
            endpoint: endpoint.clone(),
            kind,
        }
    }

    pub fn protocol(endpoint: &Endpoint, message: impl Into<String>) -> Self {
        ScoprError::Protocol {
            endpoint: endpoint.clone(),
            message: message.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ScoprError::Connection {
                kind: ConnectionFailure::Timeout,
                ..
            }
        )
    }

    pub fn is_refused(&self) -> bool {
        matches!(
            self,
            ScoprError::Connection {
                kind: ConnectionFailure::Refused,
                ..
            }
        )
    }

    /// The endpoint involved, when the failure happened on the wire.
    pub fn endpoint(&self) -> Option<&Endpoint> {
        match self {
            ScoprError::Connection { endpoint, .. } | ScoprError::Protocol { endpoint, .. } => {
                Some(endpoint)
            }
            ScoprError::Address { .. } | ScoprError::Discovery(_) => None,
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
