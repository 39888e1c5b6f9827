//! # SCPI Session
//!
//! One short-lived TCP conversation with a single instrument. A session is
//! opened per operation and consumed by [`ScpiSession::close`]; dropping it on
//! an early return releases the socket as well, so no exit path leaks it.

use std::time::Duration;

use scopr_common::config::SessionTimeouts;
use scopr_common::error::{ConnectionFailure, ScoprError};
use scopr_common::network::address::Endpoint;
use scopr_protocols::block::{BinaryBlock, BlockDecoder, BlockError};
use scopr_protocols::scpi;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

/// Largest text reply taken from a single read.
const TEXT_REPLY_MAX: usize = 2048;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub endpoint: Endpoint,
    pub timeouts: SessionTimeouts,
}

impl SessionConfig {
    pub fn new(endpoint: Endpoint, timeouts: SessionTimeouts) -> Self {
        Self { endpoint, timeouts }
    }
}

#[derive(Debug)]
pub struct ScpiSession {
    stream: TcpStream,
    endpoint: Endpoint,
    timeouts: SessionTimeouts,
}

impl ScpiSession {
    pub async fn open(config: &SessionConfig) -> Result<Self, ScoprError> {
        let stream = crate::network::tcp::connect(&config.endpoint, config.timeouts.connect()).await?;
        debug!("session opened to {}", config.endpoint);

        Ok(Self {
            stream,
            endpoint: config.endpoint.clone(),
            timeouts: config.timeouts,
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn timeouts(&self) -> SessionTimeouts {
        self.timeouts
    }

    /// Writes `text` followed by a single newline. Writes share the connect
    /// deadline.
    pub async fn send_line(&mut self, text: &str) -> Result<(), ScoprError> {
        let framed = scpi::frame_command(text);
        debug!(command = framed.trim_end(), "-> {}", self.endpoint);

        match timeout(self.timeouts.connect(), self.stream.write_all(framed.as_bytes())).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(self.failure(ConnectionFailure::from_io(e))),
            Err(_elapsed) => Err(self.failure(ConnectionFailure::Timeout)),
        }
    }

    /// Takes whatever the instrument sends in one read, trimmed.
    ///
    /// No delimiter is assumed. Silence until `read_timeout`, or the peer
    /// closing, yields an empty string: callers decide whether a missing
    /// reply matters.
    pub async fn read_text(&mut self, read_timeout: Duration) -> Result<String, ScoprError> {
        let mut buf = [0u8; TEXT_REPLY_MAX];

        let read = match timeout(read_timeout, self.stream.read(&mut buf)).await {
            Ok(Ok(read)) => read,
            Ok(Err(e)) => return Err(self.failure(ConnectionFailure::from_io(e))),
            Err(_elapsed) => {
                debug!("no reply from {} within {read_timeout:?}", self.endpoint);
                return Ok(String::new());
            }
        };

        let reply = String::from_utf8_lossy(&buf[..read]).trim().to_string();
        debug!(reply = %reply, "<- {}", self.endpoint);
        Ok(reply)
    }

    /// Decodes one binary block from the stream. Each underlying read is
    /// bounded by the decoder's read timeout.
    pub async fn read_binary_block(&mut self, decoder: &BlockDecoder) -> Result<BinaryBlock, ScoprError> {
        let decoded = decoder.decode(&mut self.stream).await;
        decoded.map_err(|e| self.block_failure(e))
    }

    /// Shuts the socket down and releases it.
    pub async fn close(mut self) {
        if let Err(e) = self.stream.shutdown().await {
            debug!("shutdown of {} failed: {e}", self.endpoint);
        }
        debug!("session to {} closed", self.endpoint);
    }

    fn failure(&self, kind: ConnectionFailure) -> ScoprError {
        ScoprError::connection(&self.endpoint, kind)
    }

    fn block_failure(&self, err: BlockError) -> ScoprError {
        if err.is_malformed() {
            return ScoprError::protocol(&self.endpoint, err.to_string());
        }

        let kind = match err {
            BlockError::Closed { expected, received } => ConnectionFailure::Closed { expected, received },
            BlockError::Timeout(_) => ConnectionFailure::Timeout,
            BlockError::Io(e) => ConnectionFailure::from_io(e),
            other => return ScoprError::protocol(&self.endpoint, other.to_string()),
        };
        self.failure(kind)
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
