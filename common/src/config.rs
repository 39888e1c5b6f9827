//! # Runtime Configuration
//!
//! A single immutable [`Config`] is built at start-up and handed to every
//! component that opens sockets. Nothing in the workspace reads timeouts or
//! ports from global state.

use std::time::Duration;

use thiserror::Error;

/// Well-known raw SCPI socket port used by most bench instruments.
pub const DEFAULT_INSTRUMENT_PORT: u16 = 5555;

/// Default query that returns the display contents as a PNG binary block.
pub const DEFAULT_SCREENSHOT_QUERY: &str = ":DISP:DATA? PNG";

const DEFAULT_MAX_BLOCK_LEN: usize = 256 * 1024 * 1024;
const DEFAULT_PROBE_CONCURRENCY: usize = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} timeout must be a positive, finite duration")]
    InvalidTimeout { name: &'static str },
    #[error("probe concurrency must be at least 1")]
    ZeroConcurrency,
}

/// Connect and read deadlines for one session.
///
/// Both durations are guaranteed non-zero, so a session built from them can
/// never block forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimeouts {
    connect: Duration,
    read: Duration,
}

impl SessionTimeouts {
    pub fn new(connect: Duration, read: Duration) -> Result<Self, ConfigError> {
        if connect.is_zero() {
            return Err(ConfigError::InvalidTimeout { name: "connect" });
        }
        if read.is_zero() {
            return Err(ConfigError::InvalidTimeout { name: "read" });
        }
        Ok(Self { connect, read })
    }

    pub fn connect(&self) -> Duration {
        self.connect
    }

    pub fn read(&self) -> Duration {
        self.read
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Port used when a resource string does not name one.
    pub default_port: u16,
    /// Deadlines used while probing during discovery. Kept short so one
    /// silent device cannot stall the scan.
    pub probe: SessionTimeouts,
    /// Deadlines for screenshot retrieval and for opening control sessions.
    pub operation: SessionTimeouts,
    /// Best-effort read after a control command.
    pub drain_timeout: Duration,
    /// Read deadline for an explicit `*IDN?`.
    pub identify_timeout: Duration,
    /// Grace period for consuming the optional terminator after a block.
    pub terminator_timeout: Duration,
    /// Largest declared binary block length accepted from an instrument.
    pub max_block_len: usize,
    /// Upper bound on probes in flight during discovery.
    pub probe_concurrency: usize,
    pub screenshot_query: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_port: DEFAULT_INSTRUMENT_PORT,
            probe: SessionTimeouts {
                connect: Duration::from_secs(1),
                read: Duration::from_secs(1),
            },
            operation: SessionTimeouts {
                connect: Duration::from_secs(5),
                read: Duration::from_secs(5),
            },
            drain_timeout: Duration::from_millis(500),
            identify_timeout: Duration::from_secs(1),
            terminator_timeout: Duration::from_millis(100),
            max_block_len: DEFAULT_MAX_BLOCK_LEN,
            probe_concurrency: DEFAULT_PROBE_CONCURRENCY,
            screenshot_query: DEFAULT_SCREENSHOT_QUERY.to_string(),
        }
    }
}

impl Config {
    /// Checks the fields that are not already guarded by their types.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let single_timeouts = [
            ("drain", self.drain_timeout),
            ("identify", self.identify_timeout),
            ("terminator", self.terminator_timeout),
        ];
        for (name, timeout) in single_timeouts {
            if timeout.is_zero() {
                return Err(ConfigError::InvalidTimeout { name });
            }
        }
        if self.probe_concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(())
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
