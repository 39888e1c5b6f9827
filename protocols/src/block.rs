//! # IEEE-488.2 Definite-Length Binary Blocks
//!
//! Instruments answer bulk queries (screen captures, waveform dumps) with
//!
//! ```text
//! #<d><length: d ASCII digits><payload: length bytes>[terminator]
//! ```
//!
//! The decoder pulls exactly one block off an async byte stream. It never
//! assumes the transport delivers the block in one piece, and it never hands
//! out a payload shorter than the declared length.

use std::io;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::timeout;
use tracing::debug;

const BLOCK_MARKER: u8 = b'#';
const READ_CHUNK: usize = 4096;
const TERMINATOR_MAX_LEN: usize = 2;

#[derive(Debug, Error)]
pub enum BlockError {
    #[error("not a binary block header: {found:?}")]
    NotBlockHeader { found: String },
    #[error("invalid length digit count {found:?} (expected 1-9)")]
    InvalidDigitCount { found: char },
    #[error("invalid block length field {field:?}")]
    InvalidLength { field: String },
    #[error("declared block length {declared} exceeds limit of {limit} bytes")]
    TooLarge { declared: usize, limit: usize },
    #[error("stream closed before payload complete ({received} of {expected} bytes)")]
    Closed { expected: usize, received: usize },
    #[error("no data within {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl BlockError {
    /// `true` when the bytes on the wire were not a well-formed block, as
    /// opposed to the transport failing.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            BlockError::NotBlockHeader { .. }
                | BlockError::InvalidDigitCount { .. }
                | BlockError::InvalidLength { .. }
                | BlockError::TooLarge { .. }
        )
    }
}

/// A fully received block. Only the decoder constructs one, so
/// `payload().len() == declared_len()` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryBlock {
    declared_len: usize,
    payload: Vec<u8>,
}

impl BinaryBlock {
    pub fn declared_len(&self) -> usize {
        self.declared_len
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}

/// Frames `payload` as a definite-length block, without terminator.
pub fn encode(payload: &[u8]) -> Vec<u8> {
    let length = payload.len().to_string();
    let mut block = Vec::with_capacity(2 + length.len() + payload.len());
    block.push(BLOCK_MARKER);
    block.extend_from_slice(length.len().to_string().as_bytes());
    block.extend_from_slice(length.as_bytes());
    block.extend_from_slice(payload);
    block
}

#[derive(Debug, Clone)]
pub struct BlockDecoder {
    read_timeout: Duration,
    terminator_timeout: Duration,
    max_len: usize,
}

impl BlockDecoder {
    /// `read_timeout` bounds every individual read, not the whole transfer.
    pub fn new(read_timeout: Duration) -> Self {
        Self {
            read_timeout,
            terminator_timeout: Duration::from_millis(100),
            max_len: 256 * 1024 * 1024,
        }
    }

    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    pub fn with_terminator_timeout(mut self, terminator_timeout: Duration) -> Self {
        self.terminator_timeout = terminator_timeout;
        self
    }

    pub async fn decode<R>(&self, reader: &mut R) -> Result<BinaryBlock, BlockError>
    where
        R: AsyncRead + Unpin,
    {
        let mut header = [0u8; 2];
        self.fill(reader, &mut header).await?;

        if header[0] != BLOCK_MARKER {
            return Err(BlockError::NotBlockHeader {
                found: String::from_utf8_lossy(&header).into_owned(),
            });
        }

        let digit_count = match header[1] {
            d @ b'1'..=b'9' => usize::from(d - b'0'),
            other => {
                return Err(BlockError::InvalidDigitCount {
                    found: char::from(other),
                });
            }
        };

        let mut length_field = vec![0u8; digit_count];
        self.fill(reader, &mut length_field).await?;
        let declared_len = self.parse_length(&length_field)?;
        debug!(declared_len, "binary block header received");

        let payload = self.read_payload(reader, declared_len).await?;
        self.consume_terminator(reader).await;

        Ok(BinaryBlock {
            declared_len,
            payload,
        })
    }

    fn parse_length(&self, field: &[u8]) -> Result<usize, BlockError> {
        let invalid = || BlockError::InvalidLength {
            field: String::from_utf8_lossy(field).into_owned(),
        };

        if !field.iter().all(u8::is_ascii_digit) {
            return Err(invalid());
        }

        // At most nine digits, so this cannot overflow.
        let declared = field
            .iter()
            .fold(0usize, |acc, digit| acc * 10 + usize::from(digit - b'0'));

        if declared > self.max_len {
            return Err(BlockError::TooLarge {
                declared,
                limit: self.max_len,
            });
        }
        Ok(declared)
    }

    async fn read_payload<R>(&self, reader: &mut R, declared_len: usize) -> Result<Vec<u8>, BlockError>
    where
        R: AsyncRead + Unpin,
    {
        let mut payload = Vec::with_capacity(declared_len.min(READ_CHUNK * 16));
        let mut chunk = [0u8; READ_CHUNK];

        while payload.len() < declared_len {
            let wanted = (declared_len - payload.len()).min(READ_CHUNK);
            let read = self.read_some(reader, &mut chunk[..wanted]).await?;
            if read == 0 {
                return Err(BlockError::Closed {
                    expected: declared_len,
                    received: payload.len(),
                });
            }
            payload.extend_from_slice(&chunk[..read]);
        }

        Ok(payload)
    }

    /// Swallows a trailing newline if one shows up quickly. The payload is
    /// already complete, so nothing here can fail the decode.
    async fn consume_terminator<R>(&self, reader: &mut R)
    where
        R: AsyncRead + Unpin,
    {
        let mut terminator = [0u8; TERMINATOR_MAX_LEN];
        match timeout(self.terminator_timeout, reader.read(&mut terminator)).await {
            Ok(Ok(read)) => debug!(read, "consumed block terminator"),
            Ok(Err(e)) => debug!("ignoring error after block payload: {e}"),
            Err(_) => debug!("no block terminator received"),
        }
    }

    async fn fill<R>(&self, reader: &mut R, buf: &mut [u8]) -> Result<(), BlockError>
    where
        R: AsyncRead + Unpin,
    {
        let expected = buf.len();
        let mut filled = 0;

        while filled < expected {
            let read = self.read_some(reader, &mut buf[filled..]).await?;
            if read == 0 {
                return Err(BlockError::Closed {
                    expected,
                    received: filled,
                });
            }
            filled += read;
        }
        Ok(())
    }

    async fn read_some<R>(&self, reader: &mut R, buf: &mut [u8]) -> Result<usize, BlockError>
    where
        R: AsyncRead + Unpin,
    {
        match timeout(self.read_timeout, reader.read(buf)).await {
            Ok(result) => Ok(result?),
            Err(_elapsed) => Err(BlockError::Timeout(self.read_timeout)),
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
