//! Purpose: Enforce the maximum request body size before decoding sees the bytes.
//! Exports: `BodyLimit`, `BodyTooLarge`, `LimitedReader`, `LimitedBuffer`, `size_limit_signal`.
//! Role: Upstream size guard for both sync readers and async chunked bodies.
//! Invariants: Overflow is signalled by the typed `BodyTooLarge` value, never by message text.
//! Invariants: Inputs of exactly `max_bytes` are accepted; one byte more is rejected.

use bytes::{Bytes, BytesMut};
use std::error::Error as StdError;
use std::fmt;
use std::io::{self, Read};

pub const DEFAULT_MAX_BODY_BYTES: u64 = 1024 * 1024;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BodyLimit {
    max_bytes: u64,
}

impl BodyLimit {
    /// Returns `None` for a zero limit.
    pub fn new(max_bytes: u64) -> Option<Self> {
        (max_bytes > 0).then_some(Self { max_bytes })
    }

    pub fn max_bytes(self) -> u64 {
        self.max_bytes
    }

    pub fn reader<R: Read>(self, inner: R) -> LimitedReader<R> {
        LimitedReader::new(inner, self)
    }

    pub fn buffer(self) -> LimitedBuffer {
        LimitedBuffer::new(self)
    }
}

impl Default for BodyLimit {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BodyTooLarge {
    pub limit: u64,
}

impl fmt::Display for BodyTooLarge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request body exceeds {} bytes", self.limit)
    }
}

impl StdError for BodyTooLarge {}

impl From<BodyTooLarge> for io::Error {
    fn from(err: BodyTooLarge) -> Self {
        io::Error::new(io::ErrorKind::InvalidData, err)
    }
}

/// Finds the guard's signal inside an I/O error, if that is what it carries.
pub fn size_limit_signal(err: &io::Error) -> Option<BodyTooLarge> {
    let mut cur = err
        .get_ref()
        .map(|inner| inner as &(dyn StdError + 'static));
    while let Some(source) = cur {
        if let Some(signal) = source.downcast_ref::<BodyTooLarge>() {
            return Some(*signal);
        }
        if let Some(nested) = source.downcast_ref::<io::Error>() {
            cur = nested
                .get_ref()
                .map(|inner| inner as &(dyn StdError + 'static));
            continue;
        }
        cur = source.source();
    }
    None
}

/// `Read` adapter that fails with `BodyTooLarge` once the input runs past the limit.
#[derive(Debug)]
pub struct LimitedReader<R> {
    inner: R,
    limit: u64,
    remaining: u64,
}

impl<R: Read> LimitedReader<R> {
    pub fn new(inner: R, limit: BodyLimit) -> Self {
        Self {
            inner,
            limit: limit.max_bytes,
            remaining: limit.max_bytes,
        }
    }
}

impl<R: Read> Read for LimitedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.remaining == 0 {
            // Probe so a body of exactly `limit` bytes still reads to EOF.
            let mut probe = [0u8; 1];
            return match self.inner.read(&mut probe)? {
                0 => Ok(0),
                _ => Err(BodyTooLarge { limit: self.limit }.into()),
            };
        }
        let max = buf.len().min(usize::try_from(self.remaining).unwrap_or(usize::MAX));
        let read = self.inner.read(&mut buf[..max])?;
        self.remaining -= read as u64;
        Ok(read)
    }
}

/// Accumulates async body chunks under the same limit as `LimitedReader`.
#[derive(Debug)]
pub struct LimitedBuffer {
    limit: u64,
    buf: BytesMut,
}

impl LimitedBuffer {
    pub fn new(limit: BodyLimit) -> Self {
        Self {
            limit: limit.max_bytes,
            buf: BytesMut::new(),
        }
    }

    /// On overflow the buffer keeps the first `limit` bytes, like `LimitedReader`.
    pub fn push(&mut self, chunk: &[u8]) -> Result<(), BodyTooLarge> {
        let room = usize::try_from(self.limit - self.buf.len() as u64).unwrap_or(usize::MAX);
        if chunk.len() > room {
            self.buf.extend_from_slice(&chunk[..room]);
            return Err(BodyTooLarge { limit: self.limit });
        }
        self.buf.extend_from_slice(chunk);
        Ok(())
    }

    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}

/// Human form used in the 413 message: `1MB`, `64KB`, or `1000 bytes`.
pub fn describe_limit(limit: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    if limit >= MB && limit % MB == 0 {
        format!("{}MB", limit / MB)
    } else if limit >= KB && limit % KB == 0 {
        format!("{}KB", limit / KB)
    } else {
        format!("{limit} bytes")
    }
}
