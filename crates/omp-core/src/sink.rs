//! Output sinks for response bytes.
//!
//! The engine never writes to a socket directly; it pushes bytes into an
//! [`OutputSink`]. A sink that cannot accept more data reports
//! [`Error::BufferFull`], which the serve loop treats as backpressure
//! (abort and retry later), never as a protocol error to the client.

use bytes::{Bytes, BytesMut};

use crate::constants::DEFAULT_SINK_CAPACITY;
use crate::error::{Error, Result};

/// Destination for response bytes.
pub trait OutputSink {
    /// Append bytes to the sink.
    ///
    /// Returns `Error::BufferFull` if the sink cannot accept the data
    /// right now; the bytes are then not consumed.
    fn write(&mut self, data: &[u8]) -> Result<()>;
}

/// Growable in-memory sink.
#[derive(Debug, Default)]
pub struct BufferSink {
    buf: BytesMut,
}

impl BufferSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        BufferSink {
            buf: BytesMut::with_capacity(4096),
        }
    }

    /// Take the accumulated bytes, leaving the sink empty.
    pub fn take(&mut self) -> Bytes {
        self.buf.split().freeze()
    }

    /// Accumulated bytes as UTF-8, for assertions and logs.
    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.buf)
    }

    /// Number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True if nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl OutputSink for BufferSink {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.buf.extend_from_slice(data);
        Ok(())
    }
}

/// In-memory sink with a hard capacity.
///
/// Models the transport write buffer: once full, writes report
/// backpressure until the owner drains it.
#[derive(Debug)]
pub struct BoundedSink {
    buf: BytesMut,
    capacity: usize,
}

impl BoundedSink {
    /// Create a sink with the given byte capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        BoundedSink {
            buf: BytesMut::with_capacity(capacity.min(4096)),
            capacity,
        }
    }

    /// Drain the buffered bytes.
    pub fn take(&mut self) -> Bytes {
        self.buf.split().freeze()
    }

    /// Number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True if nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl Default for BoundedSink {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_SINK_CAPACITY)
    }
}

impl OutputSink for BoundedSink {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        if self.buf.len() + data.len() > self.capacity {
            return Err(Error::BufferFull);
        }
        self.buf.extend_from_slice(data);
        Ok(())
    }
}

/// Sink that forwards to a [`std::io::Write`] implementation.
#[derive(Debug)]
pub struct WriterSink<W: std::io::Write> {
    inner: W,
}

impl<W: std::io::Write> WriterSink<W> {
    /// Wrap a writer.
    pub fn new(inner: W) -> Self {
        WriterSink { inner }
    }

    /// Unwrap the inner writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: std::io::Write> OutputSink for WriterSink<W> {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        match self.inner.write_all(data) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Err(Error::BufferFull),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_sink_accumulates() {
        let mut sink = BufferSink::new();
        sink.write(b"<a>").unwrap();
        sink.write(b"</a>").unwrap();
        assert_eq!(sink.as_str(), "<a></a>");
        assert_eq!(sink.take().as_ref(), b"<a></a>");
        assert!(sink.is_empty());
    }

    #[test]
    fn bounded_sink_reports_backpressure() {
        let mut sink = BoundedSink::with_capacity(4);
        sink.write(b"1234").unwrap();
        let err = sink.write(b"5").unwrap_err();
        assert!(err.is_backpressure());
        // The rejected bytes were not consumed.
        assert_eq!(sink.len(), 4);
    }

    #[test]
    fn bounded_sink_accepts_after_drain() {
        let mut sink = BoundedSink::with_capacity(4);
        sink.write(b"1234").unwrap();
        sink.take();
        sink.write(b"56").unwrap();
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn writer_sink_maps_would_block() {
        struct Full;
        impl std::io::Write for Full {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::from(std::io::ErrorKind::WouldBlock))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        let mut sink = WriterSink::new(Full);
        assert!(sink.write(b"x").unwrap_err().is_backpressure());
    }
}
