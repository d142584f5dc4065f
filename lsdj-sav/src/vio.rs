//! Byte I/O plumbing shared by the codec and the save container.
//!
//! Everything here works against the plain `std::io` traits, so the two
//! bindings that matter both come for free: an in-memory buffer behind a
//! [`std::io::Cursor`] and a [`std::fs::File`].

use std::io::{self, Read, Seek, SeekFrom, Write};

use itertools::Itertools;

const REPEAT_CHUNK_SIZE: usize = 8 * 1024;

/// Extension trait for writing a repeated byte pattern to a stream.
pub trait WriteRepeatExt: Write {
    /// Write `pattern` back-to-back `count` times.
    ///
    /// The expansion goes through a bounded scratch buffer, so large repeat
    /// counts never materialise in memory at once.
    fn write_repeat(&mut self, pattern: &[u8], count: usize) -> io::Result<()> {
        if pattern.is_empty() {
            return Ok(());
        }
        let per_chunk = (REPEAT_CHUNK_SIZE / pattern.len()).max(1);
        let mut buf = Vec::with_capacity(per_chunk.min(count) * pattern.len());
        for chunk in &(0..count).chunks(per_chunk) {
            buf.clear();
            for _ in chunk {
                buf.extend_from_slice(pattern);
            }
            self.write_all(&buf)?;
        }
        Ok(())
    }
}

impl<W: Write + ?Sized> WriteRepeatExt for W {}

/// Wraps a byte source/sink and counts the bytes moved in each direction.
///
/// Seeks pass through untouched; only actual reads and writes count.
pub struct Counted<S> {
    inner: S,
    read: u64,
    written: u64,
}

impl<S> Counted<S> {
    pub fn new(inner: S) -> Self {
        Counted {
            inner,
            read: 0,
            written: 0,
        }
    }

    pub fn bytes_read(&self) -> u64 {
        self.read
    }

    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Read> Read for Counted<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.read += n as u64;
        Ok(n)
    }
}

impl<S: Write> Write for Counted<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<S: Seek> Seek for Counted<S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}
