//! Deterministic sized byte stream

use bytes::Bytes;
use std::io::{self, Read};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};

const CHUNK_SIZE: usize = 8 * 1024;

/// A reader that yields exactly `len` bytes, where the byte at offset `i` is `i mod 256`.
///
/// Bytes are generated on demand, so the sequence never has to be held in
/// memory to be hashed or streamed. The reader only moves forward: build a
/// new one to replay the sequence.
#[derive(Debug)]
pub struct SizeReader {
    pos: u64,
    len: u64,
}

impl SizeReader {
    /// Create a reader over `len` generated bytes
    pub fn new(len: u64) -> Self {
        Self { pos: 0, len }
    }

    /// Total number of bytes this reader produces
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Offset of the next byte to be produced
    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn remaining(&self) -> u64 {
        self.len - self.pos
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos == self.len
    }

    /// Drain the rest of the sequence into a single buffer.
    pub fn into_bytes(mut self) -> Bytes {
        let mut data = Vec::with_capacity(usize::try_from(self.remaining()).unwrap_or_default());
        let mut chunk = [0u8; CHUNK_SIZE];
        loop {
            let n = self.fill(&mut chunk);
            if n == 0 {
                break;
            }
            data.extend_from_slice(&chunk[..n]);
        }
        Bytes::from(data)
    }

    /// Generate as many bytes as fit in `buf` without passing `len`.
    #[allow(clippy::cast_possible_truncation)]
    fn fill(&mut self, buf: &mut [u8]) -> usize {
        let n = usize::try_from(self.remaining()).map_or(buf.len(), |r| r.min(buf.len()));
        for byte in &mut buf[..n] {
            *byte = (self.pos & 0xff) as u8;
            self.pos += 1;
        }
        n
    }
}

impl Read for SizeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.fill(buf))
    }
}

impl AsyncRead for SizeReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let n = this.fill(buf.initialize_unfilled());
        buf.advance(n);
        Poll::Ready(Ok(()))
    }
}
