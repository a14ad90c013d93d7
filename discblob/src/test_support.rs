//! Fixture builders and instrumented streams shared by unit tests.

use std::io::{self, Read, Seek, SeekFrom};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::join_bytes_le;
use crate::riff::format::WaveFormat;
use crate::riff::writer::RiffChunkBody;
use crate::utils::byteorder::WriteBytesLe;

/// Encode one chunk, pad byte included.
pub fn chunk(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut bytes = join_bytes_le!(tag, payload.len() as u32, payload);
    if payload.len() % 2 == 1 {
        bytes.push(0);
    }
    bytes
}

pub fn fmt_chunk(format: &WaveFormat) -> Vec<u8> {
    chunk(format.chunk_type(), &format.chunk_data())
}

pub fn list_chunk(list_type: &[u8; 4], chunks: &[Vec<u8>]) -> Vec<u8> {
    let mut payload = list_type.to_vec();
    chunks.iter().for_each(|c| payload.extend_from_slice(c));
    chunk(b"LIST", &payload)
}

pub fn riff_bytes(form_type: &[u8; 4], chunks: &[Vec<u8>]) -> Vec<u8> {
    let body_len: usize = chunks.iter().map(Vec::len).sum();
    let mut bytes = join_bytes_le!(*b"RIFF", (body_len + 4) as u32, form_type);
    chunks.iter().for_each(|c| bytes.extend_from_slice(c));
    bytes
}

/// A well-formed CD audio WAVE file around `payload`.
pub fn cd_wave(payload: &[u8]) -> Vec<u8> {
    riff_bytes(
        b"WAVE",
        &[fmt_chunk(&WaveFormat::cd_audio()), chunk(b"data", payload)],
    )
}

/// Deterministic, non-repeating-looking payload.
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 + i / 251) as u8).collect()
}

#[derive(Debug, Default)]
pub struct StreamStats {
    pub seeks: AtomicUsize,
    pub reads: AtomicUsize,
    pub dropped: AtomicBool,
    pub fail_next_read: AtomicBool,
}

impl StreamStats {
    pub fn seeks(&self) -> usize {
        self.seeks.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn dropped(&self) -> bool {
        self.dropped.load(Ordering::SeqCst)
    }

    /// Make the next read of the wrapped stream fail once.
    pub fn fail_next_read(&self) {
        self.fail_next_read.store(true, Ordering::SeqCst);
    }
}

/// Wraps a stream and records seeks, reads and drop.
#[derive(Debug)]
pub struct TrackedStream<R> {
    inner: R,
    stats: Arc<StreamStats>,
}

impl<R> TrackedStream<R> {
    pub fn new(inner: R) -> (Self, Arc<StreamStats>) {
        let stats = Arc::new(StreamStats::default());
        (
            Self {
                inner,
                stats: stats.clone(),
            },
            stats,
        )
    }

    pub fn with_stats(inner: R, stats: Arc<StreamStats>) -> Self {
        Self { inner, stats }
    }
}

impl<R: Read> Read for TrackedStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stats.reads.fetch_add(1, Ordering::SeqCst);
        if self.stats.fail_next_read.swap(false, Ordering::SeqCst) {
            return Err(io::Error::other("read failed"));
        }
        self.inner.read(buf)
    }
}

impl<R: Seek> Seek for TrackedStream<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.stats.seeks.fetch_add(1, Ordering::SeqCst);
        self.inner.seek(pos)
    }
}

impl<R> Drop for TrackedStream<R> {
    fn drop(&mut self) {
        self.stats.dropped.store(true, Ordering::SeqCst);
    }
}
