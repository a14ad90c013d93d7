//! Byte-addressable track data sources.
//!
//! A [`Blob`] exposes a fixed-length run of bytes addressed from zero, whatever
//! the backing store looks like. [`RawFileBlob`] maps a file (optionally shifted
//! by an offset) and [`WaveFileBlob`] maps the `data` chunk of a CD audio WAVE
//! file. Both own exactly one backing stream and move its cursor on every read,
//! which is why reads take `&mut self`: one blob serves one reader at a time.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use crate::riff::chunk::FourCC;
use crate::utils::errors::BlobError;

pub mod raw_file;
pub mod wave_file;

pub use raw_file::RawFileBlob;
pub use wave_file::WaveFileBlob;

/// Bytes in one raw CD sector.
pub const SECTOR_SIZE: usize = 2352;

/// Sectors per second of CD audio.
pub const SECTORS_PER_SECOND: usize = 75;

/// Read-ahead used for file backed streams: two seconds of CD audio.
///
/// Track playback reads sequentially in small pieces, so a large buffer turns
/// most reads into memory copies.
pub const READ_AHEAD: usize = SECTOR_SIZE * SECTORS_PER_SECOND * 2;

/// Read-only, length-bounded byte source backing a disc track.
pub trait Blob {
    /// Read up to `buf.len()` bytes starting at blob-relative `position`.
    ///
    /// Returns the number of bytes copied, which is only short at the end of
    /// the data. Positions need not be sequential, but sequential reads are
    /// the cheap case.
    fn read_at(&mut self, position: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// Number of addressable bytes.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Release the backing stream. Calling this more than once is harmless;
    /// reads afterwards fail.
    fn close(&mut self);
}

impl<B: Blob + ?Sized> Blob for Box<B> {
    fn read_at(&mut self, position: u64, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_at(position, buf)
    }

    fn len(&self) -> u64 {
        (**self).len()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

impl<B: Blob + ?Sized> Blob for &mut B {
    fn read_at(&mut self, position: u64, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_at(position, buf)
    }

    fn len(&self) -> u64 {
        (**self).len()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

pub(crate) fn closed_error() -> io::Error {
    io::Error::other("blob has been closed")
}

/// Read until `buf` is full or the stream reports end of data.
pub(crate) fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Backing store of a track file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobKind {
    /// Raw sector data, read as is.
    Raw,
    /// RIFF WAVE container holding CD audio.
    Wave,
}

impl BlobKind {
    /// Guess the backing from the file signature.
    pub fn detect<P: AsRef<Path>>(path: P) -> Result<Self, BlobError> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| BlobError::file_access(path, e))?;

        let mut signature = [0u8; 4];
        let filled =
            read_full(&mut file, &mut signature).map_err(|e| BlobError::file_access(path, e))?;

        if filled == signature.len() && FourCC(signature) == FourCC::RIFF {
            Ok(BlobKind::Wave)
        } else {
            Ok(BlobKind::Raw)
        }
    }
}

/// Open `path` as a blob of the given kind, detecting it when `kind` is `None`.
///
/// `offset` only applies to raw blobs.
pub fn open_blob<P: AsRef<Path>>(
    path: P,
    kind: Option<BlobKind>,
    offset: u64,
) -> Result<Box<dyn Blob>, BlobError> {
    let path = path.as_ref();
    let kind = match kind {
        Some(kind) => kind,
        None => BlobKind::detect(path)?,
    };

    Ok(match kind {
        BlobKind::Raw => Box::new(RawFileBlob::open(path)?.with_offset(offset)),
        BlobKind::Wave => {
            if offset != 0 {
                log::warn!("Ignoring offset {offset} for WAVE file {}", path.display());
            }
            Box::new(WaveFileBlob::open(path)?)
        }
    })
}

/// Sequential `Read + Seek` view of a blob.
#[derive(Debug)]
pub struct BlobReader<B> {
    blob: B,
    position: u64,
}

impl<B: Blob> BlobReader<B> {
    pub fn new(blob: B) -> Self {
        Self { blob, position: 0 }
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn into_inner(self) -> B {
        self.blob
    }
}

impl<B: Blob> Read for BlobReader<B> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.blob.read_at(self.position, buf)?;
        self.position += n as u64;
        Ok(n)
    }
}

impl<B: Blob> Seek for BlobReader<B> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (base, delta) = match pos {
            SeekFrom::Start(n) => {
                self.position = n;
                return Ok(n);
            }
            SeekFrom::End(delta) => (self.blob.len(), delta),
            SeekFrom::Current(delta) => (self.position, delta),
        };

        match base.checked_add_signed(delta) {
            Some(n) => {
                self.position = n;
                Ok(n)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )),
        }
    }
}
