use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use log::trace;

use super::{Blob, READ_AHEAD, closed_error, read_full};
use crate::utils::errors::BlobError;

type Opener<R> = Box<dyn Fn(&Path) -> io::Result<R> + Send + Sync>;

/// Lazily opened backing stream.
enum StreamCell<R> {
    Unopened,
    Open {
        reader: BufReader<R>,
        /// Physical position of the reader, `None` after a failed seek or read.
        cursor: Option<u64>,
    },
    Closed,
}

/// Blob over a plain file, shifted by a fixed byte offset.
///
/// The file handle is opened on the first read and kept for the following
/// ones. The blob remembers where the handle's cursor is, so a run of
/// sequential reads costs a single seek.
///
/// [`Blob::len`] reports the full physical file length, **not** reduced by
/// the offset. Consumers that size a track from a raw file rely on this; use
/// [`RawFileBlob::available_len`] for the number of bytes actually readable
/// past the offset.
pub struct RawFileBlob<R = File> {
    physical_path: PathBuf,
    length: u64,
    offset: u64,
    opener: Opener<R>,
    stream: StreamCell<R>,
}

impl RawFileBlob<File> {
    /// Record `path` and cache its length. The file itself is opened on first read.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, BlobError> {
        Self::open_with(path, |path: &Path| File::open(path))
    }
}

impl<R: Read + Seek> RawFileBlob<R> {
    /// Like [`RawFileBlob::open`], with `opener` producing the backing stream.
    pub fn open_with<P, F>(path: P, opener: F) -> Result<Self, BlobError>
    where
        P: AsRef<Path>,
        F: Fn(&Path) -> io::Result<R> + Send + Sync + 'static,
    {
        let physical_path = path.as_ref().to_path_buf();
        let metadata =
            fs::metadata(&physical_path).map_err(|e| BlobError::file_access(&physical_path, e))?;
        if !metadata.is_file() {
            return Err(BlobError::file_access(
                &physical_path,
                io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
            ));
        }

        Ok(Self {
            physical_path,
            length: metadata.len(),
            offset: 0,
            opener: Box::new(opener),
            stream: StreamCell::Unopened,
        })
    }

    /// Shift every read by `offset` bytes into the file.
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }
}

impl<R> RawFileBlob<R> {
    pub fn physical_path(&self) -> &Path {
        &self.physical_path
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Bytes readable from position 0, i.e. the file length minus the offset.
    pub fn available_len(&self) -> u64 {
        self.length.saturating_sub(self.offset)
    }

    pub fn is_open(&self) -> bool {
        matches!(self.stream, StreamCell::Open { .. })
    }
}

impl<R: Read + Seek> Blob for RawFileBlob<R> {
    fn read_at(&mut self, position: u64, buf: &mut [u8]) -> io::Result<usize> {
        let target = position.checked_add(self.offset).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("position {position} + offset {} overflows", self.offset),
            )
        })?;

        if let StreamCell::Unopened = self.stream {
            let file = (self.opener)(&self.physical_path)?;
            trace!("opened {}", self.physical_path.display());
            self.stream = StreamCell::Open {
                reader: BufReader::with_capacity(READ_AHEAD, file),
                cursor: Some(0),
            };
        }

        let StreamCell::Open { reader, cursor } = &mut self.stream else {
            return Err(closed_error());
        };

        let resume = *cursor == Some(target);
        // Unknown until the seek and read both succeed
        *cursor = None;
        if !resume {
            trace!("seek {} to {target}", self.physical_path.display());
            reader.seek(SeekFrom::Start(target))?;
        }

        let n = read_full(reader, buf)?;
        *cursor = Some(target + n as u64);
        Ok(n)
    }

    fn len(&self) -> u64 {
        self.length
    }

    fn close(&mut self) {
        self.stream = StreamCell::Closed;
    }
}

impl<R> fmt::Debug for RawFileBlob<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawFileBlob")
            .field("physical_path", &self.physical_path)
            .field("length", &self.length)
            .field("offset", &self.offset)
            .field("open", &self.is_open())
            .finish()
    }
}
