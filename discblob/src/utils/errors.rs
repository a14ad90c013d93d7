use std::io;
use std::path::PathBuf;

use crate::riff::chunk::FourCC;

#[derive(thiserror::Error, Debug)]
pub enum RiffError {
    #[error("I/O error while walking chunks: {0}")]
    Io(#[from] io::Error),

    #[error("Not a RIFF container - found signature {0} instead of RIFF")]
    NotRiff(FourCC),

    #[error(
        "Chunk {tag} at {position:#X} claims {length} bytes but only {available} remain in its parent"
    )]
    Truncated {
        tag: FourCC,
        position: u64,
        length: u64,
        available: u64,
    },

    #[error("fmt chunk is {0} bytes, expected at least 16")]
    MalformedFormat(u64),

    #[error("LIST chunk at {position:#X} is too short to hold a list type")]
    MalformedList { position: u64 },

    #[error("LIST chunks nested deeper than {0} levels")]
    NestingTooDeep(usize),
}

#[derive(thiserror::Error, Debug)]
pub enum BlobError {
    #[error("Not a RIFF WAVE file (form type {0})")]
    NotExpectedContainerForm(FourCC),

    #[error("Not a valid RIFF WAVE file (missing fmt chunk)")]
    MissingFormatChunk,

    #[error("Multi-data-chunk WAVE files not supported (found {0} data chunks)")]
    UnsupportedMultiPayload(usize),

    #[error("Not a valid PCM WAVE file (format tag {0:#06X}, only PCM is supported)")]
    UnsupportedEncoding(u16),

    #[error(
        "Not a CD audio format WAVE file ({channels} ch, {bits_per_sample} bit, {sample_rate} Hz; conversion not supported)"
    )]
    IncompatibleAudioFormat {
        channels: u16,
        bits_per_sample: u16,
        sample_rate: u32,
    },

    #[error("Malformed RIFF container: {0}")]
    UnderlyingParseFailure(#[from] RiffError),

    #[error("Cannot access {}: {source}", path.display())]
    FileAccessFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BlobError {
    pub(crate) fn file_access(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileAccessFailure {
            path: path.into(),
            source,
        }
    }
}
