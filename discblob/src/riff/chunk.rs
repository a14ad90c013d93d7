use std::fmt;

use super::format::WaveFormat;

/// Four-character chunk identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    pub const RIFF: FourCC = FourCC(*b"RIFF");
    pub const LIST: FourCC = FourCC(*b"LIST");
    pub const WAVE: FourCC = FourCC(*b"WAVE");
    pub const FMT: FourCC = FourCC(*b"fmt ");
    pub const DATA: FourCC = FourCC(*b"data");

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02X}")?;
            }
        }
        f.write_str("\"")
    }
}

impl fmt::Debug for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCC({self})")
    }
}

/// Decoded contents of a subchunk, as far as the parser understands it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkBody {
    /// Payload left on disk, only its span is recorded.
    Opaque,
    /// A `fmt ` chunk.
    Format(WaveFormat),
    /// A `LIST` chunk and the subchunks it contains.
    List {
        list_type: FourCC,
        subchunks: Vec<Subchunk>,
    },
}

/// A chunk inside the root RIFF chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subchunk {
    pub tag: FourCC,
    /// Absolute stream position of the first payload byte.
    pub position: u64,
    /// Payload length in bytes, excluding the pad byte.
    pub length: u64,
    pub body: ChunkBody,
}

impl Subchunk {
    /// Position one past the last payload byte.
    pub fn end(&self) -> u64 {
        self.position + self.length
    }

    pub fn format(&self) -> Option<&WaveFormat> {
        match &self.body {
            ChunkBody::Format(format) => Some(format),
            _ => None,
        }
    }
}

/// The root `RIFF` chunk of a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiffChunk {
    pub form_type: FourCC,
    /// Declared size of everything after the size field.
    pub declared_size: u32,
    pub subchunks: Vec<Subchunk>,
}

impl RiffChunk {
    /// First top-level subchunk with the given tag.
    pub fn find(&self, tag: FourCC) -> Option<&Subchunk> {
        self.subchunks.iter().find(|chunk| chunk.tag == tag)
    }

    /// All top-level subchunks with the given tag, in file order.
    pub fn chunks_tagged(&self, tag: FourCC) -> impl Iterator<Item = &Subchunk> {
        self.subchunks.iter().filter(move |chunk| chunk.tag == tag)
    }

    /// Format of the first top-level `fmt ` chunk.
    pub fn format(&self) -> Option<&WaveFormat> {
        self.find(FourCC::FMT).and_then(Subchunk::format)
    }
}
