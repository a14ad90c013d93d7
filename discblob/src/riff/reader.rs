use std::io::{Read, Seek, SeekFrom};

use log::{trace, warn};

use super::chunk::{ChunkBody, FourCC, RiffChunk, Subchunk};
use super::format::WaveFormat;
use crate::utils::errors::RiffError;

/// Deepest `LIST` nesting accepted before the walk is abandoned.
pub const MAX_LIST_DEPTH: usize = 16;

/// Size of a chunk header: tag plus little-endian u32 length.
const CHUNK_HEADER_LEN: u64 = 8;

/// RIFF chunk-tree parser that owns its stream.
///
/// Only `fmt ` and `LIST` payloads are read during the walk; every other chunk
/// is recorded as a span (`position`, `length`) and skipped, so large `data`
/// payloads stay on disk. The stream stays available through
/// [`RiffReader::stream_mut`] for positioned reads and is dropped with the reader.
#[derive(Debug)]
pub struct RiffReader<R> {
    stream: R,
    riff: RiffChunk,
}

impl<R: Read + Seek> RiffReader<R> {
    /// Parse the chunk tree starting at the stream's current position.
    pub fn load_stream(mut stream: R) -> Result<Self, RiffError> {
        let start = stream.stream_position()?;
        let stream_len = stream.seek(SeekFrom::End(0))?;
        stream.seek(SeekFrom::Start(start))?;

        let mut header = [0u8; 12];
        stream.read_exact(&mut header)?;

        let id = fourcc_at(&header, 0);
        if id != FourCC::RIFF {
            return Err(RiffError::NotRiff(id));
        }
        let declared_size = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        let form_type = fourcc_at(&header, 8);

        let declared_end = start + CHUNK_HEADER_LEN + u64::from(declared_size);
        let end = if declared_end > stream_len {
            warn!(
                "RIFF size {declared_size} runs {} bytes past the end of the stream, clamping",
                declared_end - stream_len
            );
            stream_len
        } else {
            declared_end
        };

        let subchunks = walk_chunks(&mut stream, start + 12, end, 0)?;
        trace!("RIFF {form_type}: {} top-level chunks", subchunks.len());

        Ok(Self {
            stream,
            riff: RiffChunk {
                form_type,
                declared_size,
                subchunks,
            },
        })
    }
}

impl<R> RiffReader<R> {
    pub fn riff(&self) -> &RiffChunk {
        &self.riff
    }

    /// Underlying stream, for positioned reads of chunk payloads.
    pub fn stream_mut(&mut self) -> &mut R {
        &mut self.stream
    }
}

fn fourcc_at(bytes: &[u8], at: usize) -> FourCC {
    FourCC([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Walk the chunks laid out in `[pos, end)`.
fn walk_chunks<R: Read + Seek>(
    stream: &mut R,
    mut pos: u64,
    end: u64,
    depth: usize,
) -> Result<Vec<Subchunk>, RiffError> {
    if depth > MAX_LIST_DEPTH {
        return Err(RiffError::NestingTooDeep(MAX_LIST_DEPTH));
    }

    let mut chunks = Vec::new();

    while end.saturating_sub(pos) >= CHUNK_HEADER_LEN {
        stream.seek(SeekFrom::Start(pos))?;
        let mut head = [0u8; 8];
        stream.read_exact(&mut head)?;

        let tag = fourcc_at(&head, 0);
        let length = u64::from(u32::from_le_bytes([head[4], head[5], head[6], head[7]]));
        let position = pos + CHUNK_HEADER_LEN;
        let available = end - position;

        if length > available {
            return Err(RiffError::Truncated {
                tag,
                position,
                length,
                available,
            });
        }

        let body = match tag {
            FourCC::FMT => {
                if length < WaveFormat::ENCODED_LEN {
                    return Err(RiffError::MalformedFormat(length));
                }
                let mut payload = [0u8; WaveFormat::ENCODED_LEN as usize];
                stream.read_exact(&mut payload)?;
                ChunkBody::Format(WaveFormat::parse(&payload)?)
            }
            FourCC::LIST => {
                if length < 4 {
                    return Err(RiffError::MalformedList { position });
                }
                let mut list_type = [0u8; 4];
                stream.read_exact(&mut list_type)?;
                let subchunks = walk_chunks(stream, position + 4, position + length, depth + 1)?;
                ChunkBody::List {
                    list_type: FourCC(list_type),
                    subchunks,
                }
            }
            _ => ChunkBody::Opaque,
        };

        trace!("chunk {tag} at {position:#X}, {length} bytes");
        chunks.push(Subchunk {
            tag,
            position,
            length,
            body,
        });

        // Odd payloads carry one pad byte
        pos = position + length + (length & 1);
    }

    if pos < end {
        trace!("ignoring {} trailing bytes before {end:#X}", end - pos);
    }

    Ok(chunks)
}
