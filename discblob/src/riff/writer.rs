use std::io::{self, BufWriter, Seek, SeekFrom, Write};

use super::chunk::FourCC;
use super::format::WaveFormat;
use crate::join_bytes_le;
use crate::utils::byteorder::WriteBytesLe;

/// A chunk whose payload is fully known up front.
pub trait RiffChunkBody {
    fn chunk_type(&self) -> &[u8; 4];
    fn chunk_data(&self) -> Vec<u8>;

    /// Write tag, size, payload and the pad byte for odd payloads.
    fn write_chunk<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let data = self.chunk_data();
        let size = chunk_size(data.len() as u64)?;

        writer.write_all(&join_bytes_le!(self.chunk_type(), size))?;
        writer.write_all(&data)?;
        if data.len() % 2 == 1 {
            writer.write_all(&[0])?;
        }

        Ok(())
    }
}

fn chunk_size(len: u64) -> io::Result<u32> {
    u32::try_from(len).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{len} bytes do not fit in a RIFF chunk size field"),
        )
    })
}

/// RIFF WAVE writer with a single `data` chunk whose size is patched on finish.
pub struct WaveWriter<W: Write + Seek> {
    writer: BufWriter<W>,
    format: WaveFormat,
    riff_size_position: Option<u64>,
    data_size_position: Option<u64>,
    data_written: u64,
    finished: bool,
}

impl<W: Write + Seek> WaveWriter<W> {
    pub fn new(writer: W, format: WaveFormat) -> Self {
        Self {
            writer: BufWriter::new(writer),
            format,
            riff_size_position: None,
            data_size_position: None,
            data_written: 0,
            finished: false,
        }
    }

    /// Write the RIFF header, the `fmt ` chunk and an empty `data` chunk header.
    pub fn write_header(&mut self) -> io::Result<()> {
        if self.data_size_position.is_some() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Header already written",
            ));
        }

        self.writer.write_all(FourCC::RIFF.as_bytes())?;
        self.riff_size_position = Some(self.writer.stream_position()?);
        // Sizes are patched in finish()
        self.writer.write_all(&0u32.to_le_bytes())?;
        self.writer.write_all(FourCC::WAVE.as_bytes())?;

        self.format.write_chunk(&mut self.writer)?;

        self.writer.write_all(FourCC::DATA.as_bytes())?;
        self.data_size_position = Some(self.writer.stream_position()?);
        self.writer.write_all(&0u32.to_le_bytes())?;

        Ok(())
    }

    pub fn write_data(&mut self, data: &[u8]) -> io::Result<()> {
        if self.finished {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Writer already finished",
            ));
        }
        if self.data_size_position.is_none() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Must call write_header() before writing data",
            ));
        }

        chunk_size(self.data_written + data.len() as u64)?;
        self.writer.write_all(data)?;
        self.data_written += data.len() as u64;
        Ok(())
    }

    /// Pad the data chunk and patch the RIFF and data sizes.
    pub fn finish(&mut self) -> io::Result<()> {
        if self.finished {
            return Ok(());
        }
        let (Some(riff_size_position), Some(data_size_position)) =
            (self.riff_size_position, self.data_size_position)
        else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Must call write_header() before finish()",
            ));
        };

        if self.data_written % 2 == 1 {
            self.writer.write_all(&[0])?;
        }

        let end = self.writer.stream_position()?;
        let riff_size = chunk_size(end - riff_size_position - 4)?;

        self.writer.seek(SeekFrom::Start(data_size_position))?;
        self.writer
            .write_all(&chunk_size(self.data_written)?.to_le_bytes())?;

        self.writer.seek(SeekFrom::Start(riff_size_position))?;
        self.writer.write_all(&riff_size.to_le_bytes())?;

        self.writer.seek(SeekFrom::Start(end))?;
        self.writer.flush()?;

        self.finished = true;
        Ok(())
    }

    /// Finish if needed and hand back the underlying writer.
    pub fn into_inner(mut self) -> io::Result<W> {
        use std::mem::ManuallyDrop;
        use std::ptr;

        self.finish()?;

        let manual = ManuallyDrop::new(self);
        // SAFETY: `manual` is never dropped, so `writer` is moved out exactly once.
        // The remaining fields are plain data with no drop glue.
        let writer = unsafe { ptr::read(&manual.writer) };
        writer.into_inner().map_err(|e| e.into_error())
    }

    pub fn stats(&self) -> WaveWriterStats {
        WaveWriterStats {
            data_written: self.data_written,
            format: self.format,
        }
    }
}

impl<W: Write + Seek> Drop for WaveWriter<W> {
    fn drop(&mut self) {
        if !self.finished && self.data_size_position.is_some() {
            if let Err(e) = self.finish() {
                log::error!("Failed to finalize WAVE file: {e}");
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct WaveWriterStats {
    pub data_written: u64,
    pub format: WaveFormat,
}
