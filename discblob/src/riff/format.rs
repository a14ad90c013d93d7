use std::io;

use bitstream_io::{ByteRead, ByteReader, LittleEndian};
use discblob_macros::{ToBytes, riff_chunk_type};

use super::writer::RiffChunkBody;

/// `WAVE_FORMAT_PCM`, uncompressed linear PCM.
pub const WAVE_FORMAT_PCM: u16 = 0x0001;

pub const CD_CHANNELS: u16 = 2;
pub const CD_BITS_PER_SAMPLE: u16 = 16;
pub const CD_SAMPLE_RATE: u32 = 44_100;

/// Body of a `fmt ` chunk (the common `PCMWAVEFORMAT` prefix).
///
/// Extension bytes that follow `bits_per_sample` in `WAVEFORMATEX` and
/// `WAVEFORMATEXTENSIBLE` are not retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ToBytes)]
#[riff_chunk_type(b"fmt ")]
pub struct WaveFormat {
    pub format_tag: u16,
    pub channels: u16,
    pub samples_per_sec: u32,
    pub avg_bytes_per_sec: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
}

impl WaveFormat {
    /// Encoded size of the fields above.
    pub const ENCODED_LEN: u64 = 16;

    /// Red Book audio: 2 channel 16 bit PCM at 44.1 kHz.
    pub fn cd_audio() -> Self {
        Self::pcm(CD_CHANNELS, CD_SAMPLE_RATE, CD_BITS_PER_SAMPLE)
    }

    /// Derived fields saturate when the layout does not fit the header.
    pub fn pcm(channels: u16, samples_per_sec: u32, bits_per_sample: u16) -> Self {
        let block_align = channels.saturating_mul(bits_per_sample.div_ceil(8));
        Self {
            format_tag: WAVE_FORMAT_PCM,
            channels,
            samples_per_sec,
            avg_bytes_per_sec: samples_per_sec.saturating_mul(u32::from(block_align)),
            block_align,
            bits_per_sample,
        }
    }

    /// Decode a `fmt ` payload. Bytes past the first 16 are ignored.
    pub fn parse(payload: &[u8]) -> io::Result<Self> {
        let mut reader = ByteReader::endian(payload, LittleEndian);

        Ok(Self {
            format_tag: reader.read::<u16>()?,
            channels: reader.read::<u16>()?,
            samples_per_sec: reader.read::<u32>()?,
            avg_bytes_per_sec: reader.read::<u32>()?,
            block_align: reader.read::<u16>()?,
            bits_per_sample: reader.read::<u16>()?,
        })
    }

    pub fn is_pcm(&self) -> bool {
        self.format_tag == WAVE_FORMAT_PCM
    }

    /// Channel count, sample width and rate match CD audio sectors byte for byte.
    /// The encoding is checked separately by [`Self::is_pcm`].
    pub fn is_cd_layout(&self) -> bool {
        self.channels == CD_CHANNELS
            && self.bits_per_sample == CD_BITS_PER_SAMPLE
            && self.samples_per_sec == CD_SAMPLE_RATE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_layout_saturates() {
        let format = WaveFormat::pcm(u16::MAX, u32::MAX, 32);
        assert_eq!(format.block_align, u16::MAX);
        assert_eq!(format.avg_bytes_per_sec, u32::MAX);
        assert!(format.is_pcm());
        assert!(!format.is_cd_layout());
    }

    #[test]
    fn cd_audio_fields() {
        let format = WaveFormat::cd_audio();
        assert!(format.is_pcm());
        assert!(format.is_cd_layout());
        assert_eq!(format.block_align, 4);
        assert_eq!(format.avg_bytes_per_sec, 176_400);
    }

    #[test]
    fn chunk_body_is_sixteen_le_bytes() {
        let format = WaveFormat::cd_audio();
        assert_eq!(format.chunk_type(), b"fmt ");

        let data = format.chunk_data();
        assert_eq!(data.len() as u64, WaveFormat::ENCODED_LEN);
        assert_eq!(
            data,
            [
                0x01, 0x00, 0x02, 0x00, 0x44, 0xAC, 0x00, 0x00, 0x10, 0xB1, 0x02, 0x00, 0x04,
                0x00, 0x10, 0x00
            ]
        );
        assert_eq!(WaveFormat::parse(&data).unwrap(), format);
    }

    #[test]
    fn parse_ignores_extension_bytes() {
        let mut data = WaveFormat::pcm(1, 22_050, 8).chunk_data();
        data.extend_from_slice(&[0x00, 0x00]);
        let format = WaveFormat::parse(&data).unwrap();
        assert_eq!(format.channels, 1);
        assert_eq!(format.block_align, 1);
        assert!(!format.is_cd_layout());
    }

    #[test]
    fn parse_short_payload_fails() {
        let err = WaveFormat::parse(&[0x01, 0x00, 0x02]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
