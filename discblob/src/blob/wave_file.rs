use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use log::debug;

use super::{Blob, closed_error, read_full};
use crate::riff::chunk::{FourCC, RiffChunk};
use crate::riff::format::WaveFormat;
use crate::riff::reader::RiffReader;
use crate::utils::errors::BlobError;

/// Blob over the `data` chunk of a CD audio WAVE file.
///
/// Loading only succeeds for a RIFF `WAVE` container with a `fmt ` chunk
/// declaring 2 channel, 16 bit, 44100 Hz PCM and exactly one `data` chunk,
/// which is the byte layout of CD audio sectors. Containers split over several
/// `data` chunks are rejected rather than stitched together.
///
/// Every read seeks the stream to `payload_start + position`, and reads are
/// clamped to the `data` chunk.
#[derive(Debug)]
pub struct WaveFileBlob<R = File> {
    source: Option<RiffReader<R>>,
    payload_start: u64,
    length: u64,
    format: WaveFormat,
}

impl WaveFileBlob<File> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, BlobError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| BlobError::file_access(path, e))?;
        let blob = Self::load(file)?;
        debug!(
            "{}: {} bytes of CD audio at {:#X}",
            path.display(),
            blob.length,
            blob.payload_start
        );
        Ok(blob)
    }
}

impl<R: Read + Seek> WaveFileBlob<R> {
    /// Parse and validate a WAVE container, taking ownership of `stream`.
    ///
    /// On error the stream has already been dropped.
    pub fn load(stream: R) -> Result<Self, BlobError> {
        let source = RiffReader::load_stream(stream)?;
        let (payload_start, length, format) = validate(source.riff())?;

        Ok(Self {
            source: Some(source),
            payload_start,
            length,
            format,
        })
    }
}

impl<R> WaveFileBlob<R> {
    /// Absolute stream position of the first payload byte.
    pub fn payload_start(&self) -> u64 {
        self.payload_start
    }

    pub fn format(&self) -> &WaveFormat {
        &self.format
    }

    /// Parsed chunk tree, until the blob is closed.
    pub fn riff(&self) -> Option<&RiffChunk> {
        self.source.as_ref().map(RiffReader::riff)
    }

    pub fn is_open(&self) -> bool {
        self.source.is_some()
    }
}

/// Checks run in order; the first failure is reported.
fn validate(riff: &RiffChunk) -> Result<(u64, u64, WaveFormat), BlobError> {
    if riff.form_type != FourCC::WAVE {
        return Err(BlobError::NotExpectedContainerForm(riff.form_type));
    }

    let format = *riff.format().ok_or(BlobError::MissingFormatChunk)?;

    let mut data_chunks = riff.chunks_tagged(FourCC::DATA);
    let data = match (data_chunks.next(), data_chunks.count()) {
        (Some(data), 0) => data,
        (first, rest) => {
            // TODO: index every data chunk and map reads across them
            return Err(BlobError::UnsupportedMultiPayload(
                usize::from(first.is_some()) + rest,
            ));
        }
    };

    if !format.is_pcm() {
        return Err(BlobError::UnsupportedEncoding(format.format_tag));
    }

    if !format.is_cd_layout() {
        return Err(BlobError::IncompatibleAudioFormat {
            channels: format.channels,
            bits_per_sample: format.bits_per_sample,
            sample_rate: format.samples_per_sec,
        });
    }

    Ok((data.position, data.length, format))
}

impl<R: Read + Seek> Blob for WaveFileBlob<R> {
    fn read_at(&mut self, position: u64, buf: &mut [u8]) -> io::Result<usize> {
        let source = self.source.as_mut().ok_or_else(closed_error)?;

        let remaining = self.length.saturating_sub(position);
        let count = buf.len().min(usize::try_from(remaining).unwrap_or(usize::MAX));
        if count == 0 {
            return Ok(0);
        }

        let stream = source.stream_mut();
        stream.seek(SeekFrom::Start(self.payload_start + position))?;
        read_full(stream, &mut buf[..count])
    }

    fn len(&self) -> u64 {
        self.length
    }

    fn close(&mut self) {
        self.source = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::riff::format::WAVE_FORMAT_PCM;
    use crate::test_support::{
        StreamStats, TrackedStream, cd_wave, chunk, fmt_chunk, list_chunk, pattern, riff_bytes,
    };
    use crate::utils::errors::RiffError;
    use std::io::Cursor;
    use std::sync::Arc;

    type TestBlob = WaveFileBlob<TrackedStream<Cursor<Vec<u8>>>>;

    fn load_tracked(bytes: Vec<u8>) -> (Result<TestBlob, BlobError>, Arc<StreamStats>) {
        let (stream, stats) = TrackedStream::new(Cursor::new(bytes));
        (WaveFileBlob::load(stream), stats)
    }

    fn load_err(bytes: Vec<u8>) -> BlobError {
        let (result, stats) = load_tracked(bytes);
        let err = result.unwrap_err();
        assert!(stats.dropped(), "stream still alive after failed load");
        err
    }

    fn read_all(blob: &mut impl Blob, sizes: &[usize]) -> Vec<u8> {
        let mut out = Vec::new();
        let mut position = 0u64;
        for &size in sizes.iter().chain(std::iter::repeat(&4096)) {
            let mut buf = vec![0u8; size];
            let n = blob.read_at(position, &mut buf).unwrap();
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
            position += n as u64;
        }
        out
    }

    #[test]
    fn loads_cd_audio() {
        let payload = pattern(4 * 588);
        let (result, stats) = load_tracked(cd_wave(&payload));
        let blob = result.unwrap();

        assert_eq!(blob.len(), payload.len() as u64);
        assert_eq!(blob.payload_start(), 44);
        assert_eq!(*blob.format(), WaveFormat::cd_audio());
        assert!(blob.is_open());
        assert!(!stats.dropped());
    }

    #[test]
    fn chunked_reads_match_whole_read() {
        let payload = pattern(20_000);
        let mut blob = WaveFileBlob::load(Cursor::new(cd_wave(&payload))).unwrap();

        let mut whole = vec![0u8; payload.len()];
        assert_eq!(blob.read_at(0, &mut whole).unwrap(), payload.len());
        assert_eq!(whole, payload);

        assert_eq!(read_all(&mut blob, &[1, 7, 4096]), payload);
        assert_eq!(read_all(&mut blob, &[payload.len() + 10]), payload);
    }

    #[test]
    fn reads_in_any_order() {
        let payload = pattern(1000);
        let mut blob = WaveFileBlob::load(Cursor::new(cd_wave(&payload))).unwrap();

        let mut buf = [0u8; 10];
        blob.read_at(900, &mut buf).unwrap();
        assert_eq!(buf, payload[900..910]);
        blob.read_at(3, &mut buf).unwrap();
        assert_eq!(buf, payload[3..13]);
        blob.read_at(900, &mut buf).unwrap();
        assert_eq!(buf, payload[900..910]);
    }

    #[test]
    fn end_of_data() {
        let payload = pattern(256);
        // Metadata after the payload must not leak into reads
        let bytes = riff_bytes(
            b"WAVE",
            &[
                fmt_chunk(&WaveFormat::cd_audio()),
                chunk(b"data", &payload),
                list_chunk(b"INFO", &[chunk(b"INAM", b"Track 2\0")]),
            ],
        );
        let mut blob = WaveFileBlob::load(Cursor::new(bytes)).unwrap();

        let mut buf = [0u8; 16];
        assert_eq!(blob.read_at(250, &mut buf).unwrap(), 6);
        assert_eq!(buf[..6], payload[250..]);
        assert_eq!(blob.read_at(256, &mut buf).unwrap(), 0);
        assert_eq!(blob.read_at(10_000, &mut buf).unwrap(), 0);
    }

    #[test]
    fn empty_payload() {
        let mut blob = WaveFileBlob::load(Cursor::new(cd_wave(&[]))).unwrap();
        assert!(blob.is_empty());
        assert_eq!(blob.read_at(0, &mut [0u8; 4]).unwrap(), 0);
    }

    #[test]
    fn close_releases_stream() {
        let (result, stats) = load_tracked(cd_wave(&pattern(8)));
        let mut blob = result.unwrap();

        blob.close();
        assert!(stats.dropped());
        assert!(!blob.is_open());
        assert!(blob.riff().is_none());
        blob.close();

        let err = blob.read_at(0, &mut [0u8; 4]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Other);
        assert_eq!(blob.len(), 8);
    }

    #[test]
    fn rejects_other_forms() {
        let bytes = riff_bytes(
            b"AVI ",
            &[fmt_chunk(&WaveFormat::cd_audio()), chunk(b"data", &[0; 4])],
        );
        let err = load_err(bytes);
        assert!(matches!(err, BlobError::NotExpectedContainerForm(f) if f == FourCC(*b"AVI ")));
    }

    #[test]
    fn rejects_missing_fmt() {
        let err = load_err(riff_bytes(b"WAVE", &[chunk(b"data", &[0; 4])]));
        assert!(matches!(err, BlobError::MissingFormatChunk));
    }

    #[test]
    fn fmt_inside_list_does_not_count() {
        let nested = list_chunk(b"INFO", &[fmt_chunk(&WaveFormat::cd_audio())]);
        let err = load_err(riff_bytes(b"WAVE", &[nested, chunk(b"data", &[0; 4])]));
        assert!(matches!(err, BlobError::MissingFormatChunk));
    }

    #[test]
    fn rejects_payload_counts_other_than_one() {
        let fmt = fmt_chunk(&WaveFormat::cd_audio());

        let err = load_err(riff_bytes(b"WAVE", &[fmt.clone()]));
        assert!(matches!(err, BlobError::UnsupportedMultiPayload(0)));

        let err = load_err(riff_bytes(
            b"WAVE",
            &[fmt.clone(), chunk(b"data", &[0; 4]), chunk(b"data", &[0; 4])],
        ));
        assert!(matches!(err, BlobError::UnsupportedMultiPayload(2)));

        let err = load_err(riff_bytes(
            b"WAVE",
            &[
                fmt,
                chunk(b"data", &[0; 4]),
                chunk(b"data", &[0; 4]),
                chunk(b"data", &[0; 4]),
            ],
        ));
        assert!(matches!(err, BlobError::UnsupportedMultiPayload(3)));
    }

    #[test]
    fn rejects_non_pcm() {
        let float = WaveFormat {
            format_tag: 0x0003,
            ..WaveFormat::cd_audio()
        };
        let err = load_err(riff_bytes(
            b"WAVE",
            &[fmt_chunk(&float), chunk(b"data", &[0; 4])],
        ));
        assert!(matches!(err, BlobError::UnsupportedEncoding(0x0003)));
    }

    #[test]
    fn rejects_non_cd_layouts() {
        let cases = [
            WaveFormat::pcm(1, 44_100, 16),
            WaveFormat::pcm(6, 44_100, 16),
            WaveFormat::pcm(2, 44_100, 24),
            WaveFormat::pcm(2, 44_100, 8),
            WaveFormat::pcm(2, 48_000, 16),
            WaveFormat::pcm(2, 22_050, 16),
        ];

        for format in cases {
            let err = load_err(riff_bytes(
                b"WAVE",
                &[fmt_chunk(&format), chunk(b"data", &[0; 4])],
            ));
            match err {
                BlobError::IncompatibleAudioFormat {
                    channels,
                    bits_per_sample,
                    sample_rate,
                } => {
                    assert_eq!(channels, format.channels);
                    assert_eq!(bits_per_sample, format.bits_per_sample);
                    assert_eq!(sample_rate, format.samples_per_sec);
                }
                other => panic!("{format:?}: unexpected error {other:?}"),
            }
        }
    }

    #[test]
    fn first_failure_wins() {
        // Missing fmt is reported before the payload count
        let err = load_err(riff_bytes(
            b"WAVE",
            &[chunk(b"data", &[0; 2]), chunk(b"data", &[0; 2])],
        ));
        assert!(matches!(err, BlobError::MissingFormatChunk));

        // Payload count before encoding
        let adpcm = WaveFormat {
            format_tag: 0x0002,
            ..WaveFormat::pcm(1, 8_000, 4)
        };
        let err = load_err(riff_bytes(b"WAVE", &[fmt_chunk(&adpcm)]));
        assert!(matches!(err, BlobError::UnsupportedMultiPayload(0)));

        // Encoding before layout
        let err = load_err(riff_bytes(
            b"WAVE",
            &[fmt_chunk(&adpcm), chunk(b"data", &[0; 2])],
        ));
        assert!(matches!(err, BlobError::UnsupportedEncoding(0x0002)));
    }

    #[test]
    fn parse_failures_pass_through() {
        let err = load_err(b"not a wave file at all".to_vec());
        assert!(matches!(
            err,
            BlobError::UnderlyingParseFailure(RiffError::NotRiff(_))
        ));

        let mut truncated = cd_wave(&pattern(64));
        truncated.truncate(60);
        // Keep the declared RIFF size consistent so the data chunk itself is short
        let size = (truncated.len() - 8) as u32;
        truncated[4..8].copy_from_slice(&size.to_le_bytes());
        let err = load_err(truncated);
        assert!(matches!(
            err,
            BlobError::UnderlyingParseFailure(RiffError::Truncated { .. })
        ));
    }

    #[test]
    fn pcm_constant_matches_format() {
        assert_eq!(WaveFormat::cd_audio().format_tag, WAVE_FORMAT_PCM);
    }
}
