use anyhow::{Context, Result};
use serde::Serialize;

use super::command::{InfoArgs, ReportFormat};
use super::output::effective_offset;
use crate::timestamp::msf_str;
use discblob::blob::{Blob, BlobKind, RawFileBlob, SECTOR_SIZE, WaveFileBlob};
use discblob::riff::chunk::{ChunkBody, Subchunk};

pub fn cmd_info(args: &InfoArgs) -> Result<()> {
    let source = &args.source;
    log::info!("Inspecting track file: {}", source.input.display());

    let kind = match source.kind.blob_kind() {
        Some(kind) => kind,
        None => BlobKind::detect(&source.input)?,
    };

    let offset = effective_offset(kind, source);

    let report = match kind {
        BlobKind::Raw => {
            let blob = RawFileBlob::open(&source.input)?.with_offset(offset);
            TrackReport::raw(&blob)
        }
        BlobKind::Wave => {
            let blob = WaveFileBlob::open(&source.input).with_context(|| {
                format!("{} is not a usable WAVE track", source.input.display())
            })?;
            TrackReport::wave(&blob)
        }
    };

    match args.format {
        ReportFormat::Plain => display_report(&source.input.display().to_string(), &report),
        ReportFormat::Yaml => print!("{}", serde_yaml_ng::to_string(&report)?),
    }

    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum ReportKind {
    Raw,
    Wave,
}

#[derive(Debug, Serialize)]
struct TrackReport {
    kind: ReportKind,
    /// Value of `Blob::len`.
    length: u64,
    /// Bytes from blob position 0 to the end of the data.
    readable: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload_start: Option<u64>,
    sectors: u64,
    leftover_bytes: u64,
    duration: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    chunks: Vec<ChunkReport>,
}

#[derive(Debug, Serialize)]
struct ChunkReport {
    tag: String,
    position: u64,
    length: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    subchunks: Vec<ChunkReport>,
}

impl ChunkReport {
    fn from_subchunk(chunk: &Subchunk) -> Self {
        let (tag, subchunks) = match &chunk.body {
            ChunkBody::List {
                list_type,
                subchunks,
            } => (
                format!("LIST {}", String::from_utf8_lossy(list_type.as_bytes())),
                subchunks.iter().map(ChunkReport::from_subchunk).collect(),
            ),
            _ => (String::from_utf8_lossy(chunk.tag.as_bytes()).into_owned(), Vec::new()),
        };

        Self {
            tag,
            position: chunk.position,
            length: chunk.length,
            subchunks,
        }
    }
}

impl TrackReport {
    fn new(kind: ReportKind, length: u64, readable: u64) -> Self {
        let sectors = readable / SECTOR_SIZE as u64;
        Self {
            kind,
            length,
            readable,
            offset: None,
            payload_start: None,
            sectors,
            leftover_bytes: readable % SECTOR_SIZE as u64,
            duration: msf_str(sectors),
            chunks: Vec::new(),
        }
    }

    fn raw(blob: &RawFileBlob) -> Self {
        let mut report = Self::new(ReportKind::Raw, blob.len(), blob.available_len());
        report.offset = Some(blob.offset());
        report
    }

    fn wave(blob: &WaveFileBlob) -> Self {
        let mut report = Self::new(ReportKind::Wave, blob.len(), blob.len());
        report.payload_start = Some(blob.payload_start());
        report.chunks = blob
            .riff()
            .map(|riff| riff.subchunks.iter().map(ChunkReport::from_subchunk).collect())
            .unwrap_or_default();
        report
    }
}

fn display_report(name: &str, report: &TrackReport) {
    println!();
    println!("Track File Information");
    println!("======================");
    println!();
    println!("  File                      {name}");
    match report.kind {
        ReportKind::Raw => println!("  Backing                   raw"),
        ReportKind::Wave => println!("  Backing                   WAVE (CD audio)"),
    }
    println!("  Length                    {} bytes", report.length);
    if let Some(offset) = report.offset {
        println!("  Offset                    {offset} bytes");
        println!("  Readable                  {} bytes", report.readable);
    }
    if let Some(start) = report.payload_start {
        println!("  Payload start             {start:#X}");
    }
    println!("  Sectors                   {}", report.sectors);
    if report.leftover_bytes != 0 {
        println!("  Partial sector            {} bytes", report.leftover_bytes);
    }
    println!("  Duration                  {}", report.duration);

    if !report.chunks.is_empty() {
        println!();
        println!("Chunks");
        display_chunks(&report.chunks, 1);
    }
    println!();
}

fn display_chunks(chunks: &[ChunkReport], depth: usize) {
    for chunk in chunks {
        println!(
            "{:indent$}{:<10} {:>#12X} {:>12} bytes",
            "",
            chunk.tag,
            chunk.position,
            chunk.length,
            indent = depth * 2
        );
        display_chunks(&chunk.subchunks, depth + 1);
    }
}
