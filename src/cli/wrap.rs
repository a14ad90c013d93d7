use std::fs::File;

use anyhow::{Context, Result};
use indicatif::MultiProgress;
use log::{info, warn};

use super::command::WrapArgs;
use super::output::resolve_output_path;
use super::progress::create_progress_bar;
use discblob::blob::{Blob, READ_AHEAD, RawFileBlob, SECTOR_SIZE};
use discblob::riff::format::WaveFormat;
use discblob::riff::writer::WaveWriter;

pub fn cmd_wrap(args: &WrapArgs, multi: Option<&MultiProgress>) -> Result<()> {
    let output_path = resolve_output_path(&args.input, args.output_path.as_deref(), "wav")?;

    let mut blob = RawFileBlob::open(&args.input)?.with_offset(args.offset);
    let total = blob.available_len();

    if total % SECTOR_SIZE as u64 != 0 {
        warn!(
            "{} holds {total} bytes after the offset, not a whole number of sectors",
            args.input.display()
        );
    }
    if total > u32::MAX as u64 - 36 {
        anyhow::bail!("{} is too large for a WAVE file", args.input.display());
    }

    info!(
        "Wrapping {} ({total} bytes past offset {}) into {}",
        blob.physical_path().display(),
        blob.offset(),
        output_path.display()
    );

    let file = File::create(&output_path)
        .with_context(|| format!("Failed to create {}", output_path.display()))?;
    let mut writer = WaveWriter::new(file, WaveFormat::cd_audio());
    writer.write_header()?;

    let pb = match multi {
        Some(multi) => Some(create_progress_bar(multi, total, "Wrapping")?),
        None => None,
    };

    let mut buf = vec![0u8; READ_AHEAD];
    let mut position = 0u64;
    loop {
        let n = blob.read_at(position, &mut buf)?;
        if n == 0 {
            break;
        }
        writer.write_data(&buf[..n])?;
        position += n as u64;
        if let Some(pb) = &pb {
            pb.inc(n as u64);
        }
    }
    blob.close();

    let stats = writer.stats();
    writer.into_inner()?;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    info!(
        "Wrote {} bytes of audio ({} ch, {} Hz, {} bit)",
        stats.data_written,
        stats.format.channels,
        stats.format.samples_per_sec,
        stats.format.bits_per_sample
    );
    Ok(())
}
