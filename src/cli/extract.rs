use std::fs::File;
use std::io::{BufWriter, Read, Write};

use anyhow::{Context, Result};
use indicatif::MultiProgress;
use log::{info, warn};

use super::command::ExtractArgs;
use super::output::{open_source, resolve_output_path};
use super::progress::create_progress_bar;
use discblob::blob::{Blob, BlobReader, READ_AHEAD, SECTOR_SIZE};

pub fn cmd_extract(args: &ExtractArgs, multi: Option<&MultiProgress>) -> Result<()> {
    let source = &args.source;
    let output_path = resolve_output_path(&source.input, args.output_path.as_deref(), "bin")?;

    let opened = open_source(source)?;
    let total = opened.readable;
    info!(
        "Extracting {:?} track {} ({total} bytes) to {}",
        opened.kind,
        source.input.display(),
        output_path.display()
    );

    let file = File::create(&output_path)
        .with_context(|| format!("Failed to create {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    let pb = match multi {
        Some(multi) => Some(create_progress_bar(multi, total, "Extracting")?),
        None => None,
    };

    let mut reader = BlobReader::new(opened.blob);
    let copied = copy_blob(&mut reader, &mut writer, |n| {
        if let Some(pb) = &pb {
            pb.inc(n);
        }
    })?;
    writer.flush()?;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    reader.into_inner().close();

    if copied % SECTOR_SIZE as u64 != 0 {
        warn!("Track length {copied} is not a whole number of {SECTOR_SIZE} byte sectors");
    }
    info!("Wrote {copied} bytes");
    Ok(())
}

/// Copies everything readable from `reader` to `writer` in read-ahead sized pieces.
fn copy_blob<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    mut on_progress: impl FnMut(u64),
) -> Result<u64> {
    let mut buf = vec![0u8; READ_AHEAD];
    let mut copied = 0u64;

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        writer.write_all(&buf[..n])?;
        copied += n as u64;
        on_progress(n as u64);
    }

    Ok(copied)
}
