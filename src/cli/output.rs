use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use discblob::blob::{Blob, BlobKind, open_blob};

use super::command::SourceArgs;

/// `base_path` with `expected_ext` appended, unless it already ends with it.
pub fn create_path_with_extension(base_path: &Path, expected_ext: &str) -> PathBuf {
    match (base_path.extension(), base_path.file_name()) {
        (Some(existing_ext), _) if existing_ext == expected_ext => base_path.to_path_buf(),
        (Some(_), Some(file_name)) => {
            let mut path = base_path.to_path_buf();
            path.set_file_name(format!("{}.{expected_ext}", file_name.to_string_lossy()));
            path
        }
        _ => base_path.with_extension(expected_ext),
    }
}

/// Output path for a command: the explicit one, or the input renamed to `ext`.
///
/// Refuses to overwrite the input itself.
pub fn resolve_output_path(input: &Path, output: Option<&Path>, ext: &str) -> Result<PathBuf> {
    let path = match output {
        Some(path) => path.to_path_buf(),
        None => {
            let stem = input.with_extension("");
            create_path_with_extension(&stem, ext)
        }
    };

    if path == input {
        anyhow::bail!(
            "Output path {} would overwrite the input, pass --output-path",
            path.display()
        );
    }
    Ok(path)
}

/// An opened input and the number of bytes readable from position 0.
pub struct OpenedSource {
    pub kind: BlobKind,
    pub blob: Box<dyn Blob>,
    pub readable: u64,
}

/// The offset that applies to `kind`. WAVE inputs ignore it with a warning.
pub fn effective_offset(kind: BlobKind, source: &SourceArgs) -> u64 {
    match kind {
        BlobKind::Raw => source.offset,
        BlobKind::Wave => {
            if source.offset != 0 {
                log::warn!(
                    "Ignoring offset {} for WAVE file {}",
                    source.offset,
                    source.input.display()
                );
            }
            0
        }
    }
}

pub fn open_source(source: &SourceArgs) -> Result<OpenedSource> {
    let kind = match source.kind.blob_kind() {
        Some(kind) => kind,
        None => BlobKind::detect(&source.input)?,
    };
    let offset = effective_offset(kind, source);
    let blob = open_blob(&source.input, Some(kind), offset)
        .with_context(|| format!("Failed to open track file {}", source.input.display()))?;

    // a raw blob reports the physical length even when an offset shifts its window
    let readable = blob.len().saturating_sub(offset);

    Ok(OpenedSource {
        kind,
        blob,
        readable,
    })
}
