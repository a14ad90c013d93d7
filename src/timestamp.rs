use discblob::blob::SECTORS_PER_SECOND;

/// Format a sector count as `MM:SS:FF` (minutes, seconds, frames of 1/75 s).
pub fn msf_str(sectors: u64) -> String {
    let per_second = SECTORS_PER_SECOND as u64;
    let frames = sectors % per_second;
    let total_seconds = sectors / per_second;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;

    format!("{minutes:02}:{seconds:02}:{frames:02}")
}
