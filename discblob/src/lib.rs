//! Byte-addressable track data for emulated optical drives.
//!
//! A disc image built from a cue sheet refers to track files that are either
//! raw binary dumps already laid out as 2352 byte sectors, or WAVE files whose
//! `data` chunk holds the same bytes. This crate hides that difference behind
//! the [`blob::Blob`] trait so the track layer can read sectors by byte
//! offset without caring where they live.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use discblob::blob::{Blob, WaveFileBlob, SECTOR_SIZE};
//!
//! let mut blob = WaveFileBlob::open("track02.wav")?;
//! let mut sector = [0u8; SECTOR_SIZE];
//! let n = blob.read_at(0, &mut sector)?;
//! println!("{} of {} bytes", n, blob.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Loading a WAVE file validates it up front: anything other than a single
//! `data` chunk of 2 channel, 16 bit, 44.1 kHz PCM is rejected with a
//! [`utils::errors::BlobError`] and no stream is left open.

/// Blob trait and its raw-file and WAVE-file backings.
///
/// - **Raw files** ([`blob::raw_file`]): lazily opened, offset-shifted files
/// - **WAVE files** ([`blob::wave_file`]): validated `data` chunk windows
/// - **Sequential access** ([`blob::BlobReader`]): `Read + Seek` over a blob
pub mod blob;

/// RIFF chunk-tree parsing and WAVE writing.
pub mod riff;

/// Byte order helpers and error types.
pub mod utils;

#[cfg(test)]
mod test_support;
