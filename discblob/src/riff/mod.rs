//! Minimal RIFF support: enough of the chunk tree to locate and validate
//! WAVE payloads, and a writer for CD audio WAVE files.

pub mod chunk;
pub mod format;
pub mod reader;
pub mod writer;
