//! Utility functions and supporting infrastructure.
//!
//! Little-endian serialization helpers and the error types shared by the
//! chunk parser and the blob backings.

pub mod byteorder;
pub mod errors;
