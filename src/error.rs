// src/error.rs
use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VsfsError {
    /// La imagen no existe o no se puede abrir en lectura/escritura.
    #[error("failed to open the image {path:?}")]
    ImageOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Lectura o escritura parcial: el offset de todo lo que sigue ya no es confiable.
    #[error("{op} at byte {offset}: expected {expected} bytes, got {actual}")]
    IntegrityIo {
        op: &'static str,
        offset: u64,
        expected: usize,
        actual: usize,
    },

    #[error("byte range {offset}..{offset}+{len} is outside the image ({limit} bytes)")]
    OutOfBounds { offset: u64, len: usize, limit: u64 },

    #[error("{what} index {index} out of range (limit = {limit})")]
    Range {
        what: &'static str,
        index: u64,
        limit: u64,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, VsfsError>;
