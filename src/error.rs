use std::path::PathBuf;
use thiserror::Error;

/// The main error type for masktrace operations.
#[derive(Debug, Error)]
pub enum MasktraceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse mask JSON from {path}: {source}")]
    MaskJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write mask JSON: {0}")]
    MaskJsonWrite(#[source] serde_json::Error),

    #[error("Invalid version bits in bit-packed mask (expected 00)")]
    InvalidVersion,

    #[error("Run length at bit {position} does not fit in 64 bits")]
    RunLengthOverflow { position: usize },

    #[error("Invalid character {character:?} at offset {offset} in compressed RLE")]
    InvalidRleCharacter { offset: usize, character: char },

    #[error("Compressed RLE ends in the middle of a value")]
    UnterminatedRleValue,

    #[error("Compressed RLE value at offset {offset} does not fit in 64 bits")]
    RleValueOverflow { offset: usize },

    #[error("Run length {value} at index {index} is not a valid pixel count")]
    NegativeRunLength { index: usize, value: i64 },

    #[error("Segment graph walk dead-ends at vertex ({x}, {y}) before closing its loop")]
    OpenLoop { x: u32, y: u32 },

    #[error("Invalid mask size [{rows}, {cols}]: {message}")]
    InvalidMaskSize {
        rows: u64,
        cols: u64,
        message: String,
    },
}
