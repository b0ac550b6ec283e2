use std::{io, path::PathBuf};

use thiserror::Error;

/// Why a hand skeleton could not be turned into features. The recognition
/// pipeline treats every variant as "no hand this frame".
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkeletonError {
    #[error("expected 21 landmarks, got {got}")]
    WrongLandmarkCount { got: usize },
    #[error("landmark {index} has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse settings from {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode settings: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("setting {field} out of range: {reason}")]
    OutOfRange { field: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read landmark frames: {0}")]
    Io(#[from] io::Error),
    #[error("malformed landmark frame on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("landmark frame on line {line} has invalid timestamp {value}")]
    InvalidTimestamp { line: usize, value: f64 },
    #[error("recognizer stopped before the recording ended")]
    ConsumerClosed(#[from] SlotClosed),
}

/// The recognizer side of a frame slot is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("frame consumer has stopped")]
pub struct SlotClosed;
