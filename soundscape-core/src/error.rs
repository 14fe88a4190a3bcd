use std::path::PathBuf;

use thiserror::Error;

/// All errors produced by soundscape-core.
///
/// Only two variants abort a batch: [`SoundscapeError::NoiseProfile`] (no row
/// can be produced without the reference clip) and
/// [`SoundscapeError::EmptyBatch`] (an empty result table is never a valid
/// success). Everything that can go wrong with a single recording is a
/// [`SkipReason`] instead.
#[derive(Debug, Error)]
pub enum SoundscapeError {
    #[error("cannot load noise reference {path}: {reason}")]
    NoiseProfile { path: PathBuf, reason: String },

    #[error("wav decode error: {0}")]
    Decode(#[from] hound::Error),

    #[error("resampler error: {0}")]
    Resample(String),

    #[error("no input recordings found")]
    NoInputs,

    #[error("no index rows produced — every input file was skipped or failed")]
    EmptyBatch,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SoundscapeError>;

/// Why a single recording was dropped from the batch.
///
/// Skips are logged with the filename and never abort the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("filename has no _YYYYMMDD_ date / _HHMMSS.wav time token")]
    NoTimestamp,

    #[error("audio shorter than one segment")]
    TooShort,

    #[error("decode failed: {0}")]
    DecodeFailed(String),

    #[error("exceeded the per-file time budget")]
    Timeout,
}
