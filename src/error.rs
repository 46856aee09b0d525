//! Error types for the analysis engine

use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn a file into a [`SampleBuffer`](crate::model::SampleBuffer).
///
/// Always fatal for the analysis that triggered it.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("failed to open {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported or corrupt audio: {0}")]
    UnsupportedFormat(String),
    #[error("no audio track found")]
    NoAudioTrack,
    #[error("no sample rate in audio track")]
    MissingSampleRate,
    #[error("failed to create audio decoder: {0}")]
    Codec(String),
    #[error("resampling failed: {0}")]
    Resample(String),
    #[error("no audio samples could be decoded")]
    Empty,
}

/// Failure of the container length probe.
///
/// Recovered by the duration reconciler, never surfaced to callers.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("failed to open {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("container not supported by probe: {0}")]
    Unsupported(String),
    #[error("container does not declare a length")]
    UnknownLength,
}

/// Unrecoverable analysis failure, surfaced to the caller.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("cannot read {path:?}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("decoding failed: {0}")]
    Decode(#[from] DecodeError),
}
