//! Track Analyzer - tempo, key, duration and waveform extraction for audio files
//!
//! This library decodes an audio file to mono PCM, estimates its tempo (BPM)
//! and musical key, reconciles its true duration and optionally produces a
//! downsampled waveform, all in one [`AnalysisResult`] record.

pub mod analysis;
pub mod audio;
pub mod dsp;
pub mod error;
pub mod model;

pub use analysis::{AnalysisOptions, Analyzer, AudioAnalyzer};
pub use error::{AnalysisError, DecodeError, ProbeError};
pub use model::AnalysisResult;

use std::path::Path;

/// Analyze one file with the built-in backends
pub fn analyze(path: &Path, options: &AnalysisOptions) -> Result<AnalysisResult, AnalysisError> {
    Analyzer::new().analyze(path, options)
}
