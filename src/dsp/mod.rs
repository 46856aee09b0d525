//! Feature primitives consumed by the estimators
//!
//! The tempo and key estimators only see these traits, so the spectral
//! front end can be swapped (see the `stratum` feature) without touching
//! fusion or template matching.

pub mod beat;
pub mod chroma;
pub mod onset;
mod spectral;
mod stft;
#[cfg(feature = "stratum")]
mod stratum;
pub mod tempogram;

pub use spectral::SpectralFeatures;
pub use stft::{hann_window, Stft};
#[cfg(feature = "stratum")]
pub use stratum::StratumBeatTracker;

use crate::model::SampleBuffer;

/// Raw tempo signals from one buffer, before fusion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TempoSignals {
    /// Global beat-tracking tempo (0 when no beats were found)
    pub beat_track: f64,
    /// Tempo of the onset tempogram aggregated by median
    pub onset_tempogram: f64,
    /// Per-frame tempos (0 for frames without periodicity)
    pub frame_tempos: Vec<f64>,
}

/// Tempo primitive: `(buffer) -> TempoSignals`
pub trait TempoFeatures {
    fn tempo_signals(&self, buffer: &SampleBuffer) -> TempoSignals;
}

/// Chroma primitive: `(buffer) -> frames x 12`
pub trait ChromaFeatures {
    fn chromagram(&self, buffer: &SampleBuffer) -> Vec<[f32; 12]>;
}
