//! In-crate spectral feature extractor

use super::beat::{tempo_from_beats, track_beats, DEFAULT_TIGHTNESS};
use super::chroma::chromagram;
use super::onset::onset_envelope;
use super::tempogram::Tempogram;
use super::{ChromaFeatures, TempoFeatures, TempoSignals};
use crate::model::SampleBuffer;

/// Tempo and chroma features computed with rustfft
#[derive(Debug, Clone, Copy, Default)]
pub struct SpectralFeatures;

impl SpectralFeatures {
    pub fn new() -> Self {
        Self
    }
}

impl TempoFeatures for SpectralFeatures {
    fn tempo_signals(&self, buffer: &SampleBuffer) -> TempoSignals {
        let onset = onset_envelope(buffer);
        let tempogram = Tempogram::compute(&onset.values, onset.frame_rate);

        let seed = tempogram.mean_tempo();
        let beats = track_beats(&onset.values, onset.frame_rate, seed, DEFAULT_TIGHTNESS);
        let beat_track = tempo_from_beats(&beats, onset.frame_rate);

        let signals = TempoSignals {
            beat_track,
            onset_tempogram: tempogram.median_tempo(),
            frame_tempos: tempogram.frame_tempos(),
        };

        log::debug!(
            "Tempo signals: seed={:.2} beats={} beat_track={:.2} tempogram={:.2}",
            seed,
            beats.len(),
            signals.beat_track,
            signals.onset_tempogram
        );

        signals
    }
}

impl ChromaFeatures for SpectralFeatures {
    fn chromagram(&self, buffer: &SampleBuffer) -> Vec<[f32; 12]> {
        chromagram(buffer)
    }
}
