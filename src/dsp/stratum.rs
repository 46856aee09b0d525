//! Alternate beat-tracking backend using stratum-dsp
//!
//! Wraps another [`TempoFeatures`] implementation and replaces only its
//! global beat-tracking tempo with the one stratum-dsp reports.

use super::{ChromaFeatures, TempoFeatures, TempoSignals};
use crate::model::SampleBuffer;
use stratum_dsp::{analyze_audio, AnalysisConfig};

/// stratum-dsp needs at least a second of audio
const MIN_DURATION_SECS: f64 = 1.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct StratumBeatTracker<F> {
    inner: F,
}

impl<F> StratumBeatTracker<F> {
    pub fn new(inner: F) -> Self {
        Self { inner }
    }
}

impl<F: TempoFeatures> TempoFeatures for StratumBeatTracker<F> {
    fn tempo_signals(&self, buffer: &SampleBuffer) -> TempoSignals {
        let mut signals = self.inner.tempo_signals(buffer);
        signals.beat_track = stratum_tempo(buffer);
        signals
    }
}

impl<F: ChromaFeatures> ChromaFeatures for StratumBeatTracker<F> {
    fn chromagram(&self, buffer: &SampleBuffer) -> Vec<[f32; 12]> {
        self.inner.chromagram(buffer)
    }
}

fn stratum_tempo(buffer: &SampleBuffer) -> f64 {
    if buffer.duration_secs() < MIN_DURATION_SECS {
        log::debug!("Audio too short for stratum-dsp ({:.2}s)", buffer.duration_secs());
        return 0.0;
    }

    let config = AnalysisConfig::default();
    match analyze_audio(buffer.samples(), buffer.sample_rate(), config) {
        Ok(result) => {
            log::debug!("stratum-dsp tempo: {:.2}", result.bpm);
            result.bpm as f64
        }
        Err(e) => {
            log::warn!("stratum-dsp analysis failed: {:?}", e);
            0.0
        }
    }
}
