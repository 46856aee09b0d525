//! Tempo fusion
//!
//! Three independent tempo signals are combined with fixed weights. Their
//! spread is turned into a confidence: agreeing methods give values near 1.

use crate::dsp::TempoFeatures;
use crate::model::{SampleBuffer, TempoEstimate};

/// Weight of the global beat-tracking tempo
pub const BEAT_TRACK_WEIGHT: f64 = 0.3;
/// Weight of the median-aggregated onset tempogram tempo
pub const TEMPOGRAM_WEIGHT: f64 = 0.5;
/// Weight of the median of per-frame tempos
pub const FRAME_MEDIAN_WEIGHT: f64 = 0.2;

/// Estimate the tempo of a buffer
pub fn estimate_tempo<F>(features: &F, buffer: &SampleBuffer) -> TempoEstimate
where
    F: TempoFeatures + ?Sized,
{
    let signals = features.tempo_signals(buffer);
    let frame_median = median_tempo(&signals.frame_tempos);

    let estimate = fuse_tempo([signals.beat_track, signals.onset_tempogram, frame_median]);
    log::debug!(
        "Tempo: beat_track={:.2} tempogram={:.2} frame_median={:.2} -> {} BPM (confidence {:.3})",
        signals.beat_track,
        signals.onset_tempogram,
        frame_median,
        estimate.bpm,
        estimate.confidence
    );
    estimate
}

/// Fuse `[beat_track, tempogram, frame_median]` into one estimate
///
/// Non-finite tempos count as 0 in the weighted sum. Only finite, positive
/// tempos take part in the confidence, which needs at least two of them.
pub fn fuse_tempo(tempos: [f64; 3]) -> TempoEstimate {
    let tempos = tempos.map(|t| if t.is_finite() { t } else { 0.0 });

    let fused = BEAT_TRACK_WEIGHT * tempos[0]
        + TEMPOGRAM_WEIGHT * tempos[1]
        + FRAME_MEDIAN_WEIGHT * tempos[2];

    TempoEstimate {
        bpm: fused.max(0.0).round() as u32,
        confidence: agreement(&tempos),
    }
}

/// `max(0, 1 - std / mean)` over the valid tempos (population std)
fn agreement(tempos: &[f64]) -> f64 {
    let valid: Vec<f64> = tempos.iter().copied().filter(|&t| t > 0.0).collect();
    if valid.len() < 2 {
        return 0.0;
    }

    let n = valid.len() as f64;
    let mean = valid.iter().sum::<f64>() / n;
    let variance = valid.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / n;

    (1.0 - variance.sqrt() / mean).clamp(0.0, 1.0)
}

/// Median of the positive per-frame tempos, 0 when there are none
pub fn median_tempo(frame_tempos: &[f64]) -> f64 {
    let mut valid: Vec<f64> = frame_tempos
        .iter()
        .copied()
        .filter(|t| t.is_finite() && *t > 0.0)
        .collect();
    if valid.is_empty() {
        return 0.0;
    }

    valid.sort_unstable_by(|a, b| a.total_cmp(b));
    let mid = valid.len() / 2;
    if valid.len() % 2 == 0 {
        (valid[mid - 1] + valid[mid]) / 2.0
    } else {
        valid[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::TempoSignals;

    struct FixedSignals(TempoSignals);

    impl TempoFeatures for FixedSignals {
        fn tempo_signals(&self, _buffer: &SampleBuffer) -> TempoSignals {
            self.0.clone()
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        let total = BEAT_TRACK_WEIGHT + TEMPOGRAM_WEIGHT + FRAME_MEDIAN_WEIGHT;
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_agreeing_methods() {
        let estimate = fuse_tempo([128.0, 128.0, 128.0]);
        assert_eq!(estimate.bpm, 128);
        assert_eq!(estimate.confidence, 1.0);
    }

    #[test]
    fn test_weighted_fusion_and_confidence() {
        // 0.3*120 + 0.5*124 + 0.2*118 = 121.6
        let estimate = fuse_tempo([120.0, 124.0, 118.0]);
        assert_eq!(estimate.bpm, 122);

        let mean: f64 = (120.0 + 124.0 + 118.0) / 3.0;
        let std = (((120.0 - mean).powi(2) + (124.0 - mean).powi(2) + (118.0 - mean).powi(2))
            / 3.0)
            .sqrt();
        assert!((estimate.confidence - (1.0 - std / mean)).abs() < 1e-12);
    }

    #[test]
    fn test_octave_disagreement_lowers_confidence() {
        let estimate = fuse_tempo([60.0, 120.0, 240.0]);
        assert!(estimate.confidence < 0.5);
        assert!(estimate.confidence >= 0.0);
    }

    #[test]
    fn test_invalid_tempos_are_excluded_from_confidence() {
        // 0.5*120 + 0.2*120 = 84
        let estimate = fuse_tempo([f64::NAN, 120.0, 120.0]);
        assert_eq!(estimate.bpm, 84);
        assert_eq!(estimate.confidence, 1.0);

        let estimate = fuse_tempo([0.0, 120.0, f64::INFINITY]);
        assert_eq!(estimate.bpm, 60);
        assert_eq!(estimate.confidence, 0.0);
    }

    #[test]
    fn test_all_zero() {
        let estimate = fuse_tempo([0.0, 0.0, 0.0]);
        assert_eq!(estimate.bpm, 0);
        assert_eq!(estimate.confidence, 0.0);
    }

    #[test]
    fn test_median_tempo_drops_empty_frames() {
        assert_eq!(median_tempo(&[0.0, 0.0, 120.0, 0.0, 124.0, 122.0]), 122.0);
        assert_eq!(median_tempo(&[0.0, 120.0, 124.0]), 122.0);
        assert_eq!(median_tempo(&[0.0, f64::NAN]), 0.0);
        assert_eq!(median_tempo(&[]), 0.0);
    }

    #[test]
    fn test_estimate_uses_frame_median() {
        let features = FixedSignals(TempoSignals {
            beat_track: 100.0,
            onset_tempogram: 100.0,
            frame_tempos: vec![0.0, 100.0, 100.0, 0.0, 100.0],
        });
        let buffer = SampleBuffer::new(vec![0.0; 16], 8000);
        let estimate = estimate_tempo(&features, &buffer);
        assert_eq!(estimate.bpm, 100);
        assert_eq!(estimate.confidence, 1.0);
    }

    #[test]
    fn test_estimate_is_deterministic() {
        let features = crate::dsp::SpectralFeatures::new();
        let samples: Vec<f32> = (0..8000 * 4)
            .map(|i| if i % 4000 < 40 { 0.7 } else { 0.0 })
            .collect();
        let buffer = SampleBuffer::new(samples, 8000);
        assert_eq!(
            estimate_tempo(&features, &buffer),
            estimate_tempo(&features, &buffer)
        );
    }
}
