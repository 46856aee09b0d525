//! Waveform summary for visualization
//!
//! Long buffers are reduced to a fixed number of points by linear
//! interpolation at evenly spaced positions. No anti-aliasing is applied.

use crate::model::{SampleBuffer, WaveformSummary};

/// Reduce a buffer to at most `target` samples
pub fn sample_waveform(buffer: &SampleBuffer, target: usize) -> WaveformSummary {
    let samples = buffer.samples();
    let original_count = samples.len();

    if original_count <= target {
        return WaveformSummary {
            samples: samples.to_vec(),
            count: original_count,
            original_count,
            sample_rate: buffer.sample_rate(),
            downsampled: false,
        };
    }

    let points = interpolate_evenly(samples, target);
    log::debug!("Waveform: {} -> {} samples", original_count, points.len());

    WaveformSummary {
        count: points.len(),
        samples: points,
        original_count,
        sample_rate: buffer.sample_rate(),
        downsampled: true,
    }
}

/// Values at `count` positions evenly spaced over `[0, len - 1]`
fn interpolate_evenly(samples: &[f32], count: usize) -> Vec<f32> {
    let last = samples.len().saturating_sub(1);
    if count == 0 || samples.is_empty() {
        return Vec::new();
    }
    if count == 1 {
        return vec![samples[0]];
    }

    let step = last as f64 / (count - 1) as f64;
    (0..count)
        .map(|i| {
            let position = i as f64 * step;
            let left = (position.floor() as usize).min(last);
            let right = (left + 1).min(last);
            let frac = (position - left as f64) as f32;
            samples[left] + (samples[right] - samples[left]) * frac
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_buffer_is_downsampled() {
        let samples: Vec<f32> = (0..100_000).map(|i| (i % 100) as f32 / 100.0).collect();
        let summary = sample_waveform(&SampleBuffer::new(samples, 44100), 5000);

        assert_eq!(summary.samples.len(), 5000);
        assert_eq!(summary.count, 5000);
        assert_eq!(summary.original_count, 100_000);
        assert_eq!(summary.sample_rate, 44100);
        assert!(summary.downsampled);
    }

    #[test]
    fn test_short_buffer_is_copied() {
        let samples: Vec<f32> = (0..2000).map(|i| i as f32).collect();
        let summary = sample_waveform(&SampleBuffer::new(samples.clone(), 22050), 5000);

        assert_eq!(summary.samples, samples);
        assert_eq!(summary.count, 2000);
        assert_eq!(summary.original_count, 2000);
        assert!(!summary.downsampled);
    }

    #[test]
    fn test_interpolation_hits_endpoints_and_midpoints() {
        let ramp: Vec<f32> = (0..11).map(|i| i as f32).collect();
        let points = interpolate_evenly(&ramp, 3);
        assert_eq!(points, vec![0.0, 5.0, 10.0]);

        let points = interpolate_evenly(&[0.0, 1.0, 0.0], 2);
        assert_eq!(points, vec![0.0, 0.0]);

        // Positions 0, 0.5, 1.0, 1.5, 2.0
        let points = interpolate_evenly(&[0.0, 1.0, 0.0], 5);
        assert_eq!(points, vec![0.0, 0.5, 1.0, 0.5, 0.0]);
    }

    #[test]
    fn test_degenerate_targets() {
        let buffer = SampleBuffer::new(vec![0.25, 0.5, 0.75], 8000);
        let summary = sample_waveform(&buffer, 1);
        assert_eq!(summary.samples, vec![0.25]);
        assert!(summary.downsampled);

        let summary = sample_waveform(&buffer, 0);
        assert!(summary.samples.is_empty());
        assert_eq!(summary.count, 0);
    }
}
