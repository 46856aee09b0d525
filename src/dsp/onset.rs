//! Onset strength envelope (spectral flux on log-compressed magnitudes)

use super::stft::Stft;
use crate::model::SampleBuffer;

/// Log compression: `ln(1 + GAMMA * |X|)`
const LOG_COMPRESSION: f32 = 100.0;

/// Target onset frame rate; the hop is the largest power of two at or below
/// `sample_rate / TARGET_FRAME_RATE`
const TARGET_FRAME_RATE: u32 = 86;

/// Onset strength per STFT frame
#[derive(Debug, Clone, PartialEq)]
pub struct OnsetEnvelope {
    pub values: Vec<f32>,
    /// Frames per second
    pub frame_rate: f64,
}

/// Onset hop for a sample rate: 512 at 44.1 kHz, 256 at 22.05 kHz
pub fn onset_hop(sample_rate: u32) -> usize {
    let target = (sample_rate / TARGET_FRAME_RATE).max(1) as usize;
    let mut hop = 1usize;
    while hop * 2 <= target {
        hop *= 2;
    }
    hop
}

/// Compute the onset envelope of a buffer
///
/// Each value is the mean positive first difference of log-magnitude
/// across frequency bins. The first frame has no predecessor and is 0.
pub fn onset_envelope(buffer: &SampleBuffer) -> OnsetEnvelope {
    let hop = onset_hop(buffer.sample_rate());
    let frame_rate = if buffer.sample_rate() == 0 {
        0.0
    } else {
        buffer.sample_rate() as f64 / hop as f64
    };

    let mut stft = Stft::new(hop * 4, hop);
    let bins = stft.bins();
    let mut values = Vec::with_capacity(stft.frame_count(buffer.len()));
    let mut previous = vec![0.0f32; bins];
    let mut current = vec![0.0f32; bins];

    stft.for_each_frame(buffer.samples(), |frame, spectrum| {
        for (slot, bin) in current.iter_mut().zip(spectrum) {
            *slot = (1.0 + LOG_COMPRESSION * bin.norm()).ln();
        }

        let flux = if frame == 0 {
            0.0
        } else {
            let rise: f32 = current
                .iter()
                .zip(&previous)
                .map(|(cur, prev)| (cur - prev).max(0.0))
                .sum();
            rise / bins as f32
        };
        values.push(flux);

        std::mem::swap(&mut previous, &mut current);
    });

    log::debug!(
        "Onset envelope: {} frames at {:.2} fps (hop {})",
        values.len(),
        frame_rate,
        hop
    );

    OnsetEnvelope { values, frame_rate }
}
