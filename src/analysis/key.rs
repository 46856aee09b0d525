//! Key estimation by template correlation
//!
//! The time-averaged chroma vector is correlated (Pearson) against the
//! Krumhansl-Schmuckler major and minor profiles rotated to all 12 tonics.

use crate::dsp::ChromaFeatures;
use crate::model::{KeyEstimate, Mode, PitchClass, SampleBuffer};

/// Krumhansl-Schmuckler major key profile, tonic first
pub const MAJOR_PROFILE: [f64; 12] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];

/// Krumhansl-Schmuckler minor key profile, tonic first
pub const MINOR_PROFILE: [f64; 12] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

/// Added to the chroma sum before normalizing
const NORMALIZATION_EPSILON: f64 = 1e-6;

/// Estimate the key of a buffer
pub fn estimate_key<F>(features: &F, buffer: &SampleBuffer) -> KeyEstimate
where
    F: ChromaFeatures + ?Sized,
{
    let frames = features.chromagram(buffer);
    let chroma = mean_chroma(&frames);
    let estimate = match_key(&chroma);

    log::debug!(
        "Key: {} ({} chroma frames, confidence {:.3})",
        estimate.full_name(),
        frames.len(),
        estimate.confidence
    );
    estimate
}

/// Average chroma over frames, L1-normalized with `sum + 1e-6`
pub fn mean_chroma(frames: &[[f32; 12]]) -> [f64; 12] {
    let mut mean = [0.0f64; 12];
    if frames.is_empty() {
        return mean;
    }

    for frame in frames {
        for (acc, &value) in mean.iter_mut().zip(frame) {
            *acc += value as f64;
        }
    }
    let count = frames.len() as f64;
    for value in mean.iter_mut() {
        *value /= count;
    }

    let total = mean.iter().sum::<f64>() + NORMALIZATION_EPSILON;
    for value in mean.iter_mut() {
        *value /= total;
    }
    mean
}

/// Best of the 24 rotated templates
///
/// Candidates are visited tonic C..B, major before minor; a later candidate
/// only wins with a strictly higher correlation.
pub fn match_key(chroma: &[f64; 12]) -> KeyEstimate {
    let mut best = KeyEstimate {
        key: PitchClass::C,
        mode: Mode::Major,
        confidence: 0.0,
    };
    let mut best_correlation = f64::NEG_INFINITY;

    for tonic in PitchClass::ALL {
        for (mode, profile) in [(Mode::Major, &MAJOR_PROFILE), (Mode::Minor, &MINOR_PROFILE)] {
            let rotated = rotate(profile, tonic.index());
            let r = pearson(chroma, &rotated);
            if r > best_correlation {
                best_correlation = r;
                best = KeyEstimate {
                    key: tonic,
                    mode,
                    confidence: ((r + 1.0) / 2.0).clamp(0.0, 1.0),
                };
            }
        }
    }

    best
}

/// Profile with its tonic moved to pitch class `tonic`
fn rotate(profile: &[f64; 12], tonic: usize) -> [f64; 12] {
    let mut rotated = [0.0; 12];
    for (i, slot) in rotated.iter_mut().enumerate() {
        *slot = profile[(i + 12 - tonic % 12) % 12];
    }
    rotated
}

/// Pearson correlation; 0 when either side has no variance
fn pearson(x: &[f64; 12], y: &[f64; 12]) -> f64 {
    let mean_x = x.iter().sum::<f64>() / 12.0;
    let mean_y = y.iter().sum::<f64>() / 12.0;

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denominator = (var_x * var_y).sqrt();
    if denominator > 0.0 && denominator.is_finite() {
        covariance / denominator
    } else {
        0.0
    }
}
