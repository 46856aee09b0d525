//! Sample-rate conversion with rubato

use crate::error::DecodeError;
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

const SINC_LEN: usize = 128;

/// Convert mono samples from `from_rate` to `to_rate`
///
/// The whole buffer is processed as one chunk. The filter delay is trimmed
/// so the output lines up with the input and has exactly
/// `round(len * to_rate / from_rate)` samples.
pub fn resample(samples: Vec<f32>, from_rate: u32, to_rate: u32) -> Result<Vec<f32>, DecodeError> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples);
    }
    if from_rate == 0 || to_rate == 0 {
        return Err(DecodeError::Resample(format!(
            "invalid rates {} -> {}",
            from_rate, to_rate
        )));
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let expected = (samples.len() as f64 * ratio).round() as usize;

    let params = SincInterpolationParameters {
        sinc_len: SINC_LEN,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 128,
        window: WindowFunction::BlackmanHarris2,
    };

    // Zero tail flushes the filter delay out of the single chunk
    let mut padded = samples;
    padded.resize(padded.len() + SINC_LEN, 0.0);

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, padded.len(), 1)
        .map_err(|e| DecodeError::Resample(e.to_string()))?;
    let delay = resampler.output_delay();

    let waves_in = vec![padded];
    let waves_out = resampler
        .process(&waves_in, None)
        .map_err(|e| DecodeError::Resample(e.to_string()))?;

    let mut out = waves_out.into_iter().next().unwrap_or_default();
    out.drain(..delay.min(out.len()));
    out.resize(expected, 0.0);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine(freq: f32, rate: u32, secs: f32) -> Vec<f32> {
        (0..(rate as f32 * secs) as usize)
            .map(|i| (2.0 * PI * freq * i as f32 / rate as f32).sin())
            .collect()
    }

    #[test]
    fn test_same_rate_is_passthrough() {
        let input = sine(440.0, 8000, 0.1);
        let output = resample(input.clone(), 8000, 8000).unwrap();
        assert_eq!(input, output);
    }

    #[test]
    fn test_output_length_follows_ratio() {
        let up = resample(sine(440.0, 22050, 1.0), 22050, 44100).unwrap();
        assert_eq!(up.len(), 44100);

        let down = resample(sine(440.0, 44100, 1.0), 44100, 22050).unwrap();
        assert_eq!(down.len(), 22050);
    }

    #[test]
    fn test_resampled_tone_keeps_amplitude() {
        let out = resample(sine(440.0, 8000, 1.0), 8000, 16000).unwrap();
        // Skip the edges where the filter rings
        let middle = &out[2000..14000];
        let peak = middle.iter().map(|s| s.abs()).fold(0.0f32, f32::max);
        assert!(peak > 0.9 && peak < 1.1, "peak={}", peak);
    }

    #[test]
    fn test_zero_rate_is_rejected() {
        assert!(resample(vec![0.0; 10], 0, 44100).is_err());
    }
}
