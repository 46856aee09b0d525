//! Chromagram: spectral energy folded onto the 12 pitch classes

use super::stft::Stft;
use crate::model::SampleBuffer;

pub const CHROMA_N_FFT: usize = 2048;
pub const CHROMA_HOP: usize = 512;

/// Lowest folded frequency (C1)
const MIN_FREQ: f64 = 32.70;
/// Highest folded frequency (C8)
const MAX_FREQ: f64 = 4186.01;
/// Octave weighting centre (C5) and width in octaves
const OCTAVE_CENTER_HZ: f64 = 523.25;
const OCTAVE_WIDTH: f64 = 2.0;

const EPSILON: f32 = 1e-10;

/// One chroma vector per STFT frame, each normalized by its maximum
///
/// Frames without energy stay all-zero.
pub fn chromagram(buffer: &SampleBuffer) -> Vec<[f32; 12]> {
    let mut stft = Stft::new(CHROMA_N_FFT, CHROMA_HOP);
    let bin_map = pitch_class_map(buffer.sample_rate(), CHROMA_N_FFT);
    let mut frames = Vec::with_capacity(stft.frame_count(buffer.len()));

    stft.for_each_frame(buffer.samples(), |_, spectrum| {
        let mut chroma = [0.0f32; 12];
        for &(bin, pitch_class, weight) in &bin_map {
            chroma[pitch_class] += weight * spectrum[bin].norm_sqr();
        }

        let peak = chroma.iter().cloned().fold(0.0f32, f32::max);
        if peak > EPSILON {
            for value in chroma.iter_mut() {
                *value /= peak;
            }
        } else {
            chroma = [0.0; 12];
        }
        frames.push(chroma);
    });

    log::debug!("Chromagram: {} frames", frames.len());
    frames
}

/// `(bin, pitch_class, octave_weight)` for every bin in the folded range
fn pitch_class_map(sample_rate: u32, n_fft: usize) -> Vec<(usize, usize, f32)> {
    if sample_rate == 0 {
        return Vec::new();
    }
    let nyquist = sample_rate as f64 / 2.0;
    let max_freq = MAX_FREQ.min(nyquist);

    (1..=n_fft / 2)
        .filter_map(|bin| {
            let freq = bin as f64 * sample_rate as f64 / n_fft as f64;
            if freq < MIN_FREQ || freq > max_freq {
                return None;
            }
            // Semitones from A4, shifted so C = 0
            let semitones = (12.0 * (freq / 440.0).log2()).round() as i64;
            let pitch_class = (semitones + 9).rem_euclid(12) as usize;

            let octaves = (freq / OCTAVE_CENTER_HZ).log2() / OCTAVE_WIDTH;
            let weight = (-0.5 * octaves * octaves).exp() as f32;
            Some((bin, pitch_class, weight))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn tone(freqs: &[f32], sample_rate: u32, secs: f32) -> SampleBuffer {
        let len = (sample_rate as f32 * secs) as usize;
        let samples = (0..len)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                freqs.iter().map(|f| (2.0 * PI * f * t).sin()).sum::<f32>() * 0.2
            })
            .collect();
        SampleBuffer::new(samples, sample_rate)
    }

    fn dominant(frame: &[f32; 12]) -> usize {
        frame
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap()
    }

    #[test]
    fn test_a440_maps_to_a() {
        let frames = chromagram(&tone(&[440.0], 22050, 1.0));
        assert!(!frames.is_empty());
        for frame in &frames {
            assert_eq!(dominant(frame), 9);
            assert_eq!(frame[9], 1.0);
        }
    }

    #[test]
    fn test_middle_c_maps_to_c() {
        let frames = chromagram(&tone(&[261.63], 8000, 1.0));
        assert!(frames.iter().all(|f| dominant(f) == 0));
    }

    #[test]
    fn test_silence_gives_zero_frames() {
        let frames = chromagram(&SampleBuffer::new(vec![0.0; 4096], 44100));
        assert_eq!(frames.len(), 5);
        assert!(frames.iter().all(|f| f.iter().all(|&v| v == 0.0)));
    }

    #[test]
    fn test_pitch_class_map_respects_nyquist() {
        let map = pitch_class_map(8000, 2048);
        let top = map.iter().map(|&(bin, _, _)| bin).max().unwrap();
        assert!(top as f64 * 8000.0 / 2048.0 <= 4000.0);
        assert!(map.iter().all(|&(_, pc, w)| pc < 12 && w > 0.0 && w <= 1.0));
    }
}
