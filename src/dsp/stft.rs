//! Short-time Fourier transform over a mono buffer
//!
//! Frames are visited one at a time so callers can reduce each spectrum
//! on the fly instead of holding the whole spectrogram.

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

/// Windowed STFT with a fixed frame and hop size
pub struct Stft {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    hop: usize,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl Stft {
    /// Create an STFT with a periodic Hann window of `n_fft` samples
    pub fn new(n_fft: usize, hop: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(n_fft);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        Self {
            fft,
            window: hann_window(n_fft),
            hop: hop.max(1),
            buffer: vec![Complex::new(0.0, 0.0); n_fft],
            scratch,
        }
    }

    pub fn n_fft(&self) -> usize {
        self.window.len()
    }

    /// Number of non-negative frequency bins per frame
    pub fn bins(&self) -> usize {
        self.n_fft() / 2 + 1
    }

    /// Number of frames for a buffer of `len` samples
    ///
    /// A buffer shorter than one frame still yields a single zero-padded frame.
    pub fn frame_count(&self, len: usize) -> usize {
        if len == 0 {
            0
        } else if len <= self.n_fft() {
            1
        } else {
            (len - self.n_fft()) / self.hop + 1
        }
    }

    /// Call `visit(frame_index, spectrum)` for every frame
    ///
    /// `spectrum` holds the `bins()` non-negative frequency bins.
    pub fn for_each_frame<F>(&mut self, samples: &[f32], mut visit: F)
    where
        F: FnMut(usize, &[Complex<f32>]),
    {
        let n_fft = self.n_fft();
        let bins = self.bins();

        for frame in 0..self.frame_count(samples.len()) {
            let start = frame * self.hop;
            let end = (start + n_fft).min(samples.len());
            let chunk = &samples[start..end];

            for (i, slot) in self.buffer.iter_mut().enumerate() {
                let sample = chunk.get(i).copied().unwrap_or(0.0);
                *slot = Complex::new(sample * self.window[i], 0.0);
            }

            self.fft
                .process_with_scratch(&mut self.buffer, &mut self.scratch);
            visit(frame, &self.buffer[..bins]);
        }
    }
}

/// Periodic Hann window
pub fn hann_window(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f32 / len as f32).cos())
        .collect()
}
