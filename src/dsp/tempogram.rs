//! Autocorrelation tempogram of the onset envelope
//!
//! Each onset frame gets the autocorrelation of a Hann-windowed slice of the
//! envelope centred on it. Lags are converted to BPM with
//! `bpm = 60 * frame_rate / lag` and weighted by a log-normal prior around
//! 120 BPM before picking a peak.

use super::stft::hann_window;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Autocorrelation window in onset frames
pub const WIN_LENGTH: usize = 384;

/// Fastest tempo considered
pub const MAX_TEMPO_BPM: f64 = 320.0;

/// Centre of the tempo prior
pub const PRIOR_CENTER_BPM: f64 = 120.0;

/// Prior standard deviation in octaves
pub const PRIOR_STD_OCTAVES: f64 = 1.0;

const FFT_LEN: usize = 1024;
const EPSILON: f32 = 1e-10;

/// Per-frame normalized autocorrelation, `rows[frame][lag]`
#[derive(Debug, Clone)]
pub struct Tempogram {
    rows: Vec<Vec<f32>>,
    frame_rate: f64,
    /// Prior weight per lag, 0 for lags outside the tempo range
    prior: Vec<f32>,
}

impl Tempogram {
    /// Compute the tempogram of an onset envelope
    pub fn compute(onset: &[f32], frame_rate: f64) -> Self {
        let prior = tempo_prior(frame_rate);
        if onset.is_empty() || frame_rate <= 0.0 {
            return Self {
                rows: Vec::new(),
                frame_rate,
                prior,
            };
        }

        let window = hann_window(WIN_LENGTH);
        let mut planner = FftPlanner::<f32>::new();
        let forward = planner.plan_fft_forward(FFT_LEN);
        let inverse = planner.plan_fft_inverse(FFT_LEN);
        let mut buffer = vec![Complex::new(0.0f32, 0.0); FFT_LEN];
        let mut segment = vec![0.0f32; WIN_LENGTH];
        let half = WIN_LENGTH / 2;

        let rows = (0..onset.len())
            .map(|frame| {
                // Centred slice, zero outside the envelope
                for (i, slot) in segment.iter_mut().enumerate() {
                    *slot = (frame + i)
                        .checked_sub(half)
                        .and_then(|idx| onset.get(idx))
                        .copied()
                        .unwrap_or(0.0);
                }
                let mean = segment.iter().sum::<f32>() / WIN_LENGTH as f32;

                for (i, slot) in buffer.iter_mut().enumerate() {
                    let value = if i < WIN_LENGTH {
                        (segment[i] - mean) * window[i]
                    } else {
                        0.0
                    };
                    *slot = Complex::new(value, 0.0);
                }

                forward.process(&mut buffer);
                for bin in buffer.iter_mut() {
                    *bin = Complex::new(bin.norm_sqr(), 0.0);
                }
                inverse.process(&mut buffer);

                let zero_lag = buffer[0].re;
                if zero_lag <= EPSILON {
                    vec![0.0; WIN_LENGTH]
                } else {
                    buffer[..WIN_LENGTH]
                        .iter()
                        .map(|c| c.re / zero_lag)
                        .collect()
                }
            })
            .collect();

        Self {
            rows,
            frame_rate,
            prior,
        }
    }

    /// Number of frames
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Tempo of each frame, 0 where the frame has no periodicity
    pub fn frame_tempos(&self) -> Vec<f64> {
        self.rows.iter().map(|row| self.peak_tempo(row)).collect()
    }

    /// Tempo of the per-lag median across frames
    pub fn median_tempo(&self) -> f64 {
        let mut column = Vec::with_capacity(self.rows.len());
        let aggregated: Vec<f32> = (0..WIN_LENGTH)
            .map(|lag| {
                column.clear();
                column.extend(self.rows.iter().map(|row| row[lag]));
                median(&mut column)
            })
            .collect();
        self.peak_tempo(&aggregated)
    }

    /// Tempo of the per-lag mean across frames
    pub fn mean_tempo(&self) -> f64 {
        if self.rows.is_empty() {
            return 0.0;
        }
        let count = self.rows.len() as f32;
        let aggregated: Vec<f32> = (0..WIN_LENGTH)
            .map(|lag| self.rows.iter().map(|row| row[lag]).sum::<f32>() / count)
            .collect();
        self.peak_tempo(&aggregated)
    }

    /// Prior-weighted arg-max over lags, refined by parabolic interpolation
    fn peak_tempo(&self, autocorr: &[f32]) -> f64 {
        let weighted: Vec<f32> = autocorr
            .iter()
            .zip(&self.prior)
            .map(|(value, weight)| value * weight)
            .collect();

        let mut best_lag = 0;
        let mut best_value = EPSILON;
        for (lag, &value) in weighted.iter().enumerate() {
            if self.prior[lag] > 0.0 && value > best_value {
                best_lag = lag;
                best_value = value;
            }
        }
        if best_lag == 0 {
            return 0.0;
        }

        let mut lag = best_lag as f64;
        if best_lag + 1 < weighted.len() && self.prior[best_lag - 1] > 0.0 {
            let (a, b, c) = (
                weighted[best_lag - 1] as f64,
                weighted[best_lag] as f64,
                weighted[best_lag + 1] as f64,
            );
            let denom = a - 2.0 * b + c;
            if denom.abs() > f64::EPSILON {
                let offset = 0.5 * (a - c) / denom;
                if offset.abs() < 1.0 {
                    lag += offset;
                }
            }
        }

        60.0 * self.frame_rate / lag
    }
}

/// Log-normal prior per lag; lags faster than [`MAX_TEMPO_BPM`] get 0
fn tempo_prior(frame_rate: f64) -> Vec<f32> {
    (0..WIN_LENGTH)
        .map(|lag| {
            if lag == 0 || frame_rate <= 0.0 {
                return 0.0;
            }
            let bpm = 60.0 * frame_rate / lag as f64;
            if bpm > MAX_TEMPO_BPM {
                return 0.0;
            }
            let octaves = (bpm.log2() - PRIOR_CENTER_BPM.log2()) / PRIOR_STD_OCTAVES;
            (-0.5 * octaves * octaves).exp() as f32
        })
        .collect()
}

/// Median of a slice (mean of the two middle values for even lengths)
fn median(values: &mut [f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_unstable_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}
