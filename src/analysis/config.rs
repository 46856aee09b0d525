//! Analysis options

use super::tiers::TierParams;

/// Caller options for one analysis
///
/// Unset fields fall back to the file's size tier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisOptions {
    /// Produce a waveform summary (unset: tier default)
    pub include_waveform: Option<bool>,

    /// Analysis sample rate in Hz
    pub sample_rate: Option<u32>,

    /// Decode at most this many seconds; a non-positive value disables the cap
    pub max_duration: Option<f64>,

    /// Waveform length
    pub waveform_samples: Option<usize>,
}

/// Options after tier defaults have been applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedOptions {
    pub sample_rate: u32,
    pub max_duration: Option<f64>,
    pub include_waveform: bool,
    pub waveform_samples: usize,
}

impl AnalysisOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request or suppress the waveform summary
    pub fn with_waveform(mut self, include: bool) -> Self {
        self.include_waveform = Some(include);
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    /// Set the decode cap; `0` or less analyzes the whole file
    pub fn with_max_duration(mut self, secs: f64) -> Self {
        self.max_duration = Some(secs);
        self
    }

    pub fn with_waveform_samples(mut self, samples: usize) -> Self {
        self.waveform_samples = Some(samples);
        self
    }

    /// Apply these options on top of a tier's defaults
    pub fn resolve(&self, tier: &TierParams) -> ResolvedOptions {
        let max_duration = match self.max_duration {
            Some(secs) if secs.is_finite() && secs > 0.0 => Some(secs),
            Some(_) => None,
            None => tier.max_duration,
        };

        ResolvedOptions {
            sample_rate: self
                .sample_rate
                .filter(|rate| *rate > 0)
                .unwrap_or(tier.sample_rate),
            max_duration,
            include_waveform: self.include_waveform.unwrap_or(tier.include_waveform),
            waveform_samples: self.waveform_samples.unwrap_or(tier.waveform_samples),
        }
    }
}
