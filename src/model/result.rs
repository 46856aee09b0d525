//! Result records produced by the analysis engine

use super::key::{Mode, PitchClass};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Fused tempo estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempoEstimate {
    /// Rounded beats per minute (0 when no method produced a tempo)
    pub bpm: u32,
    /// Agreement between the tempo methods, in [0, 1]
    pub confidence: f64,
}

/// Template-correlation key estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyEstimate {
    pub key: PitchClass,
    pub mode: Mode,
    /// Correlation mapped from [-1, 1] to [0, 1]
    pub confidence: f64,
}

impl KeyEstimate {
    /// `"<key> <mode>"`, e.g. `"A minor"`
    pub fn full_name(&self) -> String {
        format!("{} {}", self.key, self.mode)
    }
}

/// Downsampled amplitude envelope for visualization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveformSummary {
    #[serde(rename = "waveform")]
    pub samples: Vec<f32>,
    #[serde(rename = "waveform_samples")]
    pub count: usize,
    #[serde(rename = "original_samples")]
    pub original_count: usize,
    pub sample_rate: u32,
    pub downsampled: bool,
}

/// Complete analysis record for one file
///
/// Field names are the stable contract for serialization layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub bpm: u32,
    pub bpm_confidence: f64,
    pub key: PitchClass,
    pub mode: Mode,
    pub key_full: String,
    pub key_confidence: f64,
    pub song_name: String,
    /// True track length in seconds, not the analyzed prefix
    pub duration: f64,
    pub duration_formatted: String,
    pub bitrate: Option<u32>,
    pub bitrate_kbps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waveform: Option<WaveformSummary>,
    pub filename: String,
    pub filepath: String,
}

/// Reduced record with only the user-facing fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimpleResult<'a> {
    pub bpm: u32,
    pub bpm_confidence: f64,
    /// Full key name (`key_full` of the complete record)
    pub key: &'a str,
    pub key_confidence: f64,
    pub song_name: &'a str,
    pub duration: f64,
    pub duration_formatted: &'a str,
    pub bitrate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waveform: Option<&'a WaveformSummary>,
}

impl AnalysisResult {
    /// Build the record from the individual estimates
    ///
    /// Confidences are rounded to 3 decimals and the duration to 2;
    /// `duration_formatted` uses the unrounded duration.
    pub fn assemble(
        path: &Path,
        tempo: TempoEstimate,
        key: KeyEstimate,
        duration_secs: f64,
        song_name: String,
        bitrate: Option<u32>,
        waveform: Option<WaveformSummary>,
    ) -> Self {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            bpm: tempo.bpm,
            bpm_confidence: round_to(tempo.confidence.clamp(0.0, 1.0), 3),
            key: key.key,
            mode: key.mode,
            key_full: key.full_name(),
            key_confidence: round_to(key.confidence.clamp(0.0, 1.0), 3),
            song_name,
            duration: round_to(duration_secs, 2),
            duration_formatted: format_duration(duration_secs),
            bitrate,
            bitrate_kbps: bitrate,
            waveform,
            filename,
            filepath: path.display().to_string(),
        }
    }

    pub fn simple(&self) -> SimpleResult<'_> {
        SimpleResult {
            bpm: self.bpm,
            bpm_confidence: self.bpm_confidence,
            key: &self.key_full,
            key_confidence: self.key_confidence,
            song_name: &self.song_name,
            duration: self.duration,
            duration_formatted: &self.duration_formatted,
            bitrate: self.bitrate,
            waveform: self.waveform.as_ref(),
        }
    }
}

/// Format seconds as `M:SS`, truncating (not rounding) the seconds
pub fn format_duration(duration_secs: f64) -> String {
    let total = if duration_secs.is_finite() && duration_secs > 0.0 {
        duration_secs.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
