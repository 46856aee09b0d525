//! Audio analysis layer
//!
//! Estimators (tempo, key, waveform, duration) are plain functions over a
//! decoded buffer; [`Analyzer`] wires them to the I/O collaborators behind
//! the [`AudioAnalyzer`] trait.

mod analyzer;
mod config;
mod duration;
mod key;
mod tempo;
mod tiers;
mod traits;
mod waveform;

pub use analyzer::Analyzer;
pub use config::{AnalysisOptions, ResolvedOptions};
pub use duration::{reconcile_duration, CAP_TOLERANCE_SECS};
pub use key::{estimate_key, match_key, mean_chroma, MAJOR_PROFILE, MINOR_PROFILE};
pub use tempo::{
    estimate_tempo, fuse_tempo, median_tempo, BEAT_TRACK_WEIGHT, FRAME_MEDIAN_WEIGHT,
    TEMPOGRAM_WEIGHT,
};
pub use tiers::{Tier, TierParams, LARGE_TIER_CAP_SECS, MIB};
pub use traits::AudioAnalyzer;
pub use waveform::sample_waveform;
