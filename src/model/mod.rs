//! Data model shared by the decoder, the estimators and the result record

mod buffer;
mod key;
mod result;

pub use buffer::SampleBuffer;
pub use key::{Mode, PitchClass};
pub use result::{
    format_duration, AnalysisResult, KeyEstimate, SimpleResult, TempoEstimate, WaveformSummary,
};
