//! Analyzer trait

use super::config::AnalysisOptions;
use crate::error::AnalysisError;
use crate::model::AnalysisResult;
use std::path::Path;

/// Audio analyzer trait - allows swapping the decoding and feature backends
pub trait AudioAnalyzer {
    /// Analyze one audio file
    ///
    /// Fails only when the file cannot be read or decoded; every other
    /// shortfall degrades to defaults inside the result.
    fn analyze(&self, path: &Path, options: &AnalysisOptions) -> Result<AnalysisResult, AnalysisError>;
}
