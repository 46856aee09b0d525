//! Analysis orchestrator
//!
//! Size tier -> metadata -> decode -> duration -> tempo, key, waveform -> record.

use super::config::AnalysisOptions;
use super::duration::reconcile_duration;
use super::key::estimate_key;
use super::tempo::estimate_tempo;
use super::tiers::TierParams;
use super::traits::AudioAnalyzer;
use super::waveform::sample_waveform;
use crate::audio::{
    AudioDecoder, ContainerProbe, DurationProbe, MetadataResolver, SymphoniaDecoder, TagReader,
};
use crate::dsp::{ChromaFeatures, SpectralFeatures, TempoFeatures};
use crate::error::AnalysisError;
use crate::model::AnalysisResult;
use std::path::Path;

/// Audio analyzer composed of a decoder, a metadata reader, a length probe
/// and a feature extractor
///
/// Holds no per-call state; one instance can serve many threads.
#[derive(Debug, Clone, Default)]
pub struct Analyzer<
    D = SymphoniaDecoder,
    M = TagReader,
    P = ContainerProbe,
    F = SpectralFeatures,
> {
    decoder: D,
    metadata: M,
    probe: P,
    features: F,
}

impl Analyzer {
    /// Analyzer with the built-in symphonia, lofty and rustfft backends
    pub fn new() -> Self {
        Self::default()
    }
}

impl<D, M, P, F> Analyzer<D, M, P, F> {
    pub fn with_components(decoder: D, metadata: M, probe: P, features: F) -> Self {
        Self {
            decoder,
            metadata,
            probe,
            features,
        }
    }

    /// Swap the feature extractor, keeping the I/O components
    pub fn with_features<G>(self, features: G) -> Analyzer<D, M, P, G> {
        Analyzer {
            decoder: self.decoder,
            metadata: self.metadata,
            probe: self.probe,
            features,
        }
    }
}

impl<D, M, P, F> AudioAnalyzer for Analyzer<D, M, P, F>
where
    D: AudioDecoder,
    M: MetadataResolver,
    P: DurationProbe,
    F: TempoFeatures + ChromaFeatures,
{
    fn analyze(&self, path: &Path, options: &AnalysisOptions) -> Result<AnalysisResult, AnalysisError> {
        log::debug!("Analyzing: {:?}", path);

        let file_size = std::fs::metadata(path)
            .map_err(|source| AnalysisError::Unreadable {
                path: path.to_path_buf(),
                source,
            })?
            .len();

        let tier = TierParams::for_file_size(file_size);
        let resolved = options.resolve(&tier);
        log::debug!(
            "{} bytes -> {:?} tier: {}Hz, cap {:?}, waveform {} ({} samples)",
            file_size,
            tier.tier,
            resolved.sample_rate,
            resolved.max_duration,
            resolved.include_waveform,
            resolved.waveform_samples
        );

        let metadata = self.metadata.resolve(path);

        let buffer = self
            .decoder
            .decode(path, Some(resolved.sample_rate), resolved.max_duration)?;

        let duration = reconcile_duration(
            metadata.duration_secs,
            resolved.max_duration,
            &buffer,
            || self.probe.probe_duration(path),
            || {
                self.decoder
                    .decode(path, None, None)
                    .map(|full| full.duration_secs())
            },
        );

        let tempo = estimate_tempo(&self.features, &buffer);
        let key = estimate_key(&self.features, &buffer);
        let waveform = resolved
            .include_waveform
            .then(|| sample_waveform(&buffer, resolved.waveform_samples));

        let song_name = metadata
            .title
            .or_else(|| {
                path.file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
            })
            .unwrap_or_default();

        let result = AnalysisResult::assemble(
            path,
            tempo,
            key,
            duration,
            song_name,
            metadata.bitrate_kbps,
            waveform,
        );

        log::info!(
            "Analysis complete: {:?} BPM={} ({:.2}), Key={} ({:.2}), {}",
            path,
            result.bpm,
            result.bpm_confidence,
            result.key_full,
            result.key_confidence,
            result.duration_formatted
        );

        Ok(result)
    }
}
