//! Decoding to mono f32 samples using symphonia

use super::resample::resample;
use super::{first_audio_track, open_format, OpenFailure};
use crate::error::DecodeError;
use crate::model::SampleBuffer;
use std::path::Path;
use symphonia::core::audio::SampleBuffer as InterleavedBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;

/// Decode primitive: `(file, target_rate, max_duration?) -> SampleBuffer`
pub trait AudioDecoder {
    /// Decode `path` to mono samples
    ///
    /// `target_rate` of `None` keeps the file's native rate. `max_duration`
    /// (seconds) bounds how much of the file is read.
    fn decode(
        &self,
        path: &Path,
        target_rate: Option<u32>,
        max_duration: Option<f64>,
    ) -> Result<SampleBuffer, DecodeError>;
}

/// Symphonia-backed decoder, resampling with rubato when needed
#[derive(Debug, Clone, Copy, Default)]
pub struct SymphoniaDecoder;

impl SymphoniaDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl AudioDecoder for SymphoniaDecoder {
    fn decode(
        &self,
        path: &Path,
        target_rate: Option<u32>,
        max_duration: Option<f64>,
    ) -> Result<SampleBuffer, DecodeError> {
        let (samples, native_rate) = decode_to_mono(path, max_duration)?;

        log::debug!(
            "Decoded {} samples ({:.1}s) at {}Hz from {:?}",
            samples.len(),
            samples.len() as f64 / native_rate as f64,
            native_rate,
            path
        );

        match target_rate {
            Some(rate) if rate != native_rate => {
                let resampled = resample(samples, native_rate, rate)?;
                log::debug!("Resampled {}Hz -> {}Hz ({} samples)", native_rate, rate, resampled.len());
                Ok(SampleBuffer::new(resampled, rate))
            }
            _ => Ok(SampleBuffer::new(samples, native_rate)),
        }
    }
}

/// Decode audio file to mono f32 samples at the native rate
fn decode_to_mono(path: &Path, max_duration: Option<f64>) -> Result<(Vec<f32>, u32), DecodeError> {
    let mut format = open_format(path).map_err(|failure| match failure {
        OpenFailure::Io(source) => DecodeError::Io {
            path: path.to_path_buf(),
            source,
        },
        OpenFailure::Format(e) => DecodeError::UnsupportedFormat(e.to_string()),
    })?;

    let track = first_audio_track(format.as_ref()).ok_or(DecodeError::NoAudioTrack)?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or(DecodeError::MissingSampleRate)?;

    let dec_opts = DecoderOptions::default();
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &dec_opts)
        .map_err(|e| DecodeError::Codec(e.to_string()))?;

    let max_samples = max_duration
        .filter(|secs| secs.is_finite() && *secs > 0.0)
        .map(|secs| (secs * sample_rate as f64).ceil() as usize);

    let mut all_samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => {
                log::warn!("Error reading packet: {:?}", e);
                break;
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(e) => {
                log::warn!("Error decoding packet: {:?}", e);
                continue;
            }
        };

        let spec = *decoded.spec();
        let duration = decoded.capacity() as u64;

        let mut sample_buf = InterleavedBuffer::<f32>::new(duration, spec);
        sample_buf.copy_interleaved_ref(decoded);

        let samples = sample_buf.samples();

        // Downmix by averaging channels
        let channels = spec.channels.count();
        if channels > 1 {
            for chunk in samples.chunks(channels) {
                let mono: f32 = chunk.iter().sum::<f32>() / channels as f32;
                all_samples.push(mono);
            }
        } else {
            all_samples.extend_from_slice(samples);
        }

        if let Some(limit) = max_samples {
            if all_samples.len() >= limit {
                all_samples.truncate(limit);
                break;
            }
        }
    }

    if all_samples.is_empty() {
        return Err(DecodeError::Empty);
    }

    Ok((all_samples, sample_rate))
}
