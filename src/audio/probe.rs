//! Container length probing without decoding samples

use super::{first_audio_track, open_format, OpenFailure};
use crate::error::ProbeError;
use std::path::Path;
use symphonia::core::codecs::CodecParameters;
use symphonia::core::errors::Error as SymphoniaError;

/// Length probe primitive: `(file) -> seconds`
pub trait DurationProbe {
    fn probe_duration(&self, path: &Path) -> Result<f64, ProbeError>;
}

/// Reads the length declared by the container, scanning packet
/// timestamps when no frame count is declared
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerProbe;

impl ContainerProbe {
    pub fn new() -> Self {
        Self
    }
}

impl DurationProbe for ContainerProbe {
    fn probe_duration(&self, path: &Path) -> Result<f64, ProbeError> {
        let mut format = open_format(path).map_err(|failure| match failure {
            OpenFailure::Io(source) => ProbeError::Io {
                path: path.to_path_buf(),
                source,
            },
            OpenFailure::Format(e) => ProbeError::Unsupported(e.to_string()),
        })?;

        let track = first_audio_track(format.as_ref())
            .ok_or_else(|| ProbeError::Unsupported("no audio track".to_string()))?;
        let track_id = track.id;
        let params = track.codec_params.clone();

        if let Some(secs) = params.n_frames.and_then(|n| frames_to_secs(&params, n)) {
            return Ok(secs);
        }

        // No declared frame count: sum the packet durations
        let mut total: u64 = 0;
        loop {
            match format.next_packet() {
                Ok(packet) => {
                    if packet.track_id() == track_id {
                        total += packet.dur();
                    }
                }
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    break;
                }
                Err(e) => return Err(ProbeError::Unsupported(e.to_string())),
            }
        }

        frames_to_secs(&params, total).ok_or(ProbeError::UnknownLength)
    }
}

fn frames_to_secs(params: &CodecParameters, frames: u64) -> Option<f64> {
    let secs = if let Some(tb) = params.time_base {
        let time = tb.calc_time(frames);
        time.seconds as f64 + time.frac
    } else {
        frames as f64 / params.sample_rate? as f64
    };

    (secs.is_finite() && secs > 0.0).then_some(secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_probe_wav_length() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("silence.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..(8000 * 5 / 2) {
            writer.write_sample(0i16).unwrap();
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let secs = ContainerProbe::new().probe_duration(&path).unwrap();
        assert!((secs - 2.5).abs() < 1e-6, "duration={}", secs);
    }

    #[test]
    fn test_probe_missing_file() {
        let result = ContainerProbe::new().probe_duration(Path::new("/nonexistent/song.flac"));
        assert!(matches!(result, Err(ProbeError::Io { .. })));
    }

    #[test]
    fn test_probe_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("junk.wav");
        std::fs::write(&path, [0u8; 64]).unwrap();

        assert!(ContainerProbe::new().probe_duration(&path).is_err());
    }
}
