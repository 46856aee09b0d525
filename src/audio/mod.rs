//! Audio I/O collaborators
//!
//! Everything the engine needs from a file before any estimation runs:
//! - decoding to a mono [`SampleBuffer`](crate::model::SampleBuffer)
//! - container length probing without loading samples
//! - best-effort tag metadata (title, bitrate, duration hint)
//!
//! Each concern sits behind a trait so the orchestrator can be driven by
//! alternative implementations (or fakes in tests).

mod decoder;
mod metadata;
mod probe;
mod resample;

pub use decoder::{AudioDecoder, SymphoniaDecoder};
pub use metadata::{normalize_bitrate, MetadataResolver, TagReader, TrackMetadata};
pub use probe::{ContainerProbe, DurationProbe};
pub use resample::resample;

use std::path::Path;
use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::formats::{FormatOptions, FormatReader, Track};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Why a container could not be opened
pub(crate) enum OpenFailure {
    Io(std::io::Error),
    Format(symphonia::core::errors::Error),
}

/// Open a file and probe its container format
pub(crate) fn open_format(path: &Path) -> Result<Box<dyn FormatReader>, OpenFailure> {
    let file = std::fs::File::open(path).map_err(OpenFailure::Io)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension() {
        hint.with_extension(ext.to_str().unwrap_or(""));
    }

    let format_opts = FormatOptions::default();
    let metadata_opts = MetadataOptions::default();

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &format_opts, &metadata_opts)
        .map_err(OpenFailure::Format)?;

    Ok(probed.format)
}

/// First track with a real codec
pub(crate) fn first_audio_track(format: &dyn FormatReader) -> Option<&Track> {
    format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
}
