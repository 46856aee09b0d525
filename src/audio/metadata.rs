//! Tag metadata: title, bitrate and the tag-declared duration

use lofty::file::{AudioFile, TaggedFile, TaggedFileExt};
use lofty::tag::{ItemKey, TagType};
use std::path::Path;

/// Best-effort metadata for one file
///
/// Every field is optional; unreadable tags never fail an analysis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackMetadata {
    /// Embedded title, or the filename stem when no tag carries one
    pub title: Option<String>,
    /// Normalized to kbps
    pub bitrate_kbps: Option<u32>,
    /// Length declared by the tag/header layer (the "hint")
    pub duration_secs: Option<f64>,
}

/// Metadata primitive: `(file) -> TrackMetadata`
pub trait MetadataResolver {
    fn resolve(&self, path: &Path) -> TrackMetadata;
}

/// Tag lookup order for the title, before falling back to any tag
const TITLE_TAG_PRIORITY: [TagType; 4] = [
    TagType::Id3v2,
    TagType::VorbisComments,
    TagType::Mp4Ilst,
    TagType::Ape,
];

/// lofty-backed metadata reader
#[derive(Debug, Clone, Copy, Default)]
pub struct TagReader;

impl TagReader {
    pub fn new() -> Self {
        Self
    }
}

impl MetadataResolver for TagReader {
    fn resolve(&self, path: &Path) -> TrackMetadata {
        let tagged = match lofty::read_from_path(path) {
            Ok(file) => Some(file),
            Err(e) => {
                log::debug!("No readable tags in {:?}: {}", path, e);
                None
            }
        };

        let title = tagged
            .as_ref()
            .and_then(embedded_title)
            .or_else(|| filename_title(path));

        let (bitrate_kbps, duration_secs) = match &tagged {
            Some(file) => {
                let props = file.properties();
                let bitrate = props
                    .audio_bitrate()
                    .or(props.overall_bitrate())
                    .and_then(normalize_bitrate);
                let secs = props.duration().as_secs_f64();
                (bitrate, (secs > 0.0).then_some(secs))
            }
            None => (None, None),
        };

        TrackMetadata {
            title,
            bitrate_kbps,
            duration_secs,
        }
    }
}

/// Normalize a raw bitrate to kbps
///
/// Values above 1000 are taken to be bits per second and truncated to kbps.
/// Zero means unknown.
pub fn normalize_bitrate(raw: u32) -> Option<u32> {
    match raw {
        0 => None,
        r if r > 1000 => Some(r / 1000),
        r => Some(r),
    }
}

fn embedded_title(file: &TaggedFile) -> Option<String> {
    TITLE_TAG_PRIORITY
        .iter()
        .filter_map(|tag_type| file.tag(*tag_type))
        .chain(file.tags().iter())
        .find_map(|tag| {
            tag.get_string(&ItemKey::TrackTitle)
                .map(str::trim)
                .filter(|title| !title.is_empty())
                .map(str::to_string)
        })
}

fn filename_title(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lofty::config::WriteOptions;
    use lofty::tag::{Tag, TagExt};
    use tempfile::TempDir;

    #[test]
    fn test_normalize_bitrate() {
        assert_eq!(normalize_bitrate(320), Some(320));
        assert_eq!(normalize_bitrate(1000), Some(1000));
        assert_eq!(normalize_bitrate(320_000), Some(320));
        assert_eq!(normalize_bitrate(128_999), Some(128));
        assert_eq!(normalize_bitrate(0), None);
    }

    #[test]
    fn test_unreadable_file_falls_back_to_stem() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Some Artist - Some Song.mp3");
        std::fs::write(&path, b"not audio").unwrap();

        let meta = TagReader::new().resolve(&path);
        assert_eq!(meta.title.as_deref(), Some("Some Artist - Some Song"));
        assert_eq!(meta.bitrate_kbps, None);
        assert_eq!(meta.duration_secs, None);
    }

    /// Two seconds of 8 kHz 16-bit silence
    fn write_silent_wav(path: &Path) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for _ in 0..16000 {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn save_title(path: &Path, tag_type: TagType, title: &str) {
        let mut tag = Tag::new(tag_type);
        tag.insert_text(ItemKey::TrackTitle, title.to_string());
        tag.save_to_path(path, WriteOptions::default()).unwrap();
    }

    #[test]
    fn test_id3v2_title_preferred_over_riff_info() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stem_name.wav");
        write_silent_wav(&path);
        save_title(&path, TagType::RiffInfo, "Riff Title");
        save_title(&path, TagType::Id3v2, "Id3 Title");

        let meta = TagReader::new().resolve(&path);
        assert_eq!(meta.title.as_deref(), Some("Id3 Title"));
    }

    #[test]
    fn test_title_from_any_tag_when_no_preferred_tag() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stem_name.wav");
        write_silent_wav(&path);
        save_title(&path, TagType::RiffInfo, "Riff Title");

        let meta = TagReader::new().resolve(&path);
        assert_eq!(meta.title.as_deref(), Some("Riff Title"));
    }

    #[test]
    fn test_untagged_wav_reports_properties() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("untitled.wav");
        write_silent_wav(&path);

        let meta = TagReader::new().resolve(&path);
        assert_eq!(meta.title.as_deref(), Some("untitled"));
        assert_eq!(meta.bitrate_kbps, Some(128));
        let secs = meta.duration_secs.unwrap();
        assert!((secs - 2.0).abs() < 0.01, "duration={}", secs);
    }
}
