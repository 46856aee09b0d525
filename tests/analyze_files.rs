use std::f64::consts::PI;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use track_analyzer::analysis::MIB;
use track_analyzer::model::PitchClass;
use track_analyzer::{analyze, AnalysisError, AnalysisOptions};

/// Write a 16-bit mono WAV whose samples come from `signal(t)`
fn write_wav<F>(path: &Path, sample_rate: u32, secs: f64, signal: F)
where
    F: Fn(f64) -> f64,
{
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    let frames = (secs * sample_rate as f64).round() as usize;
    for i in 0..frames {
        let value = signal(i as f64 / sample_rate as f64).clamp(-1.0, 1.0);
        writer.write_sample((value * i16::MAX as f64) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

/// C major chord (C4 E4 G4 C5) re-struck every half second
fn pulsing_c_major(t: f64) -> f64 {
    let since_beat = t % 0.5;
    let mut envelope = 0.2 + 0.8 * (-since_beat / 0.08).exp();
    if since_beat < 0.004 {
        envelope *= since_beat / 0.004;
    }
    let chord: f64 = [261.63, 329.63, 392.0, 523.25]
        .iter()
        .map(|f| (2.0 * PI * f * t).sin())
        .sum();
    envelope * 0.2 * chord
}

fn fixture(dir: &TempDir, name: &str, sample_rate: u32, secs: f64) -> PathBuf {
    let path = dir.path().join(name);
    write_wav(&path, sample_rate, secs, pulsing_c_major);
    path
}

#[test]
fn test_end_to_end_tempo_key_duration() {
    let dir = TempDir::new().unwrap();
    // 3:45 at 8 kHz / 16 bit = 128 kbps
    let path = fixture(&dir, "tone_120bpm_c_major.wav", 8000, 225.0);

    let options = AnalysisOptions::new()
        .with_sample_rate(8000)
        .with_max_duration(30.0);
    let result = analyze(&path, &options).unwrap();

    assert!(
        (result.bpm as i64 - 120).abs() <= 3,
        "bpm {} (confidence {})",
        result.bpm,
        result.bpm_confidence
    );
    assert_eq!(result.key_full, "C major");
    assert_eq!(result.key, PitchClass::C);
    assert_eq!(result.duration_formatted, "3:45");
    assert!((result.duration - 225.0).abs() < 0.01);
    assert_eq!(result.bitrate, Some(128));
    assert_eq!(result.song_name, "tone_120bpm_c_major");
    assert_eq!(result.filename, "tone_120bpm_c_major.wav");

    assert!((0.0..=1.0).contains(&result.bpm_confidence));
    assert!((0.0..=1.0).contains(&result.key_confidence));
    assert!(result.bpm_confidence > 0.9);
}

#[test]
fn test_end_to_end_with_tier_defaults() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "tone_default_tier.wav", 8000, 225.0);
    let size = std::fs::metadata(&path).unwrap().len();
    assert!(size > 3 * MIB && size <= 5 * MIB);

    // Medium tier: resampled to 22050 Hz, whole file analyzed
    let result = analyze(&path, &AnalysisOptions::new()).unwrap();

    assert!((result.bpm as i64 - 120).abs() <= 3, "bpm {}", result.bpm);
    assert_eq!(result.key_full, "C major");
    assert_eq!(result.duration_formatted, "3:45");
    assert_eq!(result.bitrate, Some(128));

    let waveform = result.waveform.as_ref().expect("medium files include a waveform");
    assert_eq!(waveform.sample_rate, 22050);
    assert_eq!(waveform.count, 5000);
}

#[test]
fn test_small_file_defaults() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "short.wav", 44100, 8.0);
    assert!(std::fs::metadata(&path).unwrap().len() <= 3 * MIB);

    let result = analyze(&path, &AnalysisOptions::new()).unwrap();

    let waveform = result.waveform.as_ref().expect("small files include a waveform");
    assert_eq!(waveform.sample_rate, 44100);
    assert_eq!(waveform.count, 5000);
    assert_eq!(waveform.samples.len(), 5000);
    assert_eq!(waveform.original_count, 44100 * 8);
    assert!(waveform.downsampled);
    assert_eq!(result.duration_formatted, "0:08");

    let mode = result.key_full.split(' ').nth(1).unwrap();
    assert!(mode == "major" || mode == "minor");
}

#[test]
fn test_large_file_tier() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("long.wav");
    // 330 s at 16 kB/s is just over 5 MiB
    write_wav(&path, 8000, 330.0, |_| 0.0);
    assert!(std::fs::metadata(&path).unwrap().len() > 5 * MIB);

    let options = AnalysisOptions::new().with_sample_rate(8000);
    let result = analyze(&path, &options).unwrap();
    assert!(result.waveform.is_none());
    assert_eq!(result.duration_formatted, "5:30");
    assert_eq!(result.bpm, 0);

    let with_waveform = analyze(&path, &options.clone().with_waveform(true)).unwrap();
    let waveform = with_waveform.waveform.unwrap();
    assert_eq!(waveform.count, 2000);
    // Only the capped prefix is decoded
    assert_eq!(waveform.original_count, 8000 * 120);
}

#[test]
fn test_analysis_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "repeat.wav", 8000, 10.0);
    let options = AnalysisOptions::new().with_waveform_samples(500);

    let first = serde_json::to_string(&analyze(&path, &options).unwrap()).unwrap();
    let second = serde_json::to_string(&analyze(&path, &options).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_simple_record() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "simple.wav", 8000, 6.0);

    let result = analyze(&path, &AnalysisOptions::new().with_waveform(false)).unwrap();
    let value = serde_json::to_value(result.simple()).unwrap();

    assert_eq!(value["key"], result.key_full.as_str());
    assert_eq!(value["song_name"], "simple");
    assert!(value.get("waveform").is_none());
    assert!(value.get("filepath").is_none());
}

#[test]
fn test_missing_file() {
    let err = analyze(Path::new("/nonexistent/missing.mp3"), &AnalysisOptions::new()).unwrap_err();
    assert!(matches!(err, AnalysisError::Unreadable { .. }));
}

#[test]
fn test_undecodable_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.wav");
    std::fs::write(&path, b"RIFF this is not really a wave file").unwrap();

    let err = analyze(&path, &AnalysisOptions::new()).unwrap_err();
    assert!(matches!(err, AnalysisError::Decode(_)), "unexpected error: {}", err);
}
