use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use track_analyzer::{AnalysisOptions, Analyzer, AudioAnalyzer};
use walkdir::WalkDir;

/// Extensions picked up when walking directories
const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "wav", "flac", "ogg", "oga", "m4a", "mp4", "aac", "aif", "aiff",
];

#[derive(Parser, Debug)]
#[command(name = "track-analyzer")]
#[command(about = "Estimate tempo, key and duration of audio files", long_about = None)]
struct Args {
    /// Audio files, directories or file:// URIs
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Always include the waveform summary
    #[arg(long, conflicts_with = "no_waveform")]
    waveform: bool,

    /// Never include the waveform summary
    #[arg(long)]
    no_waveform: bool,

    /// Analysis sample rate in Hz (default: chosen by file size)
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Analyze at most this many seconds; 0 analyzes the whole file
    #[arg(long)]
    max_duration: Option<f64>,

    /// Number of waveform points
    #[arg(long)]
    waveform_samples: Option<usize>,

    /// Emit the reduced record (bpm, key, duration, bitrate, waveform)
    #[arg(long)]
    simple: bool,

    /// Pretty-print JSON
    #[arg(long)]
    pretty: bool,

    /// Worker threads (default: one per core)
    #[arg(short = 'j', long, default_value = "0")]
    jobs: usize,

    /// Verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Use stratum-dsp for the beat-tracking tempo
    #[cfg(feature = "stratum")]
    #[arg(long)]
    stratum: bool,
}

impl Args {
    fn options(&self) -> AnalysisOptions {
        let mut options = AnalysisOptions::new();
        if self.waveform {
            options = options.with_waveform(true);
        } else if self.no_waveform {
            options = options.with_waveform(false);
        }
        if let Some(rate) = self.sample_rate {
            options = options.with_sample_rate(rate);
        }
        if let Some(secs) = self.max_duration {
            options = options.with_max_duration(secs);
        }
        if let Some(samples) = self.waveform_samples {
            options = options.with_waveform_samples(samples);
        }
        options
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let files = collect_inputs(&args.inputs);
    if files.is_empty() {
        anyhow::bail!("No audio files found in {:?}", args.inputs);
    }
    log::info!("Analyzing {} file(s)", files.len());

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.jobs)
        .build()
        .context("Failed to build worker pool")?;
    log::debug!("Using {} worker thread(s)", pool.current_num_threads());

    let options = args.options();

    #[cfg(feature = "stratum")]
    if args.stratum {
        log::info!("Beat tracking backend: stratum-dsp");
        let features =
            track_analyzer::dsp::StratumBeatTracker::new(track_analyzer::dsp::SpectralFeatures::new());
        let analyzer = Analyzer::new().with_features(features);
        return pool.install(|| run(&analyzer, &files, &options, &args));
    }

    let analyzer = Analyzer::new();
    pool.install(|| run(&analyzer, &files, &options, &args))
}

/// Analyze every file and print one JSON object per file, in input order
fn run<A>(analyzer: &A, files: &[PathBuf], options: &AnalysisOptions, args: &Args) -> Result<()>
where
    A: AudioAnalyzer + Sync,
{
    let records: Vec<(Value, bool)> = files
        .par_iter()
        .map(|path| {
            let analyzed_at = chrono::Local::now().to_rfc3339();
            match analyzer.analyze(path, options) {
                Ok(result) => {
                    let body = if args.simple {
                        serde_json::to_value(result.simple())
                    } else {
                        serde_json::to_value(&result)
                    };
                    match body {
                        Ok(body) => (
                            json!({ "analyzed_at": analyzed_at, "path": path.display().to_string(), "result": body }),
                            true,
                        ),
                        Err(e) => (
                            json!({ "analyzed_at": analyzed_at, "path": path.display().to_string(), "error": e.to_string() }),
                            false,
                        ),
                    }
                }
                Err(e) => {
                    log::warn!("Failed to analyze {:?}: {}", path, e);
                    (
                        json!({ "analyzed_at": analyzed_at, "path": path.display().to_string(), "error": e.to_string() }),
                        false,
                    )
                }
            }
        })
        .collect();

    let mut succeeded = 0;
    for (record, ok) in &records {
        let line = if args.pretty {
            serde_json::to_string_pretty(record)
        } else {
            serde_json::to_string(record)
        }
        .context("Failed to serialize record")?;
        println!("{}", line);
        if *ok {
            succeeded += 1;
        }
    }

    log::info!("{}/{} file(s) analyzed", succeeded, records.len());
    if succeeded == 0 {
        anyhow::bail!("All {} file(s) failed to analyze", records.len());
    }
    Ok(())
}

/// Expand each input into audio file paths
///
/// Directories are walked recursively; plain files are kept whatever their
/// extension so the decoder reports unsupported formats per file.
fn collect_inputs(inputs: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        let path = resolve_input(input);
        if path.is_dir() {
            let before = files.len();
            files.extend(audio_files_in(&path));
            log::debug!("{} audio file(s) under {:?}", files.len() - before, path);
        } else {
            files.push(path);
        }
    }
    files
}

/// Turn a CLI argument into a path: `file://` URIs are decoded, `~` expanded
fn resolve_input(input: &str) -> PathBuf {
    if let Some(rest) = input.strip_prefix("file://") {
        // Handle %20 spaces etc.
        return match urlencoding::decode(rest) {
            Ok(decoded) => PathBuf::from(decoded.into_owned()),
            Err(_) => PathBuf::from(rest),
        };
    }
    PathBuf::from(shellexpand::tilde(input).as_ref())
}

fn audio_files_in(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_audio_file(path))
        .collect();
    files.sort();
    files
}

fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_file_uri() {
        assert_eq!(
            resolve_input("file:///music/My%20Song.mp3"),
            PathBuf::from("/music/My Song.mp3")
        );
        assert_eq!(resolve_input("/plain/path.wav"), PathBuf::from("/plain/path.wav"));
    }

    #[test]
    fn test_directory_walk_filters_extensions() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("a.MP3"), b"").unwrap();
        std::fs::write(dir.path().join("nested/b.flac"), b"").unwrap();
        std::fs::write(dir.path().join("cover.jpg"), b"").unwrap();

        let files = collect_inputs(&[dir.path().display().to_string()]);
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| is_audio_file(f)));
    }

    #[test]
    fn test_waveform_flags_map_to_options() {
        let args = Args::parse_from(["track-analyzer", "--no-waveform", "--max-duration", "0", "x.mp3"]);
        let options = args.options();
        assert_eq!(options.include_waveform, Some(false));
        assert_eq!(options.max_duration, Some(0.0));

        let args = Args::parse_from(["track-analyzer", "x.mp3"]);
        assert_eq!(args.options(), AnalysisOptions::new());
    }
}
