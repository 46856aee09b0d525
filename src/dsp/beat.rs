//! Dynamic-programming beat tracker
//!
//! Follows Ellis (2007), "Beat Tracking by Dynamic Programming": beats are
//! placed where the onset envelope is strong while inter-beat intervals stay
//! close to the period implied by a seed tempo.

/// Penalty scale for deviating from the seed period
pub const DEFAULT_TIGHTNESS: f64 = 100.0;

/// Track beats over an onset envelope
///
/// Returns beat positions as frame indices, ascending. Empty when the seed
/// tempo is not positive or the envelope carries no energy.
pub fn track_beats(onset: &[f32], frame_rate: f64, seed_bpm: f64, tightness: f64) -> Vec<usize> {
    if onset.is_empty() || !seed_bpm.is_finite() || seed_bpm <= 0.0 || frame_rate <= 0.0 {
        return Vec::new();
    }

    let period = 60.0 * frame_rate / seed_bpm;
    if period < 1.0 {
        return Vec::new();
    }

    let normalized = match normalize(onset) {
        Some(values) => values,
        None => return Vec::new(),
    };
    let local = local_score(&normalized, period);

    let min_lag = (period / 2.0).round().max(1.0) as usize;
    let max_lag = (2.0 * period).round() as usize;
    let penalty: Vec<f64> = (min_lag..=max_lag)
        .map(|lag| {
            let ratio = (lag as f64 / period).ln();
            -tightness * ratio * ratio
        })
        .collect();

    let mut cumulative = vec![0.0f64; local.len()];
    let mut backlink: Vec<Option<usize>> = vec![None; local.len()];

    for i in 0..local.len() {
        let mut best: Option<(f64, usize)> = None;
        for (offset, lag) in (min_lag..=max_lag).enumerate() {
            let Some(prev) = i.checked_sub(lag) else {
                break;
            };
            let score = cumulative[prev] + penalty[offset];
            if best.map_or(true, |(value, _)| score > value) {
                best = Some((score, prev));
            }
        }

        match best {
            Some((score, prev)) => {
                cumulative[i] = local[i] + score;
                backlink[i] = Some(prev);
            }
            None => cumulative[i] = local[i],
        }
    }

    let Some(last) = last_beat(&cumulative) else {
        return Vec::new();
    };

    let mut beats = vec![last];
    let mut cursor = last;
    while let Some(prev) = backlink[cursor] {
        beats.push(prev);
        cursor = prev;
    }
    beats.reverse();

    trim_weak_edges(&beats, &local)
}

/// Tempo implied by the median inter-beat interval, 0 with fewer than two beats
pub fn tempo_from_beats(beats: &[usize], frame_rate: f64) -> f64 {
    if beats.len() < 2 {
        return 0.0;
    }
    let mut intervals: Vec<f64> = beats.windows(2).map(|w| (w[1] - w[0]) as f64).collect();
    intervals.sort_unstable_by(|a, b| a.total_cmp(b));
    let mid = intervals.len() / 2;
    let median = if intervals.len() % 2 == 0 {
        (intervals[mid - 1] + intervals[mid]) / 2.0
    } else {
        intervals[mid]
    };

    if median > 0.0 {
        60.0 * frame_rate / median
    } else {
        0.0
    }
}

/// Divide by the sample standard deviation
fn normalize(onset: &[f32]) -> Option<Vec<f64>> {
    if onset.len() < 2 {
        return None;
    }
    let n = onset.len() as f64;
    let mean = onset.iter().map(|&v| v as f64).sum::<f64>() / n;
    let variance = onset
        .iter()
        .map(|&v| (v as f64 - mean).powi(2))
        .sum::<f64>()
        / (n - 1.0);
    let std = variance.sqrt();
    if !std.is_finite() || std <= 0.0 {
        return None;
    }
    Some(onset.iter().map(|&v| v as f64 / std).collect())
}

/// Smooth the envelope with a Gaussian of width `period / 32`
fn local_score(onset: &[f64], period: f64) -> Vec<f64> {
    let radius = period.round() as isize;
    let kernel: Vec<f64> = (-radius..=radius)
        .map(|k| (-0.5 * (k as f64 * 32.0 / period).powi(2)).exp())
        .collect();

    let len = onset.len() as isize;
    (0..len)
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .filter_map(|(k, weight)| {
                    let idx = i + k as isize - radius;
                    (idx >= 0 && idx < len).then(|| weight * onset[idx as usize])
                })
                .sum()
        })
        .collect()
}

/// Last local maximum of the cumulative score above half their median
fn last_beat(cumulative: &[f64]) -> Option<usize> {
    if cumulative.is_empty() {
        return None;
    }

    let maxima: Vec<usize> = (1..cumulative.len().saturating_sub(1))
        .filter(|&i| cumulative[i] > cumulative[i - 1] && cumulative[i] >= cumulative[i + 1])
        .collect();

    if maxima.is_empty() {
        return cumulative
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i);
    }

    let mut values: Vec<f64> = maxima.iter().map(|&i| cumulative[i]).collect();
    values.sort_unstable_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    let median = if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    };
    let threshold = 0.5 * median;

    maxima
        .iter()
        .rev()
        .find(|&&i| cumulative[i] > threshold)
        .or_else(|| maxima.last())
        .copied()
}

/// Drop leading and trailing beats whose local score is under half the RMS
fn trim_weak_edges(beats: &[usize], local: &[f64]) -> Vec<usize> {
    if beats.is_empty() {
        return Vec::new();
    }
    let rms = (beats.iter().map(|&b| local[b].powi(2)).sum::<f64>() / beats.len() as f64).sqrt();
    let threshold = 0.5 * rms;

    let start = beats.iter().position(|&b| local[b] >= threshold);
    let end = beats.iter().rposition(|&b| local[b] >= threshold);
    match (start, end) {
        (Some(start), Some(end)) => beats[start..=end].to_vec(),
        _ => Vec::new(),
    }
}
