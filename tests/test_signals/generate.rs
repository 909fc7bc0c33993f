use std::f64::consts::PI;
use std::path::PathBuf;

/// Alternating `+amplitude, -amplitude, ...` for `len` samples
pub fn alternating(len: usize, amplitude: i16) -> Vec<i16> {
    (0..len)
        .map(|i| if i % 2 == 0 { amplitude } else { -amplitude })
        .collect()
}

/// Mono sine tone as 16-bit samples
pub fn sine(freq_hz: f64, amplitude: f64, len: usize, sample_rate: f64) -> Vec<i16> {
    (0..len)
        .map(|i| (amplitude * (2.0 * PI * freq_hz * i as f64 / sample_rate).sin()) as i16)
        .collect()
}

/// Interleave equally long per-channel buffers as `[c0, c1, ..., c0, c1, ...]`
pub fn interleave(channels: &[Vec<i16>]) -> Vec<i16> {
    let frames = channels.iter().map(Vec::len).min().unwrap_or(0);
    let mut out = Vec::with_capacity(frames * channels.len());
    for frame in 0..frames {
        for channel in channels {
            out.push(channel[frame]);
        }
    }
    out
}

pub fn rms(samples: &[i16]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum / samples.len() as f64).sqrt()
}

/// Unique scratch path for one test
pub fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("freq_cutoff_it_{}_{}", std::process::id(), name))
}
