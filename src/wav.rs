use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::Result;

/// Interleaved 16-bit audio loaded from a WAV file
pub struct VoiceClip {
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<i16>,
}

/// Read a WAV file as interleaved 16-bit samples
///
/// Wider integer and float formats are converted the way the host's voice
/// codecs deliver audio: scaled to 16-bit and saturated.
pub fn load_voice_wav<P: AsRef<Path>>(path: P) -> Result<VoiceClip> {
    let mut reader = WavReader::open(path.as_ref())?;
    let spec = reader.spec();

    let samples = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        (SampleFormat::Int, bits) => {
            let shift = bits as i32 - 16;
            reader
                .samples::<i32>()
                .map(|s| {
                    s.map(|v| {
                        if shift >= 0 {
                            (v >> shift) as i16
                        } else {
                            (v << -shift) as i16
                        }
                    })
                })
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
        (SampleFormat::Float, _) => reader
            .samples::<f32>()
            .map(|s| s.map(|v| (v * i16::MAX as f32) as i16))
            .collect::<std::result::Result<Vec<_>, _>>()?,
    };

    Ok(VoiceClip {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        samples,
    })
}

/// Write interleaved 16-bit samples to a WAV file
pub fn save_voice_wav<P: AsRef<Path>>(path: P, clip: &VoiceClip) -> Result<()> {
    let spec = WavSpec {
        channels: clip.channels,
        sample_rate: clip.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path.as_ref(), spec)?;
    for &sample in &clip.samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_voice_wav() {
        let path = std::env::temp_dir().join(format!("freq_cutoff_wav_{}.wav", std::process::id()));
        let clip = VoiceClip {
            sample_rate: 48000,
            channels: 2,
            samples: vec![0, 1, -1, i16::MAX, i16::MIN, 1234],
        };

        save_voice_wav(&path, &clip).unwrap();
        let loaded = load_voice_wav(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded.sample_rate, 48000);
        assert_eq!(loaded.channels, 2);
        assert_eq!(loaded.samples, clip.samples);
    }

    #[test]
    fn test_float_wav_is_scaled() {
        let path = std::env::temp_dir()
            .join(format!("freq_cutoff_wav_float_{}.wav", std::process::id()));
        let spec = WavSpec {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for sample in [0.0f32, 0.5, -1.0, 2.0] {
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();

        let loaded = load_voice_wav(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded.samples, vec![0, 16383, -32767, i16::MAX]);
    }
}
