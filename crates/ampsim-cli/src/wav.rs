//! WAV reading and writing with planar channel buffers.

use std::path::Path;

use anyhow::Context;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

/// Planar audio: one `Vec` per channel.
pub struct Audio {
    pub channels: Vec<Vec<f32>>,
    pub sample_rate: u32,
}

impl Audio {
    pub fn num_frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn duration_secs(&self) -> f64 {
        self.num_frames() as f64 / f64::from(self.sample_rate)
    }
}

/// Read a WAV file of any channel count, integer or float.
pub fn read_wav(path: &Path) -> anyhow::Result<Audio> {
    let reader =
        WavReader::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let spec = reader.spec();
    let num_channels = usize::from(spec.channels);
    anyhow::ensure!(num_channels > 0, "{} has no channels", path.display());

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.into_samples::<f32>().collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<Result<_, _>>()?
        }
    };

    let frames = interleaved.len() / num_channels;
    let mut channels = vec![Vec::with_capacity(frames); num_channels];
    for frame in interleaved.chunks_exact(num_channels) {
        for (channel, &sample) in channels.iter_mut().zip(frame) {
            channel.push(sample);
        }
    }

    Ok(Audio {
        channels,
        sample_rate: spec.sample_rate,
    })
}

/// Write planar audio; 32-bit is float, 16 and 24 are integer PCM.
pub fn write_wav(path: &Path, audio: &Audio, bits_per_sample: u16) -> anyhow::Result<()> {
    anyhow::ensure!(
        matches!(bits_per_sample, 16 | 24 | 32),
        "unsupported bit depth {bits_per_sample} (expected 16, 24 or 32)"
    );

    let spec = WavSpec {
        channels: u16::try_from(audio.channels.len())?,
        sample_rate: audio.sample_rate,
        bits_per_sample,
        sample_format: if bits_per_sample == 32 {
            SampleFormat::Float
        } else {
            SampleFormat::Int
        },
    };
    let mut writer =
        WavWriter::create(path, spec).with_context(|| format!("failed to create {}", path.display()))?;

    let max_val = (1i64 << (bits_per_sample - 1)) as f32;
    for i in 0..audio.num_frames() {
        for channel in &audio.channels {
            let sample = channel[i];
            if bits_per_sample == 32 {
                writer.write_sample(sample)?;
            } else {
                writer.write_sample((sample * max_val).clamp(-max_val, max_val - 1.0) as i32)?;
            }
        }
    }

    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn stereo() -> Audio {
        Audio {
            channels: vec![vec![0.0, 0.5, -0.5, 0.25], vec![1.0, -1.0, 0.0, 0.125]],
            sample_rate: 44100,
        }
    }

    #[test]
    fn float_round_trip_keeps_channels() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("stereo.wav");
        write_wav(&path, &stereo(), 32).unwrap();

        let audio = read_wav(&path).unwrap();
        assert_eq!(audio.sample_rate, 44100);
        assert_eq!(audio.channels, stereo().channels);
    }

    #[test]
    fn pcm16_round_trip_is_close() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pcm.wav");
        write_wav(&path, &stereo(), 16).unwrap();

        let audio = read_wav(&path).unwrap();
        for (a, b) in audio.channels.iter().flatten().zip(stereo().channels.iter().flatten()) {
            assert!((a - b).abs() < 1e-4, "{a} vs {b}");
        }
    }

    #[test]
    fn rejects_unsupported_bit_depth() {
        let temp = TempDir::new().unwrap();
        assert!(write_wav(&temp.path().join("x.wav"), &stereo(), 8).is_err());
    }

    #[test]
    fn duration_from_frames() {
        let audio = Audio {
            channels: vec![vec![0.0; 22050]],
            sample_rate: 44100,
        };
        assert_eq!(audio.duration_secs(), 0.5);
    }
}
