//! Recording of the captured take to a WAV file.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::RecordingError;

/// Accumulates captured mono audio for one attempt.
#[derive(Debug)]
pub struct TakeRecorder {
    samples: Vec<f32>,
    sample_rate: Option<u32>,
}

impl Default for TakeRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl TakeRecorder {
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
            sample_rate: None,
        }
    }

    /// Append one block. The first block fixes the sample rate.
    pub fn push(&mut self, samples: &[f32], sample_rate: u32) {
        self.sample_rate.get_or_insert(sample_rate);
        self.samples.extend_from_slice(samples);
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample_rate(&self) -> Option<u32> {
        self.sample_rate
    }

    /// Recorded length in seconds.
    pub fn duration_secs(&self) -> f64 {
        match self.sample_rate {
            Some(rate) if rate > 0 => self.samples.len() as f64 / rate as f64,
            _ => 0.0,
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.sample_rate = None;
    }

    /// Write the take as mono 32-bit float WAV, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), RecordingError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| RecordingError::Directory {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let sample_rate = self.sample_rate.unwrap_or(48000);
        save_to_wav(&self.samples, sample_rate, path)?;
        info!(
            "Saved {:.1}s take to {}",
            self.duration_secs(),
            path.display()
        );
        Ok(())
    }
}

/// Save mono f32 samples to a WAV file.
pub fn save_to_wav(samples: &[f32], sample_rate: u32, path: &Path) -> Result<(), RecordingError> {
    use hound::{SampleFormat, WavSpec, WavWriter};

    let wav_error = |source| RecordingError::Wav {
        path: path.to_path_buf(),
        source,
    };

    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec).map_err(wav_error)?;
    for &sample in samples {
        writer.write_sample(sample).map_err(wav_error)?;
    }
    writer.finalize().map_err(wav_error)?;

    Ok(())
}

/// Timestamped filename for a recorded take.
pub fn generate_recording_filename() -> String {
    use chrono::Local;
    format!("pitchcoach-{}.wav", Local::now().format("%Y%m%d-%H%M%S"))
}

/// `~/Documents/Recordings`, or `./Recordings` without a home directory.
pub fn default_recordings_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().join("Documents").join("Recordings"))
        .unwrap_or_else(|| PathBuf::from(".").join("Recordings"))
}
