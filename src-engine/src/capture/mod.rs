//! Microphone capture.
//!
//! A capture source hands fixed-size mono blocks to a sink in capture
//! order. Block size is counted in samples, so the interval between blocks
//! depends on the device's native sample rate.

#[cfg(feature = "cpal-capture")]
mod cpal_source;

#[cfg(feature = "cpal-capture")]
pub use cpal_source::{list_input_devices, CpalSource, InputDevice};

use std::fmt;

use serde::Deserialize;

use crate::error::CaptureError;

/// Samples per block sent to the analyzer.
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// Capture settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Input device name; the system default when unset
    pub device: Option<String>,
    /// Mono samples per block
    pub block_size: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device: None,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

/// One block of mono capture audio.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBlock {
    /// Mono f32 samples
    pub samples: Vec<f32>,
    /// Native sample rate of the device
    pub sample_rate: u32,
    /// Position of this block in capture order, starting at 0
    pub sequence: u64,
}

/// Receives blocks from the capture thread.
pub type BlockSink = Box<dyn FnMut(AudioBlock) + Send + 'static>;

/// A source of live audio.
pub trait AudioSource {
    /// Open the device and start delivering blocks to `sink`.
    fn start(&self, sink: BlockSink) -> Result<CaptureHandle, CaptureError>;
}

/// Handle to a running capture. Stopping releases the device.
pub struct CaptureHandle {
    sample_rate: u32,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl CaptureHandle {
    /// Wrap a running capture; `release` is called exactly once on stop.
    pub fn new(sample_rate: u32, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            sample_rate,
            release: Some(Box::new(release)),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }

    /// Stop capturing. Safe to call more than once.
    pub fn stop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
            tracing::info!("Audio capture stopped");
        }
    }
}

impl Drop for CaptureHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for CaptureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureHandle")
            .field("sample_rate", &self.sample_rate)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Convert interleaved multi-channel audio to mono by averaging channels.
pub fn convert_to_mono(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks(channels)
        .map(|chunk| chunk.iter().sum::<f32>() / chunk.len() as f32)
        .collect()
}

/// Re-slices device callbacks of arbitrary length into fixed-size blocks.
#[derive(Debug)]
pub struct BlockSlicer {
    block_size: usize,
    sample_rate: u32,
    pending: Vec<f32>,
    sequence: u64,
}

impl BlockSlicer {
    pub fn new(block_size: usize, sample_rate: u32) -> Self {
        let block_size = block_size.max(1);
        Self {
            block_size,
            sample_rate,
            pending: Vec::with_capacity(block_size * 2),
            sequence: 0,
        }
    }

    /// Add interleaved samples and emit every completed block, in order.
    pub fn push(&mut self, interleaved: &[f32], channels: usize, mut emit: impl FnMut(AudioBlock)) {
        self.pending
            .extend_from_slice(&convert_to_mono(interleaved, channels));

        while self.pending.len() >= self.block_size {
            let rest = self.pending.split_off(self.block_size);
            let samples = std::mem::replace(&mut self.pending, rest);
            emit(AudioBlock {
                samples,
                sample_rate: self.sample_rate,
                sequence: self.sequence,
            });
            self.sequence += 1;
        }
    }

    /// Samples waiting for a full block.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
