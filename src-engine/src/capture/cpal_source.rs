//! CPAL-based microphone capture.
//!
//! The stream is built and owned by a dedicated capture thread, which parks
//! until the handle is stopped and then drops the stream to release the
//! device.

use std::sync::mpsc;
use std::thread;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample, StreamConfig};
use serde::Serialize;
use tracing::{error, info};

use super::{AudioSource, BlockSink, BlockSlicer, CaptureConfig, CaptureHandle};
use crate::error::CaptureError;

/// An input device as shown to the user.
#[derive(Debug, Clone, Serialize)]
pub struct InputDevice {
    pub name: String,
    pub is_default: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<u16>,
}

/// List input devices on the default host.
pub fn list_input_devices() -> Result<Vec<InputDevice>, CaptureError> {
    let host = cpal::default_host();
    let default_name = host.default_input_device().and_then(|d| d.name().ok());

    let devices = host
        .input_devices()
        .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;

    Ok(devices
        .filter_map(|device| {
            let name = device.name().ok()?;
            let config = device.default_input_config().ok();
            Some(InputDevice {
                is_default: default_name.as_deref() == Some(name.as_str()),
                sample_rate: config.as_ref().map(|c| c.sample_rate().0),
                channels: config.as_ref().map(|c| c.channels()),
                name,
            })
        })
        .collect())
}

/// Microphone capture through the platform's default audio host.
#[derive(Debug, Clone)]
pub struct CpalSource {
    device: Option<String>,
    block_size: usize,
}

impl CpalSource {
    pub fn new(config: &CaptureConfig) -> Self {
        Self {
            device: config.device.clone(),
            block_size: config.block_size,
        }
    }
}

impl AudioSource for CpalSource {
    fn start(&self, sink: BlockSink) -> Result<CaptureHandle, CaptureError> {
        let device_name = self.device.clone();
        let block_size = self.block_size;
        let (ready_tx, ready_rx) = mpsc::channel::<Result<u32, CaptureError>>();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let capture_thread = thread::Builder::new()
            .name("pitchcoach-capture".into())
            .spawn(move || {
                let (stream, sample_rate) =
                    match open_stream(device_name.as_deref(), block_size, sink) {
                        Ok(opened) => opened,
                        Err(e) => {
                            let _ = ready_tx.send(Err(e));
                            return;
                        }
                    };
                let _ = ready_tx.send(Ok(sample_rate));

                // Returns on stop or when the handle is dropped
                let _ = stop_rx.recv();
                drop(stream);
            })
            .map_err(|e| CaptureError::Stream(format!("failed to spawn capture thread: {}", e)))?;

        let sample_rate = ready_rx.recv().map_err(|_| {
            CaptureError::DeviceUnavailable("capture thread exited during setup".into())
        })??;

        let thread_id = capture_thread.thread().id();
        Ok(CaptureHandle::new(sample_rate, move || {
            let _ = stop_tx.send(());
            // Joining from the capture thread itself would deadlock
            if thread::current().id() != thread_id {
                let _ = capture_thread.join();
            }
        }))
    }
}

fn find_device(host: &cpal::Host, name: Option<&str>) -> Result<cpal::Device, CaptureError> {
    match name {
        None => host
            .default_input_device()
            .ok_or_else(|| CaptureError::DeviceUnavailable("no default input device".into())),
        Some(name) => host
            .input_devices()
            .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?
            .find(|d| d.name().map(|n| n == name).unwrap_or(false))
            .ok_or_else(|| {
                CaptureError::DeviceUnavailable(format!("input device '{}' not found", name))
            }),
    }
}

fn open_stream(
    device_name: Option<&str>,
    block_size: usize,
    sink: BlockSink,
) -> Result<(cpal::Stream, u32), CaptureError> {
    let host = cpal::default_host();
    let device = find_device(&host, device_name)?;
    let name = device.name().unwrap_or_else(|_| "unknown".into());

    let supported = device.default_input_config().map_err(|e| match e {
        cpal::DefaultStreamConfigError::DeviceNotAvailable => {
            CaptureError::DeviceUnavailable(format!("'{}' is not available", name))
        }
        cpal::DefaultStreamConfigError::BackendSpecific { err } => backend_error(err.description),
        other => CaptureError::DeviceUnavailable(other.to_string()),
    })?;

    let sample_rate = supported.sample_rate().0;
    let channels = supported.channels() as usize;
    let sample_format = supported.sample_format();
    let config: StreamConfig = supported.into();

    info!(
        "Capturing from '{}' ({} Hz, {} channel(s), {:?})",
        name, sample_rate, channels, sample_format
    );

    let slicer = BlockSlicer::new(block_size, sample_rate);
    let stream = match sample_format {
        SampleFormat::F32 => build_stream::<f32>(&device, &config, channels, slicer, sink),
        SampleFormat::I16 => build_stream::<i16>(&device, &config, channels, slicer, sink),
        SampleFormat::I32 => build_stream::<i32>(&device, &config, channels, slicer, sink),
        SampleFormat::U16 => build_stream::<u16>(&device, &config, channels, slicer, sink),
        other => Err(CaptureError::DeviceUnavailable(format!(
            "unsupported sample format {:?}",
            other
        ))),
    }?;

    stream.play().map_err(|e| match e {
        cpal::PlayStreamError::DeviceNotAvailable => {
            CaptureError::DeviceUnavailable(format!("'{}' went away", name))
        }
        cpal::PlayStreamError::BackendSpecific { err } => backend_error(err.description),
        #[allow(unreachable_patterns)]
        other => CaptureError::Stream(other.to_string()),
    })?;

    Ok((stream, sample_rate))
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    channels: usize,
    mut slicer: BlockSlicer,
    mut sink: BlockSink,
) -> Result<cpal::Stream, CaptureError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let mut scratch: Vec<f32> = Vec::new();

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                scratch.clear();
                scratch.extend(data.iter().map(|&s| s.to_sample::<f32>()));
                slicer.push(&scratch, channels, |block| sink(block));
            },
            |err| error!("Audio stream error: {}", err),
            None,
        )
        .map_err(|e| match e {
            cpal::BuildStreamError::DeviceNotAvailable => {
                CaptureError::DeviceUnavailable("device not available".into())
            }
            cpal::BuildStreamError::BackendSpecific { err } => backend_error(err.description),
            other => CaptureError::DeviceUnavailable(other.to_string()),
        })
}

/// Backends report permission problems only through their message text.
fn backend_error(description: String) -> CaptureError {
    let lower = description.to_lowercase();
    if lower.contains("permission") || lower.contains("denied") || lower.contains("not authorized")
    {
        CaptureError::PermissionDenied(description)
    } else {
        CaptureError::DeviceUnavailable(description)
    }
}
