//! cpal capture backend feeding the byte-spectrum analyzer.
//!
//! The cpal stream lives on a dedicated thread (streams are not `Send`);
//! the audio callback downmixes to mono and forwards chunks over a bounded
//! channel. The consumer side is plain data and can move freely into the
//! sampling loop.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleFormat;
use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::{info, warn};

use crate::analyzer::ByteSpectrumAnalyzer;
use crate::spectrum::SpectrumSource;
use crate::{CoreError, Result};

/// Handle to a live capture stream.
pub struct CaptureBackend {
    samples: Receiver<Vec<f32>>,
    sample_rate: u32,
    // Held only so that dropping the backend hangs up the stream thread.
    _shutdown: Sender<()>,
}

impl CaptureBackend {
    /// Open an input device and start capturing.
    ///
    /// `device_name` selects a device by name; `None` uses the default
    /// input. Fails if the device cannot be opened or its sample format is
    /// unsupported.
    pub fn open(device_name: Option<&str>) -> Result<Self> {
        let (ready_tx, ready_rx) = bounded(1);
        let (shutdown_tx, shutdown_rx) = bounded::<()>(0);
        let requested = device_name.map(String::from);

        std::thread::Builder::new()
            .name("spinflow-capture".into())
            .spawn(move || {
                match open_stream(requested.as_deref()) {
                    Ok((stream, sample_rate, samples)) => {
                        if ready_tx.send(Ok((sample_rate, samples))).is_err() {
                            return;
                        }
                        // Park until the handle is dropped; the stream stays
                        // alive as long as this thread does.
                        let _ = shutdown_rx.recv();
                        drop(stream);
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                    }
                }
            })
            .map_err(|e| CoreError::AudioBackend(format!("failed to spawn capture thread: {e}")))?;

        let (sample_rate, samples) = ready_rx
            .recv()
            .map_err(|_| CoreError::AudioBackend("capture thread died during startup".into()))??;

        info!(sample_rate, "audio capture started");

        Ok(Self {
            samples,
            sample_rate,
            _shutdown: shutdown_tx,
        })
    }

    /// Sample rate of the capture stream.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Pair this backend with an analyzer into a [`SpectrumSource`].
    pub fn into_source(self, analyzer: ByteSpectrumAnalyzer) -> CaptureSource {
        CaptureSource {
            backend: self,
            analyzer,
        }
    }
}

/// Live capture plumbed through the spectrum analyzer.
pub struct CaptureSource {
    backend: CaptureBackend,
    analyzer: ByteSpectrumAnalyzer,
}

impl SpectrumSource for CaptureSource {
    fn bin_count(&self) -> usize {
        self.analyzer.bin_count()
    }

    fn frequency_snapshot(&mut self, bins: &mut [u8]) {
        // Drain whatever the audio thread produced since the last tick.
        while let Ok(chunk) = self.backend.samples.try_recv() {
            self.analyzer.push_samples(&chunk);
        }
        self.analyzer.frequency_snapshot(bins);
    }
}

fn open_stream(device_name: Option<&str>) -> Result<(cpal::Stream, u32, Receiver<Vec<f32>>)> {
    let host = cpal::default_host();
    let device = match device_name {
        Some(name) => host
            .input_devices()
            .map_err(|e| CoreError::AudioBackend(e.to_string()))?
            .find(|d| d.name().map(|n| n == name).unwrap_or(false))
            .ok_or_else(|| CoreError::AudioBackend(format!("no input device named {name:?}")))?,
        None => host
            .default_input_device()
            .ok_or_else(|| CoreError::AudioBackend("no default input device".into()))?,
    };

    let config = device
        .default_input_config()
        .map_err(|e| CoreError::AudioBackend(e.to_string()))?;
    let sample_rate = config.sample_rate();
    let channels = config.channels() as usize;
    let sample_format = config.sample_format();

    let (tx, rx) = bounded(32);
    let err_fn = |err| warn!("audio stream error: {err}");

    let stream = match sample_format {
        SampleFormat::F32 => device
            .build_input_stream(
                &config.into(),
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    // Drop the chunk if the consumer lags; the audio
                    // callback must never block.
                    let _ = tx.try_send(downmix(data, channels));
                },
                err_fn,
                None,
            )
            .map_err(|e| CoreError::AudioBackend(e.to_string()))?,
        SampleFormat::I16 => device
            .build_input_stream(
                &config.into(),
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    let floats: Vec<f32> =
                        data.iter().map(|&s| f32::from(s) / 32768.0).collect();
                    let _ = tx.try_send(downmix(&floats, channels));
                },
                err_fn,
                None,
            )
            .map_err(|e| CoreError::AudioBackend(e.to_string()))?,
        other => {
            return Err(CoreError::AudioBackend(format!(
                "unsupported sample format {other:?}"
            )))
        }
    };

    stream
        .play()
        .map_err(|e| CoreError::AudioBackend(e.to_string()))?;

    Ok((stream, sample_rate, rx))
}

/// Average interleaved frames down to mono.
fn downmix(data: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return data.to_vec();
    }
    data.chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downmix_mono_passthrough() {
        let data = [0.1, 0.2, 0.3];
        assert_eq!(downmix(&data, 1), data.to_vec());
    }

    #[test]
    fn test_downmix_stereo_averages_frames() {
        let data = [1.0, 0.0, 0.5, 0.5];
        assert_eq!(downmix(&data, 2), vec![0.5, 0.5]);
    }

    #[test]
    fn test_downmix_drops_trailing_partial_frame() {
        let data = [1.0, 1.0, 1.0];
        assert_eq!(downmix(&data, 2), vec![1.0]);
    }
}
