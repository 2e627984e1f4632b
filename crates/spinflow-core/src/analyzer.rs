//! FFT-backed byte-spectrum analyzer.
//!
//! Produces the fixed-range magnitude snapshots the animator consumes: a
//! forward FFT over the most recent input samples, Hann-windowed, with
//! per-bin exponential smoothing, mapped onto the 0-255 byte range between a
//! configurable dB floor and ceiling.

use std::sync::Arc;

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::spectrum::SpectrumSource;
use crate::{CoreError, Result};

/// Configuration for [`ByteSpectrumAnalyzer`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrumAnalyzerConfig {
    /// FFT size (power of two). Snapshots carry `fft_size / 2` bins.
    pub fft_size: usize,
    /// Per-bin exponential smoothing factor in `[0, 1)`.
    pub smoothing: f32,
    /// Magnitude in dB mapped to byte 0.
    pub min_db: f32,
    /// Magnitude in dB mapped to byte 255.
    pub max_db: f32,
}

impl Default for SpectrumAnalyzerConfig {
    fn default() -> Self {
        Self {
            fft_size: 256,
            smoothing: 0.8,
            min_db: -100.0,
            max_db: -30.0,
        }
    }
}

impl SpectrumAnalyzerConfig {
    fn validate(&self) -> Result<()> {
        if !self.fft_size.is_power_of_two() || self.fft_size < 32 {
            return Err(CoreError::InvalidConfig(format!(
                "fft_size must be a power of two >= 32, got {}",
                self.fft_size
            )));
        }
        if !(0.0..1.0).contains(&self.smoothing) {
            return Err(CoreError::InvalidConfig(format!(
                "smoothing must be in [0, 1), got {}",
                self.smoothing
            )));
        }
        if self.min_db >= self.max_db {
            return Err(CoreError::InvalidConfig(format!(
                "min_db {} must be below max_db {}",
                self.min_db, self.max_db
            )));
        }
        Ok(())
    }
}

/// Spectrum analyzer over a ring of the most recent input samples.
pub struct ByteSpectrumAnalyzer {
    config: SpectrumAnalyzerConfig,

    fft: Arc<dyn Fft<f32>>,

    /// Hann window coefficients.
    window: Vec<f32>,

    /// Input sample ring buffer.
    ring: Vec<f32>,
    write_pos: usize,

    fft_buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,

    /// Smoothed linear magnitudes, one per bin.
    smoothed: Vec<f32>,
}

impl ByteSpectrumAnalyzer {
    /// Create an analyzer, rejecting invalid configurations.
    pub fn new(config: SpectrumAnalyzerConfig) -> Result<Self> {
        config.validate()?;

        let fft_size = config.fft_size;
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        // Pre-compute Hann window
        let window: Vec<f32> = (0..fft_size)
            .map(|i| {
                let t = i as f32 / (fft_size - 1) as f32;
                0.5 * (1.0 - (2.0 * std::f32::consts::PI * t).cos())
            })
            .collect();

        let scratch_len = fft.get_inplace_scratch_len().max(1);

        debug!(fft_size, smoothing = config.smoothing, "spectrum analyzer created");

        Ok(Self {
            fft,
            window,
            ring: vec![0.0; fft_size],
            write_pos: 0,
            fft_buffer: vec![Complex::new(0.0, 0.0); fft_size],
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
            smoothed: vec![0.0; fft_size / 2],
            config,
        })
    }

    /// Append input samples, overwriting the oldest.
    ///
    /// Non-finite samples are replaced with silence so they cannot
    /// contaminate the magnitudes.
    pub fn push_samples(&mut self, samples: &[f32]) {
        for &sample in samples {
            let sample = if sample.is_finite() { sample } else { 0.0 };
            self.ring[self.write_pos] = sample;
            self.write_pos = (self.write_pos + 1) % self.config.fft_size;
        }
    }

    /// Window the ring, run the FFT, and fold the result into the smoothed
    /// magnitudes.
    fn refresh(&mut self) {
        let fft_size = self.config.fft_size;

        // The write position is where the NEXT sample lands, so the oldest
        // data starts there.
        for i in 0..fft_size {
            let src = (self.write_pos + i) % fft_size;
            self.fft_buffer[i] = Complex::new(self.ring[src] * self.window[i], 0.0);
        }

        self.fft
            .process_with_scratch(&mut self.fft_buffer, &mut self.scratch);

        let norm = 1.0 / fft_size as f32;
        let smoothing = self.config.smoothing;
        for (bin, smoothed) in self.smoothed.iter_mut().enumerate() {
            let magnitude = self.fft_buffer[bin].norm() * norm;
            *smoothed = *smoothed * smoothing + magnitude * (1.0 - smoothing);
        }
    }

    fn byte_for(&self, magnitude: f32) -> u8 {
        if magnitude <= 0.0 {
            return 0;
        }
        let db = 20.0 * magnitude.log10();
        let scaled = (db - self.config.min_db) / (self.config.max_db - self.config.min_db);
        (scaled * 255.0).clamp(0.0, 255.0) as u8
    }
}

impl SpectrumSource for ByteSpectrumAnalyzer {
    fn bin_count(&self) -> usize {
        self.config.fft_size / 2
    }

    fn frequency_snapshot(&mut self, bins: &mut [u8]) {
        self.refresh();
        for (bin, &magnitude) in bins.iter_mut().zip(self.smoothed.iter()) {
            *bin = self.byte_for(magnitude);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant_config() -> SpectrumAnalyzerConfig {
        SpectrumAnalyzerConfig {
            smoothing: 0.0, // disable smoothing for instant reaction
            ..Default::default()
        }
    }

    fn sine_at_bin(bin: usize, fft_size: usize, count: usize) -> Vec<f32> {
        (0..count)
            .map(|i| {
                (2.0 * std::f32::consts::PI * bin as f32 * i as f32 / fft_size as f32).sin() * 0.5
            })
            .collect()
    }

    #[test]
    fn test_rejects_bad_config() {
        let bad_size = SpectrumAnalyzerConfig {
            fft_size: 300,
            ..Default::default()
        };
        assert!(ByteSpectrumAnalyzer::new(bad_size).is_err());

        let bad_smoothing = SpectrumAnalyzerConfig {
            smoothing: 1.0,
            ..Default::default()
        };
        assert!(ByteSpectrumAnalyzer::new(bad_smoothing).is_err());

        let bad_range = SpectrumAnalyzerConfig {
            min_db: -10.0,
            max_db: -40.0,
            ..Default::default()
        };
        assert!(ByteSpectrumAnalyzer::new(bad_range).is_err());
    }

    #[test]
    fn test_silence_yields_zero_bins() {
        let mut analyzer = ByteSpectrumAnalyzer::new(instant_config()).unwrap();
        analyzer.push_samples(&vec![0.0; 512]);

        let mut bins = vec![0u8; analyzer.bin_count()];
        analyzer.frequency_snapshot(&mut bins);
        assert!(bins.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_tone_concentrates_in_its_bin() {
        let mut analyzer = ByteSpectrumAnalyzer::new(instant_config()).unwrap();
        analyzer.push_samples(&sine_at_bin(32, 256, 512));

        let mut bins = vec![0u8; analyzer.bin_count()];
        analyzer.frequency_snapshot(&mut bins);

        let peak = bins
            .iter()
            .enumerate()
            .max_by_key(|&(_, &b)| b)
            .map(|(i, _)| i)
            .unwrap();
        // Hann windowing spreads the tone by at most a neighboring bin.
        assert!(
            (31..=33).contains(&peak),
            "tone landed in bin {} instead of 32",
            peak
        );
        assert!(bins[peak] > 0);
    }

    #[test]
    fn test_non_finite_samples_are_silenced() {
        let mut analyzer = ByteSpectrumAnalyzer::new(instant_config()).unwrap();
        analyzer.push_samples(&[f32::NAN, f32::INFINITY, f32::NEG_INFINITY]);

        let mut bins = vec![0u8; analyzer.bin_count()];
        analyzer.frequency_snapshot(&mut bins);
        assert!(bins.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_smoothing_ramps_toward_target() {
        let config = SpectrumAnalyzerConfig {
            smoothing: 0.9,
            ..Default::default()
        };
        let mut analyzer = ByteSpectrumAnalyzer::new(config).unwrap();
        analyzer.push_samples(&sine_at_bin(32, 256, 512));

        let mut first = vec![0u8; analyzer.bin_count()];
        analyzer.frequency_snapshot(&mut first);
        let mut second = vec![0u8; analyzer.bin_count()];
        analyzer.frequency_snapshot(&mut second);

        // Same input, more accumulation: the smoothed bin keeps rising.
        assert!(second[32] >= first[32]);
    }
}
