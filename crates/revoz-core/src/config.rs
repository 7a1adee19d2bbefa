//! Synthesizer configuration and validation.
//!
//! All construction parameters are immutable for the lifetime of a
//! synthesizer instance and are validated at one call site, in field order,
//! before any allocation happens.

use thiserror::Error;

/// Errors produced when validating a [`SynthConfig`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A configuration field was zero, negative, or not finite.
    #[error("{param} must be greater than 0")]
    NonPositive {
        /// Name of the offending field.
        param: &'static str,
    },
}

/// Construction parameters for a streaming synthesizer.
///
/// The spectral and aperiodicity vector length is derived from the transform
/// size ([`SynthConfig::spectrum_bins`]) and every appended frame must match
/// it exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthConfig {
    /// Sampling frequency in Hz.
    pub sample_rate: u32,
    /// Frame period in milliseconds.
    pub frame_period_ms: f64,
    /// Size of the frequency-domain transform underlying each frame.
    pub fft_size: usize,
    /// Samples produced per successful production call.
    pub chunk_size: usize,
    /// Number of batch slots in the parameter ring.
    pub ring_slots: usize,
}

impl SynthConfig {
    /// Checks that every field is strictly positive.
    ///
    /// Fields are checked in declaration order and the first failure names
    /// the offending parameter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::NonPositive {
                param: "sample_rate",
            });
        }
        if !self.frame_period_ms.is_finite() || self.frame_period_ms <= 0.0 {
            return Err(ConfigError::NonPositive {
                param: "frame_period_ms",
            });
        }
        if self.fft_size == 0 {
            return Err(ConfigError::NonPositive { param: "fft_size" });
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::NonPositive { param: "chunk_size" });
        }
        if self.ring_slots == 0 {
            return Err(ConfigError::NonPositive { param: "ring_slots" });
        }
        Ok(())
    }

    /// Length of the spectral and aperiodicity vectors: `fft_size / 2 + 1`.
    pub fn spectrum_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }

    /// Samples per analysis frame at the configured rate.
    pub fn frame_hop(&self) -> f64 {
        self.frame_period_ms * f64::from(self.sample_rate) / 1000.0
    }
}

/// Smallest power-of-two transform size that can hold three pitch periods at
/// the given pitch floor.
///
/// This is the conventional transform size for spectral envelopes whose
/// lowest expected fundamental is `f0_floor` Hz.
pub fn fft_size_for(sample_rate: u32, f0_floor: f64) -> usize {
    let span = 3.0 * f64::from(sample_rate) / f0_floor + 1.0;
    let exponent = 1 + span.log2().floor() as u32;
    2usize.pow(exponent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> SynthConfig {
        SynthConfig {
            sample_rate: 16000,
            frame_period_ms: 5.0,
            fft_size: 1024,
            chunk_size: 1024,
            ring_slots: 8,
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn zero_sample_rate_names_field() {
        let mut c = valid();
        c.sample_rate = 0;
        assert_eq!(
            c.validate(),
            Err(ConfigError::NonPositive {
                param: "sample_rate"
            })
        );
    }

    #[test]
    fn negative_frame_period_names_field() {
        let mut c = valid();
        c.frame_period_ms = -5.0;
        assert_eq!(
            c.validate(),
            Err(ConfigError::NonPositive {
                param: "frame_period_ms"
            })
        );
    }

    #[test]
    fn nan_frame_period_rejected() {
        let mut c = valid();
        c.frame_period_ms = f64::NAN;
        assert!(c.validate().is_err());
    }

    #[test]
    fn zero_fft_size_names_field() {
        let mut c = valid();
        c.fft_size = 0;
        assert_eq!(
            c.validate(),
            Err(ConfigError::NonPositive { param: "fft_size" })
        );
    }

    #[test]
    fn zero_chunk_size_names_field() {
        let mut c = valid();
        c.chunk_size = 0;
        assert_eq!(
            c.validate(),
            Err(ConfigError::NonPositive { param: "chunk_size" })
        );
    }

    #[test]
    fn zero_ring_slots_names_field() {
        let mut c = valid();
        c.ring_slots = 0;
        assert_eq!(
            c.validate(),
            Err(ConfigError::NonPositive { param: "ring_slots" })
        );
    }

    #[test]
    fn spectrum_bins_is_half_plus_one() {
        assert_eq!(valid().spectrum_bins(), 513);
    }

    #[test]
    fn frame_hop_in_samples() {
        // 5 ms at 16 kHz = 80 samples
        assert!((valid().frame_hop() - 80.0).abs() < 1e-12);
    }

    #[test]
    fn fft_size_for_common_floor() {
        // 3 * 44100 / 71 + 1 = 1864.4 -> next power of two is 2048
        assert_eq!(fft_size_for(44100, 71.0), 2048);
        // 3 * 16000 / 71 + 1 = 677.1 -> 1024
        assert_eq!(fft_size_for(16000, 71.0), 1024);
    }

    #[test]
    fn error_display_names_parameter() {
        let err = ConfigError::NonPositive { param: "fft_size" };
        assert_eq!(err.to_string(), "fft_size must be greater than 0");
    }
}
