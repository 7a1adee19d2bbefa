//! Per-pulse response generation.
//!
//! The [`Vocoder`] converts one frame's spectral parameters into a single
//! excitation response of `fft_size` samples. Voiced frames get a
//! minimum-phase reconstruction of the periodic part of the envelope plus a
//! noise-excited aperiodic part; unvoiced frames get a noise excitation of
//! the whole envelope.
//!
//! Minimum phase is computed with the cepstral method: take the log
//! magnitude spectrum, transform to the cepstrum, fold the anticausal
//! quefrencies onto the causal side, transform back, and exponentiate. The
//! result is a causal response whose energy leads its tail, which is what an
//! overlap-add pulse train wants.
//!
//! All state (FFT plans, noise generator) is owned per instance; two
//! vocoders never share anything.

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::f64::consts::PI;
use std::sync::Arc;

/// Floor applied to magnitudes before taking logs.
const LOG_FLOOR: f64 = 1e-12;

/// Spectral-envelope-to-response converter with cached FFT plans.
pub struct Vocoder {
    fft_size: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
    /// Xorshift state for the noise excitation.
    noise_state: u32,
}

impl std::fmt::Debug for Vocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vocoder")
            .field("fft_size", &self.fft_size)
            .finish_non_exhaustive()
    }
}

impl Vocoder {
    /// Plans transforms for the given size.
    pub fn new(fft_size: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            fft_size,
            forward: planner.plan_fft_forward(fft_size),
            inverse: planner.plan_fft_inverse(fft_size),
            noise_state: 0x12345678,
        }
    }

    /// Transform size the vocoder was planned for.
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Response for one voiced excitation.
    ///
    /// `spectrum` and `aperiodicity` are `fft_size / 2 + 1` bins; the
    /// aperiodicity weight splits the power envelope into a minimum-phase
    /// periodic part (`1 - a²`) and a noise-excited part (`a²`). The
    /// periodic part is scaled by the square root of the pitch period so a
    /// sparser pulse train keeps its energy per unit time.
    pub fn periodic_response(
        &mut self,
        spectrum: &[f64],
        aperiodicity: &[f64],
        period_samples: f64,
    ) -> Vec<f64> {
        let n = self.fft_size;
        let periodic: Vec<f64> = spectrum
            .iter()
            .zip(aperiodicity.iter())
            .map(|(&s, &a)| (s * (1.0 - a * a)).max(0.0).sqrt())
            .collect();
        let mut spec = self.minimum_phase(&self.mirrored(&periodic));
        self.inverse.process(&mut spec);
        let gain = period_samples.max(1.0).sqrt() / n as f64;
        let mut out: Vec<f64> = spec.iter().map(|c| c.re * gain).collect();

        let aperiodic: Vec<f64> = spectrum
            .iter()
            .zip(aperiodicity.iter())
            .map(|(&s, &a)| (s * a * a).max(0.0).sqrt())
            .collect();
        let aperiodic_full = self.mirrored(&aperiodic);
        let noise = self.random_phase_response(&aperiodic_full);
        for (sample, excitation) in out.iter_mut().zip(noise) {
            *sample += excitation;
        }
        out
    }

    /// Response for one unvoiced excitation: the whole envelope, noise
    /// excited.
    pub fn noise_response(&mut self, spectrum: &[f64]) -> Vec<f64> {
        let magnitude: Vec<f64> = spectrum.iter().map(|&s| s.max(0.0).sqrt()).collect();
        let full = self.mirrored(&magnitude);
        self.random_phase_response(&full)
    }

    /// Expands `fft_size / 2 + 1` bins into a conjugate-symmetric magnitude
    /// of `fft_size` values.
    fn mirrored(&self, bins: &[f64]) -> Vec<f64> {
        let n = self.fft_size;
        let mut full = vec![0.0; n];
        for (i, &v) in bins.iter().enumerate() {
            full[i] = v;
            if i > 0 && n - i > i {
                full[n - i] = v;
            }
        }
        full
    }

    /// Minimum-phase spectrum of a symmetric magnitude, cepstral method.
    fn minimum_phase(&self, magnitude: &[f64]) -> Vec<Complex<f64>> {
        let n = self.fft_size;
        let mut buf: Vec<Complex<f64>> = magnitude
            .iter()
            .map(|&m| Complex::new(m.max(LOG_FLOOR).ln(), 0.0))
            .collect();
        self.inverse.process(&mut buf);
        let scale = 1.0 / n as f64;
        for c in buf.iter_mut() {
            *c *= scale;
        }
        // fold anticausal quefrencies onto the causal side
        for i in 1..=(n - 1) / 2 {
            buf[i] *= 2.0;
        }
        for i in (n / 2 + 1)..n {
            buf[i] = Complex::new(0.0, 0.0);
        }
        self.forward.process(&mut buf);
        for c in buf.iter_mut() {
            *c = c.exp();
        }
        buf
    }

    /// Real response of a magnitude spectrum under uniformly random phase.
    fn random_phase_response(&mut self, magnitude: &[f64]) -> Vec<f64> {
        let n = self.fft_size;
        let mut buf = vec![Complex::new(0.0, 0.0); n];
        buf[0] = Complex::new(magnitude[0] * self.next_noise().signum(), 0.0);
        for i in 1..=(n - 1) / 2 {
            let theta = self.next_noise() * PI;
            let bin = Complex::from_polar(magnitude[i], theta);
            buf[i] = bin;
            buf[n - i] = bin.conj();
        }
        if n % 2 == 0 && n > 1 {
            buf[n / 2] = Complex::new(magnitude[n / 2] * self.next_noise().signum(), 0.0);
        }
        self.inverse.process(&mut buf);
        let scale = 1.0 / n as f64;
        buf.iter().map(|c| c.re * scale).collect()
    }

    #[inline]
    fn next_noise(&mut self) -> f64 {
        // Simple xorshift PRNG
        let mut x = self.noise_state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.noise_state = x;
        f64::from(x as i32) / f64::from(i32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_envelope_is_a_unit_impulse() {
        // Unit magnitude everywhere has zero log spectrum, so the
        // minimum-phase response collapses to a single leading impulse.
        let mut vocoder = Vocoder::new(64);
        let bins = vec![1.0; 33];
        let zeros = vec![0.0; 33];
        let response = vocoder.periodic_response(&bins, &zeros, 1.0);
        assert_eq!(response.len(), 64);
        assert!((response[0] - 1.0).abs() < 1e-9, "got {}", response[0]);
        for &s in &response[1..] {
            assert!(s.abs() < 1e-9);
        }
    }

    #[test]
    fn period_scales_energy() {
        let mut vocoder = Vocoder::new(64);
        let bins = vec![1.0; 33];
        let zeros = vec![0.0; 33];
        let short = vocoder.periodic_response(&bins, &zeros, 1.0);
        let long = vocoder.periodic_response(&bins, &zeros, 100.0);
        assert!((long[0] / short[0] - 100.0_f64.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn responses_are_finite() {
        let mut vocoder = Vocoder::new(128);
        let spectrum: Vec<f64> = (0..65).map(|i| 1e-6 + (i as f64 / 65.0)).collect();
        let aperiodicity = vec![0.5; 65];
        for &period in &[16.0, 80.0, 400.0] {
            let response = vocoder.periodic_response(&spectrum, &aperiodicity, period);
            assert_eq!(response.len(), 128);
            assert!(response.iter().all(|s| s.is_finite()));
        }
    }

    #[test]
    fn noise_response_has_energy_and_varies() {
        let mut vocoder = Vocoder::new(128);
        let spectrum = vec![1.0; 65];
        let first = vocoder.noise_response(&spectrum);
        let second = vocoder.noise_response(&spectrum);
        let energy: f64 = first.iter().map(|s| s * s).sum();
        assert!(energy > 0.0);
        assert!(first.iter().all(|s| s.is_finite()));
        assert_ne!(first, second);
    }

    #[test]
    fn zero_envelope_is_silent() {
        let mut vocoder = Vocoder::new(64);
        let zeros = vec![0.0; 33];
        let response = vocoder.noise_response(&zeros);
        // log floor keeps the periodic path tiny; the noise path is exactly
        // scaled by the zero magnitude
        assert!(response.iter().all(|s| s.abs() < 1e-9));
    }
}
