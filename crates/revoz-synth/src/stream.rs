//! The streaming synthesizer.
//!
//! [`StreamSynthesizer`] is the single stateful, lifecycle-bearing component
//! of the workspace. It owns one [`ParameterRing`] of pending frame batches
//! and one [`Vocoder`], and converts the queued parameter timeline into
//! fixed-size chunks of audio.
//!
//! # Timeline model
//!
//! Frame `i` sits at sample `i * frame_hop` on an absolute timeline that
//! starts at construction (or the last [`StreamSynthesizer::refresh`]).
//! Production walks excitation pulses along that timeline: each pulse looks
//! up the nearest queued frame, asks the vocoder for a response, and
//! overlap-adds it into the current chunk, carrying any overhang into the
//! next one. A chunk can be produced once the queued duration reaches the
//! end of the chunk window; otherwise production reports "no data".
//!
//! # Locking
//!
//! The ring rejects batches when all slots are occupied. If at that point
//! the queued duration is still too short to produce a chunk, the component
//! can make no progress in either direction: that is the *locked* state,
//! terminal until `refresh` discards the pending timeline.
//!
//! # Concurrency
//!
//! Single-producer/single-consumer by design: there is no internal locking,
//! and the `&mut self` receivers make concurrent calls on one instance a
//! compile error rather than a data race. Distinct instances share nothing.

use revoz_core::{ConfigError, FrameBatch, ParameterRing, ShapeError, SynthConfig};

use crate::vocoder::Vocoder;

/// Excitation rate used for unvoiced frames, in Hz.
const DEFAULT_F0: f64 = 500.0;

/// Stateful converter from queued frame parameters to fixed-size chunks.
#[derive(Debug)]
pub struct StreamSynthesizer {
    config: SynthConfig,
    ring: ParameterRing,
    vocoder: Vocoder,
    /// Response overhang beyond the current chunk, `fft_size` samples.
    carry: Vec<f64>,
    /// Absolute sample index of the next chunk's first sample.
    synthesized: u64,
    /// Absolute sample location of the next excitation pulse.
    next_pulse: f64,
}

impl StreamSynthesizer {
    /// Builds a synthesizer after validating the configuration.
    ///
    /// Fails with [`ConfigError`] naming the offending parameter; a failed
    /// call allocates nothing observable.
    pub fn new(config: SynthConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            ring: ParameterRing::new(config.ring_slots),
            vocoder: Vocoder::new(config.fft_size),
            carry: vec![0.0; config.fft_size],
            synthesized: 0,
            next_pulse: 0.0,
            config,
        })
    }

    /// The configuration the synthesizer was built with.
    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    /// Attempts to queue a batch of frames.
    ///
    /// `f0`, `spectrogram` and `aperiodicity` are parallel: `N` pitch values
    /// and two `N x (fft_size / 2 + 1)` matrices. Shape mismatches fail with
    /// [`ShapeError`] before anything is copied or mutated. An empty batch
    /// succeeds trivially with no state change.
    ///
    /// Returns `Ok(true)` when the whole batch was admitted and is now owned
    /// by the ring, `Ok(false)` when the ring had no free slot - in which
    /// case the copied batch is dropped here, whole, and the caller may
    /// retry after production or [`Self::refresh`]. Admission is
    /// all-or-nothing.
    pub fn append(
        &mut self,
        f0: &[f64],
        spectrogram: &[Vec<f64>],
        aperiodicity: &[Vec<f64>],
    ) -> Result<bool, ShapeError> {
        let batch = FrameBatch::from_rows(f0, spectrogram, aperiodicity, self.config.spectrum_bins())?;
        if batch.is_empty() {
            return Ok(true);
        }
        match self.ring.push(batch) {
            Ok(()) => {
                tracing::debug!(
                    frames = f0.len(),
                    pending = self.ring.pending_batches(),
                    "append: batch accepted"
                );
                Ok(true)
            }
            Err(rejected) => {
                tracing::debug!(frames = rejected.len(), "append: ring full, batch dropped");
                Ok(false)
            }
        }
    }

    /// True exactly when the ring can accept no batch and the queued
    /// duration cannot yield a chunk. Pure query; only [`Self::refresh`]
    /// leaves this state.
    pub fn is_locked(&self) -> bool {
        self.ring.is_full() && !self.can_produce()
    }

    /// Synthesizes the next `chunk_size` samples, or `None` when the queued
    /// parameter timeline is too short.
    ///
    /// On success the stream cursor advances by exactly one chunk and every
    /// batch whose frames now lie behind the cursor is released.
    pub fn produce_chunk(&mut self) -> Option<Vec<f64>> {
        if !self.can_produce() {
            return None;
        }
        let chunk_size = self.config.chunk_size;
        let mut chunk = self.take_carry();
        let end = self.synthesized + chunk_size as u64;

        while self.next_pulse < end as f64 {
            let Some(response) = self.pulse_response() else {
                break;
            };
            let offset = (self.next_pulse.floor() as u64 - self.synthesized) as usize;
            for (i, &sample) in response.iter().enumerate() {
                let position = offset + i;
                if position < chunk_size {
                    chunk[position] += sample;
                } else {
                    self.carry[position - chunk_size] += sample;
                }
            }
        }

        self.synthesized = end;
        let cutoff = (self.synthesized as f64 / self.config.frame_hop()).floor() as u64;
        let released = self.ring.release_below(cutoff);
        tracing::debug!(
            cursor = self.synthesized,
            released,
            pending = self.ring.pending_batches(),
            "produce: chunk emitted"
        );
        Some(chunk)
    }

    /// Destructive reset to the just-constructed state.
    ///
    /// Discards every pending batch (locked or not), zeroes the stream
    /// cursor, pulse walker and overlap carry. Always succeeds.
    pub fn refresh(&mut self) {
        let discarded = self.ring.pending_batches();
        self.ring.clear();
        self.carry.fill(0.0);
        self.synthesized = 0;
        self.next_pulse = 0.0;
        tracing::debug!(discarded, "refresh: synthesizer reset");
    }

    /// End of the queued parameter timeline in samples.
    fn timeline_end(&self) -> f64 {
        self.ring.total_frames() as f64 * self.config.frame_hop()
    }

    fn can_produce(&self) -> bool {
        self.timeline_end() >= (self.synthesized + self.config.chunk_size as u64) as f64
    }

    /// Starts a chunk from the carry buffer and slides the carry forward.
    fn take_carry(&mut self) -> Vec<f64> {
        let chunk_size = self.config.chunk_size;
        let mut chunk = vec![0.0; chunk_size];
        let take = chunk_size.min(self.carry.len());
        chunk[..take].copy_from_slice(&self.carry[..take]);
        if chunk_size >= self.carry.len() {
            self.carry.fill(0.0);
        } else {
            self.carry.copy_within(chunk_size.., 0);
            let keep = self.carry.len() - chunk_size;
            self.carry[keep..].fill(0.0);
        }
        chunk
    }

    /// Generates the response for the pulse at `next_pulse` and advances the
    /// pulse walker by one pitch period.
    fn pulse_response(&mut self) -> Option<Vec<f64>> {
        let hop = self.config.frame_hop();
        let last_frame = self.ring.total_frames().saturating_sub(1);
        let nearest = (self.next_pulse / hop).round() as u64;
        let frame = self.ring.frame(nearest.min(last_frame))?;

        let voiced = frame.f0 > 0.0;
        let f0 = if voiced { frame.f0 } else { DEFAULT_F0 };
        let response = if voiced {
            let period = f64::from(self.config.sample_rate) / f0;
            self.vocoder
                .periodic_response(&frame.spectrum, &frame.aperiodicity, period)
        } else {
            self.vocoder.noise_response(&frame.spectrum)
        };

        self.next_pulse += (f64::from(self.config.sample_rate) / f0).max(1.0);
        Some(response)
    }
}
