//! Revoz Synth - real-time streaming voice resynthesis
//!
//! This crate turns queued per-frame acoustic parameters (pitch, spectral
//! envelope, aperiodicity) into a continuous audio stream, produced in
//! fixed-size chunks suitable for low-latency playback.
//!
//! # Core Components
//!
//! - [`StreamSynthesizer`] - the stateful producer/consumer component:
//!   accepts frame batches with [`StreamSynthesizer::append`], reports the
//!   terminal backpressure state with [`StreamSynthesizer::is_locked`],
//!   emits chunks with [`StreamSynthesizer::produce_chunk`], and recovers
//!   via the destructive [`StreamSynthesizer::refresh`]
//! - [`Vocoder`] - per-pulse response generation: minimum-phase
//!   reconstruction of the spectral envelope plus noise-excited aperiodic
//!   and unvoiced components
//!
//! # Example
//!
//! ```rust
//! use revoz_core::SynthConfig;
//! use revoz_synth::StreamSynthesizer;
//!
//! let config = SynthConfig {
//!     sample_rate: 16000,
//!     frame_period_ms: 5.0,
//!     fft_size: 1024,
//!     chunk_size: 1024,
//!     ring_slots: 8,
//! };
//! let mut synth = StreamSynthesizer::new(config).unwrap();
//!
//! let bins = config.spectrum_bins();
//! let f0 = vec![120.0; 16];
//! let spectrogram = vec![vec![1e-4; bins]; 16];
//! let aperiodicity = vec![vec![0.1; bins]; 16];
//!
//! assert!(synth.append(&f0, &spectrogram, &aperiodicity).unwrap());
//! let chunk = synth.produce_chunk().expect("16 frames cover one chunk");
//! assert_eq!(chunk.len(), 1024);
//! ```
//!
//! # Backpressure
//!
//! Capacity conditions are data, not errors: a full ring makes `append`
//! return `Ok(false)`, insufficient buffered duration makes `produce_chunk`
//! return `None`, and the combination of both is the *locked* state, which
//! only `refresh` leaves.

pub mod stream;
pub mod vocoder;

pub use revoz_core::{ConfigError, ShapeError, SynthConfig};
pub use stream::StreamSynthesizer;
pub use vocoder::Vocoder;
