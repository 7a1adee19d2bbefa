//! Revoz Core - data model for streaming voice resynthesis
//!
//! This crate holds the stateless building blocks underneath the revoz
//! streaming synthesizer:
//!
//! - [`SynthConfig`] - construction parameters, validated once at build time
//! - [`Frame`] / [`FrameBatch`] - one analysis time-step's pitch, spectral
//!   envelope and aperiodicity, and shape-checked owned batches of them
//! - [`ParameterRing`] - the bounded circular store of batches awaiting
//!   consumption
//!
//! # Ownership discipline
//!
//! A [`FrameBatch`] is an exclusively owned copy of caller data. Handing it
//! to [`ParameterRing::push`] either transfers ownership into the ring or
//! returns the batch untouched when the ring is full, so the scope that
//! built the copy always releases it on rejection - there is no partial
//! residency and no leak path.
//!
//! # Example
//!
//! ```rust
//! use revoz_core::{FrameBatch, ParameterRing, SynthConfig};
//!
//! let config = SynthConfig {
//!     sample_rate: 16000,
//!     frame_period_ms: 5.0,
//!     fft_size: 1024,
//!     chunk_size: 1024,
//!     ring_slots: 8,
//! };
//! config.validate().unwrap();
//!
//! let bins = config.spectrum_bins();
//! let batch = FrameBatch::from_rows(
//!     &[120.0],
//!     &[vec![1.0; bins]],
//!     &[vec![0.1; bins]],
//!     bins,
//! ).unwrap();
//!
//! let mut ring = ParameterRing::new(config.ring_slots);
//! assert!(ring.push(batch).is_ok());
//! ```

pub mod config;
pub mod frame;
pub mod ring;

pub use config::{ConfigError, SynthConfig, fft_size_for};
pub use frame::{Frame, FrameBatch, ShapeError};
pub use ring::ParameterRing;
