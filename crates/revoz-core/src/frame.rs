//! Frame parameter sets and shape-checked owned batches.
//!
//! A [`Frame`] is one analysis time-step's pitch plus spectral envelope and
//! aperiodicity vectors. A [`FrameBatch`] is an exclusively owned copy of
//! zero or more frames built from caller slices; shape validation happens
//! before any copying so a mismatched call never mutates anything.

use thiserror::Error;

/// Errors produced when the dimensions of an append batch disagree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// The three inputs describe different numbers of frames.
    #[error(
        "frame counts disagree: f0 {f0}, spectrogram {spectrum}, aperiodicity {aperiodicity}"
    )]
    FrameCount {
        /// Length of the pitch contour.
        f0: usize,
        /// Leading dimension of the spectrogram.
        spectrum: usize,
        /// Leading dimension of the aperiodicity matrix.
        aperiodicity: usize,
    },

    /// Spectrogram and aperiodicity rows have different lengths.
    #[error("bin counts disagree: spectrogram {spectrum}, aperiodicity {aperiodicity}")]
    BinCount {
        /// Bins in the spectrogram row.
        spectrum: usize,
        /// Bins in the aperiodicity row.
        aperiodicity: usize,
    },

    /// Row length does not match the transform size fixed at construction.
    #[error("{bins} bins do not match the configured transform (expected {expected})")]
    BinsForFft {
        /// Bins in the offending row.
        bins: usize,
        /// Expected bins, `fft_size / 2 + 1`.
        expected: usize,
    },
}

/// One analysis frame: pitch plus spectral envelope and aperiodicity.
///
/// A pitch of `0.0` (or any non-positive value) marks an unvoiced frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Fundamental frequency in Hz, `<= 0.0` for unvoiced.
    pub f0: f64,
    /// Power spectral envelope, `fft_size / 2 + 1` bins.
    pub spectrum: Vec<f64>,
    /// Band aperiodicity in `[0, 1]`, same length as `spectrum`.
    pub aperiodicity: Vec<f64>,
}

/// An exclusively owned batch of frames awaiting hand-off to the ring.
///
/// Dropping a batch releases every copy it holds; a rejected hand-off
/// therefore cleans up in the scope that made the copies.
#[derive(Debug, Clone, Default)]
pub struct FrameBatch {
    frames: Vec<Frame>,
}

impl FrameBatch {
    /// Builds a batch from parallel rows, validating shapes first.
    ///
    /// Checks, in order:
    ///
    /// 1. the three leading dimensions (frame counts) are equal;
    /// 2. each spectrogram row and its aperiodicity row have equal length;
    /// 3. every row has exactly `expected_bins` bins.
    ///
    /// Nothing is copied until all checks pass. An empty input produces an
    /// empty batch.
    pub fn from_rows(
        f0: &[f64],
        spectrogram: &[Vec<f64>],
        aperiodicity: &[Vec<f64>],
        expected_bins: usize,
    ) -> Result<Self, ShapeError> {
        if f0.len() != spectrogram.len() || f0.len() != aperiodicity.len() {
            return Err(ShapeError::FrameCount {
                f0: f0.len(),
                spectrum: spectrogram.len(),
                aperiodicity: aperiodicity.len(),
            });
        }
        for (sp, ap) in spectrogram.iter().zip(aperiodicity.iter()) {
            if sp.len() != ap.len() {
                return Err(ShapeError::BinCount {
                    spectrum: sp.len(),
                    aperiodicity: ap.len(),
                });
            }
        }
        for sp in spectrogram.iter() {
            if sp.len() != expected_bins {
                return Err(ShapeError::BinsForFft {
                    bins: sp.len(),
                    expected: expected_bins,
                });
            }
        }

        let frames = f0
            .iter()
            .zip(spectrogram.iter().zip(aperiodicity.iter()))
            .map(|(&f0, (sp, ap))| Frame {
                f0,
                spectrum: sp.clone(),
                aperiodicity: ap.clone(),
            })
            .collect();
        Ok(Self { frames })
    }

    /// Number of frames in the batch.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True when the batch holds no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The frames in append order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}
