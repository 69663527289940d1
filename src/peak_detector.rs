/*
MIT License

Copyright (c) 2024 Philipp Schuster

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/
//! Peak detection with an adaptive threshold.
//!
//! A peak is a sample whose amplitude is strictly greater than the threshold.
//! After each peak, the scan jumps forward by a minimum distance, so that
//! the decay of the same hit is not reported again. The threshold starts high
//! and is lowered pass by pass until enough peaks are found.

use crate::{EstimatorConfig, InvalidConfigError};
use alloc::vec::Vec;

/// Iterates the peaks of a signal above a fixed threshold, from left to
/// right. Yields the sample index of each peak.
///
/// The scan is greedy: once a peak at index `i` is found, scanning resumes at
/// `i + min_distance + 1`.
#[derive(Debug, Clone)]
pub struct ThresholdPeakIterator<'a> {
    index: usize,
    samples: &'a [f32],
    threshold: f32,
    min_distance: usize,
}

impl<'a> ThresholdPeakIterator<'a> {
    pub const fn new(samples: &'a [f32], threshold: f32, min_distance: usize) -> Self {
        Self {
            index: 0,
            samples,
            threshold,
            min_distance,
        }
    }
}

impl Iterator for ThresholdPeakIterator<'_> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let offset = self
            .samples
            .get(self.index..)?
            .iter()
            .position(|&sample| sample > self.threshold)?;
        let peak = self.index + offset;
        // + 1: the scan continues after the skipped region
        self.index = peak.saturating_add(self.min_distance).saturating_add(1);
        Some(peak)
    }
}

/// Tolerance so that float rounding in `(initial - min) / step` does not
/// skip the floor threshold.
const PASS_COUNT_EPSILON: f64 = 1e-4;

/// Number of passes from `initial` down to `min` in steps of `step`,
/// including the first pass. Saturates at `usize::MAX`.
pub(crate) fn threshold_pass_count(initial: f32, min: f32, step: f32) -> usize {
    let range = (initial - min) as f64;
    let steps = libm::floor(range / step as f64 + PASS_COUNT_EPSILON);
    (steps as usize).saturating_add(1)
}

/// Result of [`PeakDetector::detect`].
#[derive(Debug, Clone, PartialEq)]
pub struct PeakDetection {
    /// Sample indices of all peaks, strictly ascending.
    pub peaks: Vec<usize>,
    /// The threshold of the accepted pass.
    pub threshold: f32,
    /// Number of performed detection passes. Always at least one.
    pub passes: usize,
    /// Whether the configured minimum peak count was reached. If not, the
    /// peaks of the lowest threshold are reported.
    pub reached_min_peaks: bool,
}

/// Finds peaks while lowering the threshold step by step until either enough
/// peaks are found or the threshold floor was tried.
#[derive(Debug, Clone, PartialEq)]
pub struct PeakDetector {
    min_distance: usize,
    initial_threshold: f32,
    threshold_step: f32,
    min_threshold: f32,
    min_peaks: usize,
}

impl PeakDetector {
    /// Creates a detector from the relevant parts of the config.
    pub fn new(config: &EstimatorConfig) -> Result<Self, InvalidConfigError> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    /// `config` must have passed [`EstimatorConfig::validate`].
    pub(crate) const fn from_validated(config: &EstimatorConfig) -> Self {
        Self {
            min_distance: config.min_peak_distance,
            initial_threshold: config.initial_threshold,
            threshold_step: config.threshold_step,
            min_threshold: config.min_threshold,
            min_peaks: config.min_peaks,
        }
    }

    /// Returns the peaks above a single, fixed threshold.
    pub fn peaks_at_threshold(&self, samples: &[f32], threshold: f32) -> Vec<usize> {
        ThresholdPeakIterator::new(samples, threshold, self.min_distance).collect()
    }

    /// Maximum number of detection passes. The last pass uses the floor
    /// threshold (or the last step above it).
    pub fn max_passes(&self) -> usize {
        threshold_pass_count(
            self.initial_threshold,
            self.min_threshold,
            self.threshold_step,
        )
    }

    /// Returns the threshold of the given zero-based pass.
    ///
    /// Derived from the pass number instead of repeated subtraction, so that
    /// no rounding error accumulates.
    pub fn threshold_of_pass(&self, pass: usize) -> f32 {
        let threshold = self.initial_threshold - self.threshold_step * pass as f32;
        threshold.max(self.min_threshold)
    }

    /// Runs the adaptive peak detection.
    ///
    /// Performs at least one pass. Stops as soon as a pass finds at least
    /// `min_peaks` peaks or after the pass with the lowest threshold. Not
    /// finding enough peaks is not an error: the result of the last pass is
    /// returned.
    pub fn detect(&self, samples: &[f32]) -> PeakDetection {
        let max_passes = self.max_passes();
        let mut pass = 0;
        loop {
            let threshold = self.threshold_of_pass(pass);
            let peaks = self.peaks_at_threshold(samples, threshold);
            pass += 1;
            log::trace!(
                "peak detection pass {pass}/{max_passes}: threshold={threshold:.2}, peaks={}",
                peaks.len()
            );

            let reached_min_peaks = peaks.len() >= self.min_peaks;
            if reached_min_peaks || pass >= max_passes {
                return PeakDetection {
                    peaks,
                    threshold,
                    passes: pass,
                    reached_min_peaks,
                };
            }
        }
    }
}

impl Default for PeakDetector {
    fn default() -> Self {
        Self::from_validated(&EstimatorConfig::default())
    }
}
