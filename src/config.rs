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
//! Module for [`EstimatorConfig`].

use crate::peak_detector::threshold_pass_count;
use crate::tempo_aggregator::is_foldable_band;
use crate::InvalidCutoffError;
use thiserror::Error;

/// Minimum distance in samples between two peaks. At 44.1 kHz, this is
/// roughly a quarter of a second. It does not scale with the sample rate.
pub const DEFAULT_MIN_PEAK_DISTANCE: usize = 10_000;

/// Threshold of the first peak detection pass.
pub const DEFAULT_INITIAL_THRESHOLD: f32 = 0.9;

/// Amount the threshold is lowered after each unsuccessful pass.
pub const DEFAULT_THRESHOLD_STEP: f32 = 0.05;

/// Lowest threshold that is still tried.
pub const DEFAULT_MIN_THRESHOLD: f32 = 0.3;

/// Peak count that ends the adaptive threshold search.
pub const DEFAULT_MIN_PEAKS: usize = 30;

/// Number of successors each peak is compared with.
pub const DEFAULT_SUCCESSOR_WINDOW: usize = 10;

/// Lower bound of the tempo band all hypotheses are folded into.
pub const DEFAULT_MIN_BPM: f64 = 90.0;

/// Upper bound of the tempo band all hypotheses are folded into.
pub const DEFAULT_MAX_BPM: f64 = 180.0;

/// Number of ranked tempo candidates that are reported.
pub const DEFAULT_TOP_N: usize = 5;

/// Upper limit of peak detection passes a configuration may lead to. Each
/// pass scans the whole clip.
pub const MAX_THRESHOLD_PASSES: usize = 1000;

/// A value of [`EstimatorConfig`] is not usable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidConfigError {
    #[error("threshold {0} is not a finite value in range 0.0..=1.0")]
    InvalidThreshold(f32),
    #[error("minimum threshold ({min}) must not be greater than the initial threshold ({initial})")]
    ThresholdOrder { initial: f32, min: f32 },
    #[error("threshold step {0} must be finite and greater than zero")]
    InvalidThresholdStep(f32),
    #[error("the successor window must compare at least one successor")]
    EmptySuccessorWindow,
    #[error("at least one tempo candidate must be reported")]
    EmptyTopN,
    #[error("invalid tempo band {min}..={max}: bounds must be positive and max >= 2 * min")]
    InvalidTempoBand { min: f64, max: f64 },
    #[error("threshold step leads to {passes} peak detection passes, at most {max} are allowed")]
    TooManyThresholdPasses { passes: usize, max: usize },
    #[error("invalid lowpass cutoff frequency")]
    Lowpass(#[from] InvalidCutoffError),
}

/// All knobs of the tempo estimation. The defaults reproduce the heuristic
/// the algorithm was tuned with. Use [`Self::validate`] or
/// [`crate::TempoEstimator::new`] to check a custom configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorConfig {
    /// Minimum distance in samples between two consecutive peaks.
    pub min_peak_distance: usize,
    /// Threshold of the first peak detection pass.
    pub initial_threshold: f32,
    /// Amount the threshold is lowered after each pass.
    pub threshold_step: f32,
    /// Floor of the threshold. This threshold is the last one tried.
    pub min_threshold: f32,
    /// The adaptive search stops as soon as this many peaks are found.
    pub min_peaks: usize,
    /// Number of successors each peak is compared with when building the
    /// interval histogram.
    pub successor_window: usize,
    /// Lower bound of the tempo band (inclusive).
    pub min_bpm: f64,
    /// Upper bound of the tempo band (inclusive). Tempos are only halved
    /// while they are strictly above this value.
    pub max_bpm: f64,
    /// How many ranked tempo candidates are reported.
    pub top_n: usize,
    /// If set, the signal runs through a lowpass filter with this cutoff
    /// frequency (Hz) before peaks are detected.
    pub lowpass_cutoff_hz: Option<f32>,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            min_peak_distance: DEFAULT_MIN_PEAK_DISTANCE,
            initial_threshold: DEFAULT_INITIAL_THRESHOLD,
            threshold_step: DEFAULT_THRESHOLD_STEP,
            min_threshold: DEFAULT_MIN_THRESHOLD,
            min_peaks: DEFAULT_MIN_PEAKS,
            successor_window: DEFAULT_SUCCESSOR_WINDOW,
            min_bpm: DEFAULT_MIN_BPM,
            max_bpm: DEFAULT_MAX_BPM,
            top_n: DEFAULT_TOP_N,
            lowpass_cutoff_hz: None,
        }
    }
}

impl EstimatorConfig {
    /// Checks that all values are usable. A valid configuration guarantees
    /// that the threshold search and the octave folding terminate.
    pub fn validate(&self) -> Result<(), InvalidConfigError> {
        for threshold in [self.initial_threshold, self.min_threshold] {
            if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
                return Err(InvalidConfigError::InvalidThreshold(threshold));
            }
        }
        if self.min_threshold > self.initial_threshold {
            return Err(InvalidConfigError::ThresholdOrder {
                initial: self.initial_threshold,
                min: self.min_threshold,
            });
        }
        if !self.threshold_step.is_finite() || self.threshold_step <= 0.0 {
            return Err(InvalidConfigError::InvalidThresholdStep(
                self.threshold_step,
            ));
        }
        let passes = threshold_pass_count(
            self.initial_threshold,
            self.min_threshold,
            self.threshold_step,
        );
        if passes > MAX_THRESHOLD_PASSES {
            return Err(InvalidConfigError::TooManyThresholdPasses {
                passes,
                max: MAX_THRESHOLD_PASSES,
            });
        }
        if self.successor_window == 0 {
            return Err(InvalidConfigError::EmptySuccessorWindow);
        }
        if self.top_n == 0 {
            return Err(InvalidConfigError::EmptyTopN);
        }

        if !is_foldable_band(self.min_bpm, self.max_bpm) {
            return Err(InvalidConfigError::InvalidTempoBand {
                min: self.min_bpm,
                max: self.max_bpm,
            });
        }

        if let Some(cutoff_hz) = self.lowpass_cutoff_hz {
            crate::lowpass_filter::check_cutoff_hz(cutoff_hz)?;
        }

        Ok(())
    }
}
