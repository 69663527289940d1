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
//! Module for [`TempoEstimator`].

use crate::{
    EstimatorConfig, IntervalHistogram, InvalidConfigError, InvalidCutoffError,
    InvalidSampleRateError, LowpassFilter, PeakDetection, PeakDetector, SampleBuffer,
    TempoAggregator, TempoCandidate,
};
use alloc::borrow::Cow;
use alloc::vec::Vec;
use thiserror::Error;

/// Possible errors of a tempo estimation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimationError {
    #[error("invalid sample rate")]
    InvalidSampleRate(#[from] InvalidSampleRateError),
    #[error("lowpass filter can't be used for this input")]
    Lowpass(#[from] InvalidCutoffError),
    /// Not a single peak was found, even with the lowest threshold.
    #[error("no tempo could be determined: no peaks found (lowest threshold: {threshold})")]
    NoPeaks { threshold: f32 },
    /// Peaks were found, but no pair of them yields a tempo.
    #[error("no tempo could be determined: {peaks} peak(s) yield no tempo candidate")]
    NoTempoCandidates { peaks: usize },
}

/// Outcome of [`TempoEstimator::estimate`].
#[derive(Debug, Clone, PartialEq)]
pub struct TempoEstimate {
    candidates: Vec<TempoCandidate>,
    peak_count: usize,
    threshold: f32,
    passes: usize,
}

impl TempoEstimate {
    /// Ranked tempo candidates, best first. Empty if no tempo could be
    /// determined.
    #[must_use]
    pub fn candidates(&self) -> &[TempoCandidate] {
        &self.candidates
    }

    /// The best candidate, if any.
    #[must_use]
    pub fn best(&self) -> Option<TempoCandidate> {
        self.candidates.first().copied()
    }

    /// The estimated tempo in beats per minute, if any.
    #[must_use]
    pub fn bpm(&self) -> Option<u32> {
        self.best().map(|candidate| candidate.tempo)
    }

    #[must_use]
    pub fn is_determined(&self) -> bool {
        !self.candidates.is_empty()
    }

    /// Number of peaks the estimation is based on.
    #[must_use]
    pub const fn peak_count(&self) -> usize {
        self.peak_count
    }

    /// Threshold of the accepted peak detection pass.
    #[must_use]
    pub const fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Number of peak detection passes.
    #[must_use]
    pub const fn passes(&self) -> usize {
        self.passes
    }

    /// Turns an undetermined estimate into the corresponding error.
    pub fn into_bpm(self) -> Result<u32, EstimationError> {
        match (self.bpm(), self.peak_count) {
            (Some(bpm), _) => Ok(bpm),
            (None, 0) => Err(EstimationError::NoPeaks {
                threshold: self.threshold,
            }),
            (None, peaks) => Err(EstimationError::NoTempoCandidates { peaks }),
        }
    }
}

/// Estimates the tempo of a complete audio clip in three stages: peak
/// detection, interval histogram, and tempo aggregation.
///
/// The estimator has no state besides its configuration; one instance can be
/// used for any number of clips.
///
/// ## Example
/// ```rust
/// use tempo_detector::TempoEstimator;
/// // Pretend this is a decoded mono clip with a click every 0.5 seconds.
/// let mut samples = vec![0.0; 44100 * 20];
/// samples.iter_mut().step_by(22050).for_each(|s| *s = 1.0);
///
/// let estimator = TempoEstimator::default();
/// let estimate = estimator.estimate_samples(&samples, 44100).unwrap();
/// assert_eq!(estimate.bpm(), Some(120));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TempoEstimator {
    config: EstimatorConfig,
    detector: PeakDetector,
    aggregator: TempoAggregator,
}

impl TempoEstimator {
    /// Creates a new estimator with a custom configuration.
    pub fn new(config: EstimatorConfig) -> Result<Self, InvalidConfigError> {
        config.validate()?;
        Ok(Self {
            detector: PeakDetector::from_validated(&config),
            aggregator: TempoAggregator::from_validated(&config),
            config,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Estimates the tempo of the clip.
    ///
    /// Only fails if the lowpass filter can't be used with the sample rate of
    /// the clip. A clip without a detectable tempo results in an estimate
    /// without candidates.
    pub fn estimate(&self, buffer: SampleBuffer) -> Result<TempoEstimate, EstimationError> {
        let samples = self.preprocess(buffer)?;
        let detection = self.detector.detect(&samples);
        let PeakDetection {
            peaks,
            threshold,
            passes,
            reached_min_peaks,
        } = detection;
        log::debug!(
            "found {} peaks at threshold {threshold:.2} after {passes} passes (enough: {reached_min_peaks})",
            peaks.len()
        );

        let histogram = IntervalHistogram::from_peaks(&peaks, self.config.successor_window);
        let candidates = self.aggregator.aggregate(&histogram, buffer.sample_rate());

        match candidates.first() {
            Some(best) => log::debug!(
                "estimated tempo: {} BPM ({} of {} pairs)",
                best.tempo,
                best.count,
                histogram.pair_count()
            ),
            None => log::debug!("no tempo could be determined"),
        }

        Ok(TempoEstimate {
            candidates,
            peak_count: peaks.len(),
            threshold,
            passes,
        })
    }

    /// Convenient wrapper around [`Self::estimate`] for a plain slice of
    /// mono samples.
    pub fn estimate_samples(
        &self,
        samples: &[f32],
        sample_rate: u32,
    ) -> Result<TempoEstimate, EstimationError> {
        self.estimate(SampleBuffer::new(samples, sample_rate)?)
    }

    /// Returns only the best tempo. A clip without a detectable tempo is
    /// reported as [`EstimationError::NoPeaks`] or
    /// [`EstimationError::NoTempoCandidates`].
    pub fn estimate_bpm(&self, buffer: SampleBuffer) -> Result<u32, EstimationError> {
        self.estimate(buffer)?.into_bpm()
    }

    /// Runs the optional lowpass filter. The caller's buffer is never
    /// modified.
    fn preprocess<'a>(&self, buffer: SampleBuffer<'a>) -> Result<Cow<'a, [f32]>, EstimationError> {
        match self.config.lowpass_cutoff_hz {
            Some(cutoff_hz) => {
                let mut filter = LowpassFilter::new(buffer.sample_rate(), cutoff_hz)?;
                log::trace!("applying lowpass filter with cutoff {cutoff_hz} Hz");
                Ok(Cow::Owned(filter.filter_clip(buffer.samples())))
            }
            None => Ok(Cow::Borrowed(buffer.samples())),
        }
    }
}

impl Default for TempoEstimator {
    fn default() -> Self {
        let config = EstimatorConfig::default();
        Self {
            detector: PeakDetector::from_validated(&config),
            aggregator: TempoAggregator::from_validated(&config),
            config,
        }
    }
}

/// Estimates the tempo of mono samples with the default configuration.
///
/// Returns up to five ranked tempo candidates. An estimate without
/// candidates means that no tempo could be determined.
pub fn estimate_tempo(samples: &[f32], sample_rate: u32) -> Result<TempoEstimate, EstimationError> {
    TempoEstimator::default().estimate_samples(samples, sample_rate)
}

/// Estimates the tempo of mono samples with the default configuration and
/// returns only the best tempo in beats per minute.
pub fn estimate_bpm(samples: &[f32], sample_rate: u32) -> Result<u32, EstimationError> {
    estimate_tempo(samples, sample_rate)?.into_bpm()
}
