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
//! Utilities for pre-processing audio with a lowpass filter.
//!
//! Low frequencies (kick drum, bass) usually carry the beat. Removing
//! everything else before peak detection often makes the peaks more regular.

use alloc::vec::Vec;
use biquad::{Biquad, Coefficients, DirectForm2Transposed, ToHertz, Type, Q_BUTTERWORTH_F32};
use thiserror::Error;

/// The cutoff frequency can't be used for a lowpass filter.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum InvalidCutoffError {
    /// The cutoff frequency doesn't fulfill the Nyquist rule.
    #[error("invalid cutoff frequency: {cutoff_hz} * 2 <= sampling rate ({sample_rate_hz}) is not fulfilled")]
    Nyquist { cutoff_hz: f32, sample_rate_hz: u32 },
    #[error("cutoff frequency {0} is not a positive finite value")]
    NotPositive(f32),
}

/// Checks that the cutoff frequency is a positive finite value. Whether it
/// fits a sample rate is only known in [`LowpassFilter::new`].
pub(crate) fn check_cutoff_hz(cutoff_hz: f32) -> Result<(), InvalidCutoffError> {
    if cutoff_hz.is_finite() && cutoff_hz > 0.0 {
        Ok(())
    } else {
        Err(InvalidCutoffError::NotPositive(cutoff_hz))
    }
}

/// Helper to pass samples through a Butterworth lowpass filter.
///
/// Please note that the filter introduces a short delay ("group delay") onto
/// the signal. As only distances between peaks matter for the tempo, this
/// doesn't influence the result.
#[derive(Debug)]
pub struct LowpassFilter {
    /// Recommended impl of biquad filter
    filter: DirectForm2Transposed<f32>,
}

impl LowpassFilter {
    /// Creates a new lowpass filter.
    pub fn new(sample_rate_hz: u32, cutoff_hz: f32) -> Result<Self, InvalidCutoffError> {
        check_cutoff_hz(cutoff_hz)?;
        // Check Nyquist
        if cutoff_hz * 2.0 > sample_rate_hz as f32 {
            return Err(InvalidCutoffError::Nyquist {
                cutoff_hz,
                sample_rate_hz,
            });
        }

        let coefficients = Coefficients::<f32>::from_params(
            Type::LowPass,
            (sample_rate_hz as f32).hz(),
            cutoff_hz.hz(),
            Q_BUTTERWORTH_F32,
        )
        .map_err(|_| InvalidCutoffError::Nyquist {
            cutoff_hz,
            sample_rate_hz,
        })?;

        Ok(Self {
            filter: DirectForm2Transposed::<f32>::new(coefficients),
        })
    }

    /// Runs one sample through the lowpass filter and updates the internal
    /// state.
    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        self.filter.run(sample)
    }

    /// Filters a whole clip into a new buffer. The filter state is reset
    /// before, so that clips don't influence each other.
    pub fn filter_clip(&mut self, samples: &[f32]) -> Vec<f32> {
        self.filter.reset_state();
        samples.iter().map(|&sample| self.process(sample)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::PI;
    use std::vec::Vec;

    fn sine(frequency: f32, sample_rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| libm::sinf(2.0 * PI * frequency * i as f32 / sample_rate as f32))
            .collect()
    }

    fn max_abs(samples: &[f32]) -> f32 {
        samples.iter().fold(0.0, |max, &s| libm::fabsf(s).max(max))
    }

    #[test]
    fn is_send_and_sync() {
        fn accept<I: Send + Sync>() {}

        accept::<LowpassFilter>();
    }

    #[test]
    fn rejects_invalid_cutoff() {
        check!(matches!(
            LowpassFilter::new(44100, 30000.0),
            Err(InvalidCutoffError::Nyquist { .. })
        ));
        check!(matches!(
            LowpassFilter::new(44100, 0.0),
            Err(InvalidCutoffError::NotPositive(_))
        ));
        check!(matches!(
            LowpassFilter::new(44100, f32::NAN),
            Err(InvalidCutoffError::NotPositive(_))
        ));
        check!(LowpassFilter::new(44100, 100.0).is_ok());
    }

    #[test]
    fn attenuates_high_frequencies() {
        let mut filter = LowpassFilter::new(44100, 100.0).unwrap();

        let low = filter.filter_clip(&sine(40.0, 44100, 44100));
        let high = filter.filter_clip(&sine(4000.0, 44100, 44100));

        // skip the settling phase
        check!(max_abs(&low[4410..]) > 0.8);
        check!(max_abs(&high[4410..]) < 0.01);
    }

    #[test]
    fn filtering_keeps_length() {
        let mut filter = LowpassFilter::new(8000, 100.0).unwrap();
        check!(filter.filter_clip(&[]).is_empty());
        check!(filter.filter_clip(&[0.5; 123]).len() == 123);
    }
}
