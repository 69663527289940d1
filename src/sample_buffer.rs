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
//! Module for [`SampleBuffer`].

use core::time::Duration;
use thiserror::Error;

/// The sample rate must be greater than zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("the sample rate must be greater than zero")]
pub struct InvalidSampleRateError;

/// Read-only view on a complete, already decoded mono audio clip together
/// with its sample rate.
///
/// Samples are expected to be in range `-1.0..=1.0`. Values outside that
/// range are not rejected, they just behave like very loud samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleBuffer<'a> {
    samples: &'a [f32],
    sample_rate: u32,
}

impl<'a> SampleBuffer<'a> {
    /// Creates a new buffer. Any length, including zero, is fine.
    pub const fn new(samples: &'a [f32], sample_rate: u32) -> Result<Self, InvalidSampleRateError> {
        if sample_rate == 0 {
            return Err(InvalidSampleRateError);
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Returns the underlying samples.
    #[must_use]
    pub const fn samples(&self) -> &'a [f32] {
        self.samples
    }

    /// Returns the sample rate (Hz).
    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the playback duration of the clip.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }
}
