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

//! tempo-detector estimates the tempo (beats per minute) of a short audio
//! clip, such as a 30 second track preview. It only looks at the amplitude
//! of the signal in the time domain. There is no FFT involved.
//!
//! The estimation works in three stages:
//! 1. **Peak detection** ([`PeakDetector`]): find samples that are louder
//!    than a threshold, at least [`DEFAULT_MIN_PEAK_DISTANCE`] samples apart.
//!    The threshold starts at `0.9` and is lowered in steps of `0.05` (down
//!    to `0.3`) until at least 30 peaks are found.
//! 2. **Interval histogram** ([`IntervalHistogram`]): count how often each
//!    distance between a peak and its next ten peaks occurs.
//! 3. **Tempo aggregation** ([`TempoAggregator`]): turn each distance into a
//!    tempo, fold it into the band `90..=180` BPM, merge equal tempos and
//!    rank them by how many peak pairs support them.
//!
//! The input must be a complete, decoded mono clip. Decoding files and
//! selecting a channel is up to the caller; [`util`] has a few helpers.
//!
//! ## Example
//! ```rust
//! // Pretend this is a decoded mono clip with a beat every 0.5 seconds.
//! let mut samples = vec![0.0; 44100 * 20];
//! samples.iter_mut().step_by(22050).for_each(|s| *s = 0.8);
//!
//! let estimate = tempo_detector::estimate_tempo(&samples, 44100).unwrap();
//! assert_eq!(estimate.bpm(), Some(120));
//! for candidate in estimate.candidates() {
//!     println!("{} BPM ({} votes)", candidate.tempo, candidate.count);
//! }
//! ```
//!
//! ## Caveats
//! The minimum peak distance is a fixed number of samples. It corresponds to
//! roughly a quarter second only at 44.1 kHz. It can be changed via
//! [`EstimatorConfig`].

#![no_std]
#![deny(
    clippy::all,
    clippy::nursery,
    // clippy::restriction,
    // clippy::pedantic
)]
// now allow a few rules which are denied by the above statement
// --> they are ridiculous and not necessary
#![allow(
    clippy::suboptimal_flops,
    clippy::redundant_pub_crate,
    clippy::fallible_impl_from,
    clippy::multiple_crate_versions
)]
#![deny(missing_debug_implementations)]
#![deny(rustdoc::all)]

extern crate alloc;

#[cfg_attr(any(test, feature = "std"), macro_use)]
#[cfg(any(test, feature = "std"))]
extern crate std;

#[cfg(test)]
#[macro_use]
extern crate assert2;

#[cfg(test)]
#[macro_use]
extern crate float_cmp;

mod config;
mod estimator;
mod interval_histogram;
mod lowpass_filter;
mod peak_detector;
mod sample_buffer;
mod tempo_aggregator;
/// PUBLIC. Helpers to prepare decoded audio for the estimation.
pub mod util;

#[cfg(feature = "recording")]
mod stdlib;
#[cfg(test)]
mod test_utils;

pub use config::*;
pub use estimator::*;
pub use interval_histogram::*;
pub use lowpass_filter::*;
pub use peak_detector::*;
pub use sample_buffer::*;
pub use tempo_aggregator::*;

#[cfg(feature = "recording")]
pub use stdlib::recording;
