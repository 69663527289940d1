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

//! Module for recording a fixed-length clip from an audio input device.
//!
//! The clip is analysed afterwards as a whole, there is no live analysis.

use crate::util::channel_samples;
use crate::{EstimationError, SampleBuffer, TempoEstimate, TempoEstimator};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuffer::{AllocRingBuffer, RingBuffer};
use std::string::ToString;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use std::vec::Vec;
use thiserror::Error;

/// Possible errors of [`record_clip`].
#[derive(Debug, Error)]
pub enum RecordClipError {
    /// There was no audio device provided and no default device can be found.
    #[error("no audio device provided and no default input device found")]
    NoDefaultAudioDevice,
    /// There was a problem detecting the input stream config.
    #[error("failed to query the input stream config")]
    InputConfigError(#[from] cpal::DefaultStreamConfigError),
    /// Failed to build an input stream.
    #[error("failed to build the input stream")]
    FailedBuildingInputStream(#[from] cpal::BuildStreamError),
    /// There was a problem starting the stream.
    #[error("failed to start the input stream")]
    InputError(#[from] cpal::PlayStreamError),
}

/// A recorded mono clip.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedClip {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl RecordedClip {
    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Estimates the tempo of the clip.
    pub fn estimate(&self, estimator: &TempoEstimator) -> Result<TempoEstimate, EstimationError> {
        estimator.estimate(SampleBuffer::new(&self.samples, self.sample_rate)?)
    }
}

/// Records the first channel of the input device for the given duration.
///
/// Blocks the calling thread while recording. If no device is provided, the
/// default input device of the default host is used.
pub fn record_clip(
    duration: Duration,
    preferred_input_dev: Option<cpal::Device>,
) -> Result<RecordedClip, RecordClipError> {
    let input_dev = preferred_input_dev.map(Ok).unwrap_or_else(|| {
        let host = cpal::default_host();
        log::debug!("Using '{:?}' as input framework", host.id());
        host.default_input_device()
            .ok_or(RecordClipError::NoDefaultAudioDevice)
    })?;

    log::debug!(
        "Using '{}' as input device",
        input_dev.name().unwrap_or_else(|_| "<unknown>".to_string())
    );

    let input_config = input_dev.default_input_config()?.config();
    log::debug!("Input configuration: {:#?}", input_config);

    let sample_rate = input_config.sample_rate.0;
    let channels = input_config.channels as usize;
    // Keeps only the latest `duration` of audio, even if the device delivers
    // a little more than requested.
    let capacity = ((duration.as_secs_f64() * sample_rate as f64) as usize).max(1);
    let history = Arc::new(Mutex::new(AllocRingBuffer::<f32>::new(capacity)));

    let history_cb = Arc::clone(&history);
    // Under the hood, this spawns a thread.
    let stream = input_dev.build_input_stream(
        &input_config,
        move |data: &[f32], _info| {
            log::trace!(
                "audio input callback: {} samples ({channels} channels, sampling rate = {sample_rate})",
                data.len(),
            );
            let mut history = history_cb.lock().unwrap_or_else(PoisonError::into_inner);
            channel_samples(data, channels, 0).for_each(|sample| history.push(sample));
        },
        |e| {
            log::error!("Input error: {e:#?}");
        },
        // Timeout: worst case max blocking time
        Some(Duration::from_secs(1)),
    )?;

    stream.play()?;
    std::thread::sleep(duration);
    drop(stream);

    let samples = history
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .to_vec();
    log::debug!("Recorded {} samples", samples.len());

    Ok(RecordedClip {
        samples,
        sample_rate,
    })
}
