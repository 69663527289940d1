//! Helpers to turn decoded audio into what the tempo estimation expects: a
//! single channel of `f32` samples in range `-1.0..=1.0`.

use thiserror::Error;

/// Scales a 16-bit PCM sample to `-1.0..=1.0`. `i16::MIN` maps to `-1.0`.
#[inline]
pub fn i16_sample_to_f32(val: i16) -> f32 {
    (f32::from(val) / f32::from(i16::MAX)).max(-1.0)
}

/// A sample is outside of `-1.0..=1.0` or not a number.
#[derive(Copy, Clone, Debug, PartialEq, Error)]
#[error("sample {0} is out of range -1.0..=1.0")]
pub struct OutOfRangeError(pub f32);

/// Scales a sample in `-1.0..=1.0` to 16-bit PCM in
/// `-i16::MAX..=i16::MAX`. Counterpart of [`i16_sample_to_f32`].
#[inline]
pub fn f32_sample_to_i16(val: f32) -> Result<i16, OutOfRangeError> {
    if (-1.0..=1.0).contains(&val) {
        Ok((val * f32::from(i16::MAX)) as i16)
    } else {
        Err(OutOfRangeError(val))
    }
}

/// Averages the left and right sample of one stereo frame.
#[inline]
pub fn stereo_to_mono(l: f32, r: f32) -> f32 {
    (l + r) / 2.0
}

/// Iterates the samples of a single channel of interleaved audio data, such
/// as `LRLRLR` for stereo.
///
/// The tempo estimation only looks at one channel. Typically, the first
/// channel (`channel = 0`) is good enough.
///
/// # Panics
/// Panics if `channel >= channels`.
pub fn channel_samples(
    interleaved: &[f32],
    channels: usize,
    channel: usize,
) -> impl Iterator<Item = f32> + Clone + '_ {
    assert!(
        channel < channels,
        "channel {channel} doesn't exist in audio with {channels} channels"
    );
    interleaved.iter().copied().skip(channel).step_by(channels)
}
