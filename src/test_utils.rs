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

use crate::util::{channel_samples, f32_sample_to_i16, i16_sample_to_f32};
use hound::{SampleFormat, WavSpec};
use std::path::{Path, PathBuf};
use std::vec::Vec;

/// Reads a WAV file to mono audio by taking its first channel. Additionally,
/// it returns the header of the file.
pub fn read_wav_to_mono<T: AsRef<Path>>(file: T) -> (Vec<f32>, WavSpec) {
    let mut reader = hound::WavReader::open(file).unwrap();
    let header = reader.spec();

    let data = match header.sample_format {
        SampleFormat::Int => reader
            .samples::<i16>()
            .map(|s| i16_sample_to_f32(s.unwrap()))
            .collect::<Vec<_>>(),
        SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.unwrap())
            .collect::<Vec<_>>(),
    };

    let mono = channel_samples(&data, header.channels as usize, 0).collect();
    (mono, header)
}

/// Writes mono samples as 16-bit WAV file into the directory for test
/// artifacts. Returns the path of the file.
pub fn write_wav_file(name: &str, samples: &[f32], sample_rate: u32) -> PathBuf {
    let mut wav_path = target_dir_test_artifacts();
    std::fs::create_dir_all(&wav_path).unwrap();
    wav_path.push(name);

    let mut wav_writer = hound::WavWriter::create(
        &wav_path,
        WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        },
    )
    .unwrap();

    for &sample in samples {
        wav_writer
            .write_sample(f32_sample_to_i16(sample).unwrap())
            .unwrap()
    }
    wav_writer.finalize().unwrap();
    wav_path
}

/// Directory for files written by tests, `<target dir>/test_generated`.
/// Honors `CARGO_TARGET_DIR`.
pub fn target_dir_test_artifacts() -> PathBuf {
    std::env::var_os("CARGO_TARGET_DIR")
        .map_or_else(
            || PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("target"),
            PathBuf::from,
        )
        .join("test_generated")
}

/// Synthetic test signals. Generated instead of recorded so that the tempo
/// is known exactly.
pub mod signals {
    use core::f32::consts::PI;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::vec;
    use std::vec::Vec;

    /// Silence with single-sample impulses every `period` samples, starting
    /// at `offset`.
    pub fn impulse_train(len: usize, period: usize, offset: usize, amplitude: f32) -> Vec<f32> {
        let mut samples = vec![0.0; len];
        samples
            .iter_mut()
            .skip(offset)
            .step_by(period)
            .for_each(|sample| *sample = amplitude);
        samples
    }

    /// Short click that starts at full amplitude and decays within a few
    /// milliseconds.
    pub fn decaying_click(sample_rate: u32) -> Vec<f32> {
        let time_constant = 0.005 * sample_rate as f32;
        let len = (0.05 * sample_rate as f32) as usize;
        (0..len)
            .map(|i| libm::expf(-(i as f32) / time_constant))
            .collect()
    }

    /// Kick drum: a decaying 60 Hz sine.
    pub fn kick(sample_rate: u32) -> Vec<f32> {
        let len = (0.3 * sample_rate as f32) as usize;
        (0..len)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                libm::sinf(2.0 * PI * 60.0 * t) * libm::expf(-t / 0.08)
            })
            .collect()
    }

    /// Places the sound on every beat of the given tempo. Beat positions are
    /// rounded to the nearest sample.
    pub fn click_track(bpm: f64, sample_rate: u32, duration_s: f64, sound: &[f32]) -> Vec<f32> {
        let len = (duration_s * sample_rate as f64) as usize;
        let period = 60.0 * sample_rate as f64 / bpm;
        let mut samples = vec![0.0; len];
        for beat in beat_positions(period, 0.0, len) {
            mix_in(&mut samples, beat, sound);
        }
        samples
    }

    /// Adds short 5 kHz bursts half-way between the beats.
    pub fn add_offbeat_hihats(samples: &mut [f32], bpm: f64, sample_rate: u32, amplitude: f32) {
        let period = 60.0 * sample_rate as f64 / bpm;
        let burst = (0..(0.03 * sample_rate as f32) as usize)
            .map(|i| amplitude * libm::sinf(2.0 * PI * 5000.0 * i as f32 / sample_rate as f32))
            .collect::<Vec<_>>();
        for offbeat in beat_positions(period, period / 2.0, samples.len()) {
            mix_in(samples, offbeat, &burst);
        }
    }

    /// Adds uniform white noise in range `-amplitude..amplitude`.
    pub fn add_noise(samples: &mut [f32], amplitude: f32, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        samples
            .iter_mut()
            .for_each(|sample| *sample += rng.random_range(-amplitude..amplitude));
    }

    fn beat_positions(period: f64, offset: f64, len: usize) -> impl Iterator<Item = usize> {
        (0..)
            .map(move |i| libm::round(offset + i as f64 * period) as usize)
            .take_while(move |&pos| pos < len)
    }

    fn mix_in(samples: &mut [f32], at: usize, sound: &[f32]) {
        samples
            .iter_mut()
            .skip(at)
            .zip(sound)
            .for_each(|(sample, add)| *sample += add);
    }

    #[test]
    fn test_signals_are_as_long_as_expected() {
        check!(impulse_train(100, 30, 5, 1.0).iter().filter(|&&s| s == 1.0).count() == 4);
        check!(click_track(120.0, 44100, 2.0, &[1.0]).len() == 88200);
        check!(
            click_track(120.0, 44100, 2.0, &[1.0])
                .iter()
                .filter(|&&s| s == 1.0)
                .count()
                == 4
        );
        check!(decaying_click(44100).len() == 2205);
        check!(decaying_click(44100)[0] == 1.0);
        check!(kick(44100).len() == 13230);
    }
}

#[test]
fn test_wav_roundtrip_keeps_first_channel() {
    let samples = signals::impulse_train(1000, 100, 0, 1.0);
    let path = write_wav_file("impulse_train_1000.wav", &samples, 8000);
    let (read, header) = read_wav_to_mono(path);
    check!(header.sample_rate == 8000);
    check!(header.channels == 1);
    check!(read == samples);
}
