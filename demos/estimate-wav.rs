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
//! Estimates the tempo of a WAV file.
//!
//! Usage: `cargo run --example estimate-wav -- <file.wav> [lowpass cutoff Hz]`

use hound::SampleFormat;
use itertools::Itertools;
use tempo_detector::util::{channel_samples, i16_sample_to_f32};
use tempo_detector::{EstimatorConfig, TempoEstimator};

fn main() {
    simple_logger::init_with_level(log::Level::Debug).unwrap();

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .expect("Usage: estimate-wav <file.wav> [lowpass cutoff Hz]");
    let lowpass_cutoff_hz = args
        .next()
        .map(|cutoff| cutoff.parse::<f32>().expect("cutoff must be a number"));

    let mut reader = hound::WavReader::open(&path).unwrap();
    let header = reader.spec();
    let interleaved = match (header.sample_format, header.bits_per_sample) {
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| i16_sample_to_f32(s.unwrap()))
            .collect::<Vec<_>>(),
        (SampleFormat::Float, 32) => reader.samples::<f32>().map(|s| s.unwrap()).collect(),
        _ => panic!("unsupported format: {header:?}"),
    };
    // Like most tempo estimation, only the first channel is analysed.
    let samples = channel_samples(&interleaved, header.channels as usize, 0).collect::<Vec<_>>();

    let estimator = TempoEstimator::new(EstimatorConfig {
        lowpass_cutoff_hz,
        ..Default::default()
    })
    .unwrap();

    match estimator.estimate_samples(&samples, header.sample_rate) {
        Ok(estimate) => match estimate.bpm() {
            Some(bpm) => {
                println!("{path} is {bpm} BPM");
                println!(
                    "candidates: {}",
                    estimate
                        .candidates()
                        .iter()
                        .map(|c| format!("{} BPM ({})", c.tempo, c.count))
                        .join(", ")
                );
            }
            None => println!("{path}: no tempo could be determined"),
        },
        Err(e) => eprintln!("{path}: {e}"),
    }
}
