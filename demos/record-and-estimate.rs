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
//! Records 15 seconds from the default input device and estimates the tempo
//! of the recording.

use std::time::Duration;
use tempo_detector::recording::record_clip;
use tempo_detector::{EstimatorConfig, TempoEstimator};

fn main() {
    simple_logger::init_with_level(log::Level::Debug).unwrap();

    println!("Recording 15 seconds of audio, play some music ...");
    let clip = record_clip(Duration::from_secs(15), None).unwrap();

    // Microphones pick up a lot of high frequencies that don't carry the beat.
    let estimator = TempoEstimator::new(EstimatorConfig {
        lowpass_cutoff_hz: Some(120.0),
        ..Default::default()
    })
    .unwrap();

    match clip.estimate(&estimator).unwrap().into_bpm() {
        Ok(bpm) => println!("Tempo: {bpm} BPM"),
        Err(e) => println!("{e}"),
    }
}
