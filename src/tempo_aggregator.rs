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
//! Turns peak intervals into ranked tempo candidates.
//!
//! Each interval is a tempo hypothesis. As a tempo and its double or half
//! can't be told apart from intervals alone, every hypothesis is folded into
//! one octave band (`90..=180` BPM by default) before equal tempos are merged.

use crate::{EstimatorConfig, IntervalHistogram, InvalidConfigError};
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::cmp::Ordering;

/// A folded and rounded tempo together with the number of peak pairs that
/// support it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TempoCandidate {
    /// Beats per minute.
    pub tempo: u32,
    /// Accumulated evidence.
    pub count: usize,
}

impl TempoCandidate {
    /// Ranking order: more evidence first, then lower tempo first.
    pub fn cmp_rank(&self, other: &Self) -> Ordering {
        other
            .count
            .cmp(&self.count)
            .then_with(|| self.tempo.cmp(&other.tempo))
    }
}

/// Converts an interval in samples to beats per minute.
///
/// Computed as `60 * sample_rate / interval`, which equals
/// `60 / (interval / sample_rate)` but stays exact for intervals that divide
/// the sample rate evenly. Returns `None` for an interval of zero.
#[must_use]
pub fn interval_to_bpm(interval: usize, sample_rate: u32) -> Option<f64> {
    if interval == 0 {
        return None;
    }
    Some(60.0 * sample_rate as f64 / interval as f64)
}

/// Folds a tempo into the band `min_bpm..=max_bpm` by doubling it while it
/// is below `min_bpm` and halving it while it is strictly above `max_bpm`.
/// A tempo of exactly `max_bpm` is kept.
///
/// Tempos that are not positive and finite are returned unchanged. So are
/// all tempos if the band is unusable: its bounds must be positive and
/// finite with `max_bpm >= 2 * min_bpm`.
#[must_use]
pub fn fold_tempo(bpm: f64, min_bpm: f64, max_bpm: f64) -> f64 {
    if !bpm.is_finite() || bpm <= 0.0 || !is_foldable_band(min_bpm, max_bpm) {
        return bpm;
    }
    let mut bpm = bpm;
    while bpm < min_bpm {
        bpm *= 2.0;
    }
    while bpm > max_bpm {
        bpm /= 2.0;
    }
    bpm
}

/// Whether every positive finite tempo can be folded into `min_bpm..=max_bpm`.
pub(crate) fn is_foldable_band(min_bpm: f64, max_bpm: f64) -> bool {
    min_bpm.is_finite() && max_bpm.is_finite() && min_bpm > 0.0 && max_bpm >= 2.0 * min_bpm
}

/// Merges interval hypotheses into tempo candidates and ranks them.
#[derive(Debug, Clone, PartialEq)]
pub struct TempoAggregator {
    min_bpm: f64,
    max_bpm: f64,
    top_n: usize,
}

impl TempoAggregator {
    /// Creates an aggregator from the relevant parts of the config.
    pub fn new(config: &EstimatorConfig) -> Result<Self, InvalidConfigError> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    /// `config` must have passed [`EstimatorConfig::validate`].
    pub(crate) const fn from_validated(config: &EstimatorConfig) -> Self {
        Self {
            min_bpm: config.min_bpm,
            max_bpm: config.max_bpm,
            top_n: config.top_n,
        }
    }

    /// Returns the folded and rounded tempo of an interval, if the interval
    /// carries tempo information at all.
    pub fn folded_tempo(&self, interval: usize, sample_rate: u32) -> Option<u32> {
        let bpm = interval_to_bpm(interval, sample_rate)?;
        let folded = fold_tempo(bpm, self.min_bpm, self.max_bpm);
        Some(libm::round(folded) as u32)
    }

    /// Merges all histogram entries into tempo candidates, in the order of
    /// their first discovery. Intervals of zero are skipped. Each tempo
    /// exists at most once.
    pub fn merge(&self, histogram: &IntervalHistogram, sample_rate: u32) -> Vec<TempoCandidate> {
        let mut candidates = Vec::<TempoCandidate>::new();
        let mut positions = BTreeMap::<u32, usize>::new();

        let entries = histogram
            .iter()
            .filter_map(|entry| Some((self.folded_tempo(entry.interval, sample_rate)?, entry.count)));
        for (tempo, count) in entries {
            if let Some(&position) = positions.get(&tempo) {
                candidates[position].count += count;
            } else {
                positions.insert(tempo, candidates.len());
                candidates.push(TempoCandidate { tempo, count });
            }
        }

        log::trace!(
            "merged {} intervals into {} tempo candidates",
            histogram.len(),
            candidates.len()
        );
        candidates
    }

    /// Sorts candidates by descending count, ties by ascending tempo, and
    /// keeps the best `top_n`.
    pub fn rank(&self, mut candidates: Vec<TempoCandidate>) -> Vec<TempoCandidate> {
        candidates.sort_unstable_by(TempoCandidate::cmp_rank);
        candidates.truncate(self.top_n);
        candidates
    }

    /// Combination of [`Self::merge`] and [`Self::rank`].
    pub fn aggregate(&self, histogram: &IntervalHistogram, sample_rate: u32) -> Vec<TempoCandidate> {
        self.rank(self.merge(histogram, sample_rate))
    }
}

impl Default for TempoAggregator {
    fn default() -> Self {
        Self::from_validated(&EstimatorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IntervalCount;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};
    use std::vec::Vec;

    fn ic(interval: usize, count: usize) -> IntervalCount {
        IntervalCount { interval, count }
    }

    fn tc(tempo: u32, count: usize) -> TempoCandidate {
        TempoCandidate { tempo, count }
    }

    #[test]
    fn interval_conversion() {
        check!(interval_to_bpm(0, 44100) == None);
        check!(interval_to_bpm(22050, 44100) == Some(120.0));
        check!(interval_to_bpm(14700, 44100) == Some(180.0));
        check!(interval_to_bpm(24000, 48000) == Some(120.0));
    }

    #[test]
    fn folding() {
        check!(fold_tempo(120.0, 90.0, 180.0) == 120.0);
        check!(fold_tempo(60.0, 90.0, 180.0) == 120.0);
        check!(fold_tempo(30.0, 90.0, 180.0) == 120.0);
        check!(fold_tempo(240.0, 90.0, 180.0) == 120.0);
        check!(fold_tempo(500.0, 90.0, 180.0) == 125.0);
        check!(fold_tempo(89.0, 90.0, 180.0) == 178.0);
        check!(fold_tempo(90.0, 90.0, 180.0) == 90.0);
    }

    #[test]
    fn folding_upper_boundary_is_kept() {
        check!(fold_tempo(180.0, 90.0, 180.0) == 180.0);
        check!(fold_tempo(360.0, 90.0, 180.0) == 180.0);
        check!(fold_tempo(45.0, 90.0, 180.0) == 90.0);
        check!(fold_tempo(180.000_001, 90.0, 180.0) == 90.000_000_5);
    }

    #[test]
    fn unusable_band_keeps_tempo() {
        check!(fold_tempo(120.0, 90.0, -1.0) == 120.0);
        check!(fold_tempo(120.0, f64::INFINITY, 180.0) == 120.0);
        check!(fold_tempo(120.0, 90.0, f64::NAN) == 120.0);
        check!(fold_tempo(120.0, 0.0, 180.0) == 120.0);
        check!(fold_tempo(200.0, 100.0, 150.0) == 200.0);
    }

    #[test]
    fn rejects_invalid_band() {
        let config = EstimatorConfig {
            max_bpm: -1.0,
            ..Default::default()
        };
        check!(
            TempoAggregator::new(&config)
                == Err(InvalidConfigError::InvalidTempoBand {
                    min: 90.0,
                    max: -1.0
                })
        );
    }

    #[test]
    fn folding_properties() {
        let mut rng = StdRng::seed_from_u64(0xb9a);
        for _ in 0..10_000 {
            let bpm = rng.random_range(0.5..5000.0);
            let folded = fold_tempo(bpm, 90.0, 180.0);
            check!((90.0..=180.0).contains(&folded), "bpm={bpm}");
            // folded == bpm * 2^k
            let exponent = libm::log2(folded / bpm);
            check!(approx_eq!(f64, exponent, libm::round(exponent), epsilon = 1e-9));
            // idempotent
            check!(fold_tempo(folded, 90.0, 180.0) == folded);
        }
    }

    #[test]
    fn zero_intervals_are_skipped() {
        let histogram = [ic(0, 7), ic(22050, 2)].into_iter().collect();
        let candidates = TempoAggregator::default().merge(&histogram, 44100);
        check!(candidates == [tc(120, 2)]);
    }

    #[test]
    fn octaves_are_merged() {
        // 120, 60, 240 and 40 BPM (-> 160)
        let histogram = [ic(22050, 5), ic(44100, 3), ic(11025, 1), ic(66150, 2)]
            .into_iter()
            .collect();
        let candidates = TempoAggregator::default().merge(&histogram, 44100);
        check!(candidates == [tc(120, 9), tc(160, 2)]);
    }

    #[test]
    fn near_intervals_round_to_same_tempo() {
        // 119.9 and 120.1 BPM
        let histogram = [ic(22068, 1), ic(22032, 1)].into_iter().collect();
        let candidates = TempoAggregator::default().merge(&histogram, 44100);
        check!(candidates == [tc(120, 2)]);
    }

    #[test]
    fn ranking_and_tie_break() {
        let candidates = [tc(130, 2), tc(100, 7), tc(170, 2), tc(95, 2), tc(120, 7), tc(99, 1), tc(101, 1)];
        let ranked = TempoAggregator::default().rank(candidates.to_vec());
        check!(ranked == [tc(100, 7), tc(120, 7), tc(95, 2), tc(130, 2), tc(170, 2)]);
    }

    #[test]
    fn top_n_is_configurable() {
        let config = EstimatorConfig {
            top_n: 1,
            ..Default::default()
        };
        let ranked = TempoAggregator::new(&config).unwrap().rank([tc(100, 1), tc(120, 3)].to_vec());
        check!(ranked == [tc(120, 3)]);
    }

    #[test]
    fn empty_histogram() {
        let aggregator = TempoAggregator::default();
        check!(aggregator.aggregate(&IntervalHistogram::new(), 44100).is_empty());
    }

    #[test]
    fn aggregation_is_order_independent() {
        let mut entries = (1..200)
            .map(|i| ic(10_000 + i * 137, i % 7 + 1))
            .collect::<Vec<_>>();
        let aggregator = TempoAggregator {
            top_n: usize::MAX,
            ..Default::default()
        };
        let reference = aggregator.aggregate(&entries.iter().copied().collect(), 44100);

        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            entries.shuffle(&mut rng);
            let ranked = aggregator.aggregate(&entries.iter().copied().collect(), 44100);
            check!(ranked == reference);
        }
    }
}
