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
//! Module for [`IntervalHistogram`].

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

/// How often peaks were exactly `interval` samples apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IntervalCount {
    /// Distance in samples.
    pub interval: usize,
    /// Number of peak pairs with that distance.
    pub count: usize,
}

/// Tally of the distances between peaks and their next successors.
///
/// Entries keep the order of their first discovery, which makes the
/// histogram deterministic. Each interval value exists at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntervalHistogram {
    counts: Vec<IntervalCount>,
    /// Maps an interval to its position in `counts`.
    positions: BTreeMap<usize, usize>,
}

impl IntervalHistogram {
    /// Creates an empty histogram.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counts: Vec::new(),
            positions: BTreeMap::new(),
        }
    }

    /// Builds the histogram from peaks in ascending order. Each peak is
    /// compared with up to `successor_window` following peaks. Peaks at the
    /// end of the list simply have fewer successors.
    ///
    /// Entries are discovered by peak position, then by successor offset.
    pub fn from_peaks(peaks: &[usize], successor_window: usize) -> Self {
        let mut histogram = Self::new();
        for (index, &peak) in peaks.iter().enumerate() {
            peaks
                .iter()
                .skip(index + 1)
                .take(successor_window)
                .map(|&successor| successor.abs_diff(peak))
                .for_each(|interval| histogram.add(interval, 1));
        }
        log::trace!(
            "interval histogram: {} peaks, {} distinct intervals, {} pairs",
            peaks.len(),
            histogram.len(),
            histogram.pair_count()
        );
        histogram
    }

    /// Adds `count` occurrences of `interval`.
    pub fn add(&mut self, interval: usize, count: usize) {
        if let Some(&position) = self.positions.get(&interval) {
            self.counts[position].count += count;
        } else {
            self.positions.insert(interval, self.counts.len());
            self.counts.push(IntervalCount { interval, count });
        }
    }

    /// Returns the count of a specific interval.
    #[must_use]
    pub fn count_of(&self, interval: usize) -> Option<usize> {
        self.positions
            .get(&interval)
            .map(|&position| self.counts[position].count)
    }

    /// Returns all entries in the order of their first discovery.
    #[must_use]
    pub fn counts(&self) -> &[IntervalCount] {
        &self.counts
    }

    /// Iterates all entries in the order of their first discovery.
    pub fn iter(&self) -> impl Iterator<Item = &IntervalCount> + '_ {
        self.counts.iter()
    }

    /// Number of distinct intervals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total number of compared peak pairs, i.e., the sum of all counts.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.counts.iter().map(|entry| entry.count).sum()
    }
}

impl FromIterator<IntervalCount> for IntervalHistogram {
    /// Collects entries. Duplicate intervals are merged.
    fn from_iter<T: IntoIterator<Item = IntervalCount>>(iter: T) -> Self {
        let mut histogram = Self::new();
        for entry in iter {
            histogram.add(entry.interval, entry.count);
        }
        histogram
    }
}

impl<'a> IntoIterator for &'a IntervalHistogram {
    type Item = &'a IntervalCount;
    type IntoIter = core::slice::Iter<'a, IntervalCount>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.iter()
    }
}
