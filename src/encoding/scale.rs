use std::collections::HashMap;
use std::hash::Hash;

/// `(min, max)` over the finite values, or `None` when there are none.
pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|value| !value.is_nan())
        .fold(None, |acc, value| match acc {
            None => Some((value, value)),
            Some((min, max)) => Some((min.min(value), max.max(value))),
        })
}

/// Maps a discrete domain onto a discrete range by position.
///
/// A scale with a declared domain answers `unknown` for everything outside it.
/// An implicit scale grows its domain on first sight of a key and cycles
/// through the range once more keys than range entries have been seen.
#[derive(Clone, Debug)]
pub struct OrdinalScale<K, V> {
    index: HashMap<K, usize>,
    range: Vec<V>,
    unknown: Option<V>,
}

impl<K: Hash + Eq + Clone, V: Clone> OrdinalScale<K, V> {
    pub fn with_domain(
        domain: impl IntoIterator<Item = K>,
        range: impl IntoIterator<Item = V>,
        unknown: V,
    ) -> Self {
        let mut index = HashMap::new();
        for key in domain {
            let next = index.len();
            index.entry(key).or_insert(next);
        }

        Self {
            index,
            range: range.into_iter().collect(),
            unknown: Some(unknown),
        }
    }

    pub fn implicit(range: impl IntoIterator<Item = V>) -> Self {
        Self {
            index: HashMap::new(),
            range: range.into_iter().collect(),
            unknown: None,
        }
    }

    pub fn domain_len(&self) -> usize {
        self.index.len()
    }

    pub fn apply(&mut self, key: &K) -> Option<V> {
        let position = match self.index.get(key) {
            Some(&position) => position,
            None => {
                if let Some(unknown) = &self.unknown {
                    return Some(unknown.clone());
                }
                let next = self.index.len();
                self.index.insert(key.clone(), next);
                next
            }
        };

        if self.range.is_empty() {
            return self.unknown.clone();
        }
        self.range.get(position % self.range.len()).cloned()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// A zero-width domain maps every input to the middle of the range; an
    /// undefined domain maps everything to NaN.
    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        if span.is_nan() {
            return f64::NAN;
        }
        if span == 0.0 {
            return (r0 + r1) * 0.5;
        }
        r0 + ((value - d0) / span) * (r1 - r0)
    }
}

/// Equal-width bucketing of a continuous domain onto a discrete range.
#[derive(Clone, Debug)]
pub struct QuantizeScale<V> {
    thresholds: Vec<f64>,
    range: Vec<V>,
}

impl<V: Copy> QuantizeScale<V> {
    pub fn new(domain: (f64, f64), range: impl IntoIterator<Item = V>) -> Self {
        let range = range.into_iter().collect::<Vec<_>>();
        let (d0, d1) = domain;
        let buckets = range.len().max(1) as f64;
        let thresholds = (1..range.len())
            .map(|step| d0 + (d1 - d0) * (step as f64 / buckets))
            .collect();
        Self { thresholds, range }
    }

    /// Bucket index is the number of thresholds at or below `value`, so the
    /// domain minimum lands in the first bucket and the maximum in the last.
    pub fn apply(&self, value: f64) -> Option<V> {
        if value.is_nan() {
            return None;
        }
        let bucket = self
            .thresholds
            .partition_point(|&threshold| threshold <= value);
        self.range.get(bucket).copied()
    }
}
