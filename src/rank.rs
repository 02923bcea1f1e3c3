//! Rank distributions and ranking utilities.

use ordered_float::NotNan;
use std::cmp::Reverse;
use std::collections::btree_map;
use std::collections::{BTreeMap, BinaryHeap};

/// Node key -> rank. Values are non-negative and sum to 1 within floating-point
/// tolerance when produced by an estimator.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[cfg_attr(
    feature = "serde",
    serde(bound(serialize = "K: serde::Serialize", deserialize = "K: serde::Deserialize<'de> + Ord"))
)]
pub struct RankDistribution<K = String> {
    ranks: BTreeMap<K, f64>,
}

impl<K: Ord> RankDistribution<K> {
    pub fn get(&self, key: &K) -> Option<f64> {
        self.ranks.get(key).copied()
    }

    /// Entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, K, f64> {
        self.ranks.iter()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, K, f64> {
        self.ranks.keys()
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.ranks.values().sum()
    }

    /// Largest `|self[k] - other[k]|` over the union of keys (a missing key counts as 0).
    pub fn max_abs_diff(&self, other: &Self) -> f64 {
        self.pointwise_diffs(other).fold(0.0, f64::max)
    }

    /// `Σ |self[k] - other[k]|` over the union of keys.
    pub fn l1_distance(&self, other: &Self) -> f64 {
        self.pointwise_diffs(other).sum()
    }

    fn pointwise_diffs<'a>(&'a self, other: &'a Self) -> impl Iterator<Item = f64> + 'a {
        let ours = self
            .ranks
            .iter()
            .map(|(k, &a)| (a - other.ranks.get(k).copied().unwrap_or(0.0)).abs());
        let theirs_only = other
            .ranks
            .iter()
            .filter(|(k, _)| !self.ranks.contains_key(*k))
            .map(|(_, &b)| b.abs());
        ours.chain(theirs_only)
    }

    /// The `k` highest-ranked entries, best first. Ties keep key order.
    pub fn top_k(&self, k: usize) -> Vec<(&K, f64)> {
        let scores: Vec<f64> = self.ranks.values().copied().collect();
        let keys: Vec<&K> = self.ranks.keys().collect();
        top_k(&scores, k).into_iter().map(|(i, s)| (keys[i], s)).collect()
    }

    pub fn into_inner(self) -> BTreeMap<K, f64> {
        self.ranks
    }
}

impl<K: Ord> FromIterator<(K, f64)> for RankDistribution<K> {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self { ranks: iter.into_iter().collect() }
    }
}

impl<K> From<BTreeMap<K, f64>> for RankDistribution<K> {
    fn from(ranks: BTreeMap<K, f64>) -> Self {
        Self { ranks }
    }
}

impl<'a, K> IntoIterator for &'a RankDistribution<K> {
    type Item = (&'a K, &'a f64);
    type IntoIter = btree_map::Iter<'a, K, f64>;
    fn into_iter(self) -> Self::IntoIter {
        self.ranks.iter()
    }
}

/// Indices of the `k` largest positive, finite scores, best first.
///
/// Equal scores are ordered by ascending index.
pub fn top_k(scores: &[f64], k: usize) -> Vec<(usize, f64)> {
    if k == 0 || scores.is_empty() { return Vec::new(); }
    // Min-heap on (score, Reverse(index)): the root is the entry to evict next.
    let mut heap = BinaryHeap::with_capacity(k + 1);
    for (i, &score) in scores.iter().enumerate() {
        if !score.is_finite() || score <= 0.0 { continue; }
        let Ok(s) = NotNan::new(score) else { continue };
        heap.push(Reverse((s, Reverse(i))));
        if heap.len() > k {
            heap.pop();
        }
    }
    let mut results: Vec<(NotNan<f64>, usize)> =
        heap.into_iter().map(|Reverse((s, Reverse(i)))| (s, i)).collect();
    results.sort_unstable_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    results.into_iter().map(|(s, i)| (i, s.into_inner())).collect()
}

pub fn normalize(scores: &mut [f64]) {
    let sum: f64 = scores.iter().sum();
    if sum > 0.0 {
        for s in scores { *s /= sum; }
    }
}
