//! Monte Carlo PageRank: rank by random-surfer visit frequency.

use crate::graph::{collect_adjacency, Graph, LinkGraph};
use crate::rank::RankDistribution;
use crate::transition::transition_into;
use crate::{validate_damping, Error, Result};
use rand::distr::weighted::WeightedIndex;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::fmt::Debug;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SamplerConfig {
    pub damping: f64,
    /// Total visits recorded, the starting node included.
    pub samples: usize,
    pub seed: u64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self { damping: 0.85, samples: 10_000, seed: 42 }
    }
}

impl SamplerConfig {
    pub fn validate(&self) -> Result<()> {
        validate_damping(self.damping)?;
        if self.samples == 0 {
            return Err(Error::InvalidInput("samples must be >= 1".to_string()));
        }
        Ok(())
    }
}

/// Estimate PageRank from `config.samples` random-surfer visits, seeded by `config.seed`.
pub fn sample_pagerank<G: Graph>(graph: &G, config: SamplerConfig) -> Result<Vec<f64>> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    sample_pagerank_with_rng(graph, config, &mut rng)
}

/// Like [`sample_pagerank`], drawing from a caller-supplied rng (`config.seed` is ignored).
///
/// The walk starts at a uniformly random node, which counts as the first visit. Each
/// further step draws the next node from the current node's [transition
/// distribution](crate::transition_model), so the visit counts sum to exactly
/// `config.samples`.
pub fn sample_pagerank_with_rng<G: Graph, R: Rng>(
    graph: &G,
    config: SamplerConfig,
    rng: &mut R,
) -> Result<Vec<f64>> {
    config.validate()?;
    let n = graph.node_count();
    if n == 0 {
        return Err(Error::InvalidInput("graph has no nodes".to_string()));
    }
    let adjacency = collect_adjacency(graph)?;

    let mut visits = vec![0usize; n];
    let mut curr = rng.random_range(0..n);
    visits[curr] += 1;

    let mut probs = Vec::with_capacity(n);
    for _ in 1..config.samples {
        transition_into(&adjacency[curr], n, config.damping, &mut probs);
        curr = WeightedIndex::new(&probs)?.sample(rng);
        visits[curr] += 1;
    }

    tracing::debug!(nodes = n, samples = config.samples, "sampled pagerank");
    let total = config.samples as f64;
    Ok(visits.into_iter().map(|c| c as f64 / total).collect())
}

impl<K: Ord + Clone + Debug> LinkGraph<K> {
    pub fn sample_pagerank(&self, config: &SamplerConfig) -> Result<RankDistribution<K>> {
        let scores = sample_pagerank(self, *config)?;
        self.label(scores)
    }
}
