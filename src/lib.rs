//! # linkrank
//!
//! PageRank estimation over directed link graphs.
//!
//! Two independent estimators share one graph model and one damping factor:
//! - [`sample_pagerank`]: a random surfer walks the Markov chain given by
//!   [`transition_model`] and ranks are visit frequencies.
//! - [`iterate_pagerank`]: the PageRank recurrence is applied sweep by sweep until the
//!   largest per-node change drops below a tolerance.
//!
//! Public invariants (must not drift):
//! - **Node order**: index-based outputs are indexed by node id \(0..n-1\). For
//!   [`LinkGraph`] that is sorted key order.
//! - **Dangling nodes**: a node with no outgoing links is treated as linking to every
//!   node, uniformly, in both estimators.
//! - **Distributions**: every returned rank vector is non-negative and sums to 1 within
//!   floating-point tolerance.
//! - **Determinism**: the iterator is deterministic; the sampler is deterministic for a
//!   fixed seed.
//!
//! ```
//! use linkrank::{LinkGraph, PageRankConfig, SamplerConfig};
//!
//! let graph = LinkGraph::from_links([
//!     ("a", vec!["b"]),
//!     ("b", vec!["a", "c"]),
//!     ("c", vec![]),
//! ]);
//!
//! let iterated = graph.iterate_pagerank(&PageRankConfig::default()).unwrap();
//! let sampled = graph.sample_pagerank(&SamplerConfig::default()).unwrap();
//! assert!((iterated.total() - 1.0).abs() < 1e-6);
//! assert!(iterated.max_abs_diff(&sampled) < 0.05);
//! ```

pub mod graph;
pub mod pagerank;
pub mod rank;
pub mod sampler;
pub mod transition;

pub use graph::{AdjacencyList, Graph, LinkGraph};
pub use pagerank::{
    iterate_pagerank, iterate_pagerank_run, IncomingIndex, PageRankConfig, PageRankRun,
    UpdateOrder,
};
pub use rank::{normalize, top_k, RankDistribution};
pub use sampler::{sample_pagerank, sample_pagerank_with_rng, SamplerConfig};
pub use transition::transition_model;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unknown node: {0}")]
    UnknownNode(String),
    #[error("index out of bounds: {0}")]
    IndexOutOfBounds(usize),
    #[error("weighted sampling failed: {0}")]
    Weights(#[from] rand::distr::weighted::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Damping must lie in `(0, 1]`.
pub(crate) fn validate_damping(damping: f64) -> Result<()> {
    if !damping.is_finite() || damping <= 0.0 || damping > 1.0 {
        return Err(Error::InvalidInput(format!(
            "damping must be in (0, 1] (got {damping})"
        )));
    }
    Ok(())
}
