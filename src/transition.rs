//! Random-surfer transition model.
//!
//! From node `p` with out-degree `L > 0`, the surfer follows one of `p`'s links with
//! probability `d` (uniformly among them) and otherwise jumps to any node uniformly:
//!
//! \[
//!   P(p \to q) = \frac{d}{L}[q \in links(p)] + \frac{1 - d}{|N|}
//! \]
//!
//! A dangling node (`L = 0`) jumps uniformly, `P(p \to q) = 1/|N|`, matching the
//! iterator's treatment of dangling nodes as linking to every node.

use crate::graph::{Graph, LinkGraph};
use crate::rank::RankDistribution;
use crate::{validate_damping, Error, Result};
use std::fmt::Debug;

/// Transition distribution out of `node`, indexed by target node.
pub fn transition_model<G: Graph>(graph: &G, node: usize, damping: f64) -> Result<Vec<f64>> {
    validate_damping(damping)?;
    let n = graph.node_count();
    if n == 0 {
        return Err(Error::InvalidInput("graph has no nodes".to_string()));
    }
    if node >= n {
        return Err(Error::IndexOutOfBounds(node));
    }
    let links = graph.neighbors(node);
    if let Some(&v) = links.iter().find(|&&v| v >= n) {
        return Err(Error::IndexOutOfBounds(v));
    }
    let mut probs = Vec::with_capacity(n);
    transition_into(&links, n, damping, &mut probs);
    Ok(probs)
}

/// Overwrite `out` with the transition distribution for a node whose out-neighbors
/// are `links`. Callers guarantee `n > 0` and every link `< n`.
pub(crate) fn transition_into(links: &[usize], n: usize, damping: f64, out: &mut Vec<f64>) {
    out.clear();
    let n_f64 = n as f64;
    if links.is_empty() {
        out.resize(n, 1.0 / n_f64);
        return;
    }
    out.resize(n, (1.0 - damping) / n_f64);
    let share = damping / links.len() as f64;
    for &v in links {
        out[v] += share;
    }
}

impl<K: Ord + Clone + Debug> LinkGraph<K> {
    /// Transition distribution out of `page`, keyed by target page.
    pub fn transition_model(&self, page: &K, damping: f64) -> Result<RankDistribution<K>> {
        let u = self.require_index(page)?;
        let probs = transition_model(self, u, damping)?;
        self.label(probs)
    }
}
