//! PageRank by fixed-point iteration.
//!
//! Each sweep applies, to every node \(p\),
//!
//! \[
//!   r(p) = \frac{1 - d}{|N|} + d \sum_{q \in in(p)} \frac{r(q)}{out(q)}
//! \]
//!
//! where a dangling node \(q\) (no outgoing links) counts as linking to every node,
//! so it appears in every \(in(p)\) with \(out(q) = |N|\). Sweeps repeat until the
//! largest per-node change drops below the tolerance.

use crate::graph::{collect_adjacency, Graph, LinkGraph};
use crate::rank::{normalize, RankDistribution};
use crate::{validate_damping, Error, Result};
use std::fmt::Debug;

/// Which scores a sweep reads while it updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum UpdateOrder {
    /// Gauss-Seidel: later nodes in a sweep see values already updated in that sweep.
    #[default]
    InPlace,
    /// Jacobi: every node reads the previous sweep's snapshot.
    Synchronous,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PageRankConfig {
    pub damping: f64,
    /// Stop once no node changes by this much or more in one sweep.
    pub tolerance: f64,
    /// Upper bound on sweeps.
    pub max_iterations: usize,
    pub update: UpdateOrder,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            tolerance: 1e-9,
            max_iterations: 10_000,
            update: UpdateOrder::InPlace,
        }
    }
}

impl PageRankConfig {
    pub fn validate(&self) -> Result<()> {
        validate_damping(self.damping)?;
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "tolerance must be positive and finite (got {})",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(Error::InvalidInput("max_iterations must be >= 1".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageRankRun {
    pub scores: Vec<f64>,
    pub iterations: usize,
    /// Largest per-node change in the last sweep.
    pub max_delta: f64,
    pub converged: bool,
}

/// Reverse adjacency, built once per run.
#[derive(Debug, Clone)]
pub struct IncomingIndex {
    predecessors: Vec<Vec<usize>>,
    out_degree: Vec<usize>,
    dangling: Vec<usize>,
}

impl IncomingIndex {
    /// `adjacency[u]` are the out-neighbors of `u`.
    ///
    /// Fails with [`Error::IndexOutOfBounds`] if a neighbor is `>= adjacency.len()`.
    pub fn build(adjacency: &[Vec<usize>]) -> Result<Self> {
        let n = adjacency.len();
        let mut predecessors = vec![Vec::new(); n];
        for (q, nbrs) in adjacency.iter().enumerate() {
            for &p in nbrs {
                predecessors
                    .get_mut(p)
                    .ok_or(Error::IndexOutOfBounds(p))?
                    .push(q);
            }
        }
        let out_degree: Vec<usize> = adjacency.iter().map(Vec::len).collect();
        let dangling = (0..n).filter(|&q| out_degree[q] == 0).collect();
        Ok(Self { predecessors, out_degree, dangling })
    }

    pub fn node_count(&self) -> usize {
        self.out_degree.len()
    }

    /// Nodes contributing to `p`: its linking predecessors, then every dangling node.
    pub fn incoming(&self, p: usize) -> Option<impl Iterator<Item = usize> + '_> {
        let preds = self.predecessors.get(p)?;
        Some(preds.iter().copied().chain(self.dangling.iter().copied()))
    }

    /// Out-degree used by the recurrence: `|N|` for a dangling node.
    pub fn effective_out_degree(&self, q: usize) -> Option<usize> {
        match *self.out_degree.get(q)? {
            0 => Some(self.node_count()),
            deg => Some(deg),
        }
    }

    pub fn dangling(&self) -> &[usize] {
        &self.dangling
    }

    /// Apply one full sweep to `scores` and return the largest absolute change.
    ///
    /// Fails with [`Error::InvalidInput`] unless `scores.len()` equals
    /// [`node_count`](Self::node_count).
    pub fn sweep(&self, scores: &mut Vec<f64>, damping: f64, order: UpdateOrder) -> Result<f64> {
        if scores.len() != self.node_count() {
            return Err(Error::InvalidInput(format!(
                "score vector length must equal node_count (len={} node_count={})",
                scores.len(),
                self.node_count()
            )));
        }
        Ok(self.sweep_unchecked(scores, damping, order))
    }

    fn sweep_unchecked(&self, scores: &mut Vec<f64>, damping: f64, order: UpdateOrder) -> f64 {
        match order {
            UpdateOrder::InPlace => self.sweep_in_place(scores, damping),
            UpdateOrder::Synchronous => {
                let mut next = vec![0.0; scores.len()];
                let delta = self.sweep_from(scores, &mut next, damping);
                *scores = next;
                delta
            }
        }
    }

    fn linked_mass(&self, p: usize, scores: &[f64]) -> f64 {
        self.predecessors[p].iter().map(|&q| scores[q] / self.out_degree[q] as f64).sum()
    }

    fn sweep_in_place(&self, scores: &mut [f64], damping: f64) -> f64 {
        let n_f64 = self.node_count() as f64;
        let teleport = (1.0 - damping) / n_f64;
        let prev = scores.to_vec();
        // Running sum so a dangling node's update is visible to the rest of the sweep.
        let mut dangling_mass: f64 = self.dangling.iter().map(|&q| scores[q]).sum();
        for p in 0..scores.len() {
            let new = teleport + damping * (self.linked_mass(p, scores) + dangling_mass / n_f64);
            if self.out_degree[p] == 0 {
                dangling_mass += new - scores[p];
            }
            scores[p] = new;
        }
        // Gauss-Seidel does not conserve total rank; re-anchor it every sweep.
        normalize(scores);
        prev.iter().zip(scores.iter()).map(|(old, new)| (new - old).abs()).fold(0.0, f64::max)
    }

    fn sweep_from(&self, prev: &[f64], next: &mut [f64], damping: f64) -> f64 {
        let n_f64 = self.node_count() as f64;
        let teleport = (1.0 - damping) / n_f64;
        let dangling_share: f64 = self.dangling.iter().map(|&q| prev[q]).sum::<f64>() / n_f64;
        let mut max_delta = 0.0f64;
        for (p, slot) in next.iter_mut().enumerate() {
            *slot = teleport + damping * (self.linked_mass(p, prev) + dangling_share);
            max_delta = max_delta.max((*slot - prev[p]).abs());
        }
        max_delta
    }
}

pub fn iterate_pagerank<G: Graph>(graph: &G, config: PageRankConfig) -> Result<Vec<f64>> {
    Ok(iterate_pagerank_run(graph, config)?.scores)
}

/// Iterate from the uniform distribution until convergence or `config.max_iterations`.
///
/// Running out of sweeps is reported through [`PageRankRun::converged`], not as an error.
pub fn iterate_pagerank_run<G: Graph>(graph: &G, config: PageRankConfig) -> Result<PageRankRun> {
    config.validate()?;
    let n = graph.node_count();
    if n == 0 {
        return Err(Error::InvalidInput("graph has no nodes".to_string()));
    }
    let index = IncomingIndex::build(&collect_adjacency(graph)?)?;

    let mut scores = vec![1.0 / n as f64; n];
    let mut iters = 0usize;
    let mut last_delta = f64::INFINITY;
    let mut converged = false;
    for _ in 0..config.max_iterations {
        iters += 1;
        last_delta = index.sweep_unchecked(&mut scores, config.damping, config.update);
        tracing::trace!(iteration = iters, max_delta = last_delta, "pagerank sweep");
        if last_delta < config.tolerance {
            converged = true;
            break;
        }
    }

    normalize(&mut scores);

    if converged {
        tracing::debug!(nodes = n, iterations = iters, max_delta = last_delta, "pagerank converged");
    } else {
        tracing::warn!(
            nodes = n,
            iterations = iters,
            max_delta = last_delta,
            tolerance = config.tolerance,
            "pagerank stopped at max_iterations without converging"
        );
    }
    Ok(PageRankRun { scores, iterations: iters, max_delta: last_delta, converged })
}

impl<K: Ord + Clone + Debug> LinkGraph<K> {
    pub fn iterate_pagerank(&self, config: &PageRankConfig) -> Result<RankDistribution<K>> {
        let scores = iterate_pagerank(self, *config)?;
        self.label(scores)
    }

    /// Keyed ranks plus the run report (`run.scores` stays index-ordered).
    pub fn iterate_pagerank_run(
        &self,
        config: &PageRankConfig,
    ) -> Result<(RankDistribution<K>, PageRankRun)> {
        let run = iterate_pagerank_run(self, *config)?;
        let ranks = self.label(run.scores.clone())?;
        Ok((ranks, run))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::AdjacencyList;

    fn run(adj: &[Vec<usize>], update: UpdateOrder) -> PageRankRun {
        let cfg = PageRankConfig { update, ..PageRankConfig::default() };
        iterate_pagerank_run(&AdjacencyList(adj), cfg).unwrap()
    }

    #[test]
    fn two_cycle_is_uniform() {
        let pr = run(&[vec![1], vec![0]], UpdateOrder::InPlace);
        assert!(pr.converged);
        assert!((pr.scores[0] - 0.5).abs() < 1e-9);
        assert!((pr.scores[1] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn incoming_index_includes_dangling_nodes_everywhere() {
        // 0 -> 1, 1 -> 0, 2 dangling
        let index = IncomingIndex::build(&[vec![1], vec![0], vec![]]).unwrap();
        assert_eq!(index.incoming(0).unwrap().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(index.incoming(1).unwrap().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(index.incoming(2).unwrap().collect::<Vec<_>>(), vec![2]);
        assert_eq!(index.effective_out_degree(0), Some(1));
        assert_eq!(index.effective_out_degree(2), Some(3));
        assert_eq!(index.dangling(), &[2]);
        assert!(index.incoming(3).is_none());
        assert!(index.effective_out_degree(3).is_none());
    }

    #[test]
    fn incoming_index_rejects_out_of_range_neighbor() {
        let err = IncomingIndex::build(&[vec![1], vec![4]]).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfBounds(4)));
    }

    #[test]
    fn sweep_rejects_mismatched_scores() {
        let index = IncomingIndex::build(&[vec![1], vec![0]]).unwrap();
        let mut scores = vec![1.0];
        let err = index.sweep(&mut scores, 0.85, UpdateOrder::InPlace).unwrap_err();
        assert!(format!("{err}").contains("node_count"));
        assert_eq!(scores, vec![1.0]);
    }

    #[test]
    fn sweep_matches_recurrence_written_out() {
        let adj = vec![vec![1, 2], vec![2], vec![]];
        let index = IncomingIndex::build(&adj).unwrap();
        let d = 0.85;
        let prev = vec![0.2, 0.3, 0.5];
        let mut scores = prev.clone();
        index.sweep(&mut scores, d, UpdateOrder::Synchronous).unwrap();
        for p in 0..3 {
            let sum: f64 = index
                .incoming(p)
                .unwrap()
                .map(|q| prev[q] / index.effective_out_degree(q).unwrap() as f64)
                .sum();
            let expected = (1.0 - d) / 3.0 + d * sum;
            assert!((scores[p] - expected).abs() < 1e-12, "p={p}");
        }
    }

    #[test]
    fn in_place_sweep_keeps_unit_total() {
        let index = IncomingIndex::build(&[vec![1], vec![2], vec![0], vec![]]).unwrap();
        let mut scores = vec![0.25; 4];
        for _ in 0..5 {
            index.sweep(&mut scores, 1.0, UpdateOrder::InPlace).unwrap();
            assert!((scores.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn damping_near_one_still_sums_to_one() {
        // a -> b -> c -> a, d dangling
        let adj = vec![vec![1], vec![2], vec![0], vec![]];
        for damping in [1.0, 0.999] {
            for update in [UpdateOrder::InPlace, UpdateOrder::Synchronous] {
                let cfg = PageRankConfig { damping, update, ..PageRankConfig::default() };
                let pr = iterate_pagerank_run(&AdjacencyList(&adj), cfg).unwrap();
                let total: f64 = pr.scores.iter().sum();
                assert!((total - 1.0).abs() < 1e-6, "d={damping} {update:?}: total={total}");
                assert!(pr.scores.iter().all(|&x| x >= 0.0));
            }
        }
        let cfg = PageRankConfig { damping: 1.0, ..PageRankConfig::default() };
        let pr = iterate_pagerank_run(&AdjacencyList(&adj), cfg).unwrap();
        assert!(pr.converged);
        for &x in &pr.scores[..3] {
            assert!((x - 1.0 / 3.0).abs() < 1e-6, "{x}");
        }
        assert!(pr.scores[3] < 1e-6);
    }

    #[test]
    fn update_orders_reach_the_same_fixed_point() {
        let adj = vec![vec![1, 2], vec![2], vec![0], vec![0, 2], vec![]];
        let a = run(&adj, UpdateOrder::InPlace);
        let b = run(&adj, UpdateOrder::Synchronous);
        assert!(a.converged && b.converged);
        for (x, y) in a.scores.iter().zip(&b.scores) {
            assert!((x - y).abs() < 1e-7, "{x} vs {y}");
        }
    }

    #[test]
    fn sweep_cap_reports_not_converged() {
        let adj = vec![vec![1], vec![2], vec![]];
        let cfg = PageRankConfig { max_iterations: 1, tolerance: 1e-15, ..PageRankConfig::default() };
        let pr = iterate_pagerank_run(&AdjacencyList(&adj), cfg).unwrap();
        assert!(!pr.converged);
        assert_eq!(pr.iterations, 1);
        assert!(pr.max_delta >= cfg.tolerance);
    }

    #[test]
    fn rejects_invalid_config_and_empty_graph() {
        let adj = vec![vec![1], vec![0]];
        let g = AdjacencyList(&adj);
        for cfg in [
            PageRankConfig { damping: 0.0, ..PageRankConfig::default() },
            PageRankConfig { tolerance: 0.0, ..PageRankConfig::default() },
            PageRankConfig { tolerance: f64::INFINITY, ..PageRankConfig::default() },
            PageRankConfig { max_iterations: 0, ..PageRankConfig::default() },
        ] {
            assert!(matches!(iterate_pagerank(&g, cfg), Err(Error::InvalidInput(_))), "{cfg:?}");
        }
        let empty: Vec<Vec<usize>> = Vec::new();
        let err = iterate_pagerank(&AdjacencyList(&empty), PageRankConfig::default()).unwrap_err();
        assert!(format!("{err}").contains("no nodes"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_config_fills_defaults() {
        let cfg: PageRankConfig =
            serde_json::from_str(r#"{"tolerance": 1e-6, "update": "synchronous"}"#).unwrap();
        assert_eq!(cfg.damping, 0.85);
        assert_eq!(cfg.tolerance, 1e-6);
        assert_eq!(cfg.update, UpdateOrder::Synchronous);
    }
}
