//! Graph adapters.
//!
//! The estimators are written against [`Graph`], an index-based view where nodes are
//! `0..node_count()`. [`LinkGraph`] is the keyed graph callers usually build: it maps
//! node keys (page names, URLs, ...) onto dense indices in sorted key order.

use crate::rank::RankDistribution;
use crate::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;

pub trait Graph {
    fn node_count(&self) -> usize;
    fn neighbors(&self, node: usize) -> Vec<usize>;
    fn out_degree(&self, node: usize) -> usize {
        self.neighbors(node).len()
    }
}

/// Snapshot every adjacency list once, rejecting neighbor ids outside `0..n`.
pub(crate) fn collect_adjacency<G: Graph>(graph: &G) -> Result<Vec<Vec<usize>>> {
    let n = graph.node_count();
    (0..n)
        .map(|u| {
            let nbrs = graph.neighbors(u);
            match nbrs.iter().find(|&&v| v >= n) {
                Some(&v) => Err(Error::IndexOutOfBounds(v)),
                None => Ok(nbrs),
            }
        })
        .collect()
}

/// Borrowed adjacency lists: `self.0[u]` are the out-neighbors of `u`.
pub struct AdjacencyList<'a>(pub &'a [Vec<usize>]);

impl<'a> Graph for AdjacencyList<'a> {
    fn node_count(&self) -> usize {
        self.0.len()
    }
    fn neighbors(&self, node: usize) -> Vec<usize> {
        self.0.get(node).cloned().unwrap_or_default()
    }
    fn out_degree(&self, node: usize) -> usize {
        self.0.get(node).map_or(0, Vec::len)
    }
}

/// A directed link graph over keyed nodes.
///
/// Immutable once built. Every link target is a node of the graph and no node links
/// to itself; [`LinkGraph::from_links`] drops links that would break either rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkGraph<K = String> {
    keys: Vec<K>,
    links: Vec<Vec<usize>>,
}

impl<K: Ord + Clone> LinkGraph<K> {
    /// Build a graph from `(node, links)` pairs.
    ///
    /// Repeated nodes have their link sets merged. Self-links and links to nodes that
    /// never appear as a key are dropped.
    pub fn from_links<I, L>(pages: I) -> Self
    where
        I: IntoIterator<Item = (K, L)>,
        L: IntoIterator<Item = K>,
    {
        let mut merged: BTreeMap<K, BTreeSet<K>> = BTreeMap::new();
        for (page, links) in pages {
            merged.entry(page).or_default().extend(links);
        }
        Self::from(merged)
    }

    pub fn node_count(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Node keys in index order (sorted).
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn index_of(&self, key: &K) -> Option<usize> {
        self.keys.binary_search(key).ok()
    }

    pub fn key(&self, index: usize) -> Option<&K> {
        self.keys.get(index)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index_of(key).is_some()
    }

    /// Out-neighbor indices of `index`, sorted.
    pub fn neighbors_ref(&self, index: usize) -> &[usize] {
        self.links.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Keys linked to by `key`, or `None` if `key` is not a node.
    pub fn links_of(&self, key: &K) -> Option<impl Iterator<Item = &K> + '_> {
        let u = self.index_of(key)?;
        Some(self.links[u].iter().map(move |&v| &self.keys[v]))
    }

    pub fn edge_count(&self) -> usize {
        self.links.iter().map(Vec::len).sum()
    }

    /// Nodes with no outgoing links.
    pub fn dangling(&self) -> impl Iterator<Item = &K> + '_ {
        self.links
            .iter()
            .zip(&self.keys)
            .filter(|(nbrs, _)| nbrs.is_empty())
            .map(|(_, k)| k)
    }

    /// Label an index-ordered score vector with this graph's keys.
    pub fn label(&self, scores: Vec<f64>) -> Result<RankDistribution<K>> {
        if scores.len() != self.keys.len() {
            return Err(Error::InvalidInput(format!(
                "score vector length must equal node_count (len={} node_count={})",
                scores.len(),
                self.keys.len()
            )));
        }
        Ok(self.keys.iter().cloned().zip(scores).collect())
    }

    pub(crate) fn require_index(&self, key: &K) -> Result<usize>
    where
        K: Debug,
    {
        self.index_of(key)
            .ok_or_else(|| Error::UnknownNode(format!("{key:?}")))
    }
}

impl<K: Ord + Clone> From<BTreeMap<K, BTreeSet<K>>> for LinkGraph<K> {
    fn from(pages: BTreeMap<K, BTreeSet<K>>) -> Self {
        let keys: Vec<K> = pages.keys().cloned().collect();
        let mut dropped = 0usize;
        let links = pages
            .iter()
            .enumerate()
            .map(|(u, (_, targets))| {
                let kept: Vec<usize> = targets
                    .iter()
                    .filter_map(|t| keys.binary_search(t).ok())
                    .filter(|&v| v != u)
                    .collect();
                dropped += targets.len() - kept.len();
                kept
            })
            .collect();
        tracing::debug!(nodes = keys.len(), dropped_links = dropped, "built link graph");
        Self { keys, links }
    }
}

impl<K> Graph for LinkGraph<K> {
    fn node_count(&self) -> usize {
        self.keys.len()
    }
    fn neighbors(&self, node: usize) -> Vec<usize> {
        self.links.get(node).cloned().unwrap_or_default()
    }
    fn out_degree(&self, node: usize) -> usize {
        self.links.get(node).map_or(0, Vec::len)
    }
}

#[cfg(feature = "petgraph")]
impl<N, E, Ty, Ix> Graph for petgraph::Graph<N, E, Ty, Ix>
where
    Ty: petgraph::EdgeType,
    Ix: petgraph::graph::IndexType,
{
    fn node_count(&self) -> usize {
        self.node_count()
    }
    fn neighbors(&self, node: usize) -> Vec<usize> {
        self.neighbors(petgraph::graph::NodeIndex::new(node)).map(|idx| idx.index()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_links_drops_self_and_off_graph_links() {
        let g = LinkGraph::from_links([
            ("a", vec!["a", "b", "zzz"]),
            ("b", vec!["a", "a"]),
            ("c", vec![]),
        ]);
        assert_eq!(g.keys(), &["a", "b", "c"]);
        assert_eq!(g.neighbors_ref(0), &[1]);
        assert_eq!(g.neighbors_ref(1), &[0]);
        assert!(g.neighbors_ref(2).is_empty());
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.dangling().collect::<Vec<_>>(), vec![&"c"]);
    }

    #[test]
    fn repeated_keys_merge_links() {
        let g = LinkGraph::from_links([("a", vec!["b"]), ("b", vec![]), ("a", vec!["c"]), ("c", vec![])]);
        let links: Vec<_> = g.links_of(&"a").unwrap().copied().collect();
        assert_eq!(links, vec!["b", "c"]);
        assert!(g.links_of(&"missing").is_none());
    }

    #[test]
    fn label_rejects_wrong_length() {
        let g = LinkGraph::from_links([("a", Vec::<&str>::new())]);
        let err = g.label(vec![0.5, 0.5]).unwrap_err();
        assert!(format!("{err}").contains("node_count"));
    }

    #[test]
    fn collect_adjacency_rejects_out_of_range_neighbor() {
        let adj = vec![vec![1], vec![5]];
        let err = collect_adjacency(&AdjacencyList(&adj)).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfBounds(5)));
    }

    #[cfg(feature = "petgraph")]
    #[test]
    fn petgraph_adapter_reports_directed_neighbors() {
        let mut pg = petgraph::Graph::<(), ()>::new();
        let a = pg.add_node(());
        let b = pg.add_node(());
        pg.add_edge(a, b, ());
        assert_eq!(Graph::node_count(&pg), 2);
        assert_eq!(Graph::neighbors(&pg, 0), vec![1]);
        assert!(Graph::neighbors(&pg, 1).is_empty());
    }
}
