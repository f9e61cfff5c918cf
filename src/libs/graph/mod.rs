//! Adjacency graphs of alignment hits.
//!
//! A [`HitGraph`] maps every node to its neighbours and their scores. Edges
//! are directed; the reciprocal and undirected views are derived from it.

pub mod builder;
pub mod component;
pub mod gene;
pub mod io;
pub mod reciprocal;

use indexmap::IndexMap;

pub use builder::{GraphBuilder, Policy};
pub use component::{find_components, Component};
pub use gene::GeneHits;
pub use reciprocal::{reciprocal, undirected};

/// Neighbour → score
pub type Neighbors = IndexMap<String, f64>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitGraph {
    adj: IndexMap<String, Neighbors>,
}

impl HitGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get-or-create the neighbour map of `node`.
    pub fn add_node(&mut self, node: &str) -> &mut Neighbors {
        self.adj.entry(node.to_string()).or_default()
    }

    /// Insert `source → target`, creating `source` if needed. A repeated
    /// edge keeps the highest score. Self-loops are refused.
    ///
    /// ```
    /// use ogr::libs::graph::HitGraph;
    /// let mut g = HitGraph::new();
    /// assert!(g.add_edge("a", "b", 10.0));
    /// assert!(g.add_edge("a", "b", 5.0));
    /// assert!(!g.add_edge("a", "a", 1.0));
    /// assert_eq!(g.score("a", "b"), Some(10.0));
    /// assert!(!g.contains_node("b"));
    /// ```
    pub fn add_edge(&mut self, source: &str, target: &str, score: f64) -> bool {
        if source == target {
            return false;
        }
        let neighbors = self.add_node(source);
        match neighbors.get_mut(target) {
            Some(s) => {
                if score > *s {
                    *s = score;
                }
            }
            None => {
                neighbors.insert(target.to_string(), score);
            }
        }
        true
    }

    pub fn contains_node(&self, node: &str) -> bool {
        self.adj.contains_key(node)
    }

    pub fn contains_edge(&self, source: &str, target: &str) -> bool {
        self.adj
            .get(source)
            .map(|n| n.contains_key(target))
            .unwrap_or(false)
    }

    pub fn score(&self, source: &str, target: &str) -> Option<f64> {
        self.adj.get(source).and_then(|n| n.get(target)).copied()
    }

    pub fn neighbors(&self, node: &str) -> Option<&Neighbors> {
        self.adj.get(node)
    }

    /// Nodes with an entry of their own, in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.adj.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Neighbors)> {
        self.adj.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// All directed edges as `(source, target, score)`
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, f64)> {
        self.adj.iter().flat_map(|(s, n)| {
            n.iter()
                .map(move |(t, score)| (s.as_str(), t.as_str(), *score))
        })
    }

    pub fn node_count(&self) -> usize {
        self.adj.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adj.values().map(|n| n.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.adj.is_empty()
    }

    /// Graph induced by `nodes`: only those keys, only edges between them.
    pub fn subgraph<S: AsRef<str>>(&self, nodes: &[S]) -> HitGraph {
        let keep: indexmap::IndexSet<&str> = nodes.iter().map(|n| n.as_ref()).collect();
        let mut sub = HitGraph::new();
        for node in &keep {
            if let Some(neighbors) = self.adj.get(*node) {
                let entry = sub.add_node(node);
                for (t, s) in neighbors {
                    if keep.contains(t.as_str()) {
                        entry.insert(t.clone(), *s);
                    }
                }
            }
        }
        sub
    }
}
