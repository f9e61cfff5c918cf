use super::{undirected, HitGraph};
use indexmap::IndexSet;
use std::collections::VecDeque;

/// A connected component of the undirected view of a graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// Four-digit lowercase hex, sequential in discovery order
    pub id: String,
    pub nodes: Vec<String>,
}

impl Component {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Format a sequential id the way every output file does: `0000`, `0001`, ...
pub fn hex_id(i: usize) -> String {
    format!("{:04x}", i)
}

/// Partition the nodes of `graph` into connected components.
///
/// Edges are followed in both directions. Discovery follows the graph's key
/// order, then neighbours that have no entry of their own; nodes inside a
/// component are listed in BFS order.
pub fn find_components(graph: &HitGraph) -> Vec<Component> {
    let sym = undirected(graph);

    let mut seen: IndexSet<&str> = IndexSet::new();
    let mut components = vec![];

    for start in sym.nodes() {
        if seen.contains(start) {
            continue;
        }

        let mut nodes = vec![];
        let mut queue = VecDeque::new();
        seen.insert(start);
        queue.push_back(start);

        while let Some(node) = queue.pop_front() {
            nodes.push(node.to_string());
            for next in sym.neighbors(node).into_iter().flat_map(|n| n.keys()) {
                if seen.insert(next.as_str()) {
                    queue.push_back(next.as_str());
                }
            }
        }

        components.push(Component {
            id: hex_id(components.len()),
            nodes,
        });
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components_scenario_a() {
        let mut g = HitGraph::new();
        for (s, t) in [("a", "b"), ("a", "c"), ("b", "a"), ("c", "a"), ("c", "d"), ("d", "c")] {
            g.add_edge(s, t, 1.0);
        }

        let ccs = find_components(&g);
        assert_eq!(ccs.len(), 1);
        assert_eq!(ccs[0].id, "0000");
        assert_eq!(ccs[0].nodes, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_components_partition() {
        let mut g = HitGraph::new();
        g.add_edge("a", "b", 1.0);
        g.add_edge("c", "d", 1.0);
        g.add_edge("e", "d", 1.0);
        g.add_node("f");
        g.add_edge("g", "h", 1.0);

        let ccs = find_components(&g);
        let ids: Vec<_> = ccs.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["0000", "0001", "0002", "0003"]);

        // every node in exactly one component
        let mut all: Vec<&str> = ccs.iter().flat_map(|c| c.nodes.iter().map(|n| n.as_str())).collect();
        let total = all.len();
        all.sort();
        all.dedup();
        assert_eq!(total, all.len());
        assert_eq!(all, vec!["a", "b", "c", "d", "e", "f", "g", "h"]);

        assert_eq!(ccs[1].nodes, vec!["c", "d", "e"]);
        assert_eq!(ccs[2].nodes, vec!["f"]);
    }

    #[test]
    fn test_hex_id() {
        assert_eq!(hex_id(0), "0000");
        assert_eq!(hex_id(255), "00ff");
        assert_eq!(hex_id(70000), "11170");
    }
}
