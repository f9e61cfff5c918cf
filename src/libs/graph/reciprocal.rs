use super::HitGraph;

/// Keep `x → y` only if `y → x` is also in `graph`.
///
/// Reads the input as a snapshot and writes a new graph, so nothing is
/// deleted while neighbour lists are still being scanned. Every node of the
/// input survives, possibly with no neighbours left. A neighbour that has no
/// entry of its own has no outgoing edges, so edges pointing to it are
/// dropped.
///
/// ```
/// use ogr::libs::graph::{reciprocal, HitGraph};
/// let mut g = HitGraph::new();
/// g.add_edge("a", "b", 1.0);
/// g.add_edge("b", "a", 2.0);
/// g.add_edge("a", "c", 3.0);
///
/// let r = reciprocal(&g);
/// assert!(r.contains_edge("a", "b"));
/// assert!(r.contains_edge("b", "a"));
/// assert!(!r.contains_edge("a", "c"));
/// ```
pub fn reciprocal(graph: &HitGraph) -> HitGraph {
    let mut filtered = HitGraph::new();

    for (node, neighbors) in graph.iter() {
        let entry = filtered.add_node(node);
        for (adj, score) in neighbors {
            if graph.contains_edge(adj, node) {
                entry.insert(adj.clone(), *score);
            }
        }
    }

    filtered
}

/// Symmetric closure of `graph`: `x → y` implies `y → x`.
///
/// The score of an added reverse edge is the score of its forward edge; when
/// both directions exist each keeps its own score. Neighbours without an
/// entry of their own get one.
pub fn undirected(graph: &HitGraph) -> HitGraph {
    let mut sym = graph.clone();

    for (source, target, score) in graph.edges() {
        if !graph.contains_edge(target, source) {
            sym.add_edge(target, source, score);
        }
    }

    sym
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_a() -> HitGraph {
        let mut g = HitGraph::new();
        for (s, t) in [("a", "b"), ("a", "c"), ("b", "a"), ("c", "a"), ("c", "d"), ("d", "c")] {
            g.add_edge(s, t, 1.0);
        }
        g
    }

    #[test]
    fn test_reciprocal_all_kept() {
        let g = scenario_a();
        let r = reciprocal(&g);
        assert_eq!(r, g);
    }

    #[test]
    fn test_reciprocal_every_kept_edge_has_reverse() {
        let mut g = scenario_a();
        g.add_edge("a", "d", 1.0);
        g.add_edge("b", "x", 1.0);
        g.add_edge("d", "b", 1.0);

        let r = reciprocal(&g);
        for (s, t, _) in r.edges() {
            assert!(r.contains_edge(t, s), "{} -> {} lacks its reverse", s, t);
        }
        assert_eq!(r.edge_count(), 6);
        assert_eq!(r.node_count(), g.node_count());
        assert!(!r.contains_node("x"));
    }

    #[test]
    fn test_reciprocal_keeps_isolated_nodes() {
        let mut g = HitGraph::new();
        g.add_edge("a", "b", 1.0);
        g.add_node("c");

        let r = reciprocal(&g);
        assert_eq!(r.nodes().collect::<Vec<_>>(), vec!["a", "c"]);
        assert_eq!(r.edge_count(), 0);
    }

    #[test]
    fn test_undirected() {
        let mut g = HitGraph::new();
        g.add_edge("a", "b", 5.0);
        g.add_edge("b", "c", 3.0);
        g.add_edge("c", "b", 4.0);

        let u = undirected(&g);
        assert_eq!(u.score("b", "a"), Some(5.0));
        assert_eq!(u.score("c", "b"), Some(4.0));
        assert_eq!(u.edge_count(), 4);
        assert!(u.contains_node("a") && u.contains_node("b") && u.contains_node("c"));
    }
}
