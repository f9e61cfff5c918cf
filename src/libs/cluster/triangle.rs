use std::collections::{BTreeMap, BTreeSet};

/// An undirected edge, endpoints in sorted order
pub type Edge = (String, String);

type Key<'a> = (&'a str, &'a str);

fn key<'a>(a: &'a str, b: &'a str) -> Key<'a> {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Undirected simple graph over borrowed ids, sorted for reproducible walks.
#[derive(Debug, Default)]
struct Undirected<'a> {
    adj: BTreeMap<&'a str, BTreeSet<&'a str>>,
    edges: BTreeSet<Key<'a>>,
}

impl<'a> Undirected<'a> {
    fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut graph = Undirected::default();
        for (a, b) in edges {
            if a == b {
                log::warn!("self-loop on {} is not clustered", a);
                continue;
            }
            graph.adj.entry(a).or_default().insert(b);
            graph.adj.entry(b).or_default().insert(a);
            graph.edges.insert(key(a, b));
        }
        graph
    }

    /// Third nodes closing a triangle over `(a, b)`
    fn apexes(&self, (a, b): Key<'a>) -> Vec<&'a str> {
        match (self.adj.get(a), self.adj.get(b)) {
            (Some(na), Some(nb)) => na.intersection(nb).copied().collect(),
            _ => vec![],
        }
    }
}

/// Partition the edges of one component into triangle-closed clusters.
///
/// Two edges sharing a node fall in the same cluster exactly when the edge
/// joining their free ends exists, and clusters grow through chains of such
/// triangles. A component without any triangle yields no cluster. Otherwise
/// an edge that closes no triangle forms a cluster of its own, unless
/// `triangles_only` is set, in which case it is dropped.
///
/// Edges are given as `(source, target)` pairs; direction and duplicates
/// are ignored. Each cluster's edges are sorted, and clusters come in the
/// order of their smallest edge.
///
/// ```
/// use ogr::libs::cluster::triangle_clusters;
///
/// let edges = vec![("A", "B"), ("B", "C"), ("A", "C"), ("C", "D"), ("D", "C")];
/// let clusters = triangle_clusters(edges, false);
/// assert_eq!(clusters.len(), 2);
/// assert_eq!(clusters[0].len(), 3);
/// assert_eq!(clusters[1], vec![("C".to_string(), "D".to_string())]);
/// ```
pub fn triangle_clusters<'a, I>(edges: I, triangles_only: bool) -> Vec<Vec<Edge>>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let graph = Undirected::from_edges(edges);

    let closing: BTreeSet<Key> = graph
        .edges
        .iter()
        .copied()
        .filter(|&e| !graph.apexes(e).is_empty())
        .collect();
    if closing.is_empty() {
        return vec![];
    }

    let mut visited: BTreeSet<Key> = BTreeSet::new();
    let mut clusters = vec![];
    let mut dropped = 0;

    for &start in &graph.edges {
        if visited.contains(&start) {
            continue;
        }
        visited.insert(start);

        if !closing.contains(&start) {
            if triangles_only {
                dropped += 1;
            } else {
                clusters.push(vec![start]);
            }
            continue;
        }

        // edge-DFS through triangles
        let mut cluster = vec![];
        let mut stack = vec![start];
        while let Some(edge) = stack.pop() {
            cluster.push(edge);
            let (a, b) = edge;
            for c in graph.apexes(edge) {
                for next in [key(a, c), key(b, c)] {
                    if visited.insert(next) {
                        stack.push(next);
                    }
                }
            }
        }
        cluster.sort_unstable();
        clusters.push(cluster);
    }

    if dropped > 0 {
        log::debug!("{} edges in no triangle dropped", dropped);
    }

    clusters
        .into_iter()
        .map(|c| {
            c.into_iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect()
        })
        .collect()
}
