//! Orthologous groups: triangle-closed edge clusters of connected components.

pub mod classify;
pub mod triangle;

pub use classify::{classify, ComponentType, TypeSummary};
pub use triangle::{triangle_clusters, Edge};

use crate::libs::error::OgrError;
use crate::libs::graph::component::hex_id;
use crate::libs::graph::{Component, HitGraph};
use rayon::prelude::*;
use std::io::{BufRead, Write};

/// One orthologous group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    /// Id of the component it was cut from
    pub component: String,
    /// Sequential four-digit hex over the whole run
    pub id: String,
    pub edges: Vec<Edge>,
}

impl Cluster {
    /// `component:id`, the OG id used downstream
    pub fn og_id(&self) -> String {
        format!("{}:{}", self.component, self.id)
    }

    /// Distinct nodes, in order of first appearance
    pub fn nodes(&self) -> Vec<&str> {
        let mut nodes: indexmap::IndexSet<&str> = indexmap::IndexSet::new();
        for (a, b) in &self.edges {
            nodes.insert(a);
            nodes.insert(b);
        }
        nodes.into_iter().collect()
    }
}

/// Cluster every component of `graph`.
///
/// Components are handled in parallel on the current rayon pool; results
/// keep component order and cluster ids are handed out afterwards, so the
/// output does not depend on the number of threads.
pub fn cluster_components(
    graph: &HitGraph,
    components: &[Component],
    triangles_only: bool,
) -> (Vec<Cluster>, TypeSummary) {
    let per_component: Vec<(Vec<Vec<Edge>>, ComponentType)> = components
        .par_iter()
        .map(|cc| {
            let sub = graph.subgraph(&cc.nodes);
            let clusters = triangle_clusters(sub.edges().map(|(a, b, _)| (a, b)), triangles_only);
            let kind = classify(&cc.nodes, &clusters);
            (clusters, kind)
        })
        .collect();

    let mut summary = TypeSummary::new();
    let mut clusters = vec![];
    for (cc, (edge_sets, kind)) in components.iter().zip(per_component) {
        log::debug!("component {}: {} clusters, {:?}", cc.id, edge_sets.len(), kind);
        summary.add(kind, edge_sets.len());
        for edges in edge_sets {
            clusters.push(Cluster {
                component: cc.id.clone(),
                id: hex_id(clusters.len()),
                edges,
            });
        }
    }

    (clusters, summary)
}

/// Write clusters as `component:id:a,b<TAB>c,d...`.
pub fn write_clusters<W: Write + ?Sized>(writer: &mut W, clusters: &[Cluster]) -> std::io::Result<()> {
    for cluster in clusters {
        let edges = cluster
            .edges
            .iter()
            .map(|(a, b)| format!("{},{}", a, b))
            .collect::<Vec<_>>()
            .join("\t");
        writeln!(writer, "{}:{}:{}", cluster.component, cluster.id, edges)?;
    }
    Ok(())
}

/// ```
/// let clusters = ogr::libs::cluster::read_clusters(
///     "0000:0000:A,B\tA,C\tB,C\n0000:0001:C,D\n".as_bytes()
/// ).unwrap();
/// assert_eq!(clusters.len(), 2);
/// assert_eq!(clusters[0].og_id(), "0000:0000");
/// assert_eq!(clusters[0].nodes(), vec!["A", "B", "C"]);
/// ```
pub fn read_clusters<R: BufRead>(reader: R) -> anyhow::Result<Vec<Cluster>> {
    let mut clusters = vec![];

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let (component, rest) = line
            .split_once(':')
            .ok_or_else(|| OgrError::malformed(i + 1, &line, "expected component:cluster:edges"))?;
        let (id, list) = rest
            .split_once(':')
            .ok_or_else(|| OgrError::malformed(i + 1, &line, "expected component:cluster:edges"))?;

        let mut edges = vec![];
        for field in list.split('\t').map(|s| s.trim()).filter(|s| !s.is_empty()) {
            let (a, b) = field
                .split_once(',')
                .ok_or_else(|| OgrError::malformed(i + 1, &line, format!("bad edge `{}`", field)))?;
            if a == b {
                log::warn!("self-loop on {} ignored at line {}", a, i + 1);
                continue;
            }
            edges.push((a.to_string(), b.to_string()));
        }

        clusters.push(Cluster {
            component: component.trim().to_string(),
            id: id.trim().to_string(),
            edges,
        });
    }

    Ok(clusters)
}

pub fn read_clusters_file(infile: &str) -> anyhow::Result<Vec<Cluster>> {
    let clusters = read_clusters(crate::reader(infile)?)?;
    log::info!("{} clusters read from {}", clusters.len(), infile);
    Ok(clusters)
}
