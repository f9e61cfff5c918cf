use super::{Component, HitGraph};
use crate::libs::error::OgrError;
use std::io::{BufRead, Write};

/// Read an adjacency file: `node<TAB>n1:score,n2:score,...`.
///
/// A neighbour without `:score` gets score 0, a line holding only a node
/// id is a node without neighbours, and the placeholder node `null` is
/// skipped.
///
/// ```
/// let graph = ogr::libs::graph::io::read_graph(
///     "a\tb:10,c\nb\ta:12\nnull\ta\nd\n".as_bytes()
/// ).unwrap();
/// assert_eq!(graph.node_count(), 3);
/// assert_eq!(graph.score("a", "b"), Some(10.0));
/// assert_eq!(graph.score("a", "c"), Some(0.0));
/// assert!(graph.neighbors("d").unwrap().is_empty());
/// ```
pub fn read_graph<R: BufRead>(reader: R) -> anyhow::Result<HitGraph> {
    let mut graph = HitGraph::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let (node, list) = match line.split_once('\t') {
            Some((node, list)) => (node.trim(), list.trim()),
            None => (line.trim(), ""),
        };
        if node == "null" {
            continue;
        }
        graph.add_node(node);

        for entry in list.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()) {
            let (target, score) = match entry.rsplit_once(':') {
                Some((target, score)) => {
                    let score = score.parse::<f64>().map_err(|_| {
                        OgrError::malformed(i + 1, &line, format!("bad score in `{}`", entry))
                    })?;
                    if !(score >= 0.0) {
                        return Err(
                            OgrError::malformed(i + 1, &line, "score must be non-negative").into(),
                        );
                    }
                    (target, score)
                }
                None => (entry, 0.0),
            };
            if !graph.add_edge(node, target, score) {
                log::warn!("self-loop on {} ignored at line {}", node, i + 1);
            }
        }
    }

    Ok(graph)
}

pub fn read_graph_file(infile: &str) -> anyhow::Result<HitGraph> {
    let graph = read_graph(crate::reader(infile)?)?;
    log::info!(
        "{} nodes and {} edges read from {}",
        graph.node_count(),
        graph.edge_count(),
        infile
    );
    Ok(graph)
}

pub fn write_graph<W: Write + ?Sized>(writer: &mut W, graph: &HitGraph) -> std::io::Result<()> {
    for (node, neighbors) in graph.iter() {
        let list = neighbors
            .iter()
            .map(|(t, s)| format!("{}:{}", t, s))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(writer, "{}\t{}", node, list)?;
    }
    Ok(())
}

/// Read a components file: `id:n1,n2,...`.
pub fn read_components<R: BufRead>(reader: R) -> anyhow::Result<Vec<Component>> {
    let mut components = vec![];

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let (id, list) = line
            .split_once(':')
            .ok_or_else(|| OgrError::malformed(i + 1, &line, "expected id:nodes"))?;
        let nodes: Vec<String> = list
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect();

        components.push(Component {
            id: id.trim().to_string(),
            nodes,
        });
    }

    Ok(components)
}

pub fn read_components_file(infile: &str) -> anyhow::Result<Vec<Component>> {
    let components = read_components(crate::reader(infile)?)?;
    log::info!("{} components read from {}", components.len(), infile);
    Ok(components)
}

pub fn write_components<W: Write + ?Sized>(
    writer: &mut W,
    components: &[Component],
) -> std::io::Result<()> {
    for cc in components {
        writeln!(writer, "{}:{}", cc.id, cc.nodes.join(","))?;
    }
    Ok(())
}
