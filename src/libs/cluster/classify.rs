use super::Edge;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

/// Shape of a component's clustering. Diagnostic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComponentType {
    /// No cluster at all
    Empty = 0,
    /// One cluster covering every node
    Whole = 1,
    /// One cluster covering some of the nodes
    Subset = 2,
    /// Several clusters, at least two sharing a node
    Overlapping = 3,
    /// Several clusters, pairwise node-disjoint
    Disjoint = 4,
}

impl ComponentType {
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

fn nodes_of(cluster: &[Edge]) -> BTreeSet<&str> {
    cluster
        .iter()
        .flat_map(|(a, b)| [a.as_str(), b.as_str()])
        .collect()
}

/// ```
/// use ogr::libs::cluster::{classify, ComponentType};
///
/// let nodes: Vec<String> = ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect();
/// let e = |a: &str, b: &str| (a.to_string(), b.to_string());
/// let clusters = vec![
///     vec![e("A", "B"), e("A", "C"), e("B", "C")],
///     vec![e("C", "D")],
/// ];
/// assert_eq!(classify(&nodes, &clusters), ComponentType::Overlapping);
/// assert_eq!(classify(&nodes, &clusters[..1]), ComponentType::Subset);
/// ```
pub fn classify(nodes: &[String], clusters: &[Vec<Edge>]) -> ComponentType {
    match clusters {
        [] => ComponentType::Empty,
        [single] => {
            let covered = nodes_of(single);
            if nodes.iter().all(|n| covered.contains(n.as_str())) {
                ComponentType::Whole
            } else {
                ComponentType::Subset
            }
        }
        _ => {
            let sets: Vec<BTreeSet<&str>> = clusters.iter().map(|c| nodes_of(c)).collect();
            let overlapping = sets
                .iter()
                .enumerate()
                .any(|(i, a)| sets[i + 1..].iter().any(|b| !a.is_disjoint(b)));
            if overlapping {
                ComponentType::Overlapping
            } else {
                ComponentType::Disjoint
            }
        }
    }
}

/// Component counts keyed by type and number of clusters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeSummary {
    counts: BTreeMap<(ComponentType, usize), usize>,
}

impl TypeSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: ComponentType, clusters: usize) {
        *self.counts.entry((kind, clusters)).or_default() += 1;
    }

    pub fn merge(&mut self, other: &TypeSummary) {
        for (key, n) in &other.counts {
            *self.counts.entry(*key).or_default() += n;
        }
    }

    /// Components of one type, whatever their number of clusters
    pub fn total(&self, kind: ComponentType) -> usize {
        self.counts
            .iter()
            .filter(|((k, _), _)| *k == kind)
            .map(|(_, n)| n)
            .sum()
    }

    pub fn log(&self) {
        for kind in [
            ComponentType::Empty,
            ComponentType::Whole,
            ComponentType::Subset,
            ComponentType::Overlapping,
            ComponentType::Disjoint,
        ] {
            log::info!("type {} ({:?}): {} components", kind.code(), kind, self.total(kind));
        }
    }

    /// `type<TAB>clusters<TAB>components`
    pub fn write<W: Write + ?Sized>(&self, writer: &mut W) -> std::io::Result<()> {
        writeln!(writer, "type\tclusters\tcomponents")?;
        for ((kind, clusters), n) in &self.counts {
            writeln!(writer, "{}\t{}\t{}", kind.code(), clusters, n)?;
        }
        Ok(())
    }
}
