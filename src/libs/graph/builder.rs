use super::{GeneHits, HitGraph};
use crate::libs::error::OgrError;
use crate::libs::hit::Hit;
use crate::libs::meta::MetaTable;
use indexmap::IndexMap;
use std::str::FromStr;

/// Which hits of a query become edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Every hit
    All,
    /// Only the hits to the top-scoring subject gene(s)
    BestPerGene,
}

impl FromStr for Policy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Policy::All),
            "best" => Ok(Policy::BestPerGene),
            _ => Err(anyhow::anyhow!("unknown policy `{}`, expected all or best", s)),
        }
    }
}

/// Turns hit records into a [`HitGraph`].
///
/// ```
/// use ogr::libs::graph::{GraphBuilder, Policy};
/// use ogr::libs::hit::Hit;
///
/// let hits = vec![Hit::new("a", "b", 10.0), Hit::new("b", "a", 12.0)];
/// let graph = GraphBuilder::new(Policy::All).build(&hits).unwrap();
/// assert_eq!(graph.score("b", "a"), Some(12.0));
/// ```
#[derive(Debug, Clone)]
pub struct GraphBuilder<'a> {
    policy: Policy,
    meta: Option<&'a MetaTable>,
    min_coverage: Option<f64>,
    max_evalue: Option<f64>,
    by_gene: bool,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(policy: Policy) -> Self {
        Self {
            policy,
            meta: None,
            min_coverage: None,
            max_evalue: None,
            by_gene: false,
        }
    }

    pub fn meta(mut self, meta: &'a MetaTable) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Drop hits whose aligned query fraction is below `cov`.
    pub fn min_coverage(mut self, cov: Option<f64>) -> Self {
        self.min_coverage = cov;
        self
    }

    /// Drop hits whose evalue is above `evalue`. Hits read without an evalue
    /// column are kept.
    pub fn max_evalue(mut self, evalue: Option<f64>) -> Self {
        self.max_evalue = evalue;
        self
    }

    /// Build a gene graph instead of a protein graph.
    pub fn by_gene(mut self, flag: bool) -> Self {
        self.by_gene = flag;
        self
    }

    fn require_meta(&self) -> anyhow::Result<&'a MetaTable> {
        self.meta
            .ok_or_else(|| anyhow::anyhow!("a metadata table is needed to resolve genes"))
    }

    /// Hits that pass the coverage and evalue filters and the policy, grouped by query in
    /// order of first appearance.
    pub fn select<'h>(&self, hits: &'h [Hit]) -> anyhow::Result<IndexMap<&'h str, Vec<&'h Hit>>> {
        let mut groups: IndexMap<&'h str, Vec<&'h Hit>> = IndexMap::new();
        for hit in hits {
            let group = groups.entry(hit.query.as_str()).or_default();
            if hit.is_self_hit() {
                log::warn!("self hit of {} ignored", hit.query);
                continue;
            }
            if let (Some(min), Some(cov)) = (self.min_coverage, hit.coverage) {
                if cov < min {
                    continue;
                }
            }
            if let (Some(max), Some(evalue)) = (self.max_evalue, hit.evalue) {
                if evalue > max {
                    continue;
                }
            }
            group.push(hit);
        }

        if self.policy == Policy::BestPerGene {
            let meta = self.require_meta()?;
            for group in groups.values_mut() {
                *group = best_hits_per_gene(group, meta)?;
            }
        }

        Ok(groups)
    }

    pub fn build(&self, hits: &[Hit]) -> anyhow::Result<HitGraph> {
        let groups = self.select(hits)?;

        let graph = if self.by_gene {
            let meta = self.require_meta()?;
            let genes = GeneHits::from_hits(groups.values().flatten().copied(), meta)?.to_graph();

            // queries left without hits still become nodes
            let mut graph = HitGraph::new();
            for query in groups.keys() {
                graph.add_node(meta.gene_of(query)?);
            }
            for (source, target, score) in genes.edges() {
                graph.add_edge(source, target, score);
            }
            graph
        } else {
            let mut graph = HitGraph::new();
            for (query, group) in &groups {
                graph.add_node(query);
                for hit in group {
                    graph.add_edge(&hit.query, &hit.subject, hit.score);
                }
            }
            graph
        };

        log::info!(
            "graph built with {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }
}

/// Keep the hits of one query that go to its best subject gene(s).
///
/// Hits are ranked by descending score (stable). The first hit fixes the top
/// score and every gene reaching it is accepted. Further hits to an accepted
/// gene are kept whatever their score, until the scan stops at the first new
/// gene scoring lower; hits ranked after that point are dropped, even those
/// to an accepted gene.
///
/// ```
/// use ogr::libs::graph::builder::best_hits_per_gene;
/// use ogr::libs::hit::Hit;
/// use ogr::libs::meta::MetaTable;
///
/// let mut meta = MetaTable::new();
/// meta.insert("s1", "g1", "Y").unwrap();
/// meta.insert("s2", "g1", "Y").unwrap();
/// meta.insert("s3", "g2", "Y").unwrap();
///
/// let hits = vec![
///     Hit::new("q", "s1", 100.0),
///     Hit::new("q", "s3", 80.0),
///     Hit::new("q", "s2", 90.0),
/// ];
/// let refs: Vec<&Hit> = hits.iter().collect();
/// let best = best_hits_per_gene(&refs, &meta).unwrap();
/// let subjects: Vec<&str> = best.iter().map(|h| h.subject.as_str()).collect();
/// assert_eq!(subjects, vec!["s1", "s2"]);
/// ```
pub fn best_hits_per_gene<'h>(
    hits: &[&'h Hit],
    meta: &MetaTable,
) -> Result<Vec<&'h Hit>, OgrError> {
    let mut ranked: Vec<&'h Hit> = hits.to_vec();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    let top = match ranked.first() {
        Some(hit) => hit.score,
        None => return Ok(vec![]),
    };

    let mut accepted: Vec<&str> = vec![];
    let mut best = vec![];
    for hit in ranked {
        let gene = meta.gene_of(&hit.subject)?;
        if !accepted.contains(&gene) {
            if hit.score < top {
                break;
            }
            accepted.push(gene);
        }
        best.push(hit);
    }

    Ok(best)
}
