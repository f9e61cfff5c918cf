use crate::libs::cluster::Cluster;
use crate::libs::error::OgrError;
use crate::libs::graph::GeneHits;
use std::collections::{BTreeMap, BTreeSet};

/// The protein-level view of one orthologous group: its genes, the
/// candidate proteins of each gene and the scores between them, restricted
/// to the gene pairs joined by an edge of the group.
#[derive(Debug)]
pub struct OgGraph<'a> {
    id: &'a str,
    hits: &'a GeneHits,
    partners: BTreeMap<&'a str, BTreeSet<&'a str>>,
    candidates: BTreeMap<&'a str, Vec<&'a str>>,
}

impl<'a> OgGraph<'a> {
    /// Fails with `EmptyCandidates` when a gene of the group has no protein
    /// with a hit to one of its partners.
    pub fn new(cluster: &'a Cluster, hits: &'a GeneHits) -> Result<Self, OgrError> {
        let mut partners: BTreeMap<&'a str, BTreeSet<&'a str>> = BTreeMap::new();
        for (a, b) in &cluster.edges {
            partners.entry(a.as_str()).or_default().insert(b.as_str());
            partners.entry(b.as_str()).or_default().insert(a.as_str());
        }

        let mut candidates = BTreeMap::new();
        for (&gene, genes) in &partners {
            let proteins: BTreeSet<&'a str> = genes
                .iter()
                .filter_map(|partner| hits.get(gene, partner))
                .flat_map(|m| m.keys().map(|k| k.as_str()))
                .collect();
            if proteins.is_empty() {
                return Err(OgrError::EmptyCandidates {
                    og: cluster.id.clone(),
                    gene: gene.to_string(),
                });
            }
            candidates.insert(gene, proteins.into_iter().collect());
        }

        Ok(Self {
            id: &cluster.id,
            hits,
            partners,
            candidates,
        })
    }

    pub fn id(&self) -> &'a str {
        self.id
    }

    /// Genes in sorted order
    pub fn genes(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.partners.keys().copied()
    }

    /// Sorted candidate proteins of `gene`; empty for a gene outside the group
    pub fn candidates(&self, gene: &str) -> &[&'a str] {
        self.candidates.get(gene).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Score of `p1 → p2`, zero when the genes are not joined in the group
    /// or no hit was recorded.
    pub fn score(&self, g1: &str, p1: &str, g2: &str, p2: &str) -> f64 {
        let joined = self
            .partners
            .get(g1)
            .map(|s| s.contains(g2))
            .unwrap_or(false);
        if !joined {
            return 0.0;
        }
        self.hits
            .get(g1, g2)
            .and_then(|m| m.get(p1))
            .and_then(|m| m.get(p2))
            .copied()
            .unwrap_or(0.0)
    }

    /// Sum of both directions
    pub fn pair_score(&self, g1: &str, p1: &str, g2: &str, p2: &str) -> f64 {
        self.score(g1, p1, g2, p2) + self.score(g2, p2, g1, p1)
    }
}
