use super::HitGraph;
use crate::libs::error::OgrError;
use crate::libs::hit::Hit;
use crate::libs::meta::MetaTable;
use indexmap::IndexMap;

/// Query protein → subject protein → score
pub type ProteinHits = IndexMap<String, IndexMap<String, f64>>;

/// Protein-level hits grouped by gene pair: query gene → subject gene →
/// query protein → subject protein → score.
#[derive(Debug, Clone, Default)]
pub struct GeneHits {
    genes: IndexMap<String, IndexMap<String, ProteinHits>>,
}

impl GeneHits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lift protein hits to their genes. Hits between two proteins of the
    /// same gene carry no orthology signal and are skipped.
    pub fn from_hits<'a, I>(hits: I, meta: &MetaTable) -> Result<Self, OgrError>
    where
        I: IntoIterator<Item = &'a Hit>,
    {
        let mut gh = GeneHits::new();
        for hit in hits {
            let qgene = meta.gene_of(&hit.query)?;
            let sgene = meta.gene_of(&hit.subject)?;
            gh.genes.entry(qgene.to_string()).or_default();
            if qgene == sgene {
                log::debug!(
                    "skip hit {} -> {} within gene {}",
                    hit.query,
                    hit.subject,
                    qgene
                );
                continue;
            }
            gh.insert(qgene, sgene, &hit.query, &hit.subject, hit.score);
        }
        Ok(gh)
    }

    /// Record a protein hit; a repeated pair keeps the highest score.
    pub fn insert(&mut self, qgene: &str, sgene: &str, qppid: &str, sppid: &str, score: f64) {
        let slot = self
            .genes
            .entry(qgene.to_string())
            .or_default()
            .entry(sgene.to_string())
            .or_default()
            .entry(qppid.to_string())
            .or_default()
            .entry(sppid.to_string())
            .or_insert(score);
        if score > *slot {
            *slot = score;
        }
    }

    pub fn get(&self, qgene: &str, sgene: &str) -> Option<&ProteinHits> {
        self.genes.get(qgene).and_then(|m| m.get(sgene))
    }

    pub fn genes(&self) -> impl Iterator<Item = &str> {
        self.genes.keys().map(|k| k.as_str())
    }

    /// Gene graph whose edge score is the mean over the protein pairs of each
    /// ordered gene pair.
    pub fn to_graph(&self) -> HitGraph {
        let mut graph = HitGraph::new();
        for (qgene, subjects) in &self.genes {
            graph.add_node(qgene);
            for (sgene, proteins) in subjects {
                let scores: Vec<f64> = proteins.values().flat_map(|m| m.values()).copied().collect();
                if scores.is_empty() {
                    continue;
                }
                let mean = scores.iter().sum::<f64>() / scores.len() as f64;
                graph.add_edge(qgene, sgene, mean);
            }
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> MetaTable {
        let mut m = MetaTable::new();
        m.insert("p1", "g1", "X").unwrap();
        m.insert("p2", "g1", "X").unwrap();
        m.insert("p3", "g2", "Y").unwrap();
        m
    }

    #[test]
    fn test_gene_hits() {
        let hits = vec![
            Hit::new("p1", "p3", 50.0),
            Hit::new("p2", "p3", 10.0),
            Hit::new("p1", "p2", 99.0),
            Hit::new("p3", "p1", 40.0),
            Hit::new("p1", "p3", 20.0),
        ];
        let gh = GeneHits::from_hits(&hits, &meta()).unwrap();

        let g1g2 = gh.get("g1", "g2").unwrap();
        assert_eq!(g1g2["p1"]["p3"], 50.0);
        assert_eq!(g1g2["p2"]["p3"], 10.0);
        assert!(gh.get("g1", "g1").is_none());
        assert_eq!(gh.get("g2", "g1").unwrap()["p3"]["p1"], 40.0);

        let graph = gh.to_graph();
        assert_eq!(graph.score("g1", "g2"), Some(30.0));
        assert_eq!(graph.score("g2", "g1"), Some(40.0));
    }

    #[test]
    fn test_gene_hits_unknown() {
        let hits = vec![Hit::new("p1", "p9", 50.0)];
        let err = GeneHits::from_hits(&hits, &meta()).unwrap_err();
        assert_eq!(err, OgrError::UnknownProtein("p9".to_string()));
    }
}
