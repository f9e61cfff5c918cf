//! One representative protein per gene for each orthologous group, chosen
//! along the species tree.
//!
//! The tree is pruned to the species of the group and walked from the root.
//! A node with two leaf children picks the protein combination maximising
//! the bitscores between both species. A node with one leaf child fixes the
//! other child first, then picks the leaf's combination maximising the
//! branch-length weighted scores against it. A node with two internal
//! children just joins their selections.

pub mod og;

pub use og::OgGraph;

use crate::libs::cluster::Cluster;
use crate::libs::error::OgrError;
use crate::libs::graph::GeneHits;
use crate::libs::meta::MetaTable;
use crate::libs::phylo::{NodeId, Tree};
use itertools::Itertools;
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

/// Above this many protein combinations at one node a warning is logged
pub const COMBINATION_WARN: usize = 1_000_000;

/// The protein kept for one gene of a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub species: String,
    pub gene: String,
    pub protein: String,
}

/// Selections of one group, in tree order
#[derive(Debug, Clone, PartialEq)]
pub struct ReducedOg {
    pub og: String,
    pub selections: Vec<Selection>,
}

pub struct TreeReducer<'a> {
    tree: &'a Tree,
    meta: &'a MetaTable,
    hits: &'a GeneHits,
    leaves: BTreeSet<&'a str>,
}

impl<'a> TreeReducer<'a> {
    /// Leaf names are species ids and must be unique.
    pub fn new(tree: &'a Tree, meta: &'a MetaTable, hits: &'a GeneHits) -> Result<Self, OgrError> {
        let mut leaves = BTreeSet::new();
        for name in tree.leaf_names() {
            if !leaves.insert(name) {
                return Err(OgrError::DuplicateLeaf(name.to_string()));
            }
        }
        Ok(Self {
            tree,
            meta,
            hits,
            leaves,
        })
    }

    /// Reduce one group.
    ///
    /// Every gene of the group gets exactly one selection. Genes whose
    /// species is missing from the tree, genes without candidate proteins
    /// and pruned trees that are not bifurcating are errors.
    pub fn reduce(&self, cluster: &Cluster) -> Result<ReducedOg, OgrError> {
        let og = OgGraph::new(cluster, self.hits)?;

        let mut species: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for gene in og.genes() {
            let spid = self.meta.species_of_gene(gene)?;
            if !self.leaves.contains(spid) {
                return Err(OgrError::SpeciesNotInTree {
                    species: spid.to_string(),
                    gene: gene.to_string(),
                });
            }
            species.entry(spid).or_default().push(gene);
        }

        let mut tree = self.tree.clone();
        tree.retain_leaves(|name| species.contains_key(name));

        let selections = match tree.get_root() {
            None => vec![],
            Some(root) => {
                let work = Reduction {
                    og: &og,
                    tree: &tree,
                    species: &species,
                };
                if tree.get_node(root).map(|n| n.is_leaf()).unwrap_or(false) {
                    work.reduce_single(root)
                } else if !tree.is_binary() {
                    return Err(OgrError::NotBifurcating(cluster.id.clone()));
                } else {
                    work.reduce_node(root)
                }
            }
        };

        log::debug!(
            "OG {} reduced to {} proteins",
            cluster.og_id(),
            selections.len()
        );
        Ok(ReducedOg {
            og: cluster.id.clone(),
            selections,
        })
    }

    /// Reduce every group on the current rayon pool, keeping input order.
    pub fn reduce_all(&self, clusters: &[Cluster]) -> Result<Vec<ReducedOg>, OgrError> {
        clusters.par_iter().map(|c| self.reduce(c)).collect()
    }
}

/// State of one group's walk over its pruned tree
struct Reduction<'r, 'a> {
    og: &'r OgGraph<'a>,
    tree: &'r Tree,
    species: &'r BTreeMap<&'a str, Vec<&'a str>>,
}

impl<'r, 'a> Reduction<'r, 'a> {
    fn name(&self, id: NodeId) -> &'r str {
        self.tree
            .get_node(id)
            .and_then(|n| n.name.as_deref())
            .unwrap_or("")
    }

    fn genes(&self, leaf: NodeId) -> &'r [&'a str] {
        self.species
            .get(self.name(leaf))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    fn select(&self, leaf: NodeId, genes: &[&'a str], proteins: &[&'a str]) -> Vec<Selection> {
        let spid = self.name(leaf);
        genes
            .iter()
            .zip(proteins)
            .map(|(gene, protein)| Selection {
                species: spid.to_string(),
                gene: gene.to_string(),
                protein: protein.to_string(),
            })
            .collect()
    }

    /// First highest-scoring choice of one candidate per gene. The last
    /// gene varies fastest.
    fn best<F>(&self, genes: &[&'a str], score: F) -> Vec<&'a str>
    where
        F: Fn(&[&'a str]) -> f64,
    {
        let lists: Vec<&[&'a str]> = genes.iter().map(|g| self.og.candidates(g)).collect();
        let total = lists
            .iter()
            .fold(1usize, |acc, l| acc.saturating_mul(l.len()));
        if total > COMBINATION_WARN {
            log::warn!(
                "OG {}: scoring {} protein combinations over {} genes",
                self.og.id(),
                total,
                genes.len()
            );
        }

        let mut best: Option<(f64, Vec<&'a str>)> = None;
        for combo in lists
            .iter()
            .map(|l| l.iter().copied())
            .multi_cartesian_product()
        {
            let s = score(combo.as_slice());
            let better = match &best {
                Some((top, _)) => s > *top,
                None => true,
            };
            if better {
                best = Some((s, combo));
            }
        }

        best.map(|(_, combo)| combo).unwrap_or_default()
    }

    fn reduce_node(&self, id: NodeId) -> Vec<Selection> {
        let children = match self.tree.get_node(id) {
            Some(node) => node.children.clone(),
            None => return vec![],
        };
        let (left, right) = (children[0], children[1]);
        let is_leaf = |c: NodeId| {
            self.tree
                .get_node(c)
                .map(|n| n.is_leaf())
                .unwrap_or(false)
        };

        match (is_leaf(left), is_leaf(right)) {
            (true, true) => self.reduce_terminal(left, right),
            (true, false) => {
                let fixed = self.reduce_node(right);
                self.reduce_nonterminal(id, left, fixed)
            }
            (false, true) => {
                let fixed = self.reduce_node(left);
                self.reduce_nonterminal(id, right, fixed)
            }
            (false, false) => {
                let mut selections = self.reduce_node(left);
                selections.extend(self.reduce_node(right));
                selections
            }
        }
    }

    /// Two sibling leaves: maximise the inter-species scores, both directions.
    fn reduce_terminal(&self, left: NodeId, right: NodeId) -> Vec<Selection> {
        let (g1, g2) = (self.genes(left), self.genes(right));
        let genes: Vec<&'a str> = g1.iter().chain(g2).copied().collect();
        let n = g1.len();

        let combo = self.best(&genes, |c| {
            let mut score = 0.0;
            for i in 0..n {
                for j in n..genes.len() {
                    score += self.og.pair_score(genes[i], c[i], genes[j], c[j]);
                }
            }
            score
        });

        let mut selections = self.select(left, g1, &combo[..n]);
        selections.extend(self.select(right, g2, &combo[n..]));
        selections
    }

    /// A leaf next to an already reduced subtree. Each pair is weighted by
    /// `(dist[a] + dist[b]) / D` with distances taken from `node` and
    /// `D = sum(dist) + (leaves - 2) * dist[leaf]`.
    fn reduce_nonterminal(&self, node: NodeId, leaf: NodeId, fixed: Vec<Selection>) -> Vec<Selection> {
        let dists: BTreeMap<&str, f64> = self
            .tree
            .leaf_distances(node)
            .into_iter()
            .map(|(id, d)| (self.name(id), d))
            .collect();
        let spid = self.name(leaf);
        let own = dists.get(spid).copied().unwrap_or(0.0);
        let total = dists.values().sum::<f64>() + (dists.len() as f64 - 2.0) * own;
        let weight = |other: &str| {
            if total == 0.0 {
                1.0
            } else {
                (own + dists.get(other).copied().unwrap_or(0.0)) / total
            }
        };

        let genes = self.genes(leaf);
        let combo = self.best(genes, |c| {
            let mut score = 0.0;
            for (gene, protein) in genes.iter().zip(c) {
                for sel in &fixed {
                    score += weight(sel.species.as_str())
                        * self.og.pair_score(gene, protein, &sel.gene, &sel.protein);
                }
            }
            score
        });

        let mut selections = self.select(leaf, genes, &combo);
        selections.extend(fixed);
        selections
    }

    /// All genes in one species: maximise the scores between distinct genes.
    fn reduce_single(&self, leaf: NodeId) -> Vec<Selection> {
        let genes = self.genes(leaf);
        let combo = self.best(genes, |c| {
            let mut score = 0.0;
            for i in 0..genes.len() {
                for j in i + 1..genes.len() {
                    score += self.og.pair_score(genes[i], c[i], genes[j], c[j]);
                }
            }
            score
        });
        self.select(leaf, genes, &combo)
    }
}

/// Write `OGid<TAB>spid<TAB>gnid<TAB>ppid` rows under a header.
pub fn write_reduced<W: Write + ?Sized>(writer: &mut W, reduced: &[ReducedOg]) -> std::io::Result<()> {
    writeln!(writer, "OGid\tspid\tgnid\tppid")?;
    for rog in reduced {
        for sel in &rog.selections {
            writeln!(
                writer,
                "{}\t{}\t{}\t{}",
                rog.og, sel.species, sel.gene, sel.protein
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster(edges: &[(&str, &str)]) -> Cluster {
        Cluster {
            component: "0000".to_string(),
            id: "0001".to_string(),
            edges: edges
                .iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect(),
        }
    }

    fn meta(rows: &[(&str, &str, &str)]) -> MetaTable {
        let mut m = MetaTable::new();
        for (p, g, s) in rows {
            m.insert(p, g, s).unwrap();
        }
        m
    }

    fn proteins(rog: &ReducedOg) -> Vec<&str> {
        rog.selections.iter().map(|s| s.protein.as_str()).collect()
    }

    #[test]
    fn test_terminal_pair() {
        let tree = Tree::from_newick("(X:1,Y:1);").unwrap();
        let meta = meta(&[("p1", "g1", "X"), ("p2", "g1", "X"), ("p3", "g2", "Y")]);
        let mut hits = GeneHits::new();
        hits.insert("g1", "g2", "p1", "p3", 50.0);
        hits.insert("g1", "g2", "p2", "p3", 10.0);
        hits.insert("g2", "g1", "p3", "p1", 40.0);
        hits.insert("g2", "g1", "p3", "p2", 5.0);

        let reducer = TreeReducer::new(&tree, &meta, &hits).unwrap();
        let rog = reducer.reduce(&cluster(&[("g1", "g2")])).unwrap();
        assert_eq!(rog.og, "0001");
        assert_eq!(
            rog.selections,
            vec![
                Selection {
                    species: "X".to_string(),
                    gene: "g1".to_string(),
                    protein: "p1".to_string()
                },
                Selection {
                    species: "Y".to_string(),
                    gene: "g2".to_string(),
                    protein: "p3".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_dominating_combination_wins() {
        let tree = Tree::from_newick("(X:1,Y:1);").unwrap();
        let meta = meta(&[
            ("a1", "ga", "X"),
            ("a2", "ga", "X"),
            ("b1", "gb", "X"),
            ("c1", "gc", "Y"),
            ("c2", "gc", "Y"),
        ]);
        let mut hits = GeneHits::new();
        for (g1, p1, g2, p2, s) in [
            ("ga", "a1", "gc", "c1", 10.0),
            ("ga", "a2", "gc", "c2", 30.0),
            ("gb", "b1", "gc", "c1", 10.0),
            ("gb", "b1", "gc", "c2", 20.0),
            ("gc", "c1", "ga", "a1", 10.0),
            ("gc", "c2", "ga", "a2", 30.0),
            ("gc", "c2", "gb", "b1", 20.0),
        ] {
            hits.insert(g1, g2, p1, p2, s);
        }

        let reducer = TreeReducer::new(&tree, &meta, &hits).unwrap();
        let rog = reducer
            .reduce(&cluster(&[("ga", "gc"), ("gb", "gc")]))
            .unwrap();
        assert_eq!(proteins(&rog), vec!["a2", "b1", "c2"]);
    }

    #[test]
    fn test_ties_keep_first() {
        let tree = Tree::from_newick("(X,Y);").unwrap();
        let meta = meta(&[("p1", "g1", "X"), ("p2", "g1", "X"), ("p3", "g2", "Y")]);
        let mut hits = GeneHits::new();
        hits.insert("g1", "g2", "p2", "p3", 7.0);
        hits.insert("g1", "g2", "p1", "p3", 7.0);
        hits.insert("g2", "g1", "p3", "p1", 1.0);
        hits.insert("g2", "g1", "p3", "p2", 1.0);

        let reducer = TreeReducer::new(&tree, &meta, &hits).unwrap();
        let rog = reducer.reduce(&cluster(&[("g1", "g2")])).unwrap();
        assert_eq!(proteins(&rog), vec!["p1", "p3"]);
    }

    #[test]
    fn test_weighted_nonterminal() {
        // Z is the leaf next to the reduced (X,Y) subtree; from the root the
        // distances are X 2, Y 4, Z 1, so D = 7 + 1 * 1 = 8
        let tree = Tree::from_newick("((X:1,Y:3):1,Z:1);").unwrap();
        let meta = meta(&[
            ("x1", "gx", "X"),
            ("y1", "gy", "Y"),
            ("z1", "gz", "Z"),
            ("z2", "gz", "Z"),
        ]);
        let mut hits = GeneHits::new();
        for (g1, p1, g2, p2, s) in [
            ("gx", "x1", "gy", "y1", 1.0),
            ("gy", "y1", "gx", "x1", 1.0),
            // z1 scores 30 against X, weight 3/8
            ("gz", "z1", "gx", "x1", 30.0),
            ("gx", "x1", "gz", "z1", 0.0),
            // z2 scores 25 against Y, weight 5/8
            ("gz", "z2", "gy", "y1", 25.0),
            ("gy", "y1", "gz", "z2", 0.0),
        ] {
            hits.insert(g1, g2, p1, p2, s);
        }
        let c = cluster(&[("gx", "gy"), ("gx", "gz"), ("gy", "gz")]);

        let reducer = TreeReducer::new(&tree, &meta, &hits).unwrap();
        let rog = reducer.reduce(&c).unwrap();
        // 25 * 5/8 = 15.6 beats 30 * 3/8 = 11.25
        assert_eq!(proteins(&rog), vec!["z2", "x1", "y1"]);
        assert_eq!(rog.selections[0].species, "Z");
    }

    #[test]
    fn test_pruned_species_and_completeness() {
        let tree = Tree::from_newick("(((A:1,B:1):1,C:2):1,(D:1,E:1):2);").unwrap();
        let meta = meta(&[
            ("a1", "ga", "A"),
            ("c1", "gc", "C"),
            ("c2", "gc2", "C"),
            ("e1", "ge", "E"),
            ("e2", "ge", "E"),
        ]);
        let mut hits = GeneHits::new();
        for (g1, p1, g2, p2) in [
            ("ga", "a1", "gc", "c1"),
            ("gc", "c1", "ga", "a1"),
            ("gc", "c1", "ge", "e1"),
            ("ge", "e1", "gc", "c1"),
            ("ge", "e2", "gc2", "c2"),
            ("gc2", "c2", "ge", "e2"),
        ] {
            hits.insert(g1, g2, p1, p2, 10.0);
        }
        let c = cluster(&[("ga", "gc"), ("gc", "ge"), ("ge", "gc2")]);

        let reducer = TreeReducer::new(&tree, &meta, &hits).unwrap();
        let rog = reducer.reduce(&c).unwrap();

        let mut genes: Vec<&str> = rog.selections.iter().map(|s| s.gene.as_str()).collect();
        genes.sort();
        assert_eq!(genes, vec!["ga", "gc", "gc2", "ge"]);
    }

    #[test]
    fn test_single_species() {
        let tree = Tree::from_newick("(X:1,Y:1);").unwrap();
        let meta = meta(&[("p1", "g1", "X"), ("p2", "g1", "X"), ("p3", "g2", "X")]);
        let mut hits = GeneHits::new();
        hits.insert("g1", "g2", "p1", "p3", 1.0);
        hits.insert("g1", "g2", "p2", "p3", 8.0);
        hits.insert("g2", "g1", "p3", "p2", 1.0);

        let reducer = TreeReducer::new(&tree, &meta, &hits).unwrap();
        let rog = reducer.reduce(&cluster(&[("g1", "g2")])).unwrap();
        assert_eq!(proteins(&rog), vec!["p2", "p3"]);
    }

    #[test]
    fn test_errors() {
        let meta = meta(&[("p1", "g1", "X"), ("p3", "g2", "W"), ("p5", "g3", "V")]);
        let mut hits = GeneHits::new();
        hits.insert("g1", "g2", "p1", "p3", 1.0);
        hits.insert("g2", "g1", "p3", "p1", 1.0);
        hits.insert("g3", "g2", "p5", "p3", 1.0);
        let c = cluster(&[("g1", "g2"), ("g2", "g3")]);

        let tree = Tree::from_newick("(X,Y);").unwrap();
        let err = TreeReducer::new(&tree, &meta, &hits).unwrap().reduce(&c).unwrap_err();
        assert_eq!(
            err,
            OgrError::SpeciesNotInTree {
                species: "W".to_string(),
                gene: "g2".to_string()
            }
        );

        let tree = Tree::from_newick("((X,W,V),Y);").unwrap();
        let err = TreeReducer::new(&tree, &meta, &hits).unwrap().reduce(&c).unwrap_err();
        assert_eq!(err, OgrError::NotBifurcating("0001".to_string()));

        let meta = self::meta(&[("p1", "g1", "X")]);
        let err = TreeReducer::new(&tree, &meta, &hits).unwrap().reduce(&c).unwrap_err();
        assert_eq!(err, OgrError::UnknownGene("g2".to_string()));

        let mut hits = GeneHits::new();
        hits.insert("g1", "g2", "p1", "p3", 1.0);
        let err = TreeReducer::new(&tree, &meta, &hits).unwrap().reduce(&c).unwrap_err();
        assert!(matches!(err, OgrError::EmptyCandidates { .. }));
    }

    #[test]
    fn test_duplicate_leaf() {
        let meta = meta(&[("p1", "g1", "X"), ("p3", "g2", "Y")]);
        let mut hits = GeneHits::new();
        hits.insert("g1", "g2", "p1", "p3", 1.0);
        hits.insert("g2", "g1", "p3", "p1", 1.0);

        // a second X leaf would emit g1 twice
        let tree = Tree::from_newick("((X:1,Y:1):1,X:1);").unwrap();
        let err = TreeReducer::new(&tree, &meta, &hits).err();
        assert_eq!(err, Some(OgrError::DuplicateLeaf("X".to_string())));

        let tree = Tree::from_newick("((X:1,Y:1):1,Z:1);").unwrap();
        let rog = TreeReducer::new(&tree, &meta, &hits)
            .unwrap()
            .reduce(&cluster(&[("g1", "g2")]))
            .unwrap();
        assert_eq!(proteins(&rog), vec!["p1", "p3"]);
    }

    #[test]
    fn test_write_reduced() {
        let reduced = vec![ReducedOg {
            og: "0003".to_string(),
            selections: vec![Selection {
                species: "X".to_string(),
                gene: "g1".to_string(),
                protein: "p1".to_string(),
            }],
        }];
        let mut buf: Vec<u8> = vec![];
        write_reduced(&mut buf, &reduced).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "OGid\tspid\tgnid\tppid\n0003\tX\tg1\tp1\n"
        );
    }
}
