use super::args;
use clap::*;
use ogr::libs::cluster::{read_clusters_file, Cluster};
use ogr::libs::graph::GeneHits;
use ogr::libs::hit::read_hits;
use ogr::libs::meta::MetaTable;
use ogr::libs::phylo::Tree;
use ogr::libs::reduce::{write_reduced, ReducedOg, TreeReducer};

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("reduce")
        .about("Pick one representative protein per gene in each cluster")
        .after_help(
            r###"
The clusters must come from a gene graph (`ogr graph --by-gene`). The hits
give the protein-level scores behind each gene pair.

Notes:
* The species tree is pruned to the species of each cluster and walked
  from the root:
    * two sibling leaves: the protein combination with the highest sum of
      scores between both species wins
    * a leaf next to a subtree: the subtree is reduced first, then the
      leaf's proteins are scored against it, each pair weighted by
      (dist_a + dist_b) / D, where D sums the leaf distances under the node
      plus (leaves - 2) times the leaf's own distance
    * two subtrees: their selections are joined
* Ties keep the first combination: genes and proteins in sorted order, the
  last gene varying fastest
* Candidate proteins of a gene are those with a hit to one of its partners
  in the cluster. A gene without candidates is an error
* Every gene's species must be a leaf of the tree, and leaf names must be
  unique
* Use the same --policy and column options as for `ogr graph`

Output:
    OGid<TAB>spid<TAB>gnid<TAB>ppid

Examples:
1. Reduce gene clusters:
   ogr reduce clusters.tsv hits.tsv --meta meta.tsv --tree species.nwk

2. From BLAST output, best hits only, on 8 threads:
   ogr reduce clusters.tsv blast.tsv --blast6 --policy best \
       --meta meta.tsv --tree species.nwk -p 8 -o reduced.tsv

"###,
        )
        .arg(
            Arg::new("clusters")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Clusters file"),
        )
        .arg(
            Arg::new("hits")
                .required(true)
                .num_args(1)
                .index(2)
                .help("Hit file"),
        )
        .arg(
            Arg::new("tree")
                .long("tree")
                .short('t')
                .required(true)
                .num_args(1)
                .help("Rooted, bifurcating species tree in Newick"),
        )
        .args(args::hit_args())
        .arg(args::parallel_arg())
        .arg(args::outfile_arg())
}

/// Protein-level hits behind the gene graph, selected as `ogr graph` does
pub fn gene_hits(args: &ArgMatches, infile: &str, meta: &MetaTable) -> anyhow::Result<GeneHits> {
    let format = args::hit_format(args)?;
    let builder = args::graph_builder(args, Some(meta))?;

    let hits = read_hits(infile, &format)?;
    let groups = builder.select(&hits)?;
    let gene_hits = GeneHits::from_hits(groups.values().flatten().copied(), meta)?;
    Ok(gene_hits)
}

/// Shared with `pipeline`
pub fn reduce_clusters(
    clusters: &[Cluster],
    tree: &Tree,
    meta: &MetaTable,
    hits: &GeneHits,
) -> anyhow::Result<Vec<ReducedOg>> {
    let reducer = TreeReducer::new(tree, meta, hits)?;
    let reduced = reducer.reduce_all(clusters)?;
    log::info!(
        "{} clusters reduced to {} proteins",
        reduced.len(),
        reduced.iter().map(|r| r.selections.len()).sum::<usize>()
    );
    Ok(reduced)
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let clusters_file = args.get_one::<String>("clusters").unwrap();
    let hits_file = args.get_one::<String>("hits").unwrap();
    let tree_file = args.get_one::<String>("tree").unwrap();

    args::init_pool(args)?;

    //----------------------------
    // Loading
    //----------------------------
    let meta = args::meta(args)?.ok_or_else(|| anyhow::anyhow!("reduce needs --meta"))?;
    let tree = Tree::from_file(tree_file)?;
    let clusters = read_clusters_file(clusters_file)?;
    let hits = gene_hits(args, hits_file, &meta)?;

    //----------------------------
    // Operating
    //----------------------------
    let reduced = reduce_clusters(&clusters, &tree, &meta, &hits)?;

    //----------------------------
    // Output
    //----------------------------
    let mut writer = ogr::writer(args.get_one::<String>("outfile").unwrap())?;
    write_reduced(&mut writer, &reduced)?;

    Ok(())
}
