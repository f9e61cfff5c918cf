use super::args;
use clap::*;
use ogr::libs::cluster::{cluster_components, write_clusters};
use ogr::libs::graph::io::{write_components, write_graph};
use ogr::libs::graph::{find_components, reciprocal, GeneHits};
use ogr::libs::hit::read_hits;
use ogr::libs::phylo::Tree;
use ogr::libs::reduce::write_reduced;
use std::path::Path;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("pipeline")
        .about("Hits to clusters in one run, keeping every intermediate file")
        .after_help(
            r###"
Runs `graph`, `reciprocal`, `cc` and `cluster` in memory, and `reduce` too
when a species tree is given.

Files written to --outdir:
* graph.tsv       - adjacency graph of the hits
* reciprocal.tsv  - reciprocal edges only
* components.tsv  - connected components
* clusters.tsv    - triangle-closed clusters
* types.tsv       - component type counts
* reduced.tsv     - one protein per gene, with --tree

Nothing is written when a stage fails.

Examples:
1. Protein clusters:
   ogr pipeline hits.tsv -d out

2. Gene clusters reduced along a species tree:
   ogr pipeline blast.tsv --blast6 --meta meta.tsv --policy best --by-gene \
       --tree species.nwk -d out -p 4

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Hit file. [stdin] for standard input"),
        )
        .args(args::hit_args())
        .arg(
            Arg::new("by-gene")
                .long("by-gene")
                .action(ArgAction::SetTrue)
                .help("Build a gene graph"),
        )
        .arg(
            Arg::new("triangles-only")
                .long("triangles-only")
                .action(ArgAction::SetTrue)
                .help("Drop edges that close no triangle"),
        )
        .arg(
            Arg::new("tree")
                .long("tree")
                .short('t')
                .num_args(1)
                .help("Species tree; also reduce the clusters. Needs --by-gene"),
        )
        .arg(
            Arg::new("outdir")
                .long("outdir")
                .short('d')
                .required(true)
                .num_args(1)
                .help("Output directory"),
        )
        .arg(args::parallel_arg())
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let infile = args.get_one::<String>("infile").unwrap();
    let outdir = args.get_one::<String>("outdir").unwrap();
    let is_by_gene = args.get_flag("by-gene");
    let is_triangles_only = args.get_flag("triangles-only");

    let tree = match args.get_one::<String>("tree") {
        Some(f) if !is_by_gene => anyhow::bail!("--tree {} needs --by-gene", f),
        Some(f) => Some(Tree::from_file(f)?),
        None => None,
    };

    args::init_pool(args)?;

    let format = args::hit_format(args)?;
    let meta = args::meta(args)?;
    if tree.is_some() && meta.is_none() {
        anyhow::bail!("--tree needs --meta");
    }
    let builder = args::graph_builder(args, meta.as_ref())?;

    //----------------------------
    // Operating
    //----------------------------
    let hits = read_hits(infile, &format)?;
    let graph = builder.build(&hits)?;

    let filtered = reciprocal(&graph);
    log::info!(
        "{} of {} edges are reciprocal",
        filtered.edge_count(),
        graph.edge_count()
    );

    let components = find_components(&filtered);
    let (clusters, summary) = cluster_components(&filtered, &components, is_triangles_only);
    log::info!(
        "{} clusters from {} components",
        clusters.len(),
        components.len()
    );
    summary.log();

    let reduced = match (&tree, &meta) {
        (Some(tree), Some(meta)) => {
            let groups = builder.select(&hits)?;
            let gene_hits = GeneHits::from_hits(groups.values().flatten().copied(), meta)?;
            Some(super::reduce::reduce_clusters(&clusters, tree, meta, &gene_hits)?)
        }
        _ => None,
    };

    //----------------------------
    // Output
    //----------------------------
    std::fs::create_dir_all(outdir)?;
    let path = |name: &str| Path::new(outdir).join(name).to_string_lossy().to_string();

    write_graph(&mut ogr::writer(&path("graph.tsv"))?, &graph)?;
    write_graph(&mut ogr::writer(&path("reciprocal.tsv"))?, &filtered)?;
    write_components(&mut ogr::writer(&path("components.tsv"))?, &components)?;
    write_clusters(&mut ogr::writer(&path("clusters.tsv"))?, &clusters)?;
    summary.write(&mut ogr::writer(&path("types.tsv"))?)?;
    if let Some(reduced) = &reduced {
        write_reduced(&mut ogr::writer(&path("reduced.tsv"))?, reduced)?;
    }

    Ok(())
}
