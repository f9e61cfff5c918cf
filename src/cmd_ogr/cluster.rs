use super::args;
use clap::*;
use ogr::libs::cluster::{cluster_components, write_clusters};
use ogr::libs::graph::io::{read_components_file, read_graph_file};

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("cluster")
        .about("Cut connected components into triangle-closed clusters")
        .after_help(
            r###"
Each component's edges are split into clusters closed under triangles:
two edges sharing a node belong to the same cluster when the edge joining
their other ends exists.

Notes:
* Edges are undirected; both directions of a pair count once
* A component without any triangle gives no cluster
* In other components an edge closing no triangle forms its own cluster;
  --triangles-only drops such edges instead
* The same node may appear in several clusters
* Cluster ids are 0000, 0001, ... over the whole run, in component order
* --types writes how many components fall in each type:
    0 no cluster, 1 one cluster covering the component,
    2 one cluster covering part of it, 3 clusters sharing nodes,
    4 node-disjoint clusters

Output:
    component_id:cluster_id:a,b<TAB>c,d...

Examples:
1. Cluster a reciprocal gene graph:
   ogr cluster rgraph.tsv components.tsv -o clusters.tsv

2. With diagnostics, on 4 threads:
   ogr cluster rgraph.tsv components.tsv --types types.tsv -p 4

"###,
        )
        .arg(
            Arg::new("graph")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Adjacency file"),
        )
        .arg(
            Arg::new("components")
                .required(true)
                .num_args(1)
                .index(2)
                .help("Components file"),
        )
        .arg(
            Arg::new("triangles-only")
                .long("triangles-only")
                .action(ArgAction::SetTrue)
                .help("Drop edges that close no triangle"),
        )
        .arg(
            Arg::new("types")
                .long("types")
                .num_args(1)
                .help("Write component type counts to this file"),
        )
        .arg(args::parallel_arg())
        .arg(args::outfile_arg())
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let graph_file = args.get_one::<String>("graph").unwrap();
    let cc_file = args.get_one::<String>("components").unwrap();
    let is_triangles_only = args.get_flag("triangles-only");

    args::init_pool(args)?;

    //----------------------------
    // Operating
    //----------------------------
    let graph = read_graph_file(graph_file)?;
    let components = read_components_file(cc_file)?;

    let (clusters, summary) = cluster_components(&graph, &components, is_triangles_only);
    log::info!(
        "{} clusters from {} components",
        clusters.len(),
        components.len()
    );
    summary.log();

    //----------------------------
    // Output
    //----------------------------
    let mut writer = ogr::writer(args.get_one::<String>("outfile").unwrap())?;
    write_clusters(&mut writer, &clusters)?;

    if let Some(types) = args.get_one::<String>("types") {
        let mut writer = ogr::writer(types)?;
        summary.write(&mut writer)?;
    }

    Ok(())
}
