use super::args;
use clap::*;
use ogr::libs::graph::find_components;
use ogr::libs::graph::io::{read_graph_file, write_components};

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("cc")
        .about("Connected components of an adjacency graph")
        .after_help(
            r###"
Edges are followed in both directions.

Notes:
* Components are numbered 0000, 0001, ... in order of discovery
* Discovery follows the order of the nodes in the input
* Every node lands in exactly one component; isolated nodes form their own

Output:
    component_id:node,node,...

Examples:
1. Components of the reciprocal graph:
   ogr cc rgraph.tsv -o components.tsv

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Adjacency file. [stdin] for standard input"),
        )
        .arg(args::outfile_arg())
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let infile = args.get_one::<String>("infile").unwrap();

    let graph = read_graph_file(infile)?;
    let components = find_components(&graph);
    log::info!("{} components", components.len());

    let mut writer = ogr::writer(args.get_one::<String>("outfile").unwrap())?;
    write_components(&mut writer, &components)?;

    Ok(())
}
