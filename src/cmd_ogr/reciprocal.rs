use super::args;
use clap::*;
use ogr::libs::graph::io::{read_graph_file, write_graph};
use ogr::libs::graph::reciprocal;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("reciprocal")
        .about("Keep only the edges whose reverse edge exists")
        .after_help(
            r###"
An edge `a -> b` survives only when `b -> a` is also in the graph.

Notes:
* Every node of the input is kept, possibly without neighbours
* Scores are left untouched; the two directions may differ

Examples:
1. Filter a graph:
   ogr reciprocal graph.tsv -o rgraph.tsv

2. In a pipe:
   ogr graph hits.tsv | ogr reciprocal stdin

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
    let filtered = reciprocal(&graph);
    log::info!(
        "{} of {} edges are reciprocal",
        filtered.edge_count(),
        graph.edge_count()
    );

    let mut writer = ogr::writer(args.get_one::<String>("outfile").unwrap())?;
    write_graph(&mut writer, &filtered)?;

    Ok(())
}
