use super::args;
use clap::*;
use ogr::libs::graph::io::write_graph;
use ogr::libs::hit::read_hits;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("graph")
        .about("Build an adjacency graph from alignment hits")
        .after_help(
            r###"
Each hit `query -> subject` becomes a directed edge weighted by its score.

Notes:
* Hits are tab-separated; comment lines starting with `#` and blank lines are skipped
* Columns are 1-based; the default layout is query, subject, score
* --blast6 reads BLAST `-outfmt 6` rows, bitscore in column 12
* A repeated query/subject pair keeps its highest score
* --max-evalue drops hits above an evalue; it needs an evalue column
* Self hits are ignored with a warning
* --policy best keeps, for each query, only the hits to its top-scoring
  subject gene(s). Ties keep every tied gene with all its proteins. Needs --meta
* --by-gene lifts the graph to genes; each gene pair scores the mean of its
  protein hits. Needs --meta
* Queries without any remaining hit are kept as nodes without neighbours

Output:
    node<TAB>neighbour:score,neighbour:score,...

Examples:
1. Protein graph from a 3-column hit table:
   ogr graph hits.tsv -o graph.tsv

2. Gene graph from BLAST output, best hits only:
   ogr graph blast.tsv --blast6 --meta meta.tsv --policy best --by-gene

3. Drop hits covering less than half of the query:
   ogr graph hits.tsv --qlen-col 4 --qaln-col 5 --min-cov 0.5

4. BLAST output, significant hits only:
   ogr graph blast.tsv --blast6 --max-evalue 1e-5

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
        .arg(args::outfile_arg())
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let infile = args.get_one::<String>("infile").unwrap();

    let format = args::hit_format(args)?;
    let meta = args::meta(args)?;
    let builder = args::graph_builder(args, meta.as_ref())?;

    //----------------------------
    // Operating
    //----------------------------
    let hits = read_hits(infile, &format)?;
    let graph = builder.build(&hits)?;

    //----------------------------
    // Output
    //----------------------------
    let mut writer = ogr::writer(args.get_one::<String>("outfile").unwrap())?;
    write_graph(&mut writer, &graph)?;

    Ok(())
}
