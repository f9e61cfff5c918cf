//! Arguments shared by several subcommands.

use clap::parser::ValueSource;
use clap::*;
use ogr::libs::graph::{GraphBuilder, Policy};
use ogr::libs::hit::HitFormat;
use ogr::libs::meta::MetaTable;

/// Hit file layout, policy and metadata
pub fn hit_args() -> Vec<Arg> {
    vec![
        Arg::new("meta")
            .long("meta")
            .short('m')
            .num_args(1)
            .help("Protein metadata: ppid<TAB>gnid<TAB>spid"),
        Arg::new("policy")
            .long("policy")
            .num_args(1)
            .default_value("all")
            .value_parser(["all", "best"])
            .help("Which hits become edges"),
        Arg::new("qcol")
            .long("qcol")
            .num_args(1)
            .default_value("1")
            .value_parser(value_parser!(usize))
            .help("Column of the query id"),
        Arg::new("scol")
            .long("scol")
            .num_args(1)
            .default_value("2")
            .value_parser(value_parser!(usize))
            .help("Column of the subject id"),
        Arg::new("score-col")
            .long("score-col")
            .num_args(1)
            .default_value("3")
            .value_parser(value_parser!(usize))
            .help("Column of the score"),
        Arg::new("evalue-col")
            .long("evalue-col")
            .num_args(1)
            .value_parser(value_parser!(usize))
            .help("Column of the evalue"),
        Arg::new("max-evalue")
            .long("max-evalue")
            .num_args(1)
            .value_parser(value_parser!(f64))
            .help("Drop hits with an evalue above this. Needs --blast6 or --evalue-col"),
        Arg::new("blast6")
            .long("blast6")
            .action(ArgAction::SetTrue)
            .help("BLAST -outfmt 6 layout: evalue in column 11, bitscore in 12"),
        Arg::new("qlen-col")
            .long("qlen-col")
            .num_args(1)
            .value_parser(value_parser!(usize))
            .help("Column of the query length"),
        Arg::new("qaln-col")
            .long("qaln-col")
            .num_args(1)
            .value_parser(value_parser!(usize))
            .help("Column of the aligned query length"),
        Arg::new("min-cov")
            .long("min-cov")
            .num_args(1)
            .value_parser(value_parser!(f64))
            .help("Drop hits covering less of the query than this fraction"),
        Arg::new("header")
            .long("header")
            .action(ArgAction::SetTrue)
            .help("The first line is a header"),
        Arg::new("id-regex")
            .long("id-regex")
            .num_args(1)
            .help("Extract ids from the query/subject fields with the first capture group"),
    ]
}

fn column(args: &ArgMatches, id: &str) -> anyhow::Result<Option<usize>> {
    match args.get_one::<usize>(id) {
        None => Ok(None),
        Some(0) => Err(anyhow::anyhow!("--{}: columns are 1-based", id)),
        Some(&c) => Ok(Some(c - 1)),
    }
}

fn from_command_line(args: &ArgMatches, id: &str) -> bool {
    args.value_source(id) == Some(ValueSource::CommandLine)
}

pub fn hit_format(args: &ArgMatches) -> anyhow::Result<HitFormat> {
    let mut format = if args.get_flag("blast6") {
        HitFormat::blast6()
    } else {
        HitFormat::default()
    };

    if !args.get_flag("blast6") || from_command_line(args, "qcol") {
        format.query = column(args, "qcol")?.unwrap_or(format.query);
    }
    if !args.get_flag("blast6") || from_command_line(args, "scol") {
        format.subject = column(args, "scol")?.unwrap_or(format.subject);
    }
    if !args.get_flag("blast6") || from_command_line(args, "score-col") {
        format.score = column(args, "score-col")?.unwrap_or(format.score);
    }
    if let Some(c) = column(args, "evalue-col")? {
        format.evalue = Some(c);
    }

    format.qlen = column(args, "qlen-col")?;
    format.qaln = column(args, "qaln-col")?;
    if format.qlen.is_some() != format.qaln.is_some() {
        anyhow::bail!("--qlen-col and --qaln-col go together");
    }

    format.header = args.get_flag("header");
    if let Some(re) = args.get_one::<String>("id-regex") {
        let re = regex::Regex::new(re)?;
        if re.captures_len() < 2 {
            anyhow::bail!("--id-regex needs a capture group");
        }
        format.id_regex = Some(re);
    }

    Ok(format)
}

pub fn min_coverage(args: &ArgMatches) -> anyhow::Result<Option<f64>> {
    let cov = args.get_one::<f64>("min-cov").copied();
    if let (Some(_), None) = (cov, column(args, "qlen-col")?) {
        anyhow::bail!("--min-cov needs --qlen-col and --qaln-col");
    }
    Ok(cov)
}

pub fn max_evalue(args: &ArgMatches) -> anyhow::Result<Option<f64>> {
    let evalue = args.get_one::<f64>("max-evalue").copied();
    let has_column = args.get_flag("blast6") || column(args, "evalue-col")?.is_some();
    if evalue.is_some() && !has_column {
        anyhow::bail!("--max-evalue needs --blast6 or --evalue-col");
    }
    Ok(evalue)
}

pub fn policy(args: &ArgMatches) -> anyhow::Result<Policy> {
    args.get_one::<String>("policy").unwrap().parse()
}

pub fn meta(args: &ArgMatches) -> anyhow::Result<Option<MetaTable>> {
    match args.get_one::<String>("meta") {
        Some(infile) => Ok(Some(MetaTable::from_file(infile)?)),
        None => Ok(None),
    }
}

/// A builder set up from --policy, --min-cov, --max-evalue and --by-gene,
/// when present
pub fn graph_builder<'a>(
    args: &ArgMatches,
    meta: Option<&'a MetaTable>,
) -> anyhow::Result<GraphBuilder<'a>> {
    let by_gene = args
        .try_get_one::<bool>("by-gene")
        .ok()
        .flatten()
        .copied()
        .unwrap_or(false);

    let mut builder = GraphBuilder::new(policy(args)?)
        .min_coverage(min_coverage(args)?)
        .max_evalue(max_evalue(args)?)
        .by_gene(by_gene);
    if let Some(meta) = meta {
        builder = builder.meta(meta);
    }
    Ok(builder)
}

pub fn parallel_arg() -> Arg {
    Arg::new("parallel")
        .long("parallel")
        .short('p')
        .num_args(1)
        .default_value("1")
        .value_parser(value_parser!(usize))
        .help("Number of threads for parallel processing")
}

/// Size the global rayon pool from `--parallel`.
pub fn init_pool(args: &ArgMatches) -> anyhow::Result<()> {
    let opt_parallel = *args.get_one::<usize>("parallel").unwrap();
    rayon::ThreadPoolBuilder::new()
        .num_threads(opt_parallel)
        .build_global()?;
    Ok(())
}

pub fn outfile_arg() -> Arg {
    Arg::new("outfile")
        .long("outfile")
        .short('o')
        .num_args(1)
        .default_value("stdout")
        .help("Output filename. [stdout] for screen")
}
