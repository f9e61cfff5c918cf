extern crate clap;
use clap::*;

mod cmd_ogr;

fn main() -> anyhow::Result<()> {
    let app = Command::new("ogr")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`ogr` - Orthologous Group Refiner")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("Raise the log level: -v info, -vv debug"),
        )
        .subcommand(cmd_ogr::graph::make_subcommand())
        .subcommand(cmd_ogr::reciprocal::make_subcommand())
        .subcommand(cmd_ogr::cc::make_subcommand())
        .subcommand(cmd_ogr::cluster::make_subcommand())
        .subcommand(cmd_ogr::reduce::make_subcommand())
        .subcommand(cmd_ogr::pipeline::make_subcommand())
        .after_help(
            r###"Subcommands, in pipeline order:

* graph      - Alignment hits to an adjacency graph
* reciprocal - Keep reciprocal edges only
* cc         - Connected components
* cluster    - Triangle-closed clusters (orthologous groups)
* reduce     - One representative protein per gene along a species tree

* pipeline   - graph, reciprocal, cc and cluster in one go, reduce with --tree

Logging goes to stderr; RUST_LOG overrides -v.

"###,
        );

    let matches = app.get_matches();

    let level = match matches.get_count("verbose") {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();

    match matches.subcommand() {
        Some(("graph", sub_matches)) => cmd_ogr::graph::execute(sub_matches),
        Some(("reciprocal", sub_matches)) => cmd_ogr::reciprocal::execute(sub_matches),
        Some(("cc", sub_matches)) => cmd_ogr::cc::execute(sub_matches),
        Some(("cluster", sub_matches)) => cmd_ogr::cluster::execute(sub_matches),
        Some(("reduce", sub_matches)) => cmd_ogr::reduce::execute(sub_matches),
        Some(("pipeline", sub_matches)) => cmd_ogr::pipeline::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}
