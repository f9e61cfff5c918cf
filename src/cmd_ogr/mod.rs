//! Subcommand modules for the `ogr` binary.

pub mod args;
pub mod cc;
pub mod cluster;
pub mod graph;
pub mod pipeline;
pub mod reciprocal;
pub mod reduce;
