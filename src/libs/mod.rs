pub mod cluster;
pub mod error;
pub mod graph;
pub mod hit;
pub mod io;
pub mod meta;
pub mod phylo;
pub mod reduce;

pub use error::OgrError;
