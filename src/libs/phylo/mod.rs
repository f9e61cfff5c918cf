//! Rooted species trees: an arena of nodes parsed from Newick.

pub mod error;
pub mod node;
pub mod parser;
pub mod tree;

pub use error::TreeError;
pub use node::{Node, NodeId};
pub use tree::Tree;
