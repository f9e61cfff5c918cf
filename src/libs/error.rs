use thiserror::Error;

/// Failures of the clustering and reduction pipeline.
///
/// Missing reverse edges and missing pairwise scores are expected and never
/// reach this type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OgrError {
    #[error("malformed row at line {line}: {reason}\n    {row}")]
    MalformedRow {
        line: usize,
        row: String,
        reason: String,
    },

    #[error("protein {0} not found in the metadata table")]
    UnknownProtein(String),

    #[error("gene {0} not found in the metadata table")]
    UnknownGene(String),

    #[error("conflicting metadata for protein {ppid}: {first} vs {second}")]
    ConflictingMeta {
        ppid: String,
        first: String,
        second: String,
    },

    #[error("species {species} of gene {gene} is not a leaf of the species tree")]
    SpeciesNotInTree { species: String, gene: String },

    #[error("gene {gene} of OG {og} has no candidate protein")]
    EmptyCandidates { og: String, gene: String },

    #[error("species tree pruned for OG {0} is not bifurcating")]
    NotBifurcating(String),

    #[error("leaf {0} appears more than once in the species tree")]
    DuplicateLeaf(String),
}

impl OgrError {
    pub fn malformed(line: usize, row: &str, reason: impl Into<String>) -> Self {
        OgrError::MalformedRow {
            line,
            row: row.to_string(),
            reason: reason.into(),
        }
    }
}
