use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("hierarchy has {} roots ({}); expected exactly one", .ids.len(), .ids.join(", "))]
    MultipleRoots { ids: Vec<String> },

    #[error("duplicate node id: {id}")]
    DuplicateId { id: String },

    #[error("hierarchy has no root node")]
    NoRoot,

    #[error("node {id} references missing parent {parent}")]
    MissingParent { id: String, parent: String },

    #[error("{count} node(s) are not reachable from the root (parent cycle)")]
    Unreachable { count: usize },

    #[error("unknown node id: {id}")]
    NodeNotFound { id: String },

    #[error("no input file found (looked for {})", display_paths(.candidates))]
    MissingInputFile { candidates: Vec<PathBuf> },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
