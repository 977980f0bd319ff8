use ontobridge_graph::GraphError;
use std::path::PathBuf;

/// Fatal failures of a reconciliation run. Anything recoverable is recorded
/// in the [`crate::RunReport`] instead.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid target IRI {iri}: {reason}")]
    InvalidIri { iri: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
