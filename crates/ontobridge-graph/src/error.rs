use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Parse error in {location}: {message}")]
    Parse { location: String, message: String },
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("ontology {0} has no location to save to")]
    NoLocation(String),
    #[error("unknown resource: {0}")]
    UnknownResource(String),
    #[error("resource name {name} already exists in {ontology}")]
    DuplicateName { name: String, ontology: String },
    #[error("{iri} is not a {expected}")]
    WrongKind { iri: String, expected: &'static str },
    #[error("cannot load {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: Box<GraphError>,
    },
}

pub type Result<T> = std::result::Result<T, GraphError>;
