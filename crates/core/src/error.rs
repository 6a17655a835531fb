use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("directory does not exist: {0}")]
    MissingDirectory(PathBuf),

    #[error("malformed document {path}: {details}")]
    MalformedDocument { path: PathBuf, details: String },

    #[error("title {title:?} from {path} already loaded from {existing}")]
    DuplicateTitle {
        title: String,
        path: PathBuf,
        existing: PathBuf,
    },

    #[error("path has no usable file name: {0}")]
    MissingFileName(PathBuf),
}

impl LoadError {
    pub(crate) fn malformed(path: &std::path::Path, details: impl ToString) -> Self {
        Self::MalformedDocument {
            path: path.to_path_buf(),
            details: details.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid response from {backend}: {details}")]
    BackendResponse { backend: String, details: String },

    #[error("{0} returned no text")]
    EmptyResponse(String),

    #[error("semantic search is not configured: {0}")]
    NotConfigured(String),

    #[error("no answer within {0:?}")]
    TimedOut(Duration),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotFound {
    #[error("song not found: {0}")]
    Song(String),

    #[error("chords not found for: {0}")]
    Chords(String),

    #[error("file not found: {0}")]
    File(PathBuf),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestDecodeError {
    #[error("unknown request kind: {0}")]
    UnknownKind(String),

    #[error("request {kind} is missing its payload")]
    MissingPayload { kind: String },

    #[error("invalid payload for {kind}: {payload}")]
    InvalidPayload { kind: String, payload: String },
}
