use std::path::PathBuf;

use thiserror::Error;

use super::model::EntityKind;

// ---------------------------------------------------------------------------
// Loader failures
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("dataset source not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("unsupported dataset format: .{extension}")]
    UnsupportedFormat { extension: String },

    #[error("{} contains no organism rows", path.display())]
    EmptyMatrix { path: PathBuf },
}

impl LoadError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            LoadError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            LoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    pub(crate) fn parse(path: &std::path::Path, message: impl ToString) -> Self {
        LoadError::Parse {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }

    /// Stable tag for a transport layer.
    pub fn reason(&self) -> &'static str {
        match self {
            LoadError::NotFound { .. } | LoadError::Io { .. } => "source_unavailable",
            LoadError::Parse { .. }
            | LoadError::UnsupportedFormat { .. }
            | LoadError::EmptyMatrix { .. } => "parse_error",
        }
    }
}

// ---------------------------------------------------------------------------
// Query failures
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum QueryError {
    /// No snapshot is published; `cause` is the failure of the last load
    /// attempt when one was made.
    #[error("dataset is not loaded")]
    DataNotLoaded {
        #[source]
        cause: Option<Box<LoadError>>,
    },

    #[error("no {kind} record matches \"{name}\"")]
    NotFound { kind: EntityKind, name: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Load(#[from] LoadError),
}

impl QueryError {
    pub(crate) fn not_found(kind: EntityKind, name: impl Into<String>) -> Self {
        QueryError::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Stable tag for a transport layer to map onto status codes.
    pub fn reason(&self) -> &'static str {
        match self {
            QueryError::DataNotLoaded { .. } => "data_not_loaded",
            QueryError::NotFound { .. } => "not_found",
            QueryError::InvalidInput(_) => "invalid_input",
            QueryError::Load(e) => e.reason(),
        }
    }
}
