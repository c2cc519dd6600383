use thiserror::Error;

use crate::TermId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No records provided")]
    EmptyInput,

    #[error("Malformed record at position {position}: {reason}")]
    MalformedRecord { position: usize, reason: String },

    #[error("No data indexed yet. Call ingest() first.")]
    NotIndexed,

    #[error("Query cannot be empty")]
    EmptyQuery,

    #[error("Invalid search parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to index records: {0}")]
    Indexing(String),

    #[error("Search failed: {0}")]
    SearchFailed(#[source] ScoringError),
}

/// Faults raised while scoring a query against the weight matrix.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    #[error("query term {term_id} is outside the matrix ({columns} columns)")]
    TermOutOfRange { term_id: TermId, columns: usize },

    #[error("non-finite score {score} for document {doc_id}")]
    NonFiniteScore { doc_id: usize, score: f64 },
}

/// Coarse error categories, one per failure class callers react to differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    NotIndexed,
    InvalidQuery,
    Indexing,
    Search,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EmptyInput | Error::MalformedRecord { .. } | Error::InvalidConfig(_) => ErrorKind::Input,
            Error::NotIndexed => ErrorKind::NotIndexed,
            Error::EmptyQuery | Error::InvalidParameter(_) => ErrorKind::InvalidQuery,
            Error::Indexing(_) => ErrorKind::Indexing,
            Error::SearchFailed(_) => ErrorKind::Search,
        }
    }
}
