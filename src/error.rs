use thiserror::Error;

/// Failure of a single GET against one candidate URL.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("empty body from {url}")]
    EmptyBody { url: String },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("fetch milestone index: {0}")]
    Fetch(#[from] FetchError),

    #[error("parse milestone index {url}: {message}")]
    Parse { url: String, message: String },

    #[error("milestone index {url} lists no milestones")]
    Empty { url: String },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JourneyError {
    #[error("could not load {url} after {attempts} attempt(s)")]
    Exhausted { url: String, attempts: usize },

    #[error(transparent)]
    Index(#[from] IndexError),
}
