//! Shared error types for the services crate.
//!
//! Every variant here is recovered at the boundary where it occurs and
//! rendered as user-visible text; none is fatal to the session.

use thiserror::Error;

use quiz_core::model::QuestionError;

/// Priming the question source failed. Surfaced as a dismissible message
/// in the setup context; the session does not start.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CorpusLoadError {
    #[error("{0}")]
    Rejected(String),

    #[error("the corpus list is empty")]
    EmptyCustomList,

    #[error("corpus request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Fetching the next question failed or its payload was malformed.
/// Surfaced in the quiz context; the score is untouched and the fetch
/// may be retried.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuestionFetchError {
    #[error("{0}")]
    Rejected(String),

    #[error("question request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("malformed question payload: {0}")]
    Malformed(#[from] QuestionError),
}
