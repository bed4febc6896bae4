// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for the CRPT submission client.

use thiserror::Error;

/// Top-level client error.
#[derive(Debug, Error)]
pub enum Error {
    /// Non-positive window or request limit, or an unusable endpoint.
    /// Construction fails and no background task is started.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The wait for an admission unit was cancelled before a unit became
    /// available. The guarded operation was never run; retrying is safe.
    #[error("wait for admission was interrupted")]
    Interrupted,

    /// The document submitter failed; the admission unit is not refunded.
    #[error(transparent)]
    Submit(#[from] SubmitError),
}

/// Outcome of gating an arbitrary caller-supplied operation.
///
/// The operation's own error type passes through unmodified; the gate only
/// adds [`ExecuteError::Interrupted`] when admission itself was not granted.
#[derive(Debug, Error)]
pub enum ExecuteError<E> {
    /// The wait for an admission unit was cancelled; the operation was
    /// never run and no unit was consumed.
    #[error("wait for admission was interrupted")]
    Interrupted,

    /// The guarded operation ran and failed.
    #[error(transparent)]
    Operation(E),
}

impl<E> ExecuteError<E> {
    /// Extract the operation error, if any.
    pub fn into_operation_error(self) -> Option<E> {
        match self {
            Self::Interrupted => None,
            Self::Operation(e) => Some(e),
        }
    }
}

impl From<ExecuteError<SubmitError>> for Error {
    fn from(err: ExecuteError<SubmitError>) -> Self {
        match err {
            ExecuteError::Interrupted => Error::Interrupted,
            ExecuteError::Operation(e) => Error::Submit(e),
        }
    }
}

/// Document submitter failure.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The document payload could not be serialized to JSON.
    #[error("failed to serialize document payload: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The request never produced an HTTP response.
    #[error("transport error submitting document: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("document submission rejected: status {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
}
