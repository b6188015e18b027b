//! User-visible API errors
//!
//! Three failure modes are surfaced to clients, each with a
//! machine-readable `code` extension: a write without an authenticated
//! user, a reference to a missing entity, and a violated uniqueness
//! invariant. Queries never produce these; absence of matches is an
//! empty result.

use async_graphql::{Error, ErrorExtensions};
use linkboard_core::StoreError;
use thiserror::Error as ThisError;

/// Errors surfaced to API callers
#[derive(Debug, ThisError)]
pub enum ApiError {
    /// Caller is anonymous but the operation requires a user
    #[error("You must be logged in!")]
    Unauthenticated,

    /// Referenced entity does not exist
    #[error("{0}")]
    NotFound(&'static str),

    /// Uniqueness invariant violated
    #[error("{0}")]
    Conflict(&'static str),
}

impl ApiError {
    /// The machine-readable code attached to the error extensions
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated => "UNAUTHENTICATED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
        }
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> Error {
        Error::new(self.to_string()).extend_with(|_, e| e.set("code", self.code()))
    }
}

/// Map a storage error to the API taxonomy
///
/// Domain failures keep their taxonomy code; anything else propagates
/// opaquely as INTERNAL, never retried.
pub(crate) fn map_store_error(err: StoreError) -> Error {
    match err {
        StoreError::UnknownLink(_) => ApiError::NotFound("Invalid link!").extend(),
        StoreError::DuplicateVote { .. } => ApiError::Conflict("User already voted!").extend(),
        other => {
            Error::new(other.to_string()).extend_with(|_, e| e.set("code", "INTERNAL"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_codes() {
        assert_eq!(ApiError::Unauthenticated.code(), "UNAUTHENTICATED");
        assert_eq!(ApiError::NotFound("Invalid link!").code(), "NOT_FOUND");
        assert_eq!(ApiError::Conflict("User already voted!").code(), "CONFLICT");
    }

    #[test]
    fn test_store_error_mapping() {
        let err = map_store_error(StoreError::UnknownLink(Uuid::new_v4()));
        assert_eq!(err.message, "Invalid link!");

        let err = map_store_error(StoreError::DuplicateVote {
            user: Uuid::new_v4(),
            link: Uuid::new_v4(),
        });
        assert_eq!(err.message, "User already voted!");
    }

    #[test]
    fn test_unauthenticated_message() {
        let err = ApiError::Unauthenticated.extend();
        assert_eq!(err.message, "You must be logged in!");
    }
}
