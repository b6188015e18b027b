//! Storage error handling
//!
//! Provides typed errors for storage operations with descriptive messages.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Referenced link does not exist
    #[error("Unknown link: '{0}'")]
    UnknownLink(Uuid),

    /// Referenced user does not exist
    #[error("Unknown user: '{0}'")]
    UnknownUser(Uuid),

    /// A vote for this (user, link) pair already exists
    #[error("User '{user}' already voted on link '{link}'")]
    DuplicateVote { user: Uuid, link: Uuid },

    /// A user with this name already exists
    #[error("User name '{0}' is already taken")]
    DuplicateUser(String),

    /// SQLite database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_vote_display() {
        let user = Uuid::new_v4();
        let link = Uuid::new_v4();
        let err = StoreError::DuplicateVote { user, link };

        let msg = err.to_string();
        assert!(msg.contains("already voted"));
        assert!(msg.contains(&user.to_string()));
        assert!(msg.contains(&link.to_string()));
    }

    #[test]
    fn test_unknown_link_display() {
        let id = Uuid::new_v4();
        let err = StoreError::UnknownLink(id);
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn test_database_error_from() {
        let err: StoreError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, StoreError::Database(_)));
    }
}
