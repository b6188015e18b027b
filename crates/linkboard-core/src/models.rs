//! Data models for linkboard
//!
//! Defines the core data structures: User, Link, and Vote.
//! These are plain row types; relationships are resolved by the `Store`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user
///
/// User records are provisioned by the authentication collaborator;
/// this crate only references them, it never mutates them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Unique identifier
    pub id: Uuid,
    /// Unique display name
    pub name: String,
    /// When this user was first seen
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }

    /// Create a user with a specific ID (for loading from storage)
    pub fn with_id(id: Uuid, name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            created_at,
        }
    }
}

/// A shared link
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Link {
    /// Unique identifier
    pub id: Uuid,
    /// The URL
    pub url: String,
    /// Description (may be empty)
    pub description: String,
    /// The user who posted this link, if any
    pub posted_by: Option<Uuid>,
    /// When this link was created
    pub created_at: DateTime<Utc>,
}

impl Link {
    /// Create a new link
    pub fn new(url: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: url.into(),
            description: description.into(),
            posted_by: None,
            created_at: Utc::now(),
        }
    }

    /// Create a new link attributed to a user
    pub fn posted_by(url: impl Into<String>, description: impl Into<String>, user: Uuid) -> Self {
        Self {
            posted_by: Some(user),
            ..Self::new(url, description)
        }
    }
}

/// One user's upvote on one link
///
/// At most one vote exists per (user, link) pair. `link_id` is nullable
/// in the row model, but link deletion cascades to its votes, so a vote
/// without a link is never produced by this crate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vote {
    /// Unique identifier
    pub id: Uuid,
    /// The voting user
    pub user_id: Uuid,
    /// The link voted on
    pub link_id: Option<Uuid>,
    /// When this vote was cast
    pub created_at: DateTime<Utc>,
}

impl Vote {
    /// Create a new vote by `user` on `link`
    pub fn new(user: Uuid, link: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user,
            link_id: Some(link),
            created_at: Utc::now(),
        }
    }
}
