//! Linkboard Core Library
//!
//! This crate provides the storage layer for linkboard, a small
//! link-sharing service: users post links, other users upvote them.
//!
//! # Architecture
//!
//! - **SQLite**: single source of truth, with foreign-key cascades
//!   enforcing the relationships between users, links, and votes
//!
//! All queries are served directly from the database; derived values
//! such as vote counts are computed per query, never cached.
//!
//! # Quick Start
//!
//! ```text
//! let store = Store::open_in_memory()?;
//!
//! // Add a link
//! let user = store.ensure_user("alice")?;
//! let link = store.create_link("https://example.com", "an example", Some(user.id))?;
//!
//! // Query links
//! let links = store.list_links(Some("example"), None, None)?;
//! ```
//!
//! # Modules
//!
//! - `store`: Unified storage interface (main entry point)
//! - `models`: Data structures for users, links, and votes
//! - `storage`: SQLite schema and typed storage errors
//! - `config`: Application configuration

pub mod config;
pub mod models;
pub mod storage;
pub mod store;

pub use config::Config;
pub use models::{Link, User, Vote};
pub use storage::{StoreError, StoreResult};
pub use store::Store;
