//! Storage layer
//!
//! SQLite schema management and typed storage errors.
//!
//! The database enforces the relational invariants directly:
//! foreign-key cascades delete a user's links and votes with the user,
//! and a link's votes with the link; a unique index on (user, link)
//! makes duplicate votes impossible regardless of caller interleaving.

pub mod error;
pub mod schema;

pub use error::{StoreError, StoreResult};
pub use schema::{init_schema, needs_init, SCHEMA_VERSION};
