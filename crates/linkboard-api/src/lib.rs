//! Linkboard GraphQL API
//!
//! Exposes the link-sharing schema over async-graphql:
//!
//! - Queries: `links` (offset-paginated list with search), `votes`,
//!   `relayLinks` (cursor-based connection with per-field filters),
//!   `relayLink` (global-id node lookup)
//! - Mutations: `createLink`, `createVote`
//!
//! The schema carries an `Arc<Store>` as context data; the current user
//! is attached per request by the server's identity layer (see
//! [`context::CurrentUser`]).
//!
//! # Modules
//!
//! - `query`: Read-only resolvers
//! - `mutation`: Write resolvers with authentication gates
//! - `types`: API-facing entity types with derived fields
//! - `node`: Global object identifiers
//! - `context`: Current-user request context
//! - `error`: The user-visible error taxonomy

pub mod context;
pub mod error;
pub mod mutation;
pub mod node;
pub mod query;
pub mod types;

use std::sync::Arc;

use async_graphql::{EmptySubscription, Schema};
use linkboard_core::Store;

pub use context::CurrentUser;
pub use error::ApiError;
pub use mutation::MutationRoot;
pub use query::QueryRoot;

/// The complete GraphQL schema type for linkboard
pub type LinkboardSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the GraphQL schema with the given store
pub fn build_schema(store: Arc<Store>) -> LinkboardSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(store)
        .finish()
}

/// Export the schema in SDL form (for documentation or codegen)
pub fn schema_sdl(store: Arc<Store>) -> String {
    build_schema(store).sdl()
}
