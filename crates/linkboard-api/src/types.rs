//! API-facing entity types
//!
//! Thin wrappers over the stored rows. A link's `votes` and `voteCount`
//! are derived fields, recomputed from the store on every resolution;
//! nothing here is cached.

use std::sync::Arc;

use async_graphql::{Context, Error, Object, Result, SimpleObject, ID};
use linkboard_core::{Link, Store, User, Vote};
use uuid::Uuid;

use crate::error::map_store_error;
use crate::node::NodeId;

pub(crate) fn store<'a>(ctx: &'a Context<'_>) -> Result<&'a Arc<Store>> {
    ctx.data::<Arc<Store>>()
}

/// A registered user
#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "User")]
pub struct UserType {
    pub id: ID,
    pub name: String,
}

impl From<User> for UserType {
    fn from(user: User) -> Self {
        Self {
            id: ID(user.id.to_string()),
            name: user.name,
        }
    }
}

/// A shared link
pub struct LinkType {
    link: Link,
}

impl LinkType {
    pub fn new(link: Link) -> Self {
        Self { link }
    }
}

#[Object(name = "Link")]
impl LinkType {
    async fn id(&self) -> ID {
        ID(self.link.id.to_string())
    }

    async fn url(&self) -> &str {
        &self.link.url
    }

    async fn description(&self) -> &str {
        &self.link.description
    }

    /// The user who posted this link, if it has an attributed author
    async fn posted_by(&self, ctx: &Context<'_>) -> Result<Option<UserType>> {
        resolve_posted_by(ctx, self.link.posted_by)
    }

    /// All votes cast on this link
    async fn votes(&self, ctx: &Context<'_>) -> Result<Vec<VoteType>> {
        resolve_votes(ctx, self.link.id)
    }

    /// Number of votes cast on this link
    async fn vote_count(&self, ctx: &Context<'_>) -> Result<i64> {
        resolve_vote_count(ctx, self.link.id)
    }
}

/// One user's upvote on one link
pub struct VoteType {
    vote: Vote,
}

impl VoteType {
    pub fn new(vote: Vote) -> Self {
        Self { vote }
    }
}

#[Object(name = "Vote")]
impl VoteType {
    async fn id(&self) -> ID {
        ID(self.vote.id.to_string())
    }

    /// The voting user
    async fn user(&self, ctx: &Context<'_>) -> Result<UserType> {
        store(ctx)?
            .get_user(self.vote.user_id)
            .map_err(map_store_error)?
            .map(UserType::from)
            .ok_or_else(|| Error::new("Vote refers to a missing user"))
    }

    /// The link voted on
    async fn link(&self, ctx: &Context<'_>) -> Result<Option<LinkType>> {
        match self.vote.link_id {
            Some(id) => Ok(store(ctx)?
                .get_link(id)
                .map_err(map_store_error)?
                .map(LinkType::new)),
            None => Ok(None),
        }
    }
}

/// A link exposed through the relay connection, carrying a global ID
pub struct LinkNode {
    link: Link,
}

impl LinkNode {
    pub fn new(link: Link) -> Self {
        Self { link }
    }
}

#[Object]
impl LinkNode {
    /// Globally unique identifier, reversible to (type, local id)
    async fn id(&self) -> ID {
        NodeId::link(self.link.id).to_id()
    }

    async fn url(&self) -> &str {
        &self.link.url
    }

    async fn description(&self) -> &str {
        &self.link.description
    }

    /// The user who posted this link, if it has an attributed author
    async fn posted_by(&self, ctx: &Context<'_>) -> Result<Option<UserType>> {
        resolve_posted_by(ctx, self.link.posted_by)
    }

    /// All votes cast on this link
    async fn votes(&self, ctx: &Context<'_>) -> Result<Vec<VoteType>> {
        resolve_votes(ctx, self.link.id)
    }

    /// Number of votes cast on this link
    async fn vote_count(&self, ctx: &Context<'_>) -> Result<i64> {
        resolve_vote_count(ctx, self.link.id)
    }
}

// Derived-field resolution shared by LinkType and LinkNode

fn resolve_posted_by(ctx: &Context<'_>, posted_by: Option<Uuid>) -> Result<Option<UserType>> {
    match posted_by {
        Some(id) => Ok(store(ctx)?
            .get_user(id)
            .map_err(map_store_error)?
            .map(UserType::from)),
        None => Ok(None),
    }
}

fn resolve_votes(ctx: &Context<'_>, link: Uuid) -> Result<Vec<VoteType>> {
    Ok(store(ctx)?
        .votes_for_link(link)
        .map_err(map_store_error)?
        .into_iter()
        .map(VoteType::new)
        .collect())
}

fn resolve_vote_count(ctx: &Context<'_>, link: Uuid) -> Result<i64> {
    store(ctx)?.vote_count(link).map_err(map_store_error)
}
