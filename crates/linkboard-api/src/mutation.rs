//! Write resolvers
//!
//! Both mutations are gated on an authenticated caller. Failure
//! performs no write: preconditions are checked in order, and vote
//! creation is atomic in the store, so a rejected mutation leaves the
//! dataset exactly as it was.

use async_graphql::{Context, ErrorExtensions, Object, Result, SimpleObject, ID};
use uuid::Uuid;

use crate::context::require_user;
use crate::error::{map_store_error, ApiError};
use crate::types::{store, LinkType, UserType};

/// Root mutation object
pub struct MutationRoot;

/// The created link, field by field
#[derive(SimpleObject)]
pub struct CreateLinkPayload {
    id: ID,
    url: String,
    description: String,
    posted_by: UserType,
}

/// The voting user and the link voted on
#[derive(SimpleObject)]
pub struct CreateVotePayload {
    user: UserType,
    link: LinkType,
}

#[Object]
impl MutationRoot {
    /// Post a new link, attributed to the calling user
    ///
    /// Fails with `Unauthenticated` for anonymous callers.
    async fn create_link(
        &self,
        ctx: &Context<'_>,
        url: String,
        description: String,
    ) -> Result<CreateLinkPayload> {
        let user = require_user(ctx)?.clone();
        let link = store(ctx)?
            .create_link(&url, &description, Some(user.id))
            .map_err(map_store_error)?;

        Ok(CreateLinkPayload {
            id: ID(link.id.to_string()),
            url: link.url,
            description: link.description,
            posted_by: user.into(),
        })
    }

    /// Upvote a link as the calling user
    ///
    /// Fails with `Unauthenticated` for anonymous callers, `NotFound`
    /// when the link does not exist, and `Conflict` when the caller
    /// already voted on it. Checked in that order.
    async fn create_vote(&self, ctx: &Context<'_>, link_id: ID) -> Result<CreateVotePayload> {
        let user = require_user(ctx)?.clone();
        let store = store(ctx)?;

        // An id that doesn't parse can't reference an existing link
        let link_id = Uuid::parse_str(link_id.as_str())
            .map_err(|_| ApiError::NotFound("Invalid link!").extend())?;

        store
            .create_vote(user.id, link_id)
            .map_err(map_store_error)?;
        let link = store
            .get_link(link_id)
            .map_err(map_store_error)?
            .ok_or_else(|| ApiError::NotFound("Invalid link!").extend())?;

        Ok(CreateVotePayload {
            user: user.into(),
            link: LinkType::new(link),
        })
    }
}
