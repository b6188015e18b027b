//! Current-user request context
//!
//! Authentication itself happens upstream; by the time a request
//! reaches the schema it carries either a concrete user or the
//! anonymous sentinel. Resolvers only ever check presence.

use async_graphql::{Context, Error, ErrorExtensions};
use linkboard_core::User;

use crate::error::ApiError;

/// The identity attached to a request by the authentication collaborator
#[derive(Debug, Clone)]
pub enum CurrentUser {
    /// A verified, logged-in user
    Authenticated(User),
    /// No identity supplied
    Anonymous,
}

impl CurrentUser {
    /// The user, if authenticated
    pub fn user(&self) -> Option<&User> {
        match self {
            CurrentUser::Authenticated(user) => Some(user),
            CurrentUser::Anonymous => None,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, CurrentUser::Anonymous)
    }
}

static ANONYMOUS: CurrentUser = CurrentUser::Anonymous;

/// Get the current user from the request context
///
/// Requests with no identity attached are treated as anonymous.
pub fn current_user<'a>(ctx: &'a Context<'_>) -> &'a CurrentUser {
    ctx.data_opt::<CurrentUser>().unwrap_or(&ANONYMOUS)
}

/// Get the authenticated user, or fail with `Unauthenticated`
pub fn require_user<'a>(ctx: &'a Context<'_>) -> Result<&'a User, Error> {
    current_user(ctx)
        .user()
        .ok_or_else(|| ApiError::Unauthenticated.extend())
}
