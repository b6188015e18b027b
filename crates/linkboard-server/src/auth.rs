//! Request identity resolution
//!
//! Authentication happens upstream; the gateway asserts the caller's
//! identity in a request header, and this module turns that assertion
//! into a [`CurrentUser`]. The user row is provisioned on first sight
//! so foreign keys always resolve. Requests without the header are
//! anonymous, which is fine for queries and rejected by mutations.

use axum::http::HeaderMap;
use linkboard_api::CurrentUser;
use linkboard_core::{Store, StoreResult};

/// Header carrying the authenticated user name
pub const USER_HEADER: &str = "x-linkboard-user";

/// Resolve the request's current user from its headers
pub fn resolve_current_user(store: &Store, headers: &HeaderMap) -> StoreResult<CurrentUser> {
    let name = headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|name| !name.is_empty());

    match name {
        Some(name) => Ok(CurrentUser::Authenticated(store.ensure_user(name)?)),
        None => Ok(CurrentUser::Anonymous),
    }
}
