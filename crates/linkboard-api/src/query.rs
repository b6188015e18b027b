//! Read-only resolvers
//!
//! Two parallel views over the link set: a plain offset-paginated list
//! with an OR search across url and description, and a relay-style
//! connection with per-field filters that compose as AND. The
//! asymmetry between the two matchers is intentional. Reads never fail
//! for structural reasons; no match means an empty result.

use async_graphql::connection::{query, Connection, Edge, OpaqueCursor};
use async_graphql::{Context, Object, Result, ID};

use crate::error::map_store_error;
use crate::node::{NodeId, NodeKind};
use crate::types::{store, LinkNode, LinkType, VoteType};

/// Root query object
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// List links in creation order
    ///
    /// `search` keeps links whose url or description contains the term
    /// (case-insensitive); `skip` then drops the first N matches and
    /// `first` takes at most N of the rest.
    async fn links(
        &self,
        ctx: &Context<'_>,
        search: Option<String>,
        first: Option<u32>,
        skip: Option<u32>,
    ) -> Result<Vec<LinkType>> {
        let links = store(ctx)?
            .list_links(
                search.as_deref(),
                skip.map(|n| n as usize),
                first.map(|n| n as usize),
            )
            .map_err(map_store_error)?;
        Ok(links.into_iter().map(LinkType::new).collect())
    }

    /// All votes, unfiltered
    async fn votes(&self, ctx: &Context<'_>) -> Result<Vec<VoteType>> {
        let votes = store(ctx)?.all_votes().map_err(map_store_error)?;
        Ok(votes.into_iter().map(VoteType::new).collect())
    }

    /// Cursor-paginated connection over links
    ///
    /// `url` and `description` filter by substring and compose as AND
    /// when both are given. Cursors are opaque positions into the
    /// filtered sequence, stable for a fixed filter.
    async fn relay_links(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
        url: Option<String>,
        description: Option<String>,
    ) -> Result<Connection<OpaqueCursor<usize>, LinkNode>> {
        let links = store(ctx)?
            .filter_links(url.as_deref(), description.as_deref())
            .map_err(map_store_error)?;

        query(
            after,
            before,
            first,
            last,
            move |after: Option<OpaqueCursor<usize>>,
                  before: Option<OpaqueCursor<usize>>,
                  first,
                  last| async move {
                let total = links.len();
                let mut start = after.map(|c| c.0 + 1).unwrap_or(0).min(total);
                let mut end = before.map(|c| c.0).unwrap_or(total).min(total);
                if start > end {
                    start = end;
                }
                if let Some(first) = first {
                    end = end.min(start.saturating_add(first));
                }
                if let Some(last) = last {
                    start = start.max(end.saturating_sub(last));
                }

                let mut connection = Connection::new(start > 0, end < total);
                connection.edges.extend(
                    links[start..end]
                        .iter()
                        .enumerate()
                        .map(|(i, link)| Edge::new(OpaqueCursor(start + i), LinkNode::new(link.clone()))),
                );
                Ok::<_, async_graphql::Error>(connection)
            },
        )
        .await
    }

    /// Look up a single node by its global identifier
    ///
    /// Malformed ids and ids of other node types resolve to null.
    async fn relay_link(&self, ctx: &Context<'_>, id: ID) -> Result<Option<LinkNode>> {
        let node = match NodeId::decode(&id) {
            Some(node) => node,
            None => return Ok(None),
        };

        match node.kind {
            NodeKind::Link => Ok(store(ctx)?
                .get_link(node.id)
                .map_err(map_store_error)?
                .map(LinkNode::new)),
            NodeKind::Vote => Ok(None),
        }
    }
}
