//! Global object identifiers
//!
//! A node ID is a (type tag, local id) pair serialized as
//! base64("<Kind>:<uuid>"): deterministic, reversible, and opaque to
//! clients. Lookups decode the tag and dispatch on it; anything that
//! fails to decode is treated as referring to no node at all.

use async_graphql::ID;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use uuid::Uuid;

/// The entity type a global ID refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Link,
    Vote,
}

impl NodeKind {
    fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Link => "Link",
            NodeKind::Vote => "Vote",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Link" => Some(NodeKind::Link),
            "Vote" => Some(NodeKind::Vote),
            _ => None,
        }
    }
}

/// A decoded global object identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId {
    pub kind: NodeKind,
    pub id: Uuid,
}

impl NodeId {
    pub fn link(id: Uuid) -> Self {
        Self {
            kind: NodeKind::Link,
            id,
        }
    }

    pub fn vote(id: Uuid) -> Self {
        Self {
            kind: NodeKind::Vote,
            id,
        }
    }

    /// Encode as an opaque GraphQL ID
    pub fn to_id(&self) -> ID {
        ID(STANDARD.encode(format!("{}:{}", self.kind.as_str(), self.id)))
    }

    /// Decode an opaque GraphQL ID
    ///
    /// Returns `None` for unknown tags or malformed input; callers
    /// surface that as an absent node, not an error.
    pub fn decode(id: &ID) -> Option<Self> {
        let bytes = STANDARD.decode(id.as_str()).ok()?;
        let decoded = String::from_utf8(bytes).ok()?;
        let (tag, raw) = decoded.split_once(':')?;
        Some(Self {
            kind: NodeKind::from_tag(tag)?,
            id: Uuid::parse_str(raw).ok()?,
        })
    }
}
