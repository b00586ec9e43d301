//! Thread data model.
//!
//! `Comment` is the flat record the API hands us. `ThreadTree` is the
//! engine-owned arena built from a list of comments: nodes live in a `Vec`
//! and refer to their replies by index, so there are no parent/child links
//! to keep alive.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Label shown for comments whose author label is missing.
pub const ANONYMOUS_LABEL: &str = "Anonymous";

/// Label shown for original-poster comments whose author label is missing.
pub const ORIGINAL_POSTER_LABEL: &str = "OP";

/// Opaque comment identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(String);

impl CommentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for CommentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A comment (or question response) as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    /// Parent comment; `None` marks a root-level comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CommentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_label: Option<String>,
    /// True when the author is the anonymous identity that created the
    /// feedback item or question being discussed.
    #[serde(default)]
    pub is_original_poster: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub content: String,
}

impl Comment {
    /// Returns the label to show for the author.
    ///
    /// Falls back to "OP" / "Anonymous" when the API sent no label.
    pub fn display_author(&self) -> &str {
        match self.author_label.as_deref().map(str::trim) {
            Some(label) if !label.is_empty() => label,
            _ if self.is_original_poster => ORIGINAL_POSTER_LABEL,
            _ => ANONYMOUS_LABEL,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Index of a node inside a `ThreadTree`.
pub type NodeIdx = usize;

/// One comment plus the indices of its direct replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadNode {
    pub comment: Comment,
    pub replies: Vec<NodeIdx>,
}

impl ThreadNode {
    pub(crate) fn new(comment: Comment) -> Self {
        Self {
            comment,
            replies: Vec::new(),
        }
    }

    pub fn id(&self) -> &CommentId {
        &self.comment.id
    }
}

/// Arena-backed comment tree.
///
/// Every input comment owns exactly one slot in `nodes`. `roots` lists the
/// top-level nodes in display order; each node's `replies` lists its
/// children in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadTree {
    pub(crate) nodes: Vec<ThreadNode>,
    pub(crate) roots: Vec<NodeIdx>,
    /// Last node indexed under each id (duplicates: last write wins).
    pub(crate) index: HashMap<CommentId, NodeIdx>,
}

impl ThreadTree {
    pub fn roots(&self) -> &[NodeIdx] {
        &self.roots
    }

    pub fn node(&self, idx: NodeIdx) -> &ThreadNode {
        &self.nodes[idx]
    }

    pub fn nodes(&self) -> &[ThreadNode] {
        &self.nodes
    }

    /// Looks up a node by comment id.
    pub fn find(&self, id: &CommentId) -> Option<NodeIdx> {
        self.index.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Walks the whole tree depth-first in display order.
    ///
    /// Returns `(node, depth)` pairs, roots at depth 0.
    pub fn depth_first(&self) -> Vec<(NodeIdx, usize)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(NodeIdx, usize)> =
            self.roots.iter().rev().map(|&idx| (idx, 0)).collect();

        while let Some((idx, depth)) = stack.pop() {
            out.push((idx, depth));
            for &child in self.nodes[idx].replies.iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        out
    }

    /// Converts the arena into an owned nested structure (for JSON output).
    pub fn to_nested(&self) -> Vec<NestedComment> {
        self.roots.iter().map(|&idx| self.nest(idx)).collect()
    }

    fn nest(&self, idx: NodeIdx) -> NestedComment {
        let node = &self.nodes[idx];
        NestedComment {
            comment: node.comment.clone(),
            replies: node.replies.iter().map(|&child| self.nest(child)).collect(),
        }
    }
}

/// Owned, serializable view of a subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NestedComment {
    #[serde(flatten)]
    pub comment: Comment,
    pub replies: Vec<NestedComment>,
}
