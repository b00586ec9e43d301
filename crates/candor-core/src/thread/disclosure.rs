//! Progressive reveal of a comment tree.
//!
//! Tracks how many root comments are visible and, per comment, whether its
//! replies are expanded and how many of them are shown. State is keyed by
//! comment id so it survives tree rebuilds; it is never persisted.
//!
//! Per-node lifecycle:
//!
//! ```text
//! Collapsed ──toggle/show more──▶ Expanded(N_reply)
//! Expanded(n) ──show more──▶ Expanded(min(n + N_reply, total))
//! Expanded(n) ──toggle──▶ Collapsed (n remembered)
//! Collapsed (n remembered) ──toggle──▶ Expanded(n)
//! ```

use std::collections::HashMap;

use super::model::CommentId;

/// Replies are allowed at depths `0..MAX_DEPTH`.
pub const MAX_DEPTH: usize = 6;

/// Root comments revealed per "show more" step.
pub const DEFAULT_ROOT_PAGE_SIZE: usize = 3;

/// Replies revealed per "show more replies" step.
pub const DEFAULT_REPLY_PAGE_SIZE: usize = 2;

/// Returns whether a comment at `depth` (roots are depth 0) may be replied to.
///
/// This gates the reply affordance only. Deeper comments that already exist
/// still render.
pub fn can_reply_at(depth: usize) -> bool {
    depth < MAX_DEPTH
}

/// Page sizes for root and reply disclosure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSizes {
    pub roots: usize,
    pub replies: usize,
}

impl PageSizes {
    /// Creates page sizes; zero is bumped to one so paging always advances.
    pub fn new(roots: usize, replies: usize) -> Self {
        Self {
            roots: roots.max(1),
            replies: replies.max(1),
        }
    }
}

impl Default for PageSizes {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_PAGE_SIZE, DEFAULT_REPLY_PAGE_SIZE)
    }
}

/// Disclosure record for one comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeDisclosure {
    pub expanded: bool,
    pub visible_reply_count: usize,
}

/// Disclosure state for one thread view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisclosureState {
    page_sizes: PageSizes,
    visible_root_count: usize,
    nodes: HashMap<CommentId, NodeDisclosure>,
}

impl Default for DisclosureState {
    fn default() -> Self {
        Self::new(PageSizes::default())
    }
}

impl DisclosureState {
    pub fn new(page_sizes: PageSizes) -> Self {
        Self {
            page_sizes,
            visible_root_count: page_sizes.roots,
            nodes: HashMap::new(),
        }
    }

    pub fn page_sizes(&self) -> PageSizes {
        self.page_sizes
    }

    /// Raw root budget (may exceed the number of roots).
    pub fn visible_root_count(&self) -> usize {
        self.visible_root_count
    }

    /// Number of roots to show out of `total`.
    pub fn visible_roots(&self, total: usize) -> usize {
        self.visible_root_count.min(total)
    }

    /// Whether a "show more" control for roots should be offered.
    pub fn has_more_roots(&self, total: usize) -> bool {
        self.visible_root_count < total
    }

    /// Reveals the next page of roots, capped at `total`.
    pub fn show_more_roots(&mut self, total: usize) {
        let next = (self.visible_root_count + self.page_sizes.roots).min(total);
        self.visible_root_count = self.visible_root_count.max(next);
    }

    pub fn node(&self, id: &CommentId) -> Option<&NodeDisclosure> {
        self.nodes.get(id)
    }

    pub fn is_expanded(&self, id: &CommentId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.expanded)
    }

    /// Number of replies to show for a node with `total` replies.
    pub fn visible_replies(&self, id: &CommentId, total: usize) -> usize {
        match self.nodes.get(id) {
            Some(node) if node.expanded => node.visible_reply_count.min(total),
            _ => 0,
        }
    }

    /// Whether an expanded node still hides some of its `total` replies.
    pub fn has_more_replies(&self, id: &CommentId, total: usize) -> bool {
        self.is_expanded(id) && self.visible_replies(id, total) < total
    }

    /// Flips a node between collapsed and expanded.
    ///
    /// The first expansion shows one page; later expansions resume at the
    /// count the node had when it was collapsed.
    pub fn toggle_replies(&mut self, id: &CommentId) -> NodeDisclosure {
        let page = self.page_sizes.replies;
        let node = self.nodes.entry(id.clone()).or_insert(NodeDisclosure {
            expanded: false,
            visible_reply_count: page,
        });
        node.expanded = !node.expanded;
        *node
    }

    /// Reveals the next page of replies, capped at `total`.
    ///
    /// A collapsed node is expanded instead (same as [`Self::toggle_replies`]).
    pub fn show_more_replies(&mut self, id: &CommentId, total: usize) -> NodeDisclosure {
        let page = self.page_sizes.replies;
        let node = self.nodes.entry(id.clone()).or_insert(NodeDisclosure {
            expanded: false,
            visible_reply_count: page,
        });
        if node.expanded {
            let next = (node.visible_reply_count + page).min(total);
            node.visible_reply_count = node.visible_reply_count.max(next);
        } else {
            node.expanded = true;
        }
        *node
    }
}
