//! Thread engine facade for a single view.
//!
//! Owns the flat comment list, the ranked tree derived from it, and the
//! disclosure state. Any change to the list rebuilds and re-ranks the tree;
//! disclosure state is keyed by comment id and carries over.

use tracing::debug;

use super::builder::build_tree;
use super::disclosure::{DisclosureState, PageSizes, can_reply_at};
use super::model::{Comment, CommentId, NodeIdx, ThreadTree};
use super::ranker::{SortMode, rank};

/// A comment row in the flattened, disclosure-aware view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRow {
    pub node: NodeIdx,
    pub id: CommentId,
    /// Nesting depth (0 = root).
    pub depth: usize,
    /// Total direct replies, visible or not.
    pub reply_count: usize,
    /// Whether the replies are currently expanded.
    pub expanded: bool,
    /// False once the depth limit is reached.
    pub can_reply: bool,
}

/// One line of the flattened thread as a host view should render it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibleRow {
    Comment(CommentRow),
    /// "Show N more replies" under `parent`, rendered at `depth`.
    MoreReplies {
        parent: CommentId,
        depth: usize,
        remaining: usize,
    },
    /// "Show N more comments" after the last visible root.
    MoreRoots { remaining: usize },
}

/// Build → rank → disclose pipeline over one comment list.
#[derive(Debug, Clone)]
pub struct ThreadEngine {
    comments: Vec<Comment>,
    sort_mode: SortMode,
    tree: ThreadTree,
    disclosure: DisclosureState,
}

impl Default for ThreadEngine {
    fn default() -> Self {
        Self::new(Vec::new(), SortMode::default(), PageSizes::default())
    }
}

impl ThreadEngine {
    pub fn new(comments: Vec<Comment>, sort_mode: SortMode, page_sizes: PageSizes) -> Self {
        let mut engine = Self {
            comments,
            sort_mode,
            tree: ThreadTree::default(),
            disclosure: DisclosureState::new(page_sizes),
        };
        engine.rebuild();
        engine
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    /// Re-ranks under a new mode. Disclosure state is untouched.
    pub fn set_sort_mode(&mut self, mode: SortMode) {
        if self.sort_mode != mode {
            self.sort_mode = mode;
            self.rebuild();
        }
    }

    /// Replaces the whole comment list (e.g. after a reload).
    pub fn replace_comments(&mut self, comments: Vec<Comment>) {
        self.comments = comments;
        self.rebuild();
    }

    /// Adds a freshly posted comment and rebuilds.
    ///
    /// A comment whose id is already present (e.g. delivered by a reload that
    /// raced the post) replaces the existing record instead of duplicating it.
    pub fn append(&mut self, comment: Comment) {
        match self.comments.iter_mut().find(|c| c.id == comment.id) {
            Some(existing) => *existing = comment,
            None => self.comments.push(comment),
        }
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.tree = rank(&build_tree(&self.comments), self.sort_mode);
        debug!(
            comments = self.comments.len(),
            roots = self.tree.roots().len(),
            sort = %self.sort_mode,
            "thread rebuilt"
        );
    }

    pub fn get_ranked_tree(&self) -> &ThreadTree {
        &self.tree
    }

    pub fn disclosure(&self) -> &DisclosureState {
        &self.disclosure
    }

    pub fn comment(&self, id: &CommentId) -> Option<&Comment> {
        self.tree.find(id).map(|idx| &self.tree.node(idx).comment)
    }

    /// Depth of a comment in the current tree (roots are 0).
    pub fn depth_of(&self, id: &CommentId) -> Option<usize> {
        let target = self.tree.find(id)?;
        self.tree
            .depth_first()
            .into_iter()
            .find(|&(idx, _)| idx == target)
            .map(|(_, depth)| depth)
    }

    /// Whether the comment `id` may receive a reply.
    pub fn can_reply_to(&self, id: &CommentId) -> bool {
        self.depth_of(id).is_some_and(can_reply_at)
    }

    /// Expands or collapses the replies of `id`. Unknown ids and comments
    /// without replies are ignored.
    pub fn toggle_replies(&mut self, id: &CommentId) -> &DisclosureState {
        if self.reply_count(id) > 0 {
            self.disclosure.toggle_replies(id);
        }
        &self.disclosure
    }

    /// Reveals the next page of replies of `id`.
    pub fn show_more_replies(&mut self, id: &CommentId) -> &DisclosureState {
        let total = self.reply_count(id);
        if total > 0 {
            self.disclosure.show_more_replies(id, total);
        }
        &self.disclosure
    }

    /// Reveals the next page of root comments.
    pub fn show_more_roots(&mut self) -> &DisclosureState {
        self.disclosure.show_more_roots(self.tree.roots().len());
        &self.disclosure
    }

    /// Pages and expands every ancestor of `id` until it appears in
    /// [`Self::visible_rows`]. Returns `false` for unknown ids.
    pub fn reveal(&mut self, id: &CommentId) -> bool {
        let Some(target) = self.tree.find(id) else {
            return false;
        };

        let mut parents = vec![None; self.tree.len()];
        for (idx, node) in self.tree.nodes().iter().enumerate() {
            for &child in &node.replies {
                parents[child] = Some(idx);
            }
        }

        let mut current = target;
        while let Some(parent) = parents[current] {
            let node = self.tree.node(parent);
            let total = node.replies.len();
            let Some(position) = node.replies.iter().position(|&c| c == current) else {
                break;
            };
            let parent_id = node.comment.id.clone();
            if !self.disclosure.is_expanded(&parent_id) {
                self.disclosure.toggle_replies(&parent_id);
            }
            while self.disclosure.visible_replies(&parent_id, total) <= position {
                let before = self.disclosure.visible_replies(&parent_id, total);
                self.disclosure.show_more_replies(&parent_id, total);
                if self.disclosure.visible_replies(&parent_id, total) == before {
                    break;
                }
            }
            current = parent;
        }

        let total = self.tree.roots().len();
        if let Some(position) = self.tree.roots().iter().position(|&r| r == current) {
            while self.disclosure.visible_roots(total) <= position {
                let before = self.disclosure.visible_roots(total);
                self.disclosure.show_more_roots(total);
                if self.disclosure.visible_roots(total) == before {
                    break;
                }
            }
        }
        true
    }

    fn reply_count(&self, id: &CommentId) -> usize {
        self.tree
            .find(id)
            .map_or(0, |idx| self.tree.node(idx).replies.len())
    }

    /// Flattens the ranked tree under the current disclosure state.
    ///
    /// Comments come out depth-first in display order. An expanded comment
    /// that still hides replies is followed (after its visible replies) by a
    /// `MoreReplies` row; a trailing `MoreRoots` row is added while roots
    /// remain hidden.
    pub fn visible_rows(&self) -> Vec<VisibleRow> {
        enum Pending {
            Node(NodeIdx, usize),
            Row(VisibleRow),
        }

        let roots = self.tree.roots();
        let shown_roots = self.disclosure.visible_roots(roots.len());

        let mut rows = Vec::new();
        let mut stack: Vec<Pending> = roots[..shown_roots]
            .iter()
            .rev()
            .map(|&idx| Pending::Node(idx, 0))
            .collect();

        while let Some(pending) = stack.pop() {
            let (idx, depth) = match pending {
                Pending::Node(idx, depth) => (idx, depth),
                Pending::Row(row) => {
                    rows.push(row);
                    continue;
                }
            };

            let node = self.tree.node(idx);
            let id = node.id().clone();
            let total = node.replies.len();
            let expanded = total > 0 && self.disclosure.is_expanded(&id);

            if expanded {
                let shown = self.disclosure.visible_replies(&id, total);
                if shown < total {
                    stack.push(Pending::Row(VisibleRow::MoreReplies {
                        parent: id.clone(),
                        depth: depth + 1,
                        remaining: total - shown,
                    }));
                }
                for &child in node.replies[..shown].iter().rev() {
                    stack.push(Pending::Node(child, depth + 1));
                }
            }

            rows.push(VisibleRow::Comment(CommentRow {
                node: idx,
                id,
                depth,
                reply_count: total,
                expanded,
                can_reply: can_reply_at(depth),
            }));
        }

        if self.disclosure.has_more_roots(roots.len()) {
            rows.push(VisibleRow::MoreRoots {
                remaining: roots.len() - shown_roots,
            });
        }

        rows
    }
}
