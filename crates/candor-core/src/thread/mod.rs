//! Discussion-thread engine.
//!
//! - `builder`: flat comment list → arena tree (orphans become roots)
//! - `ranker`: per-level sibling ordering (`best`, `newest`, `oldest`)
//! - `disclosure`: paged reveal of roots and replies, reply depth limit
//! - `engine`: the three wired together for one view

mod builder;
mod disclosure;
mod engine;
mod model;
mod ranker;

pub use builder::build_tree;
pub use disclosure::{
    DEFAULT_REPLY_PAGE_SIZE, DEFAULT_ROOT_PAGE_SIZE, DisclosureState, MAX_DEPTH, NodeDisclosure,
    PageSizes, can_reply_at,
};
pub use engine::{CommentRow, ThreadEngine, VisibleRow};
pub use model::{Comment, CommentId, NestedComment, NodeIdx, ThreadNode, ThreadTree};
pub use ranker::{SortMode, rank, thread_score, thread_scores};

/// Builds and ranks `comments` in one step.
pub fn get_ranked_tree(comments: &[Comment], sort_mode: SortMode) -> ThreadTree {
    rank(&build_tree(comments), sort_mode)
}
