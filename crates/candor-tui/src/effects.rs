//! Effects returned by the reducer for the runtime to execute.
//!
//! Effects cover I/O only; the reducer never touches the network or disk.

use candor_core::thread::{CommentId, SortMode};
use candor_core::vote::{VoteDirection, VoteState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    Quit,

    /// Fetch summary and comments for the current thread.
    LoadThread,

    PostComment {
        content: String,
        parent_id: Option<CommentId>,
    },

    /// Send a vote; `previous` is the state before the optimistic update.
    CastVote {
        direction: VoteDirection,
        previous: VoteState,
    },

    /// Write `thread.default_sort` to the config file.
    PersistSort { mode: SortMode },
}
