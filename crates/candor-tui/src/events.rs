//! UI events consumed by the reducer.

use candor_core::api::{ApiError, ThreadSummary};
use candor_core::thread::Comment;
use candor_core::vote::VoteState;
use crossterm::event::Event;

#[derive(Debug)]
pub enum UiEvent {
    Tick,
    Frame {
        width: u16,
        height: u16,
    },
    Terminal(Event),
    /// Summary and comments fetched together.
    ThreadLoaded(Result<(ThreadSummary, Vec<Comment>), ApiError>),
    CommentPosted(Result<Comment, ApiError>),
    /// Server answer to a vote; `previous` is restored on failure.
    VoteCast {
        result: Result<VoteState, ApiError>,
        previous: VoteState,
    },
}
