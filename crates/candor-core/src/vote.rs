//! Upvote/downvote state for feedback items and questions.
//!
//! Votes follow toggle-and-switch rules: voting the same way twice removes
//! the vote, voting the other way moves it. The client applies these rules
//! optimistically and replaces its state with the server's answer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            VoteDirection::Up => "up",
            VoteDirection::Down => "down",
        }
    }
}

impl fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteDirection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "+" | "upvote" => Ok(VoteDirection::Up),
            "down" | "-" | "downvote" => Ok(VoteDirection::Down),
            other => anyhow::bail!("unknown vote direction '{other}' (expected up or down)"),
        }
    }
}

/// Vote tally plus the current session's own vote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteState {
    #[serde(default)]
    pub upvotes: u64,
    #[serde(default)]
    pub downvotes: u64,
    #[serde(default)]
    pub my_vote: Option<VoteDirection>,
}

impl VoteState {
    /// Net score (upvotes minus downvotes).
    pub fn score(&self) -> i64 {
        self.upvotes as i64 - self.downvotes as i64
    }

    /// Applies a vote request and returns the resulting own vote.
    ///
    /// - no prior vote: add it
    /// - same direction: remove it
    /// - opposite direction: switch it
    pub fn apply(&mut self, requested: VoteDirection) -> Option<VoteDirection> {
        let next = if self.my_vote == Some(requested) {
            None
        } else {
            Some(requested)
        };

        if let Some(previous) = self.my_vote {
            let counter = self.counter(previous);
            *counter = counter.saturating_sub(1);
        }
        if let Some(direction) = next {
            *self.counter(direction) += 1;
        }

        self.my_vote = next;
        next
    }

    fn counter(&mut self, direction: VoteDirection) -> &mut u64 {
        match direction {
            VoteDirection::Up => &mut self.upvotes,
            VoteDirection::Down => &mut self.downvotes,
        }
    }
}
