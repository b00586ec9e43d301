//! Client for the feedback server.
//!
//! The thread engine never talks to the network; this module fetches the flat
//! comment list it consumes and posts comments and votes back.

mod client;
mod error;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use client::{ApiClient, NewComment, SESSION_HEADER};
pub use error::{ApiError, ApiErrorKind, ApiResult};

use crate::vote::VoteState;

/// What a discussion hangs off: a feedback item or a question.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ThreadRef {
    Feedback(String),
    Question(String),
}

impl ThreadRef {
    pub fn id(&self) -> &str {
        match self {
            ThreadRef::Feedback(id) | ThreadRef::Question(id) => id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ThreadRef::Feedback(_) => "feedback",
            ThreadRef::Question(_) => "question",
        }
    }

    /// Route of the item itself, e.g. `/api/feedback/42`.
    pub fn item_path(&self) -> String {
        match self {
            ThreadRef::Feedback(id) => format!("/api/feedback/{id}"),
            ThreadRef::Question(id) => format!("/api/questions/{id}"),
        }
    }

    /// Questions call their comments "responses".
    pub fn comments_path(&self) -> String {
        let collection = match self {
            ThreadRef::Feedback(_) => "comments",
            ThreadRef::Question(_) => "responses",
        };
        format!("{}/{collection}", self.item_path())
    }

    pub fn vote_path(&self) -> String {
        format!("{}/vote", self.item_path())
    }
}

impl fmt::Display for ThreadRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}

impl FromStr for ThreadRef {
    type Err = anyhow::Error;

    /// Parses `feedback:<id>`, `question:<id>` or a bare feedback id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (kind, id) = s.split_once(':').unwrap_or(("feedback", s));

        if id.is_empty() {
            anyhow::bail!("thread reference '{s}' has no id");
        }
        if id.contains(['/', '?', '#']) || id.chars().any(char::is_whitespace) {
            anyhow::bail!("invalid thread id '{id}'");
        }

        match kind {
            "feedback" | "f" => Ok(ThreadRef::Feedback(id.to_string())),
            "question" | "q" => Ok(ThreadRef::Question(id.to_string())),
            other => anyhow::bail!("unknown thread kind '{other}' (expected feedback or question)"),
        }
    }
}

/// Header data for a thread: the feedback item or question and its votes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadSummary {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(flatten)]
    pub votes: VoteState,
}

impl ThreadSummary {
    /// Title, or the first line of the content when there is none.
    pub fn headline(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| self.content.lines().next().unwrap_or_default())
    }
}
