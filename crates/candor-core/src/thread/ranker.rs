//! Sibling ordering for thread trees.
//!
//! Ranking never touches tree structure: it returns a copy of the tree with
//! `roots` and every node's `replies` reordered under one `SortMode`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::model::{NodeIdx, ThreadTree};

/// Ordering applied to siblings at every depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// OP first, then most active subtree, then newest.
    #[default]
    Best,
    /// Most recent first.
    #[serde(alias = "new")]
    Newest,
    /// Oldest first.
    #[serde(alias = "old")]
    Oldest,
}

impl SortMode {
    /// Returns all sort modes in cycling order.
    pub fn all() -> &'static [SortMode] {
        &[SortMode::Best, SortMode::Newest, SortMode::Oldest]
    }

    /// Returns the next mode (Best → Newest → Oldest → Best).
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            SortMode::Best => SortMode::Newest,
            SortMode::Newest => SortMode::Oldest,
            SortMode::Oldest => SortMode::Best,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::Best => "best",
            SortMode::Newest => "newest",
            SortMode::Oldest => "oldest",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "best" => Ok(SortMode::Best),
            "newest" | "new" => Ok(SortMode::Newest),
            "oldest" | "old" => Ok(SortMode::Oldest),
            other => anyhow::bail!("unknown sort mode '{other}' (expected best, newest or oldest)"),
        }
    }
}

/// Computes the thread score of every node, indexed by `NodeIdx`.
///
/// A leaf scores 0. Otherwise the score is the number of direct replies plus
/// the sum of the replies' own scores, so deep and wide discussions both
/// count. Evaluated bottom-up over a pre-order walk, without recursion.
pub fn thread_scores(tree: &ThreadTree) -> Vec<u64> {
    let mut scores = vec![0_u64; tree.len()];
    for (idx, _) in tree.depth_first().into_iter().rev() {
        let node = tree.node(idx);
        let nested: u64 = node.replies.iter().map(|&child| scores[child]).sum();
        scores[idx] = node.replies.len() as u64 + nested;
    }
    scores
}

/// Thread score of a single subtree. See [`thread_scores`].
pub fn thread_score(tree: &ThreadTree, idx: NodeIdx) -> u64 {
    thread_scores(tree)[idx]
}

/// Returns a copy of `tree` with siblings sorted at every level.
///
/// All sorts are stable: siblings that compare equal keep their current
/// relative order.
pub fn rank(tree: &ThreadTree, mode: SortMode) -> ThreadTree {
    let scores = match mode {
        SortMode::Best => thread_scores(tree),
        SortMode::Newest | SortMode::Oldest => Vec::new(),
    };
    let compare = |a: &NodeIdx, b: &NodeIdx| compare_siblings(tree, &scores, mode, *a, *b);

    let mut ranked = tree.clone();
    ranked.roots.sort_by(compare);
    for node in &mut ranked.nodes {
        node.replies.sort_by(compare);
    }
    ranked
}

fn compare_siblings(
    tree: &ThreadTree,
    scores: &[u64],
    mode: SortMode,
    a: NodeIdx,
    b: NodeIdx,
) -> Ordering {
    let left = &tree.node(a).comment;
    let right = &tree.node(b).comment;
    match mode {
        SortMode::Newest => right.created_at.cmp(&left.created_at),
        SortMode::Oldest => left.created_at.cmp(&right.created_at),
        SortMode::Best => right
            .is_original_poster
            .cmp(&left.is_original_poster)
            .then_with(|| scores[b].cmp(&scores[a]))
            .then_with(|| right.created_at.cmp(&left.created_at)),
    }
}
