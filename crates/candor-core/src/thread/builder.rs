//! Thread tree construction.
//!
//! Transforms a flat list of `Comment`s into a `ThreadTree` arena.
//!
//! ## Design
//!
//! - **Source of truth**: the flat `Vec<Comment>` stays canonical; the tree is
//!   rebuilt from scratch whenever it changes
//! - **Orphan handling**: comments whose parent is unknown appear at root level
//! - **Duplicates**: every record gets its own node; the id index is
//!   last-write-wins, so replies attach to the last record with that id
//! - **Cycles**: nodes unreachable from any root after linking are detached
//!   from their parent and promoted to roots, in input order

use std::collections::HashMap;

use tracing::debug;

use super::model::{Comment, CommentId, NodeIdx, ThreadNode, ThreadTree};

/// Builds a tree from an unordered list of comments.
///
/// Reply lists keep input order; use [`super::rank`] to sort them.
///
/// # Example
///
/// Given comments:
/// - A (root)
/// - B (reply to A)
/// - C (reply to X, which does not exist)
/// - D (reply to B)
///
/// Roots: A, C. A's replies: B. B's replies: D.
pub fn build_tree(comments: &[Comment]) -> ThreadTree {
    let mut nodes: Vec<ThreadNode> = comments.iter().cloned().map(ThreadNode::new).collect();

    let mut index: HashMap<CommentId, NodeIdx> = HashMap::with_capacity(nodes.len());
    for (idx, node) in nodes.iter().enumerate() {
        index.insert(node.comment.id.clone(), idx);
    }

    let mut parent_of: Vec<Option<NodeIdx>> = vec![None; nodes.len()];
    let mut roots: Vec<NodeIdx> = Vec::new();

    for idx in 0..nodes.len() {
        let parent = nodes[idx]
            .comment
            .parent_id
            .as_ref()
            .and_then(|parent_id| index.get(parent_id))
            .copied();

        match parent {
            Some(parent_idx) => {
                nodes[parent_idx].replies.push(idx);
                parent_of[idx] = Some(parent_idx);
            }
            None => {
                if let Some(parent_id) = &nodes[idx].comment.parent_id {
                    debug!(comment = %nodes[idx].comment.id, parent = %parent_id, "orphaned comment placed at root");
                }
                roots.push(idx);
            }
        }
    }

    let mut reached = vec![false; nodes.len()];
    for &root in &roots {
        mark_reachable(&nodes, root, &mut reached);
    }

    // Anything still unreached sits on a parent cycle.
    for idx in 0..nodes.len() {
        if reached[idx] {
            continue;
        }
        if let Some(parent_idx) = parent_of[idx].take() {
            nodes[parent_idx].replies.retain(|&child| child != idx);
        }
        debug!(comment = %nodes[idx].comment.id, "parent cycle broken, comment promoted to root");
        roots.push(idx);
        mark_reachable(&nodes, idx, &mut reached);
    }

    ThreadTree {
        nodes,
        roots,
        index,
    }
}

fn mark_reachable(nodes: &[ThreadNode], start: NodeIdx, reached: &mut [bool]) {
    let mut stack = vec![start];
    while let Some(idx) = stack.pop() {
        if reached[idx] {
            continue;
        }
        reached[idx] = true;
        stack.extend(nodes[idx].replies.iter().copied());
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::{DateTime, Utc};

    use super::*;

    fn make_comment(id: &str, parent: Option<&str>) -> Comment {
        Comment {
            id: id.into(),
            parent_id: parent.map(CommentId::from),
            author_label: None,
            is_original_poster: false,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            content: format!("Comment {id}"),
        }
    }

    fn ids(tree: &ThreadTree, indices: &[NodeIdx]) -> Vec<String> {
        indices
            .iter()
            .map(|&idx| tree.node(idx).comment.id.to_string())
            .collect()
    }

    fn reachable_ids(tree: &ThreadTree) -> Vec<String> {
        tree.depth_first()
            .into_iter()
            .map(|(idx, _)| tree.node(idx).comment.id.to_string())
            .collect()
    }

    #[test]
    fn test_empty_comments() {
        let tree = build_tree(&[]);
        assert!(tree.is_empty());
        assert!(tree.roots().is_empty());
    }

    #[test]
    fn test_parent_child_relationship() {
        let comments = vec![make_comment("A", None), make_comment("B", Some("A"))];
        let tree = build_tree(&comments);

        assert_eq!(ids(&tree, tree.roots()), vec!["A"]);
        let a = tree.find(&"A".into()).unwrap();
        assert_eq!(ids(&tree, &tree.node(a).replies), vec!["B"]);
    }

    #[test]
    fn test_child_appears_before_parent_in_input() {
        let comments = vec![make_comment("B", Some("A")), make_comment("A", None)];
        let tree = build_tree(&comments);

        assert_eq!(ids(&tree, tree.roots()), vec!["A"]);
        let a = tree.find(&"A".into()).unwrap();
        assert_eq!(ids(&tree, &tree.node(a).replies), vec!["B"]);
    }

    #[test]
    fn test_orphan_treated_as_root() {
        // B claims parent "X" but X doesn't exist
        let comments = vec![make_comment("A", None), make_comment("B", Some("X"))];
        let tree = build_tree(&comments);

        assert_eq!(ids(&tree, tree.roots()), vec!["A", "B"]);
    }

    #[test]
    fn test_replies_keep_input_order() {
        let comments = vec![
            make_comment("A", None),
            make_comment("C", Some("A")),
            make_comment("B", Some("A")),
            make_comment("D", Some("B")),
        ];
        let tree = build_tree(&comments);

        let a = tree.find(&"A".into()).unwrap();
        assert_eq!(ids(&tree, &tree.node(a).replies), vec!["C", "B"]);
        assert_eq!(reachable_ids(&tree), vec!["A", "C", "B", "D"]);
    }

    #[test]
    fn test_every_comment_reachable_exactly_once() {
        let comments = vec![
            make_comment("A", None),
            make_comment("B", Some("A")),
            make_comment("C", None),
            make_comment("D", Some("B")),
            make_comment("E", Some("A")),
            make_comment("F", Some("missing")),
            make_comment("G", Some("F")),
        ];
        let tree = build_tree(&comments);

        let reached = reachable_ids(&tree);
        assert_eq!(reached.len(), comments.len());
        let unique: HashSet<&String> = reached.iter().collect();
        assert_eq!(unique.len(), comments.len());
        for comment in &comments {
            assert!(unique.contains(&comment.id.to_string()));
        }
    }

    #[test]
    fn test_duplicate_ids_do_not_drop_nodes() {
        // Second "A" wins the index, so "B" attaches to it.
        let comments = vec![
            make_comment("A", None),
            make_comment("A", None),
            make_comment("B", Some("A")),
        ];
        let tree = build_tree(&comments);

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.roots(), &[0, 1]);
        assert!(tree.node(0).replies.is_empty());
        assert_eq!(tree.node(1).replies, vec![2]);
        assert_eq!(tree.find(&"A".into()), Some(1));
    }

    #[test]
    fn test_cycle_promoted_to_root() {
        // Malformed data: A -> B -> A (cycle)
        let comments = vec![make_comment("A", Some("B")), make_comment("B", Some("A"))];
        let tree = build_tree(&comments);

        // A is first in input order, so it becomes the root and keeps B.
        assert_eq!(ids(&tree, tree.roots()), vec!["A"]);
        assert_eq!(reachable_ids(&tree), vec!["A", "B"]);
        assert!(tree.node(1).replies.is_empty());
    }

    #[test]
    fn test_self_parent_promoted_to_root() {
        let comments = vec![make_comment("A", Some("A")), make_comment("B", Some("A"))];
        let tree = build_tree(&comments);

        assert_eq!(ids(&tree, tree.roots()), vec!["A"]);
        let a = tree.find(&"A".into()).unwrap();
        assert_eq!(ids(&tree, &tree.node(a).replies), vec!["B"]);
    }
}
