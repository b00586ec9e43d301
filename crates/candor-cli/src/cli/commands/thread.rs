//! `candor thread show`.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use candor_core::api::{ThreadRef, ThreadSummary};
use candor_core::config::Config;
use candor_core::thread::{SortMode, ThreadTree, can_reply_at, get_ranked_tree};
use serde_json::json;

use super::vote::format_tally;

pub async fn show(
    config: &Config,
    thread: &ThreadRef,
    sort: Option<SortMode>,
    json_output: bool,
) -> Result<()> {
    let sort = sort.unwrap_or(config.thread.default_sort);
    let client = super::api_client(config)?;

    let summary = client
        .get_summary(thread)
        .await
        .with_context(|| format!("load {thread}"))?;
    let comments = client
        .list_comments(thread)
        .await
        .with_context(|| format!("load comments for {thread}"))?;
    let tree = get_ranked_tree(&comments, sort);

    if json_output {
        let out = json!({
            "thread": summary,
            "sort": sort,
            "comments": tree.to_nested(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", format_thread(&summary, &tree, sort));
    }
    Ok(())
}

/// Renders the whole tree as indented text, two spaces per level.
pub(crate) fn format_thread(summary: &ThreadSummary, tree: &ThreadTree, sort: SortMode) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", summary.headline());
    let _ = writeln!(out, "{}", format_tally(&summary.votes));
    let _ = writeln!(out, "{} comments · sort: {sort}", tree.len());

    if tree.is_empty() {
        let _ = writeln!(out, "\nNo comments yet.");
        return out;
    }

    for (idx, depth) in tree.depth_first() {
        let comment = &tree.node(idx).comment;
        let indent = "  ".repeat(depth);
        let mut header = format!(
            "{} · {} · {}",
            comment.display_author(),
            comment.created_at.format("%Y-%m-%d %H:%M"),
            comment.id
        );
        if !can_reply_at(depth) {
            header.push_str(" · replies closed");
        }

        if depth == 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "{indent}{header}");
        for line in comment.content.lines() {
            let _ = writeln!(out, "{indent}  {line}");
        }
    }
    out
}
