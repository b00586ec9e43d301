use anyhow::{Context, Result};
use candor_core::api::ThreadRef;
use candor_core::config::Config;
use candor_core::thread::CommentId;

pub async fn post(
    config: &Config,
    thread: &ThreadRef,
    content: &str,
    parent: Option<String>,
) -> Result<()> {
    let client = super::api_client(config)?;
    let comment = client
        .post_comment(thread, content, parent.map(CommentId::from))
        .await
        .with_context(|| format!("post comment to {thread}"))?;

    match &comment.parent_id {
        Some(parent) => println!("Posted reply {} (to {parent})", comment.id),
        None => println!("Posted comment {}", comment.id),
    }
    Ok(())
}
