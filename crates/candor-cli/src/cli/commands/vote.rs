use anyhow::{Context, Result};
use candor_core::api::ThreadRef;
use candor_core::config::Config;
use candor_core::vote::{VoteDirection, VoteState};

pub async fn cast(config: &Config, thread: &ThreadRef, direction: VoteDirection) -> Result<()> {
    let client = super::api_client(config)?;
    let state = client
        .cast_vote(thread, direction)
        .await
        .with_context(|| format!("vote on {thread}"))?;
    println!("{}", format_tally(&state));
    Ok(())
}

pub(crate) fn format_tally(state: &VoteState) -> String {
    let mine = state.my_vote.map_or("none", VoteDirection::as_str);
    format!(
        "▲ {}  ▼ {}  score {}  (your vote: {mine})",
        state.upvotes,
        state.downvotes,
        state.score()
    )
}
