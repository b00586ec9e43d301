//! Effect handlers: async functions that talk to the server and return the
//! resulting `UiEvent`. They never touch state; the runtime spawns them and
//! forwards the event to the inbox.

use candor_core::api::{ApiClient, ThreadRef};
use candor_core::thread::CommentId;
use candor_core::vote::{VoteDirection, VoteState};
use tracing::{info, warn};

use crate::events::UiEvent;

pub async fn load_thread(client: ApiClient, thread: ThreadRef) -> UiEvent {
    let (summary, comments) = tokio::join!(
        client.get_summary(&thread),
        client.list_comments(&thread)
    );
    let result = summary.and_then(|summary| comments.map(|comments| (summary, comments)));
    if let Err(e) = &result {
        warn!(thread = %thread, kind = %e.kind, "thread load failed: {e}");
    }
    UiEvent::ThreadLoaded(result)
}

pub async fn post_comment(
    client: ApiClient,
    thread: ThreadRef,
    content: String,
    parent_id: Option<CommentId>,
) -> UiEvent {
    let result = client.post_comment(&thread, &content, parent_id).await;
    match &result {
        Ok(comment) => info!(thread = %thread, id = %comment.id, "comment posted"),
        Err(e) => warn!(thread = %thread, kind = %e.kind, "comment post failed: {e}"),
    }
    UiEvent::CommentPosted(result)
}

pub async fn cast_vote(
    client: ApiClient,
    thread: ThreadRef,
    direction: VoteDirection,
    previous: VoteState,
) -> UiEvent {
    let result = client.cast_vote(&thread, direction).await;
    if let Err(e) = &result {
        warn!(thread = %thread, %direction, kind = %e.kind, "vote failed: {e}");
    }
    UiEvent::VoteCast { result, previous }
}
